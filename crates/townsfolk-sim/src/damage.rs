//! Hits landing on agents.

use glam::Vec2;
use townsfolk_common::AgentId;
use tracing::debug;

use crate::agent::{Agent, Faction, Job, Personality, HIT_COOLDOWN};
use crate::barks;
use crate::behavior::BehaviorState;
use crate::events::{EventBus, SimEvent};
use crate::player::PlayerState;
use crate::rng::SimRng;
use crate::tactics::{CombatCause, CombatState};

/// Radius around a struck agent in which bystanders react.
pub const ALARM_RADIUS: f32 = 200.0;
/// Relation lost when the player lands a hit.
pub const STRIKE_RELATION_PENALTY: i32 = 30;

/// Result of a hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitOutcome {
    /// Damage actually dealt
    pub dealt: f32,
    /// Whether the hit killed the agent
    pub killed: bool,
}

/// Mutable world slices a hit may touch.
pub(crate) struct DamageScene<'a> {
    pub agents: &'a mut [Agent],
    pub player: &'a mut PlayerState,
    pub rng: &'a mut SimRng,
    pub events: &'a EventBus,
}

/// Applies `amount` damage to agent `id`.
///
/// Returns `None` when the agent does not exist or is already dead. Hits
/// during the post-hit cooldown deal nothing. Blocking quarters the hit,
/// armor scales it and a landed hit deals at least 1. Player hits that do
/// not kill sour the victim's opinion, provoke it and alarm bystanders.
pub(crate) fn damage_agent(
    id: AgentId,
    amount: f32,
    from_player: bool,
    scene: DamageScene<'_>,
) -> Option<HitOutcome> {
    let DamageScene {
        agents,
        player,
        rng,
        events,
    } = scene;

    let agent = agents.get_mut(id.index()).filter(|a| a.alive)?;
    if agent.hit_cooldown > 0.0 {
        return Some(HitOutcome {
            dealt: 0.0,
            killed: false,
        });
    }

    let mut actual = amount.max(0.0);
    if agent.blocking {
        actual *= 0.25;
    }
    let actual = (actual * (1.0 - agent.armor.clamp(0.0, 100.0) * 0.01))
        .round()
        .max(1.0);
    agent.health = (agent.health - actual).clamp(0.0, agent.max_health);
    agent.hit_cooldown = HIT_COOLDOWN;
    if actual > 10.0 && rng.chance(0.25) {
        agent.bleeding += 2.0;
    }
    events.publish(SimEvent::AgentDamaged {
        agent: id,
        amount: actual,
        from_player,
    });

    if agent.health <= 0.0 {
        agent.kill();
        if from_player {
            player.kill_count += 1;
        }
        debug!(agent = %id, by_player = from_player, "agent killed");
        events.publish(SimEvent::AgentKilled {
            agent: id,
            by_player: from_player,
        });
        return Some(HitOutcome {
            dealt: actual,
            killed: true,
        });
    }

    if from_player {
        agent.adjust_relation(-STRIKE_RELATION_PENALTY);
        if !matches!(agent.state, BehaviorState::Fight(_) | BehaviorState::Flee) {
            if agent.personality == Personality::Cowardly || agent.health_ratio() < 0.3 {
                agent.set_state(BehaviorState::Flee);
            } else {
                let combat = CombatState::engage(CombatCause::Provoked, rng);
                agent.set_state(BehaviorState::Fight(combat));
            }
        }
        let origin = agent.position;
        raise_alarm(agents, id, origin, rng, events);
    }

    Some(HitOutcome {
        dealt: actual,
        killed: false,
    })
}

fn raise_alarm(agents: &mut [Agent], victim: AgentId, origin: Vec2, rng: &mut SimRng, events: &EventBus) {
    let radius_sq = ALARM_RADIUS * ALARM_RADIUS;
    for other in agents
        .iter_mut()
        .filter(|a| a.id != victim && a.alive && a.position.distance_squared(origin) <= radius_sq)
    {
        let line = if other.job == Job::Guard {
            if !other.is_fighting() {
                let combat = CombatState::engage(CombatCause::Alarm, rng);
                other.set_state(BehaviorState::Fight(combat));
            }
            barks::GUARD_ALARM_LINE
        } else if other.personality != Personality::Hostile && other.faction != Faction::Bandits {
            other.set_state(BehaviorState::Flee);
            barks::CIVILIAN_ALARM_LINE
        } else {
            continue;
        };
        other.set_bark(line);
        events.publish(SimEvent::Bark {
            agent: other.id,
            text: line.to_string(),
        });
    }
}
