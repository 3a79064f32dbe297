//! Tactical combat sub-machine.
//!
//! A fighting agent cycles through approach, circle, attack, feint, dodge
//! and retreat phases around its target. Nearby fighting allies pull it
//! toward the far side of the target so groups surround instead of queue.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};

use crate::agent::{Agent, Faction, Job};
use crate::barks;
use crate::behavior::{BehaviorState, TickContext};
use crate::events::SimEvent;
use crate::law::{CrimeKind, CrimeTrigger};
use crate::movement::{angle_between, from_angle, move_toward};
use crate::rng::SimRng;

/// Distance beyond which an agent gives up the chase.
pub const GIVE_UP_DISTANCE: f32 = 500.0;
/// Radius searched for fighting allies.
pub const ALLY_RADIUS: f32 = 150.0;
/// Distance kept from the target while flanking.
pub const FLANK_RADIUS: f32 = 45.0;
/// Fraction of the flank offset closed per second.
pub const FLANK_BLEND: f32 = 0.8;
/// Strafing radius in the circle phase.
pub const CIRCLE_RADIUS: f32 = 50.0;
/// Distance at which the approach phase stops closing.
pub const ENGAGE_DISTANCE: f32 = 45.0;
/// Strike reach.
pub const STRIKE_REACH: f32 = 42.0;
/// Distance below which attackers stop rushing.
pub const RUSH_STOP: f32 = 38.0;

const COMBAT_BARK_CHANCE: f32 = 0.003;

/// What the agent is fighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatTarget {
    /// The player
    Player,
}

/// Why the fight started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatCause {
    /// Bandit ambush
    Ambush,
    /// Guard spotted a wanted player
    Bounty,
    /// Guard saw a crime
    CrimeWitnessed,
    /// The player struck this agent
    Provoked,
    /// A nearby assault raised the alarm
    Alarm,
    /// Resumed from a snapshot
    Restored,
}

/// Tactical phase of a fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TacticalPhase {
    /// Closing distance
    Approach,
    /// Strafing around the target
    Circle,
    /// Rushing in to strike
    Attack,
    /// Faking an attack against a blocking target
    Feint,
    /// Sidestepping an incoming swing
    Dodge,
    /// Backing off while blocking
    Retreat,
}

/// Combat bookkeeping carried inside [`BehaviorState::Fight`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatState {
    /// Target
    pub target: CombatTarget,
    /// Why the fight started
    pub cause: CombatCause,
    /// Current phase
    pub phase: TacticalPhase,
    /// Seconds left in the phase
    pub phase_timer: f32,
    /// Strafing direction, +1 or -1
    pub circle_dir: f32,
}

impl CombatState {
    /// Starts a fight against the player in the approach phase.
    pub fn engage(cause: CombatCause, rng: &mut SimRng) -> Self {
        Self {
            target: CombatTarget::Player,
            cause,
            phase: TacticalPhase::Approach,
            phase_timer: 0.0,
            circle_dir: rng.sign(),
        }
    }

    fn enter(&mut self, phase: TacticalPhase, timer: f32) {
        self.phase = phase;
        self.phase_timer = timer;
    }
}

/// Offset that drifts `position` toward the side of `target` opposite the
/// average bearing of `allies`. Returns `None` without allies.
#[must_use]
pub fn flank_drift(position: Vec2, target: Vec2, allies: &[Vec2], dt: f32) -> Option<Vec2> {
    if allies.is_empty() {
        return None;
    }
    let sum: Vec2 = allies
        .iter()
        .map(|ally| (*ally - target).normalize_or_zero())
        .sum();
    let avg = sum / allies.len() as f32;
    let bearing = avg.normalize_or_zero();
    if bearing == Vec2::ZERO {
        return None;
    }
    let ideal = target - bearing * FLANK_RADIUS;
    Some((ideal - position) * dt * FLANK_BLEND)
}

/// Runs one tick of combat for `agent`, which must be fighting.
pub(crate) fn update_combat(agent: &mut Agent, dt: f32, ctx: &mut TickContext<'_>) {
    let BehaviorState::Fight(mut combat) = agent.state else {
        return;
    };

    let target = ctx.player.position;
    if !ctx.player.alive {
        let line = barks::victory_line(ctx.rng);
        stand_down(agent, ctx, line);
        return;
    }
    let dist = agent.distance_to(target);
    if dist > GIVE_UP_DISTANCE {
        stand_down(agent, ctx, barks::GIVE_UP_LINE.to_string());
        return;
    }

    combat.phase_timer -= dt;
    let aggro = agent.aggression;
    let allies: Vec<Vec2> = ctx
        .index
        .query(agent.position, ALLY_RADIUS)
        .into_iter()
        .filter(|entry| entry.id != agent.id && entry.fighting)
        .map(|entry| entry.position)
        .collect();

    let ratio = agent.health_ratio();
    if ratio < agent.personality.flee_threshold() && allies.is_empty() {
        agent.blocking = false;
        agent.set_state(BehaviorState::Flee);
        let line = barks::yield_line(ctx.rng);
        ctx.bark(agent, line);
        return;
    }
    if ratio < 0.5 && combat.phase != TacticalPhase::Retreat && ctx.rng.chance(0.01) {
        let timer = 1.5 + ctx.rng.unit();
        combat.enter(TacticalPhase::Retreat, timer);
        let line = barks::retreat_line(ctx.rng);
        ctx.bark(agent, line);
    }

    let to_target = angle_between(agent.position, target);
    match combat.phase {
        TacticalPhase::Approach => {
            if dist > ENGAGE_DISTANCE {
                move_toward(agent, target, dt, 1.2 + aggro * 0.3, ctx.terrain);
            } else {
                let next = if ctx.rng.chance(0.4 + aggro * 0.3) {
                    TacticalPhase::Attack
                } else {
                    TacticalPhase::Circle
                };
                let timer = 0.3 + ctx.rng.unit() * 0.5;
                combat.enter(next, timer);
            }
            agent.blocking = false;
        },
        TacticalPhase::Circle => {
            let angle = to_target + FRAC_PI_2 * combat.circle_dir;
            let spot = target + from_angle(angle) * CIRCLE_RADIUS;
            move_toward(agent, spot, dt, 0.8, ctx.terrain);
            agent.blocking = ctx.rng.chance(0.5);

            if combat.phase_timer <= 0.0 {
                if ctx.rng.chance(0.6 + aggro * 0.2) {
                    combat.enter(TacticalPhase::Attack, 0.1);
                } else {
                    combat.circle_dir = -combat.circle_dir;
                    combat.phase_timer = 1.0 + ctx.rng.unit() * 1.5;
                }
            }
            if ctx.player.is_attacking() && dist < CIRCLE_RADIUS && ctx.rng.chance(aggro * 0.4) {
                combat.enter(TacticalPhase::Dodge, 0.3);
            }
        },
        TacticalPhase::Attack => attack(agent, &mut combat, dist, dt, ctx),
        TacticalPhase::Feint => {
            if combat.phase_timer > 0.3 {
                move_toward(agent, target, dt, 1.4, ctx.terrain);
            } else {
                let back = agent.position + from_angle(to_target + PI) * 30.0;
                move_toward(agent, back, dt, 1.0, ctx.terrain);
            }
            agent.blocking = false;
            if combat.phase_timer <= 0.0 {
                combat.enter(TacticalPhase::Attack, 0.3);
            }
        },
        TacticalPhase::Dodge => {
            let side = agent.position + from_angle(to_target + FRAC_PI_2 * combat.circle_dir) * 60.0;
            move_toward(agent, side, dt, 2.0, ctx.terrain);
            agent.blocking = false;
            if combat.phase_timer <= 0.0 {
                combat.enter(TacticalPhase::Attack, 0.2);
            }
        },
        TacticalPhase::Retreat => {
            let back = agent.position + from_angle(to_target + PI) * 80.0;
            move_toward(agent, back, dt, 0.9, ctx.terrain);
            agent.blocking = true;
            if combat.phase_timer <= 0.0 {
                let next = if dist > 80.0 {
                    TacticalPhase::Approach
                } else {
                    TacticalPhase::Circle
                };
                let timer = 1.0 + ctx.rng.unit();
                combat.enter(next, timer);
            }
        },
    }

    if !matches!(combat.phase, TacticalPhase::Dodge | TacticalPhase::Retreat) {
        if let Some(drift) = flank_drift(agent.position, target, &allies, dt) {
            agent.position += drift;
        }
    }

    if agent.presentation.can_bark() && ctx.rng.chance(COMBAT_BARK_CHANCE) {
        let line = barks::combat_line(agent, ctx.rng);
        ctx.bark(agent, line);
    }

    if agent.is_fighting() {
        agent.state = BehaviorState::Fight(combat);
    }
}

fn attack(agent: &mut Agent, combat: &mut CombatState, dist: f32, dt: f32, ctx: &mut TickContext<'_>) {
    let target = ctx.player.position;
    if dist > RUSH_STOP {
        move_toward(agent, target, dt, 1.6, ctx.terrain);
        agent.blocking = false;
    }
    if dist < STRIKE_REACH && agent.attack_timer <= 0.0 {
        if ctx.player.blocking && ctx.rng.chance(0.35) {
            combat.enter(TacticalPhase::Feint, 0.6);
            return;
        }
        let damage = (agent.damage * (0.8 + ctx.rng.unit() * 0.4)).round();
        let dealt = ctx.player.take_damage(damage, ctx.rng);
        agent.attack_timer = 0.6 + ctx.rng.unit() * 0.5;
        if dealt > 10.0 && ctx.rng.chance(0.2) {
            ctx.player.bleeding += 1.5;
        }
        if dealt > 0.0 {
            ctx.events.publish(SimEvent::PlayerDamaged {
                attacker: agent.id,
                amount: dealt,
            });
        }
        if agent.job != Job::Guard && agent.faction != Faction::Bandits {
            ctx.crime_triggers.push(CrimeTrigger {
                kind: CrimeKind::Assault,
                reporter: Some(agent.id),
                victim: Some(agent.id),
            });
        }
        if ctx.rng.chance(0.4) {
            let timer = 0.5 + ctx.rng.unit() * 0.5;
            combat.enter(TacticalPhase::Retreat, timer);
        } else {
            let timer = 0.8 + ctx.rng.unit();
            combat.enter(TacticalPhase::Circle, timer);
        }
    }
    if combat.phase == TacticalPhase::Attack && combat.phase_timer <= 0.0 {
        combat.enter(TacticalPhase::Circle, 1.0);
    }
}

fn stand_down(agent: &mut Agent, ctx: &mut TickContext<'_>, line: String) {
    agent.blocking = false;
    agent.set_state(BehaviorState::Idle);
    ctx.bark(agent, line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::tests::test_agent;
    use crate::agent::Personality;
    use crate::behavior::tests::Harness;
    use crate::behavior::StateTag;
    use townsfolk_common::AgentId;

    const PLAYER: Vec2 = Vec2::new(1000.0, 1000.0);

    fn fighter(job: Job, offset: f32, phase: TacticalPhase, timer: f32) -> Agent {
        let mut agent = test_agent(job, PLAYER + Vec2::new(offset, 0.0));
        let mut combat = CombatState::engage(CombatCause::Provoked, &mut SimRng::seeded(3));
        combat.enter(phase, timer);
        agent.set_state(BehaviorState::Fight(combat));
        agent
    }

    fn tick(h: &mut Harness, agent: &mut Agent, dt: f32) {
        let mut ctx = h.context(12.0);
        update_combat(agent, dt, &mut ctx);
    }

    fn phase(agent: &Agent) -> Option<TacticalPhase> {
        match agent.state {
            BehaviorState::Fight(combat) => Some(combat.phase),
            _ => None,
        }
    }

    #[test]
    fn test_engage_starts_in_approach() {
        let mut rng = SimRng::seeded(9);
        let combat = CombatState::engage(CombatCause::Ambush, &mut rng);
        assert_eq!(combat.phase, TacticalPhase::Approach);
        assert_eq!(combat.target, CombatTarget::Player);
        assert!(combat.circle_dir == 1.0 || combat.circle_dir == -1.0);
    }

    #[test]
    fn test_flank_moves_to_far_side() {
        let target = Vec2::new(100.0, 100.0);
        let ally = Vec2::new(140.0, 100.0);
        let position = Vec2::new(100.0, 140.0);
        let drift = flank_drift(position, target, &[ally], 0.1).expect("ally present");
        let ally_dir = (ally - target).normalize();
        let after = position + drift;
        assert!((after - target).dot(ally_dir) < (position - target).dot(ally_dir));
        assert!(drift.dot(ally_dir) < 0.0);
    }

    #[test]
    fn test_flank_averages_bearings() {
        let target = Vec2::ZERO;
        // Bearings 170 and -170 degrees average to due west, not east.
        let a = from_angle(170f32.to_radians()) * 100.0;
        let b = from_angle((-170f32).to_radians()) * 100.0;
        let drift = flank_drift(Vec2::ZERO, target, &[a, b], 1.0).expect("allies present");
        assert!(drift.x > 0.0);
    }

    #[test]
    fn test_no_flank_without_allies() {
        assert!(flank_drift(Vec2::ONE, Vec2::ZERO, &[], 0.1).is_none());
    }

    #[test]
    fn test_approach_closes_distance() {
        let mut h = Harness::new(PLAYER);
        let mut agent = fighter(Job::Villager, 200.0, TacticalPhase::Approach, 0.0);
        tick(&mut h, &mut agent, 0.1);
        assert_eq!(phase(&agent), Some(TacticalPhase::Approach));
        assert!(agent.distance_to(PLAYER) < 200.0);
    }

    #[test]
    fn test_approach_commits_within_engage_distance() {
        let mut h = Harness::new(PLAYER);
        let mut eager = fighter(Job::Villager, 40.0, TacticalPhase::Approach, 0.0);
        eager.aggression = 2.0;
        tick(&mut h, &mut eager, 0.1);
        assert_eq!(phase(&eager), Some(TacticalPhase::Attack));

        let mut wary = fighter(Job::Villager, 40.0, TacticalPhase::Approach, 0.0);
        wary.aggression = -2.0;
        tick(&mut h, &mut wary, 0.1);
        assert_eq!(phase(&wary), Some(TacticalPhase::Circle));
    }

    #[test]
    fn test_strike_hurts_player_and_raises_assault() {
        let mut h = Harness::new(PLAYER);
        let mut agent = fighter(Job::Villager, 30.0, TacticalPhase::Attack, 0.5);
        agent.id = AgentId::from_index(4);
        agent.attack_timer = 0.0;
        tick(&mut h, &mut agent, 0.1);

        assert!(h.player.health < 100.0);
        assert!(agent.attack_timer > 0.0);
        assert!(matches!(phase(&agent), Some(TacticalPhase::Retreat | TacticalPhase::Circle)));
        assert_eq!(
            h.triggers,
            vec![CrimeTrigger {
                kind: CrimeKind::Assault,
                reporter: Some(agent.id),
                victim: Some(agent.id),
            }]
        );
        let damaged = h
            .events
            .drain()
            .into_iter()
            .any(|event| matches!(event, SimEvent::PlayerDamaged { attacker, .. } if attacker == agent.id));
        assert!(damaged);
    }

    #[test]
    fn test_guards_and_bandits_strike_lawfully() {
        let mut h = Harness::new(PLAYER);
        let mut guard = fighter(Job::Guard, 30.0, TacticalPhase::Attack, 0.5);
        guard.attack_timer = 0.0;
        tick(&mut h, &mut guard, 0.1);

        h.player.hit_cooldown = 0.0;
        let mut bandit = fighter(Job::Villager, 30.0, TacticalPhase::Attack, 0.5);
        bandit.faction = Faction::Bandits;
        bandit.attack_timer = 0.0;
        tick(&mut h, &mut bandit, 0.1);

        assert!(guard.attack_timer > 0.0);
        assert!(bandit.attack_timer > 0.0);
        assert!(h.triggers.is_empty());
    }

    #[test]
    fn test_strike_waits_for_cooldown() {
        let mut h = Harness::new(PLAYER);
        let mut agent = fighter(Job::Villager, 30.0, TacticalPhase::Attack, 0.5);
        agent.attack_timer = 0.4;
        tick(&mut h, &mut agent, 0.1);
        assert_eq!(h.player.health, 100.0);
        assert_eq!(phase(&agent), Some(TacticalPhase::Attack));
        assert!(h.triggers.is_empty());
    }

    #[test]
    fn test_blocking_player_draws_feints() {
        let mut feints = 0;
        for seed in 0..64 {
            let mut h = Harness::new(PLAYER);
            h.rng = SimRng::seeded(seed);
            h.player.blocking = true;
            let mut agent = fighter(Job::Villager, 30.0, TacticalPhase::Attack, 0.5);
            agent.attack_timer = 0.0;
            tick(&mut h, &mut agent, 0.1);

            if phase(&agent) == Some(TacticalPhase::Feint) {
                feints += 1;
                assert_eq!(h.player.health, 100.0);
                assert_eq!(agent.attack_timer, 0.0);
                assert!(h.triggers.is_empty());
            } else {
                assert!(h.player.health < 100.0);
                assert_eq!(h.triggers.len(), 1);
            }
        }
        assert!(feints > 0 && feints < 64);
    }

    #[test]
    fn test_feint_and_dodge_lead_into_attack() {
        let mut h = Harness::new(PLAYER);
        let mut feinter = fighter(Job::Villager, 40.0, TacticalPhase::Feint, 0.05);
        tick(&mut h, &mut feinter, 0.1);
        assert_eq!(phase(&feinter), Some(TacticalPhase::Attack));
        assert!(!feinter.blocking);

        let mut dodger = fighter(Job::Villager, 40.0, TacticalPhase::Dodge, 0.05);
        tick(&mut h, &mut dodger, 0.1);
        assert_eq!(phase(&dodger), Some(TacticalPhase::Attack));
    }

    #[test]
    fn test_retreat_picks_next_phase_by_distance() {
        let mut h = Harness::new(PLAYER);
        let mut far = fighter(Job::Villager, 200.0, TacticalPhase::Retreat, 0.05);
        tick(&mut h, &mut far, 0.1);
        assert_eq!(phase(&far), Some(TacticalPhase::Approach));
        assert!(far.blocking);

        let mut near = fighter(Job::Villager, 60.0, TacticalPhase::Retreat, 0.05);
        tick(&mut h, &mut near, 0.1);
        assert_eq!(phase(&near), Some(TacticalPhase::Circle));
    }

    #[test]
    fn test_gives_up_when_target_escapes() {
        let mut h = Harness::new(PLAYER);
        let mut agent = fighter(Job::Guard, 600.0, TacticalPhase::Approach, 0.0);
        tick(&mut h, &mut agent, 0.1);
        assert_eq!(agent.state_tag(), StateTag::Idle);
        assert_eq!(phase(&agent), None);
        assert_eq!(agent.presentation.bark.as_deref(), Some(barks::GIVE_UP_LINE));
    }

    #[test]
    fn test_stands_down_when_player_dies() {
        let mut h = Harness::new(PLAYER);
        h.player.alive = false;
        let mut agent = fighter(Job::Guard, 30.0, TacticalPhase::Circle, 1.0);
        tick(&mut h, &mut agent, 0.1);
        assert_eq!(agent.state_tag(), StateTag::Idle);
        assert_eq!(phase(&agent), None);
        assert!(!agent.blocking);
    }

    #[test]
    fn test_flee_thresholds_by_personality() {
        let cases = [
            (Personality::Brave, 15.0, StateTag::Fight),
            (Personality::Brave, 5.0, StateTag::Flee),
            (Personality::Calm, 25.0, StateTag::Fight),
            (Personality::Calm, 15.0, StateTag::Flee),
            (Personality::Cowardly, 35.0, StateTag::Flee),
        ];
        for (personality, health, expected) in cases {
            let mut h = Harness::new(PLAYER);
            let mut agent = fighter(Job::Villager, 200.0, TacticalPhase::Approach, 0.0);
            agent.personality = personality;
            agent.max_health = 100.0;
            agent.health = health;
            tick(&mut h, &mut agent, 0.1);
            assert_eq!(agent.state_tag(), expected, "{personality:?} at {health}");
        }
    }
}
