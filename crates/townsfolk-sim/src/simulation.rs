//! The simulation world.
//!
//! [`SimulationWorld`] owns every agent, the player record, the clock, the
//! spatial index, the law system and the single RNG. A tick runs in a
//! fixed order so a seed plus an identical sequence of calls reproduces
//! identical results:
//!
//! 1. advance the clock and the player's timers;
//! 2. rebuild the spatial index from living agents;
//! 3. update every agent in registry order at its level of detail;
//! 4. report crimes raised during step 3, then advance witness reports.

use glam::Vec2;
use townsfolk_common::{AgentId, SchemaVersion};
use tracing::{debug, info};

use crate::agent::{Agent, AgentSpec, Faction};
use crate::barks::BarkProvider;
use crate::behavior::{self, BehaviorState, SocialVenues, StateTag, TickContext, UpdateTier};
use crate::clock::GameClock;
use crate::config::SimConfig;
use crate::damage::{self, DamageScene, HitOutcome};
use crate::events::{EventBus, SimEvent};
use crate::law::{CrimeKind, CrimeRecord, CrimeScene, CrimeTrigger, LawSystem};
use crate::memory::{MemoryKind, MemoryLog};
use crate::names::NameGenerator;
use crate::player::PlayerState;
use crate::rng::SimRng;
use crate::schedule::ScheduleTable;
use crate::snapshot::{AgentRecord, WorldSnapshot};
use crate::spatial::SpatialIndex;
use crate::tactics::{CombatCause, CombatState};
use crate::terrain::Terrain;

/// A population of agents around one player.
#[derive(Debug)]
pub struct SimulationWorld {
    config: SimConfig,
    agents: Vec<Agent>,
    index: SpatialIndex,
    player: PlayerState,
    clock: GameClock,
    schedules: ScheduleTable,
    venues: SocialVenues,
    law: LawSystem,
    rng: SimRng,
    names: NameGenerator,
    events: EventBus,
}

impl SimulationWorld {
    /// Creates an empty world.
    #[must_use]
    pub fn new(mut config: SimConfig) -> Self {
        config.validate();
        Self {
            agents: Vec::new(),
            index: SpatialIndex::new(config.cell_size),
            player: PlayerState::default(),
            clock: GameClock::new(config.start_minutes).with_time_scale(config.time_scale),
            schedules: ScheduleTable::default(),
            venues: SocialVenues::new(),
            law: LawSystem::new(),
            rng: SimRng::seeded(config.seed),
            names: NameGenerator::new(),
            events: EventBus::new(config.event_capacity),
            config,
        }
    }

    /// Replaces the schedule table.
    #[must_use]
    pub fn with_schedules(mut self, schedules: ScheduleTable) -> Self {
        self.schedules = schedules;
        self
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Adds an agent and returns its id.
    pub fn spawn(&mut self, spec: AgentSpec) -> AgentId {
        let id = AgentId::from_index(self.agents.len());
        let mut agent = spec.build(id, &mut self.rng, &mut self.names);
        agent.memory = MemoryLog::new(self.config.memory_capacity);
        debug!(agent = %id, name = %agent.name.full, job = ?agent.job, "spawned");
        self.index.insert(&agent);
        self.agents.push(agent);
        id
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Every agent in registry order.
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// One agent.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.index())
    }

    /// One agent, mutably.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id.index())
    }

    /// The player record.
    #[must_use]
    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    /// The player record, mutably.
    pub fn player_mut(&mut self) -> &mut PlayerState {
        &mut self.player
    }

    /// The game clock.
    #[must_use]
    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    /// The game clock, mutably.
    pub fn clock_mut(&mut self) -> &mut GameClock {
        &mut self.clock
    }

    /// The schedule table.
    #[must_use]
    pub fn schedules(&self) -> &ScheduleTable {
        &self.schedules
    }

    /// Social venues, mutably.
    pub fn venues_mut(&mut self) -> &mut SocialVenues {
        &mut self.venues
    }

    /// The law system.
    #[must_use]
    pub fn law(&self) -> &LawSystem {
        &self.law
    }

    /// The event bus.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Takes every pending event.
    pub fn drain_events(&self) -> Vec<SimEvent> {
        self.events.drain()
    }

    pub(crate) fn rng_mut(&mut self) -> &mut SimRng {
        &mut self.rng
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advances the world by `dt` real seconds.
    pub fn update(&mut self, dt: f32, terrain: &dyn Terrain, barks: &dyn BarkProvider) {
        let dt = dt.max(0.0);
        self.clock.advance(dt);
        self.player.tick(dt);
        let hour = self.clock.hour();
        let now = self.clock.minutes();

        self.index.rebuild(&self.agents);
        let before: Vec<StateTag> = self.agents.iter().map(Agent::state_tag).collect();
        let (near, far) = (self.config.near_range, self.config.far_range);

        let mut triggers = Vec::new();
        let mut ctx = TickContext {
            player: &mut self.player,
            index: &self.index,
            rng: &mut self.rng,
            terrain,
            barks,
            events: &self.events,
            schedules: &self.schedules,
            venues: &self.venues,
            hour,
            recent_crimes: self.law.recent_count(),
            crime_triggers: &mut triggers,
        };
        for agent in self.agents.iter_mut().filter(|a| a.alive) {
            let distance = agent.distance_to(ctx.player.position);
            let tier = UpdateTier::for_distance(distance, near, far);
            match tier {
                UpdateTier::FullSimulation => behavior::update_full(agent, dt, &mut ctx),
                UpdateTier::CoarseApproximation => behavior::update_coarse(agent, ctx.schedules, hour),
                UpdateTier::Dormant => continue,
            }
            if agent.tick_vitals(dt) {
                debug!(agent = %agent.id, "bled out");
                ctx.events.publish(SimEvent::AgentKilled {
                    agent: agent.id,
                    by_player: false,
                });
            }
        }

        for trigger in triggers {
            self.report(trigger, terrain, hour, now);
        }
        self.law.update(dt, &mut self.agents, now, &self.events);

        for (agent, from) in self.agents.iter().zip(before) {
            let to = agent.state_tag();
            if from != to {
                self.events.publish(SimEvent::StateChanged {
                    agent: agent.id,
                    from,
                    to,
                });
            }
        }
    }

    /// Rebuilds the spatial index from current positions.
    pub fn rebuild_index(&mut self) {
        self.index.rebuild(&self.agents);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Living agents within `radius` of the player, ordered by id.
    #[must_use]
    pub fn near_player(&self, radius: f32) -> Vec<&Agent> {
        self.near(self.player.position, radius)
    }

    /// Living agents within `radius` of `position`, ordered by id.
    #[must_use]
    pub fn near(&self, position: Vec2, radius: f32) -> Vec<&Agent> {
        self.index
            .query_ids(position, radius)
            .into_iter()
            .filter_map(|id| self.agent(id))
            .filter(|a| a.alive)
            .collect()
    }

    /// Closest living agent within `radius` of `position`.
    #[must_use]
    pub fn nearest(&self, position: Vec2, radius: f32) -> Option<&Agent> {
        self.near(position, radius).into_iter().min_by(|a, b| {
            a.position
                .distance_squared(position)
                .total_cmp(&b.position.distance_squared(position))
        })
    }

    /// Living members of a faction.
    #[must_use]
    pub fn by_faction(&self, faction: &Faction) -> Vec<&Agent> {
        self.agents
            .iter()
            .filter(|a| a.alive && &a.faction == faction)
            .collect()
    }

    // ========================================================================
    // Collaborator hooks
    // ========================================================================

    /// Shows a bark over an agent. Returns false for unknown agents.
    pub fn set_bark(&mut self, id: AgentId, text: impl Into<String>) -> bool {
        let Some(agent) = self.agents.get_mut(id.index()) else {
            return false;
        };
        let text = text.into();
        agent.set_bark(text.clone());
        self.events.publish(SimEvent::Bark { agent: id, text });
        true
    }

    /// Shows a speech bubble over an agent. Returns false for unknown agents.
    pub fn set_speech(&mut self, id: AgentId, text: impl Into<String>, duration: Option<f32>) -> bool {
        self.agent_mut(id).map_or(false, |agent| {
            agent.set_speech(text, duration);
            true
        })
    }

    /// Records a memory stamped with the current game minute.
    pub fn add_memory(&mut self, id: AgentId, kind: MemoryKind) -> bool {
        let now = self.clock.minutes();
        self.agent_mut(id).map_or(false, |agent| {
            agent.remember(kind, now);
            true
        })
    }

    /// Reports a crime by the player at the player's position.
    ///
    /// Nearby awake agents may witness it depending on distance, time of
    /// day, forest cover and the player's stealth. Guards who see it attack
    /// at once; other witnesses flee and report to the guards later.
    /// Bounty and reputation are adjusted exactly once per call.
    pub fn report_crime(
        &mut self,
        kind: CrimeKind,
        reporter: Option<AgentId>,
        victim: Option<AgentId>,
        terrain: &dyn Terrain,
    ) -> CrimeRecord {
        let hour = self.clock.hour();
        let now = self.clock.minutes();
        self.report(
            CrimeTrigger {
                kind,
                reporter,
                victim,
            },
            terrain,
            hour,
            now,
        )
    }

    fn report(&mut self, trigger: CrimeTrigger, terrain: &dyn Terrain, hour: f32, now: f32) -> CrimeRecord {
        self.law.report_crime(
            trigger,
            CrimeScene {
                agents: &mut self.agents,
                index: &self.index,
                player: &mut self.player,
                rng: &mut self.rng,
                terrain,
                events: &self.events,
                hour,
                now,
            },
        )
    }

    /// Zeroes the bounty and stands down guards fighting the player.
    /// Returns the number of guards stood down.
    pub fn clear_bounty(&mut self) -> usize {
        LawSystem::clear_bounty(&mut self.player, &mut self.agents, &self.events)
    }

    /// Applies damage to an agent. Returns `None` for unknown or dead agents.
    pub fn damage_agent(&mut self, id: AgentId, amount: f32, from_player: bool) -> Option<HitOutcome> {
        damage::damage_agent(
            id,
            amount,
            from_player,
            DamageScene {
                agents: &mut self.agents,
                player: &mut self.player,
                rng: &mut self.rng,
                events: &self.events,
            },
        )
    }

    /// The player strikes an agent. Hitting anyone but a bandit is an
    /// assault, and a killing blow is also murder.
    pub fn player_strike(&mut self, id: AgentId, amount: f32, terrain: &dyn Terrain) -> Option<HitOutcome> {
        let outcome = self.damage_agent(id, amount, true)?;
        let lawful_target = self.agent(id).is_some_and(|a| a.faction != Faction::Bandits);
        if lawful_target {
            self.report_crime(CrimeKind::Assault, None, Some(id), terrain);
            if outcome.killed {
                self.report_crime(CrimeKind::Murder, None, Some(id), terrain);
            }
        }
        Some(outcome)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Captures the mutable state of the world.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            version: SchemaVersion::WORLD_SNAPSHOT,
            minutes: self.clock.minutes(),
            day: self.clock.day(),
            agents: self
                .agents
                .iter()
                .map(|a| AgentRecord {
                    id: a.id,
                    position: a.position,
                    health: a.health,
                    alive: a.alive,
                    state: a.state_tag(),
                    player_relation: a.player_relation,
                    memory: a.memory.to_vec(),
                    bleeding: a.bleeding,
                })
                .collect(),
            recent_crimes: self.law.recent_crimes().cloned().collect(),
        }
    }

    /// Restores a snapshot onto the agents spawned in the same order.
    /// Records beyond the current population are ignored. Returns the
    /// number of agents restored.
    pub fn apply_snapshot(&mut self, snapshot: &WorldSnapshot) -> usize {
        self.clock.set_minutes(snapshot.minutes);
        self.clock.set_day(snapshot.day);
        self.law.restore_recent(snapshot.recent_crimes.clone());

        let mut restored = 0;
        for (agent, record) in self.agents.iter_mut().zip(&snapshot.agents) {
            agent.position = record.position;
            agent.player_relation = record.player_relation.clamp(-100, 100);
            agent.bleeding = record.bleeding.max(0.0);
            agent.memory.replace_with(record.memory.iter().cloned());
            agent.blocking = false;
            agent.state_timer = 0.0;

            if record.alive && record.state != StateTag::Dead && record.health > 0.0 {
                agent.alive = true;
                agent.health = record.health.min(agent.max_health);
                agent.state = restored_state(record.state, &mut self.rng);
            } else {
                agent.kill();
            }
            restored += 1;
        }
        self.index.rebuild(&self.agents);
        info!(agents = restored, day = snapshot.day, "snapshot applied");
        restored
    }
}

fn restored_state(tag: StateTag, rng: &mut SimRng) -> BehaviorState {
    match tag {
        StateTag::Idle | StateTag::Dead => BehaviorState::Idle,
        StateTag::Travel => BehaviorState::Travel,
        StateTag::Work => BehaviorState::Work,
        StateTag::Socialize => BehaviorState::Socialize,
        StateTag::Patrol => BehaviorState::Patrol,
        StateTag::Sleep => BehaviorState::Sleep,
        StateTag::Fight => BehaviorState::Fight(CombatState::engage(CombatCause::Restored, rng)),
        StateTag::Flee => BehaviorState::Flee,
        StateTag::Investigate => BehaviorState::Investigate { target: None },
    }
}
