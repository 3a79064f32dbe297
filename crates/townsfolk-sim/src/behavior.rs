//! Per-agent behavior state machine.
//!
//! Overrides (combat, fleeing, investigating) take priority over role
//! triggers, which take priority over the daily schedule. Agents far from
//! the player run a coarse approximation or nothing at all.

use ahash::AHashMap;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, Faction, Facing, Job};
use crate::barks::{self, BarkContext, BarkProvider, BarkScene};
use crate::events::{EventBus, SimEvent};
use crate::law::CrimeTrigger;
use crate::movement::{move_away, move_toward};
use crate::player::{PlayerState, SocialStanding};
use crate::rng::SimRng;
use crate::schedule::{Activity, ScheduleTable, ScheduleTarget};
use crate::spatial::SpatialIndex;
use crate::tactics::{self, CombatCause, CombatState};
use crate::terrain::Terrain;

/// Default distance below which agents are fully simulated.
pub const DEFAULT_NEAR_RANGE: f32 = 600.0;
/// Default distance below which agents are coarsely simulated.
pub const DEFAULT_FAR_RANGE: f32 = 1800.0;

const FLEE_RELEASE: f32 = 400.0;
const ARRIVE_RADIUS_SQ: f32 = 400.0;
const AMBUSH_RANGE: f32 = 200.0;
const GUARD_ALERT_RANGE: f32 = 180.0;
const SALUTE_RANGE: f32 = 80.0;
const GREET_RANGE: f32 = 100.0;
const GREET_COOLDOWN: f32 = 30.0;
const AWARENESS_RANGE: f32 = 120.0;
const COARSE_LERP: f32 = 0.01;

/// Top-level behavior. [`BehaviorState::Dead`] is terminal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BehaviorState {
    /// Loitering
    Idle,
    /// Walking to work
    Travel,
    /// Working
    Work,
    /// Gathering with others
    Socialize,
    /// Walking a patrol route
    Patrol,
    /// Asleep at home
    Sleep,
    /// In combat
    Fight(CombatState),
    /// Running from the player
    Flee,
    /// Heading to a reported crime
    Investigate {
        /// Where to go; `None` relaxes to idle
        target: Option<Vec2>,
    },
    /// Dead
    Dead,
}

impl BehaviorState {
    /// Payload-free tag.
    #[must_use]
    pub const fn tag(&self) -> StateTag {
        match self {
            Self::Idle => StateTag::Idle,
            Self::Travel => StateTag::Travel,
            Self::Work => StateTag::Work,
            Self::Socialize => StateTag::Socialize,
            Self::Patrol => StateTag::Patrol,
            Self::Sleep => StateTag::Sleep,
            Self::Fight(_) => StateTag::Fight,
            Self::Flee => StateTag::Flee,
            Self::Investigate { .. } => StateTag::Investigate,
            Self::Dead => StateTag::Dead,
        }
    }

    fn from_activity(activity: Activity) -> Self {
        match activity {
            Activity::Idle => Self::Idle,
            Activity::Travel => Self::Travel,
            Activity::Work => Self::Work,
            Activity::Socialize => Self::Socialize,
            Activity::Patrol => Self::Patrol,
            Activity::Sleep => Self::Sleep,
        }
    }
}

/// [`BehaviorState`] without payload, used in events and snapshots.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StateTag {
    Idle,
    Travel,
    Work,
    Socialize,
    Patrol,
    Sleep,
    Fight,
    Flee,
    Investigate,
    Dead,
}

/// Level of detail an agent is simulated at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateTier {
    /// Schedule, behavior and combat
    FullSimulation,
    /// Schedule plus a slow drift toward home or work
    CoarseApproximation,
    /// Not updated
    Dormant,
}

impl UpdateTier {
    /// Picks the tier for an agent `distance` away from the player.
    #[must_use]
    pub fn for_distance(distance: f32, near: f32, far: f32) -> Self {
        if distance < near {
            Self::FullSimulation
        } else if distance < far {
            Self::CoarseApproximation
        } else {
            Self::Dormant
        }
    }
}

// ============================================================================
// Social venues
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
struct Venue {
    evening: Vec2,
    day: Vec2,
}

/// Gathering points agents head to when socializing inside a location.
#[derive(Debug, Clone, Default)]
pub struct SocialVenues {
    venues: AHashMap<String, Venue>,
}

impl SocialVenues {
    /// Hour from which the evening spot is used.
    pub const EVENING_HOUR: f32 = 18.0;

    /// Creates an empty venue table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the evening and daytime spots of a location.
    pub fn insert(&mut self, location: impl Into<String>, evening: Vec2, day: Vec2) {
        self.venues.insert(location.into(), Venue { evening, day });
    }

    /// Gathering point for `location` at `hour`.
    #[must_use]
    pub fn spot(&self, location: &str, hour: f32) -> Option<Vec2> {
        self.venues.get(location).map(|v| {
            if hour >= Self::EVENING_HOUR {
                v.evening
            } else {
                v.day
            }
        })
    }

    /// Number of locations with venues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.venues.len()
    }

    /// Whether no venues are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.venues.is_empty()
    }
}

// ============================================================================
// Tick context
// ============================================================================

/// Everything an agent update may read or touch besides the agent itself.
pub(crate) struct TickContext<'a> {
    pub player: &'a mut PlayerState,
    pub index: &'a SpatialIndex,
    pub rng: &'a mut SimRng,
    pub terrain: &'a dyn Terrain,
    pub barks: &'a dyn BarkProvider,
    pub events: &'a EventBus,
    pub schedules: &'a ScheduleTable,
    pub venues: &'a SocialVenues,
    pub hour: f32,
    pub recent_crimes: usize,
    pub crime_triggers: &'a mut Vec<CrimeTrigger>,
}

impl TickContext<'_> {
    /// Shows a bark and publishes it.
    pub fn bark(&self, agent: &mut Agent, text: impl Into<String>) {
        let text = text.into();
        agent.set_bark(text.clone());
        self.events.publish(SimEvent::Bark {
            agent: agent.id,
            text,
        });
    }

    fn ambient(&mut self, agent: &mut Agent, context: BarkContext) {
        let scene = BarkScene {
            hour: self.hour,
            player_class: self.player.apparent_class(),
            player_reputation: self.player.reputation.global(),
            recent_crimes: self.recent_crimes,
        };
        let line = barks::ambient_bark(self.barks, agent, context, &scene, self.rng);
        self.bark(agent, line);
    }
}

// ============================================================================
// Updates
// ============================================================================

/// Copies the scheduled activity for the current hour onto the agent.
/// Jobs without a schedule keep their previous activity.
pub(crate) fn sync_schedule(agent: &mut Agent, schedules: &ScheduleTable, hour: f32) {
    if let Some(block) = schedules.resolve(agent.job, hour) {
        agent.scheduled = block.activity;
        agent.schedule_target = block.target;
    }
}

/// Full-detail update for one agent.
pub(crate) fn update_full(agent: &mut Agent, dt: f32, ctx: &mut TickContext<'_>) {
    sync_schedule(agent, ctx.schedules, ctx.hour);
    agent.state_timer += dt;

    let player_pos = ctx.player.position;
    match agent.state {
        BehaviorState::Dead => return,
        BehaviorState::Fight(_) => {
            tactics::update_combat(agent, dt, ctx);
            return;
        },
        BehaviorState::Flee => {
            move_away(agent, player_pos, 200.0, dt, 1.5, ctx.terrain);
            if agent.distance_to(player_pos) > FLEE_RELEASE {
                agent.set_state(BehaviorState::Idle);
            }
            return;
        },
        BehaviorState::Investigate { target } => {
            match target {
                Some(target) => {
                    move_toward(agent, target, dt, 0.8, ctx.terrain);
                    if agent.position.distance_squared(target) < ARRIVE_RADIUS_SQ {
                        agent.set_state(BehaviorState::Idle);
                    }
                },
                None => {
                    agent.set_state(BehaviorState::Idle);
                },
            }
            return;
        },
        _ => {},
    }

    let distance = agent.distance_to(player_pos);
    if role_triggers(agent, distance, ctx) {
        return;
    }

    if agent.presentation.bark_timer > 2.5 && distance < GREET_RANGE {
        agent.face_toward(player_pos);
        agent.wander_timer = agent.wander_timer.max(2.0);
    }

    follow_schedule(agent, dt, ctx);
    greet(agent, distance, dt, ctx);

    let close = distance < GREET_RANGE;
    if agent.presentation.can_bark() && distance < AWARENESS_RANGE && !close && ctx.rng.chance(0.002) {
        ctx.ambient(agent, BarkContext::PlayerNear);
    }
}

/// Coarse update: schedule plus a slow drift toward home or work.
pub(crate) fn update_coarse(agent: &mut Agent, schedules: &ScheduleTable, hour: f32) {
    sync_schedule(agent, schedules, hour);
    match agent.scheduled {
        Activity::Sleep => agent.position = agent.position.lerp(agent.home, COARSE_LERP),
        Activity::Work => agent.position = agent.position.lerp(agent.work, COARSE_LERP),
        _ => {},
    }
}

/// Bandit ambushes and guard reactions. Returns true if the agent
/// entered combat.
fn role_triggers(agent: &mut Agent, distance: f32, ctx: &mut TickContext<'_>) -> bool {
    if agent.faction == Faction::Bandits
        && distance < AMBUSH_RANGE
        && ctx.player.alive
        && agent.aggression > 0.5
    {
        let combat = CombatState::engage(CombatCause::Ambush, ctx.rng);
        agent.set_state(BehaviorState::Fight(combat));
        ctx.bark(agent, barks::AMBUSH_LINE);
        return true;
    }

    if agent.job != Job::Guard || distance >= GUARD_ALERT_RANGE {
        return false;
    }
    if ctx.player.bounty > 0 {
        let combat = CombatState::engage(CombatCause::Bounty, ctx.rng);
        agent.set_state(BehaviorState::Fight(combat));
        ctx.bark(agent, barks::WANTED_LINE);
        return true;
    }

    let player_tile = ctx.terrain.tile_at(ctx.player.position);
    if ctx.terrain.is_restricted(player_tile)
        && ctx.player.apparent_class() != SocialStanding::Noble
        && agent.presentation.can_bark()
    {
        ctx.bark(agent, barks::RESTRICTED_LINE);
    }

    for noble in ctx.index.query(agent.position, SALUTE_RANGE) {
        if !noble.job.is_noble() || !agent.presentation.can_bark() || !ctx.rng.chance(0.01) {
            continue;
        }
        agent.facing = if noble.position.x < agent.position.x {
            Facing::W
        } else {
            Facing::E
        };
        ctx.bark(agent, barks::salute_line(noble.job));
        break;
    }
    false
}

fn follow_schedule(agent: &mut Agent, dt: f32, ctx: &mut TickContext<'_>) {
    agent.set_state(BehaviorState::from_activity(agent.scheduled));
    let terrain = ctx.terrain;
    match agent.scheduled {
        Activity::Sleep => {
            move_toward(agent, agent.home, dt, 0.5, terrain);
        },
        Activity::Work => {
            move_toward(agent, agent.work, dt, 1.0, terrain);
            if agent.position.distance_squared(agent.work) < ARRIVE_RADIUS_SQ {
                if agent.wander_timer <= 0.0 {
                    agent.wander_target = Some(ctx.rng.jitter(agent.work, 48.0));
                    agent.wander_timer = ctx.rng.range(3.0, 8.0);
                } else {
                    agent.wander_timer -= dt;
                    if let Some(target) = agent.wander_target {
                        move_toward(agent, target, dt, 0.5, terrain);
                    }
                }
                if agent.presentation.can_bark() && ctx.rng.chance(0.006) {
                    ctx.ambient(agent, BarkContext::Work);
                }
            }
        },
        Activity::Patrol => {
            if let Some(point) = agent.patrol.current() {
                move_toward(agent, point, dt, 1.0, terrain);
                if agent.position.distance_squared(point) < ARRIVE_RADIUS_SQ {
                    agent.patrol.advance();
                }
            }
        },
        Activity::Socialize => {
            let location = terrain.location_at(agent.position);
            let spot = match ctx.venues.spot(&location, ctx.hour) {
                Some(spot) => spot,
                None => {
                    wander(agent, dt, ctx.rng, 2.0, 6.0);
                    agent.wander_target.unwrap_or(agent.home)
                },
            };
            move_toward(agent, spot, dt, 0.6, terrain);
            if agent.presentation.can_bark() && ctx.rng.chance(0.004) {
                ctx.ambient(agent, BarkContext::Social);
            }
        },
        Activity::Idle => {
            if wander(agent, dt, ctx.rng, 2.0, 6.0) {
                if let Some(target) = agent.wander_target {
                    move_toward(agent, target, dt, 0.4, terrain);
                }
            }
        },
        Activity::Travel => {
            let destination = match agent.schedule_target {
                Some(ScheduleTarget::Home) => agent.home,
                Some(ScheduleTarget::Work) | None => agent.work,
            };
            move_toward(agent, destination, dt, 1.0, terrain);
        },
    }
}

/// Ticks the wander timer around home, picking a new target when it runs
/// out. Returns true when the current target is still live.
fn wander(agent: &mut Agent, dt: f32, rng: &mut SimRng, min: f32, max: f32) -> bool {
    if agent.wander_timer <= 0.0 {
        agent.wander_target = Some(rng.jitter(agent.home, 64.0));
        agent.wander_timer = rng.range(min, max);
        false
    } else {
        agent.wander_timer -= dt;
        true
    }
}

fn greet(agent: &mut Agent, distance: f32, dt: f32, ctx: &mut TickContext<'_>) {
    if agent.greeting.cooldown > 0.0 {
        agent.greeting.cooldown -= dt;
    }
    let p = &mut agent.presentation;
    if p.alert_icon_timer > 0.0 {
        p.alert_icon_timer -= dt;
    } else {
        p.alert_icon = None;
    }

    let was_close = agent.greeting.last_player_distance < GREET_RANGE;
    let is_close = distance < GREET_RANGE;
    agent.greeting.last_player_distance = distance;

    if !is_close || was_close || !agent.presentation.can_bark() || agent.greeting.cooldown > 0.0 {
        return;
    }
    agent.greeting.times_met += 1;
    agent.greeting.cooldown = GREET_COOLDOWN;

    let greeting = barks::greeting(
        agent,
        agent.greeting.times_met,
        ctx.player.apparent_class(),
        ctx.rng,
    );
    if let Some((icon, duration)) = greeting.icon {
        agent.set_alert_icon(icon, duration);
    }
    ctx.bark(agent, greeting.line);
    agent.face_toward(ctx.player.position);
    agent.wander_timer = agent.wander_timer.max(3.0);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::agent::tests::test_agent;
    use crate::agent::{AlertIcon, Personality};
    use crate::barks::BuiltinBarks;
    use crate::schedule::ScheduleBlock;
    use crate::tactics::TacticalPhase;
    use crate::terrain::FlatTerrain;

    /// Owns everything a [`TickContext`] borrows.
    pub(crate) struct Harness {
        pub player: PlayerState,
        pub index: SpatialIndex,
        pub rng: SimRng,
        pub terrain: FlatTerrain,
        pub events: EventBus,
        pub schedules: ScheduleTable,
        pub venues: SocialVenues,
        pub triggers: Vec<CrimeTrigger>,
    }

    impl Harness {
        pub(crate) fn new(player_pos: Vec2) -> Self {
            Self {
                player: PlayerState::new(player_pos),
                index: SpatialIndex::default(),
                rng: SimRng::seeded(42),
                terrain: FlatTerrain::new(),
                events: EventBus::default(),
                schedules: ScheduleTable::default(),
                venues: SocialVenues::new(),
                triggers: Vec::new(),
            }
        }

        pub(crate) fn run(&mut self, agent: &mut Agent, dt: f32, hour: f32) {
            let mut ctx = self.context(hour);
            update_full(agent, dt, &mut ctx);
        }

        pub(crate) fn context(&mut self, hour: f32) -> TickContext<'_> {
            TickContext {
                player: &mut self.player,
                index: &self.index,
                rng: &mut self.rng,
                terrain: &self.terrain,
                barks: &BuiltinBarks,
                events: &self.events,
                schedules: &self.schedules,
                venues: &self.venues,
                hour,
                recent_crimes: 0,
                crime_triggers: &mut self.triggers,
            }
        }
    }

    #[test]
    fn test_tier_thresholds() {
        let near = DEFAULT_NEAR_RANGE;
        let far = DEFAULT_FAR_RANGE;
        assert_eq!(UpdateTier::for_distance(599.9, near, far), UpdateTier::FullSimulation);
        assert_eq!(UpdateTier::for_distance(600.0, near, far), UpdateTier::CoarseApproximation);
        assert_eq!(UpdateTier::for_distance(1799.0, near, far), UpdateTier::CoarseApproximation);
        assert_eq!(UpdateTier::for_distance(1800.0, near, far), UpdateTier::Dormant);
    }

    #[test]
    fn test_schedule_drives_state() {
        let mut h = Harness::new(Vec2::new(4000.0, 4000.0));
        let mut agent = test_agent(Job::Guard, Vec2::new(1000.0, 1000.0));
        h.run(&mut agent, 0.1, 23.0);
        assert_eq!(agent.state_tag(), StateTag::Sleep);
        h.run(&mut agent, 0.1, 10.0);
        assert_eq!(agent.state_tag(), StateTag::Patrol);
    }

    #[test]
    fn test_travel_follows_block_target() {
        let mut h = Harness::new(Vec2::new(4000.0, 4000.0));
        let mut agent = test_agent(Job::Woodcutter, Vec2::new(1000.0, 1000.0));
        agent.home = Vec2::new(800.0, 1000.0);
        agent.work = Vec2::new(1200.0, 1000.0);

        h.run(&mut agent, 0.1, 17.0);
        assert_eq!(agent.state_tag(), StateTag::Travel);
        assert_eq!(agent.schedule_target, Some(ScheduleTarget::Home));
        assert!(agent.position.x < 1000.0);

        agent.position = Vec2::new(1000.0, 1000.0);
        h.run(&mut agent, 0.1, 6.0);
        assert_eq!(agent.schedule_target, Some(ScheduleTarget::Work));
        assert!(agent.position.x > 1000.0);

        h.schedules.set(Job::Woodcutter, vec![ScheduleBlock::new(0.0, 24.0, Activity::Travel)]);
        agent.position = Vec2::new(1000.0, 1000.0);
        h.run(&mut agent, 0.1, 12.0);
        assert_eq!(agent.schedule_target, None);
        assert!(agent.position.x > 1000.0);
    }

    #[test]
    fn test_unscheduled_job_keeps_activity() {
        let mut h = Harness::new(Vec2::new(4000.0, 4000.0));
        h.schedules.remove(Job::Farmer);
        let mut agent = test_agent(Job::Farmer, Vec2::new(1000.0, 1000.0));
        agent.scheduled = Activity::Work;
        h.run(&mut agent, 0.1, 3.0);
        assert_eq!(agent.scheduled, Activity::Work);
    }

    #[test]
    fn test_flee_reverts_when_far() {
        let mut h = Harness::new(Vec2::new(1000.0, 1000.0));
        let mut agent = test_agent(Job::Villager, Vec2::new(1500.0, 1000.0));
        agent.set_state(BehaviorState::Flee);
        h.run(&mut agent, 0.1, 12.0);
        assert_eq!(agent.state_tag(), StateTag::Idle);
    }

    #[test]
    fn test_investigate_arrives_and_relaxes() {
        let mut h = Harness::new(Vec2::new(4000.0, 4000.0));
        let mut agent = test_agent(Job::Guard, Vec2::new(1000.0, 1000.0));
        agent.set_state(BehaviorState::Investigate {
            target: Some(Vec2::new(1010.0, 1000.0)),
        });
        h.run(&mut agent, 0.1, 12.0);
        assert_eq!(agent.state_tag(), StateTag::Idle);

        agent.set_state(BehaviorState::Investigate { target: None });
        h.run(&mut agent, 0.1, 12.0);
        assert_eq!(agent.state_tag(), StateTag::Idle);
    }

    #[test]
    fn test_bandit_ambush() {
        let mut h = Harness::new(Vec2::new(1000.0, 1000.0));
        let mut bandit = test_agent(Job::Bandit, Vec2::new(1100.0, 1000.0));
        bandit.faction = Faction::Bandits;
        bandit.aggression = 0.8;
        h.run(&mut bandit, 0.1, 12.0);
        match bandit.state {
            BehaviorState::Fight(combat) => {
                assert_eq!(combat.cause, CombatCause::Ambush);
                assert_eq!(combat.phase, TacticalPhase::Approach);
            },
            other => panic!("expected fight, got {other:?}"),
        }
        assert_eq!(bandit.presentation.bark.as_deref(), Some(barks::AMBUSH_LINE));
    }

    #[test]
    fn test_timid_bandit_does_not_ambush() {
        let mut h = Harness::new(Vec2::new(1000.0, 1000.0));
        let mut bandit = test_agent(Job::Bandit, Vec2::new(1100.0, 1000.0));
        bandit.faction = Faction::Bandits;
        bandit.aggression = 0.4;
        h.run(&mut bandit, 0.1, 12.0);
        assert!(!bandit.is_fighting());
    }

    #[test]
    fn test_guard_engages_wanted_player() {
        let mut h = Harness::new(Vec2::new(1000.0, 1000.0));
        h.player.bounty = 20;
        let mut guard = test_agent(Job::Guard, Vec2::new(1150.0, 1000.0));
        h.run(&mut guard, 0.1, 12.0);
        assert!(matches!(
            guard.state,
            BehaviorState::Fight(CombatState {
                cause: CombatCause::Bounty,
                ..
            })
        ));
    }

    #[test]
    fn test_first_greeting_on_approach() {
        let mut h = Harness::new(Vec2::new(1000.0, 1000.0));
        h.schedules.remove(Job::Merchant);
        let mut agent = test_agent(Job::Merchant, Vec2::new(1050.0, 1000.0));
        agent.personality = Personality::Friendly;
        h.run(&mut agent, 0.1, 12.0);
        assert_eq!(agent.greeting.times_met, 1);
        assert_eq!(
            agent.presentation.bark.as_deref(),
            Some("A customer? Come, have a look!")
        );
        assert_eq!(agent.presentation.alert_icon, Some(AlertIcon::Curious));
        assert!(agent.greeting.cooldown > 29.0);

        // Staying close does not greet again.
        agent.presentation.bark_timer = 0.0;
        h.run(&mut agent, 0.1, 12.0);
        assert_eq!(agent.greeting.times_met, 1);
    }

    #[test]
    fn test_coarse_drifts_home_at_night() {
        let schedules = ScheduleTable::default();
        let mut agent = test_agent(Job::Farmer, Vec2::new(1000.0, 1000.0));
        agent.home = Vec2::new(2000.0, 1000.0);
        update_coarse(&mut agent, &schedules, 23.0);
        assert!((agent.position.x - 1010.0).abs() < 1e-3);
        assert_eq!(agent.scheduled, Activity::Sleep);
    }

    #[test]
    fn test_venue_spot_by_hour() {
        let mut venues = SocialVenues::new();
        venues.insert("ashford", Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0));
        assert_eq!(venues.spot("ashford", 19.0), Some(Vec2::new(1.0, 0.0)));
        assert_eq!(venues.spot("ashford", 12.0), Some(Vec2::new(2.0, 0.0)));
        assert_eq!(venues.spot("millhaven", 12.0), None);
    }
}
