//! Agent records: identity, vitals, combat stats and presentation hooks.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use townsfolk_common::AgentId;
use tracing::debug;

use crate::behavior::{BehaviorState, StateTag};
use crate::memory::{MemoryEvent, MemoryKind, MemoryLog, DEFAULT_MEMORY_CAPACITY};
use crate::names::NameGenerator;
use crate::rng::SimRng;
use crate::schedule::{Activity, ScheduleTarget};

/// Collision half-extent used by the movement probes.
pub const AGENT_HALF_EXTENT: f32 = 8.0;
/// Seconds a bark stays visible and blocks new barks.
pub const BARK_DURATION: f32 = 4.0;
/// Default speech bubble duration.
pub const SPEECH_DURATION: f32 = 3.0;
/// Seconds of invulnerability after taking a hit.
pub const HIT_COOLDOWN: f32 = 0.3;
/// Bleeding decay per second.
pub const BLEED_DECAY: f32 = 0.3;

// ============================================================================
// Classification
// ============================================================================

/// Occupation driving an agent's daily schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Job {
    /// Works the fields
    Farmer,
    /// Patrols town and enforces the law
    Guard,
    /// Runs a stall or shop
    Merchant,
    /// Works the forge
    Blacksmith,
    /// Runs the tavern
    TavernKeeper,
    /// Court member
    Noble,
    /// Ruler
    King,
    /// Outlaw
    Bandit,
    /// Commoner
    Villager,
    /// Fells trees
    Woodcutter,
}

impl Job {
    /// Every job, in table order.
    pub const ALL: [Self; 10] = [
        Self::Farmer,
        Self::Guard,
        Self::Merchant,
        Self::Blacksmith,
        Self::TavernKeeper,
        Self::Noble,
        Self::King,
        Self::Bandit,
        Self::Villager,
        Self::Woodcutter,
    ];

    /// Social class rank (0 = outlaw, 5 = ruler).
    #[must_use]
    pub const fn social_class(self) -> u8 {
        match self {
            Self::King => 5,
            Self::Noble => 4,
            Self::Guard | Self::Merchant => 3,
            Self::Blacksmith | Self::TavernKeeper => 2,
            Self::Farmer | Self::Villager | Self::Woodcutter => 1,
            Self::Bandit => 0,
        }
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Farmer => "Farmer",
            Self::Guard => "Guard",
            Self::Merchant => "Merchant",
            Self::Blacksmith => "Blacksmith",
            Self::TavernKeeper => "Tavern Keeper",
            Self::Noble => "Noble",
            Self::King => "King",
            Self::Bandit => "Bandit",
            Self::Villager => "Villager",
            Self::Woodcutter => "Woodcutter",
        }
    }

    /// Whether this job belongs to the nobility.
    #[must_use]
    pub const fn is_noble(self) -> bool {
        matches!(self, Self::Noble | Self::King)
    }
}

/// Allegiance used by faction-wide queries and reactions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// Ordinary townsfolk
    Civilian,
    /// The royal household
    Crown,
    /// Court nobility
    Nobles,
    /// Town watch
    Guards,
    /// Outlaws
    Bandits,
    /// Residents loyal to a named settlement
    Settlement(String),
}

impl Faction {
    /// Stable key used for reputation lookups and logging.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Civilian => "civilian",
            Self::Crown => "crown",
            Self::Nobles => "nobles",
            Self::Guards => "guards",
            Self::Bandits => "bandits",
            Self::Settlement(name) => name,
        }
    }
}

/// Temperament affecting combat thresholds and witness reactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Personality {
    /// Fights to the end
    Brave,
    /// Flees early
    Cowardly,
    /// Warm toward strangers
    Friendly,
    /// Never helps the law
    Hostile,
    /// Money minded
    Greedy,
    /// Straight dealer
    Honest,
    /// Distrustful
    Suspicious,
    /// Even tempered
    Calm,
}

impl Personality {
    /// Every personality.
    pub const ALL: [Self; 8] = [
        Self::Brave,
        Self::Cowardly,
        Self::Friendly,
        Self::Hostile,
        Self::Greedy,
        Self::Honest,
        Self::Suspicious,
        Self::Calm,
    ];

    /// Health ratio below which a lone fighter gives up.
    #[must_use]
    pub const fn flee_threshold(self) -> f32 {
        match self {
            Self::Cowardly => 0.4,
            Self::Brave => 0.1,
            _ => 0.2,
        }
    }
}

/// Agent gender, used for name generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Male
    Male,
    /// Female
    Female,
}

/// Eight-way facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// North (up, negative y)
    N,
    /// North-east
    NE,
    /// East
    E,
    /// South-east
    SE,
    /// South (down, positive y)
    S,
    /// South-west
    SW,
    /// West
    W,
    /// North-west
    NW,
}

impl Facing {
    /// Snaps an angle (radians, y down) to the nearest of eight directions.
    #[must_use]
    pub fn from_angle(angle: f32) -> Self {
        const DIRS: [Facing; 8] = [
            Facing::E,
            Facing::SE,
            Facing::S,
            Facing::SW,
            Facing::W,
            Facing::NW,
            Facing::N,
            Facing::NE,
        ];
        let octant = (angle / std::f32::consts::FRAC_PI_4).round() as i32;
        DIRS[octant.rem_euclid(8) as usize]
    }

    /// Facing along the dominant axis of a motion vector.
    #[must_use]
    pub fn from_motion(delta: Vec2) -> Self {
        if delta.x.abs() > delta.y.abs() {
            if delta.x > 0.0 {
                Self::E
            } else {
                Self::W
            }
        } else if delta.y > 0.0 {
            Self::S
        } else {
            Self::N
        }
    }
}

/// Full name of an agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentName {
    /// Given name
    pub first: String,
    /// Family name
    pub last: String,
    /// Display name (may carry a title)
    pub full: String,
}

impl AgentName {
    /// Builds a name whose display form is "first last".
    #[must_use]
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        let first = first.into();
        let last = last.into();
        let full = format!("{first} {last}");
        Self { first, last, full }
    }

    /// Overrides the display form (for titles).
    #[must_use]
    pub fn titled(mut self, full: impl Into<String>) -> Self {
        self.full = full.into();
        self
    }
}

/// Ordered patrol waypoints with a cursor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatrolRoute {
    /// Waypoints in world units
    pub waypoints: Vec<Vec2>,
    /// Index of the waypoint currently being walked to
    pub index: usize,
}

impl PatrolRoute {
    /// Creates a route starting at its first waypoint.
    #[must_use]
    pub fn new(waypoints: Vec<Vec2>) -> Self {
        Self {
            waypoints,
            index: 0,
        }
    }

    /// Current waypoint, if the route is not empty.
    #[must_use]
    pub fn current(&self) -> Option<Vec2> {
        if self.waypoints.is_empty() {
            None
        } else {
            Some(self.waypoints[self.index % self.waypoints.len()])
        }
    }

    /// Moves the cursor to the next waypoint, wrapping around.
    pub fn advance(&mut self) {
        if !self.waypoints.is_empty() {
            self.index = (self.index + 1) % self.waypoints.len();
        }
    }
}

/// Icon shown above an agent's head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlertIcon {
    /// `?` on a first meeting
    Curious,
    /// `!` for a hostile acquaintance
    Alarmed,
}

/// Bark, speech and icon state consumed by the renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Presentation {
    /// Short overhead line
    pub bark: Option<String>,
    /// Seconds left on the bark
    pub bark_timer: f32,
    /// Dialogue bubble
    pub speech: Option<String>,
    /// Seconds left on the speech bubble
    pub speech_timer: f32,
    /// Overhead icon
    pub alert_icon: Option<AlertIcon>,
    /// Seconds left on the icon
    pub alert_icon_timer: f32,
}

impl Presentation {
    /// Whether a new bark may be shown.
    #[must_use]
    pub fn can_bark(&self) -> bool {
        self.bark_timer <= 0.0
    }
}

/// Greeting bookkeeping toward the player.
#[derive(Debug, Clone, PartialEq)]
pub struct GreetingState {
    /// Number of greeted encounters
    pub times_met: u32,
    /// Player distance observed last tick
    pub last_player_distance: f32,
    /// Seconds before another greeting is allowed
    pub cooldown: f32,
}

impl Default for GreetingState {
    fn default() -> Self {
        Self {
            times_met: 0,
            last_player_distance: f32::MAX,
            cooldown: 0.0,
        }
    }
}

// ============================================================================
// Agent
// ============================================================================

/// One simulated inhabitant.
#[derive(Debug, Clone)]
pub struct Agent {
    /// Registry id
    pub id: AgentId,
    /// Name
    pub name: AgentName,
    /// Gender
    pub gender: Gender,
    /// Age in years
    pub age: u32,
    /// Occupation
    pub job: Job,
    /// Allegiance
    pub faction: Faction,
    /// Social class rank derived from the job
    pub social_class: u8,
    /// Temperament
    pub personality: Personality,
    /// World position
    pub position: Vec2,
    /// Displacement applied last movement step
    pub velocity: Vec2,
    /// Facing
    pub facing: Facing,
    /// Base walking speed (units per second)
    pub speed: f32,
    /// Current health
    pub health: f32,
    /// Maximum health
    pub max_health: f32,
    /// Health lost per second
    pub bleeding: f32,
    /// Whether the agent is alive
    pub alive: bool,
    /// Current behavior
    pub state: BehaviorState,
    /// Activity the schedule asks for
    pub scheduled: Activity,
    /// Destination of the current schedule block, if it names one
    pub schedule_target: Option<ScheduleTarget>,
    /// Seconds spent in the current state
    pub state_timer: f32,
    /// Seconds until a new wander target is picked
    pub wander_timer: f32,
    /// Current wander target
    pub wander_target: Option<Vec2>,
    /// Recent memories
    pub memory: MemoryLog,
    /// Combat eagerness, 0-1
    pub aggression: f32,
    /// Base melee damage
    pub damage: f32,
    /// Armor percentage
    pub armor: f32,
    /// Whether the agent is blocking
    pub blocking: bool,
    /// Seconds until the next strike
    pub attack_timer: f32,
    /// Seconds of hit invulnerability left
    pub hit_cooldown: f32,
    /// Opinion of the player, -100 to 100
    pub player_relation: i32,
    /// Patrol route (guards)
    pub patrol: PatrolRoute,
    /// Home position
    pub home: Vec2,
    /// Work position
    pub work: Vec2,
    /// Settlement the agent belongs to
    pub home_location: String,
    /// Carried item ids
    pub inventory: Vec<String>,
    /// Bark, speech and icon state
    pub presentation: Presentation,
    /// Greeting bookkeeping
    pub greeting: GreetingState,
}

impl Agent {
    /// Distance to a point.
    #[must_use]
    pub fn distance_to(&self, pos: Vec2) -> f32 {
        self.position.distance(pos)
    }

    /// Health as a fraction of maximum.
    #[must_use]
    pub fn health_ratio(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            self.health / self.max_health
        }
    }

    /// Whether the agent is in combat.
    #[must_use]
    pub fn is_fighting(&self) -> bool {
        matches!(self.state, BehaviorState::Fight(_))
    }

    /// Whether the agent is asleep.
    #[must_use]
    pub fn is_sleeping(&self) -> bool {
        matches!(self.state, BehaviorState::Sleep)
    }

    /// Whether the agent is a member of the bandit faction.
    #[must_use]
    pub fn is_bandit(&self) -> bool {
        self.faction == Faction::Bandits
    }

    /// Switches behavior state. Death is one-way: a dead agent only
    /// accepts `Dead`. Returns whether the state tag changed.
    pub fn set_state(&mut self, state: BehaviorState) -> bool {
        if !self.alive && !matches!(state, BehaviorState::Dead) {
            return false;
        }
        let before = self.state.tag();
        let after = state.tag();
        self.state = state;
        if before != after {
            self.state_timer = 0.0;
            debug!(agent = %self.id, from = ?before, to = ?after, "state change");
        }
        before != after
    }

    /// Current state tag.
    #[must_use]
    pub fn state_tag(&self) -> StateTag {
        self.state.tag()
    }

    /// Marks the agent dead.
    pub fn kill(&mut self) {
        self.health = 0.0;
        self.alive = false;
        self.blocking = false;
        self.velocity = Vec2::ZERO;
        self.set_state(BehaviorState::Dead);
    }

    /// Changes the opinion of the player, clamped to -100..=100.
    pub fn adjust_relation(&mut self, delta: i32) {
        self.player_relation = (self.player_relation + delta).clamp(-100, 100);
    }

    /// Shows a bark for [`BARK_DURATION`] seconds.
    pub fn set_bark(&mut self, text: impl Into<String>) {
        self.presentation.bark = Some(text.into());
        self.presentation.bark_timer = BARK_DURATION;
    }

    /// Shows a speech bubble.
    pub fn set_speech(&mut self, text: impl Into<String>, duration: Option<f32>) {
        self.presentation.speech = Some(text.into());
        self.presentation.speech_timer = duration.unwrap_or(SPEECH_DURATION);
    }

    /// Shows an overhead icon.
    pub fn set_alert_icon(&mut self, icon: AlertIcon, duration: f32) {
        self.presentation.alert_icon = Some(icon);
        self.presentation.alert_icon_timer = duration;
    }

    /// Records a memory stamped with the game minute.
    pub fn remember(&mut self, kind: MemoryKind, time: f32) {
        self.memory.push(MemoryEvent { kind, time });
    }

    /// Turns to look at a point.
    pub fn face_toward(&mut self, target: Vec2) {
        let delta = target - self.position;
        if delta != Vec2::ZERO {
            self.facing = Facing::from_angle(delta.y.atan2(delta.x));
        }
    }

    /// Advances bleeding and the cooldown timers. Returns true if the
    /// agent bled out this step.
    pub fn tick_vitals(&mut self, dt: f32) -> bool {
        let mut died = false;
        if self.alive && self.bleeding > 0.0 {
            self.health = (self.health - self.bleeding * dt).max(0.0);
            self.bleeding = (self.bleeding - BLEED_DECAY * dt).max(0.0);
            if self.health <= 0.0 {
                self.kill();
                died = true;
            }
        }
        let p = &mut self.presentation;
        if p.bark_timer > 0.0 {
            p.bark_timer -= dt;
        }
        if p.speech_timer > 0.0 {
            p.speech_timer -= dt;
        }
        if self.attack_timer > 0.0 {
            self.attack_timer -= dt;
        }
        if self.hit_cooldown > 0.0 {
            self.hit_cooldown -= dt;
        }
        died
    }
}

// ============================================================================
// Spawning
// ============================================================================

/// Description of an agent to spawn. Unset fields are rolled from the
/// world RNG at spawn time.
#[derive(Debug, Clone)]
pub struct AgentSpec {
    /// Occupation
    pub job: Job,
    /// Spawn position
    pub position: Vec2,
    /// Fixed name
    pub name: Option<AgentName>,
    /// Fixed gender
    pub gender: Option<Gender>,
    /// Fixed age
    pub age: Option<u32>,
    /// Fixed personality
    pub personality: Option<Personality>,
    /// Allegiance
    pub faction: Faction,
    /// Home position (defaults to spawn position)
    pub home: Option<Vec2>,
    /// Work position (defaults to home)
    pub work: Option<Vec2>,
    /// Maximum health
    pub max_health: f32,
    /// Melee damage
    pub damage: f32,
    /// Armor percentage
    pub armor: f32,
    /// Walking speed
    pub speed: f32,
    /// Combat eagerness
    pub aggression: f32,
    /// Starting opinion of the player
    pub player_relation: i32,
    /// Patrol waypoints
    pub patrol: Vec<Vec2>,
    /// Settlement key
    pub location: String,
    /// Carried item ids
    pub inventory: Vec<String>,
}

impl AgentSpec {
    /// Creates a spec with the baseline stats of an unremarkable civilian.
    #[must_use]
    pub fn new(job: Job, position: Vec2) -> Self {
        Self {
            job,
            position,
            name: None,
            gender: None,
            age: None,
            personality: None,
            faction: Faction::Civilian,
            home: None,
            work: None,
            max_health: 80.0,
            damage: 8.0,
            armor: 0.0,
            speed: 60.0,
            aggression: 0.3,
            player_relation: 0,
            patrol: Vec::new(),
            location: "wilderness".to_string(),
            inventory: Vec::new(),
        }
    }

    /// Sets the name.
    #[must_use]
    pub fn named(mut self, name: AgentName) -> Self {
        self.name = Some(name);
        self
    }

    /// Sets the gender.
    #[must_use]
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    /// Sets the age.
    #[must_use]
    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    /// Sets the personality.
    #[must_use]
    pub fn with_personality(mut self, personality: Personality) -> Self {
        self.personality = Some(personality);
        self
    }

    /// Sets the faction.
    #[must_use]
    pub fn with_faction(mut self, faction: Faction) -> Self {
        self.faction = faction;
        self
    }

    /// Sets the home position.
    #[must_use]
    pub fn with_home(mut self, home: Vec2) -> Self {
        self.home = Some(home);
        self
    }

    /// Sets the work position.
    #[must_use]
    pub fn with_work(mut self, work: Vec2) -> Self {
        self.work = Some(work);
        self
    }

    /// Sets maximum (and starting) health.
    #[must_use]
    pub fn with_health(mut self, health: f32) -> Self {
        self.max_health = health.max(1.0);
        self
    }

    /// Sets damage and armor.
    #[must_use]
    pub fn with_combat(mut self, damage: f32, armor: f32) -> Self {
        self.damage = damage.max(0.0);
        self.armor = armor.clamp(0.0, 100.0);
        self
    }

    /// Sets the walking speed.
    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed.max(0.0);
        self
    }

    /// Sets aggression.
    #[must_use]
    pub fn with_aggression(mut self, aggression: f32) -> Self {
        self.aggression = aggression.clamp(0.0, 1.0);
        self
    }

    /// Sets the starting opinion of the player.
    #[must_use]
    pub fn with_relation(mut self, relation: i32) -> Self {
        self.player_relation = relation.clamp(-100, 100);
        self
    }

    /// Sets patrol waypoints.
    #[must_use]
    pub fn with_patrol(mut self, waypoints: Vec<Vec2>) -> Self {
        self.patrol = waypoints;
        self
    }

    /// Sets the settlement key.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Sets carried items.
    #[must_use]
    pub fn with_inventory<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inventory = items.into_iter().map(Into::into).collect();
        self
    }

    /// Materializes the agent, rolling unset fields from `rng`.
    pub fn build(self, id: AgentId, rng: &mut SimRng, names: &mut NameGenerator) -> Agent {
        let gender = self.gender.unwrap_or_else(|| {
            if rng.chance(0.5) {
                Gender::Male
            } else {
                Gender::Female
            }
        });
        let name = match self.name {
            Some(name) => {
                names.reserve(&name);
                name
            },
            None => names.generate(gender, rng),
        };
        let age = self
            .age
            .unwrap_or_else(|| rng.index(48).map_or(18, |n| 18 + n as u32));
        let personality = self.personality.unwrap_or_else(|| {
            rng.pick(&Personality::ALL)
                .copied()
                .unwrap_or(Personality::Calm)
        });
        let home = self.home.unwrap_or(self.position);
        let work = self.work.unwrap_or(home);

        Agent {
            id,
            name,
            gender,
            age,
            job: self.job,
            faction: self.faction,
            social_class: self.job.social_class(),
            personality,
            position: self.position,
            velocity: Vec2::ZERO,
            facing: Facing::S,
            speed: self.speed,
            health: self.max_health,
            max_health: self.max_health,
            bleeding: 0.0,
            alive: true,
            state: BehaviorState::Idle,
            scheduled: Activity::Idle,
            schedule_target: None,
            state_timer: 0.0,
            wander_timer: 0.0,
            wander_target: None,
            memory: MemoryLog::new(DEFAULT_MEMORY_CAPACITY),
            aggression: self.aggression,
            damage: self.damage,
            armor: self.armor,
            blocking: false,
            attack_timer: 0.0,
            hit_cooldown: 0.0,
            player_relation: self.player_relation,
            patrol: PatrolRoute::new(self.patrol),
            home,
            work,
            home_location: self.location,
            inventory: self.inventory,
            presentation: Presentation::default(),
            greeting: GreetingState::default(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn test_agent(job: Job, position: Vec2) -> Agent {
        let mut rng = SimRng::seeded(1);
        let mut names = NameGenerator::new();
        AgentSpec::new(job, position)
            .with_personality(Personality::Calm)
            .build(AgentId::from_index(0), &mut rng, &mut names)
    }

    #[test]
    fn test_spec_defaults() {
        let agent = test_agent(Job::Villager, Vec2::new(100.0, 50.0));
        assert!(agent.alive);
        assert_eq!(agent.state_tag(), StateTag::Idle);
        assert_eq!(agent.health, 80.0);
        assert_eq!(agent.speed, 60.0);
        assert_eq!(agent.home, Vec2::new(100.0, 50.0));
        assert_eq!(agent.work, agent.home);
        assert_eq!(agent.social_class, 1);
    }

    #[test]
    fn test_social_class_by_job() {
        assert_eq!(Job::King.social_class(), 5);
        assert_eq!(Job::Noble.social_class(), 4);
        assert_eq!(Job::Guard.social_class(), 3);
        assert_eq!(Job::TavernKeeper.social_class(), 2);
        assert_eq!(Job::Bandit.social_class(), 0);
    }

    #[test]
    fn test_death_is_one_way() {
        let mut agent = test_agent(Job::Farmer, Vec2::ZERO);
        agent.kill();
        assert!(!agent.alive);
        assert_eq!(agent.health, 0.0);
        assert!(!agent.set_state(BehaviorState::Idle));
        assert_eq!(agent.state_tag(), StateTag::Dead);
    }

    #[test]
    fn test_bleeding_kills_and_decays() {
        let mut agent = test_agent(Job::Farmer, Vec2::ZERO);
        agent.bleeding = 2.0;
        assert!(!agent.tick_vitals(1.0));
        assert!((agent.health - 78.0).abs() < 1e-4);
        assert!((agent.bleeding - 1.7).abs() < 1e-4);

        agent.health = 0.5;
        assert!(agent.tick_vitals(1.0));
        assert!(!agent.alive);
        assert_eq!(agent.health, 0.0);
    }

    #[test]
    fn test_relation_clamped() {
        let mut agent = test_agent(Job::Farmer, Vec2::ZERO);
        agent.adjust_relation(-250);
        assert_eq!(agent.player_relation, -100);
        agent.adjust_relation(500);
        assert_eq!(agent.player_relation, 100);
    }

    #[test]
    fn test_facing_from_angle() {
        assert_eq!(Facing::from_angle(0.0), Facing::E);
        assert_eq!(Facing::from_angle(std::f32::consts::FRAC_PI_2), Facing::S);
        assert_eq!(Facing::from_angle(std::f32::consts::PI), Facing::W);
        assert_eq!(Facing::from_angle(-std::f32::consts::FRAC_PI_2), Facing::N);
        assert_eq!(Facing::from_angle(std::f32::consts::FRAC_PI_4), Facing::SE);
    }

    #[test]
    fn test_facing_from_motion() {
        assert_eq!(Facing::from_motion(Vec2::new(5.0, 1.0)), Facing::E);
        assert_eq!(Facing::from_motion(Vec2::new(-5.0, 1.0)), Facing::W);
        assert_eq!(Facing::from_motion(Vec2::new(1.0, -5.0)), Facing::N);
    }

    #[test]
    fn test_patrol_route_wraps() {
        let mut route = PatrolRoute::new(vec![Vec2::ZERO, Vec2::ONE]);
        assert_eq!(route.current(), Some(Vec2::ZERO));
        route.advance();
        route.advance();
        assert_eq!(route.current(), Some(Vec2::ZERO));
        assert!(PatrolRoute::default().current().is_none());
    }
}
