//! Player-facing state the simulation reads and mutates.
//!
//! The player is driven by an outside controller; the simulation only
//! reads its position and combat flags and writes bounty, reputation,
//! crime history and damage.

use ahash::AHashMap;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::agent::{Facing, HIT_COOLDOWN};
use crate::law::CrimeKind;
use crate::ring::BoundedLog;
use crate::rng::SimRng;

/// Crimes kept in the player's history.
pub const PLAYER_CRIME_HISTORY: usize = 20;
/// Lower bound of every reputation score.
pub const REPUTATION_MIN: i32 = -100;
/// Upper bound of every reputation score.
pub const REPUTATION_MAX: i32 = 100;

/// How others read the player's rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocialStanding {
    /// Lowest standing
    Peasant,
    /// Ordinary townsperson
    Commoner,
    /// Trader
    Merchant,
    /// Member of the watch
    Guard,
    /// Nobility
    Noble,
}

/// Skill levels, 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Skills {
    /// Melee
    pub sword: f32,
    /// Ranged
    pub archery: f32,
    /// Persuasion
    pub speech: f32,
    /// Evading notice
    pub stealth: f32,
}

impl Default for Skills {
    fn default() -> Self {
        Self {
            sword: 5.0,
            archery: 2.0,
            speech: 5.0,
            stealth: 3.0,
        }
    }
}

/// Global, per-location and per-faction reputation scores.
#[derive(Debug, Clone, PartialEq)]
pub struct Reputation {
    global: i32,
    locations: AHashMap<String, i32>,
    factions: AHashMap<String, i32>,
}

impl Default for Reputation {
    fn default() -> Self {
        let mut rep = Self::neutral();
        for (key, value) in [("ashford", 0), ("millhaven", 5), ("thornfield", 0)] {
            rep.locations.insert(key.to_string(), value);
        }
        for key in ["guards", "nobles", "bandits"] {
            rep.factions.insert(key.to_string(), 0);
        }
        rep
    }
}

impl Reputation {
    /// Reputation with no tracked locations or factions.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            global: 0,
            locations: AHashMap::new(),
            factions: AHashMap::new(),
        }
    }

    /// Global score.
    #[must_use]
    pub fn global(&self) -> i32 {
        self.global
    }

    /// Score in a location, if tracked.
    #[must_use]
    pub fn location(&self, key: &str) -> Option<i32> {
        self.locations.get(key).copied()
    }

    /// Score with a faction, if tracked.
    #[must_use]
    pub fn faction(&self, key: &str) -> Option<i32> {
        self.factions.get(key).copied()
    }

    /// Starts tracking a location.
    pub fn track_location(&mut self, key: impl Into<String>, value: i32) {
        self.locations
            .insert(key.into(), value.clamp(REPUTATION_MIN, REPUTATION_MAX));
    }

    /// Adjusts the global score.
    pub fn adjust_global(&mut self, delta: i32) {
        self.global = clamp_rep(self.global + delta);
    }

    /// Adjusts a tracked location. Untracked locations are left alone.
    /// Returns whether the location was tracked.
    pub fn adjust_location(&mut self, key: &str, delta: i32) -> bool {
        match self.locations.get_mut(key) {
            Some(value) => {
                *value = clamp_rep(*value + delta);
                true
            },
            None => false,
        }
    }

    /// Adjusts a faction score, tracking it if needed.
    pub fn adjust_faction(&mut self, key: &str, delta: i32) {
        let value = self.factions.entry(key.to_string()).or_insert(0);
        *value = clamp_rep(*value + delta);
    }
}

fn clamp_rep(value: i32) -> i32 {
    value.clamp(REPUTATION_MIN, REPUTATION_MAX)
}

/// A crime on the player's record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrimeEntry {
    /// Kind of crime
    pub kind: CrimeKind,
    /// Game minute committed
    pub time: f32,
}

/// Player snapshot shared with the simulation.
#[derive(Debug, Clone)]
pub struct PlayerState {
    /// World position
    pub position: Vec2,
    /// Facing
    pub facing: Facing,
    /// Whether the player is alive
    pub alive: bool,
    /// Current health
    pub health: f32,
    /// Maximum health
    pub max_health: f32,
    /// Current stamina
    pub stamina: f32,
    /// Health lost per second
    pub bleeding: f32,
    /// Outstanding bounty
    pub bounty: u32,
    /// Standing with places and factions
    pub reputation: Reputation,
    /// Skill levels
    pub skills: Skills,
    /// Rank by birth
    pub standing: SocialStanding,
    /// Rank suggested by worn gear, if any
    pub apparent_override: Option<SocialStanding>,
    /// Seconds left in the current swing (positive while attacking)
    pub attack_timer: f32,
    /// Whether the player holds a block
    pub blocking: bool,
    /// Whether the player is mid-dodge
    pub dodging: bool,
    /// Seconds of hit invulnerability left
    pub hit_cooldown: f32,
    /// Armor defense percentage
    pub armor_defense: f32,
    /// Agents killed
    pub kill_count: u32,
    /// Crime history
    pub crimes: BoundedLog<CrimeEntry>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl PlayerState {
    /// Creates a healthy peasant with no record.
    #[must_use]
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            facing: Facing::S,
            alive: true,
            health: 100.0,
            max_health: 100.0,
            stamina: 100.0,
            bleeding: 0.0,
            bounty: 0,
            reputation: Reputation::default(),
            skills: Skills::default(),
            standing: SocialStanding::Peasant,
            apparent_override: None,
            attack_timer: 0.0,
            blocking: false,
            dodging: false,
            hit_cooldown: 0.0,
            armor_defense: 0.0,
            kill_count: 0,
            crimes: BoundedLog::new(PLAYER_CRIME_HISTORY),
        }
    }

    /// Whether a swing is in progress.
    #[must_use]
    pub fn is_attacking(&self) -> bool {
        self.attack_timer > 0.0
    }

    /// Rank others perceive: worn gear wins over birth.
    #[must_use]
    pub fn apparent_class(&self) -> SocialStanding {
        self.apparent_override.unwrap_or(self.standing)
    }

    /// Applies an incoming hit and returns the damage actually taken.
    ///
    /// Hits are ignored during the post-hit cooldown or a dodge. Blocking
    /// cuts damage to a fifth at a stamina cost, then armor applies; any
    /// landed hit deals at least 1.
    pub fn take_damage(&mut self, amount: f32, rng: &mut SimRng) -> f32 {
        if !self.alive || self.hit_cooldown > 0.0 || self.dodging {
            return 0.0;
        }
        let mut actual = amount.max(0.0);
        if self.blocking {
            actual *= 0.2;
            self.stamina = (self.stamina - amount * 0.5).max(0.0);
        }
        actual *= 1.0 - self.armor_defense.clamp(0.0, 100.0) * 0.01;
        let actual = actual.round().max(1.0);

        self.health = (self.health - actual).max(0.0);
        self.hit_cooldown = HIT_COOLDOWN;
        if actual > 15.0 && rng.chance(0.3) {
            self.bleeding += 2.0;
        }
        if self.health <= 0.0 {
            self.alive = false;
        }
        actual
    }

    /// Advances bleeding and cooldowns.
    pub fn tick(&mut self, dt: f32) {
        if self.alive && self.bleeding > 0.0 {
            self.health = (self.health - self.bleeding * dt).max(0.0);
            self.bleeding = (self.bleeding - 0.3 * dt).max(0.0);
            if self.health <= 0.0 {
                self.alive = false;
            }
        }
        if self.hit_cooldown > 0.0 {
            self.hit_cooldown -= dt;
        }
        if self.attack_timer > 0.0 {
            self.attack_timer -= dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_reputation() {
        let rep = Reputation::default();
        assert_eq!(rep.global(), 0);
        assert_eq!(rep.location("millhaven"), Some(5));
        assert_eq!(rep.location("banditCamp"), None);
        assert_eq!(rep.faction("guards"), Some(0));
    }

    #[test]
    fn test_untracked_location_untouched() {
        let mut rep = Reputation::default();
        assert!(!rep.adjust_location("wilderness", -10));
        assert_eq!(rep.location("wilderness"), None);
        assert!(rep.adjust_location("ashford", -10));
        assert_eq!(rep.location("ashford"), Some(-10));
    }

    #[test]
    fn test_reputation_clamped() {
        let mut rep = Reputation::default();
        rep.adjust_global(-500);
        assert_eq!(rep.global(), REPUTATION_MIN);
        rep.adjust_faction("guards", 1000);
        assert_eq!(rep.faction("guards"), Some(REPUTATION_MAX));
    }

    #[test]
    fn test_block_and_armor_reduce_damage() {
        let mut rng = SimRng::seeded(5);
        let mut player = PlayerState::new(Vec2::ZERO);
        player.blocking = true;
        let taken = player.take_damage(10.0, &mut rng);
        assert_eq!(taken, 2.0);
        assert_eq!(player.stamina, 95.0);

        player.hit_cooldown = 0.0;
        player.blocking = false;
        player.armor_defense = 50.0;
        assert_eq!(player.take_damage(10.0, &mut rng), 5.0);
    }

    #[test]
    fn test_cooldown_and_dodge_ignore_hits() {
        let mut rng = SimRng::seeded(5);
        let mut player = PlayerState::new(Vec2::ZERO);
        assert!(player.take_damage(10.0, &mut rng) > 0.0);
        assert_eq!(player.take_damage(10.0, &mut rng), 0.0);
        player.hit_cooldown = 0.0;
        player.dodging = true;
        assert_eq!(player.take_damage(10.0, &mut rng), 0.0);
    }

    #[test]
    fn test_minimum_one_damage_and_death() {
        let mut rng = SimRng::seeded(5);
        let mut player = PlayerState::new(Vec2::ZERO);
        player.armor_defense = 100.0;
        assert_eq!(player.take_damage(50.0, &mut rng), 1.0);

        player.hit_cooldown = 0.0;
        player.armor_defense = 0.0;
        player.take_damage(500.0, &mut rng);
        assert!(!player.alive);
        assert_eq!(player.health, 0.0);
    }

    #[test]
    fn test_apparent_class_override() {
        let mut player = PlayerState::default();
        assert_eq!(player.apparent_class(), SocialStanding::Peasant);
        player.apparent_override = Some(SocialStanding::Noble);
        assert_eq!(player.apparent_class(), SocialStanding::Noble);
    }
}
