//! Simulation tuning.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::behavior::{DEFAULT_FAR_RANGE, DEFAULT_NEAR_RANGE};
use crate::clock::{DEFAULT_START_MINUTES, DEFAULT_TIME_SCALE, MINUTES_PER_DAY};
use crate::events::DEFAULT_EVENT_CAPACITY;
use crate::memory::DEFAULT_MEMORY_CAPACITY;
use crate::spatial::DEFAULT_CELL_SIZE;

/// Parameters of a [`crate::SimulationWorld`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed of the world RNG
    pub seed: u64,
    /// Distance below which agents are fully simulated
    pub near_range: f32,
    /// Distance below which agents are coarsely simulated
    pub far_range: f32,
    /// Spatial index cell size
    pub cell_size: f32,
    /// Game minutes per real second
    pub time_scale: f32,
    /// Game minute the clock starts at
    pub start_minutes: f32,
    /// Memories kept per agent
    pub memory_capacity: usize,
    /// Events buffered between drains
    pub event_capacity: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            near_range: DEFAULT_NEAR_RANGE,
            far_range: DEFAULT_FAR_RANGE,
            cell_size: DEFAULT_CELL_SIZE,
            time_scale: DEFAULT_TIME_SCALE,
            start_minutes: DEFAULT_START_MINUTES,
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl SimConfig {
    /// Sets the seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Clamps values to usable ranges.
    pub fn validate(&mut self) {
        if self.near_range <= 0.0 {
            warn!(near_range = self.near_range, "near range must be positive, using default");
            self.near_range = DEFAULT_NEAR_RANGE;
        }
        if self.far_range < self.near_range {
            warn!(far_range = self.far_range, "far range below near range, clamping");
            self.far_range = self.near_range;
        }
        if self.cell_size <= 0.0 {
            warn!(cell_size = self.cell_size, "cell size must be positive, using default");
            self.cell_size = DEFAULT_CELL_SIZE;
        }
        self.time_scale = self.time_scale.max(0.0);
        self.start_minutes = self.start_minutes.rem_euclid(MINUTES_PER_DAY);
        self.memory_capacity = self.memory_capacity.max(1);
        self.event_capacity = self.event_capacity.max(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SimConfig::default();
        assert_eq!(config.near_range, 600.0);
        assert_eq!(config.far_range, 1800.0);
        assert_eq!(config.cell_size, 128.0);
        assert_eq!(config.time_scale, 2.0);
        assert_eq!(config.start_minutes, 420.0);
        assert_eq!(config.memory_capacity, 10);
    }

    #[test]
    fn test_validate_clamps() {
        let mut config = SimConfig {
            near_range: -5.0,
            far_range: 10.0,
            cell_size: 0.0,
            start_minutes: 1500.0,
            memory_capacity: 0,
            ..SimConfig::default()
        };
        config.validate();
        assert_eq!(config.near_range, 600.0);
        assert_eq!(config.far_range, 600.0);
        assert_eq!(config.cell_size, 128.0);
        assert_eq!(config.start_minutes, 60.0);
        assert_eq!(config.memory_capacity, 1);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SimConfig = serde_json::from_str(r#"{"seed": 7}"#).expect("parse");
        assert_eq!(config.seed, 7);
        assert_eq!(config.near_range, 600.0);
    }
}
