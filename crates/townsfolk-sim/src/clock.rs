//! Simulated time of day.
//!
//! Time is tracked in game minutes since midnight and wraps at 1440,
//! bumping the day counter. By default one real second advances the
//! clock by two game minutes.

use serde::{Deserialize, Serialize};

/// Minutes in a game day.
pub const MINUTES_PER_DAY: f32 = 24.0 * 60.0;
/// Minutes in a game hour.
pub const MINUTES_PER_HOUR: f32 = 60.0;
/// Default game minutes per real second.
pub const DEFAULT_TIME_SCALE: f32 = 2.0;
/// Default starting time (07:00).
pub const DEFAULT_START_MINUTES: f32 = 420.0;

/// Game clock with a wrapping time of day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameClock {
    /// Minutes since midnight, in `[0, 1440)`.
    minutes: f32,
    /// Number of completed days.
    day: u32,
    /// Game minutes per real second.
    time_scale: f32,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new(DEFAULT_START_MINUTES)
    }
}

impl GameClock {
    /// Creates a clock at the given minute of day 1.
    #[must_use]
    pub fn new(minutes: f32) -> Self {
        Self {
            minutes: minutes.rem_euclid(MINUTES_PER_DAY),
            day: 1,
            time_scale: DEFAULT_TIME_SCALE,
        }
    }

    /// Creates a clock at a specific hour and minute.
    #[must_use]
    pub fn at(hour: u32, minute: u32) -> Self {
        let hour = hour.min(23);
        let minute = minute.min(59);
        Self::new(hour as f32 * MINUTES_PER_HOUR + minute as f32)
    }

    /// Sets the time scale (game minutes per real second).
    #[must_use]
    pub fn with_time_scale(mut self, scale: f32) -> Self {
        self.time_scale = scale.max(0.0);
        self
    }

    /// Game minutes per real second.
    #[must_use]
    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Advances the clock by `dt` real seconds.
    pub fn advance(&mut self, dt: f32) {
        self.minutes += dt.max(0.0) * self.time_scale;
        while self.minutes >= MINUTES_PER_DAY {
            self.minutes -= MINUTES_PER_DAY;
            self.day = self.day.saturating_add(1);
        }
    }

    /// Jumps to a minute of the current day without touching the day counter.
    pub fn set_minutes(&mut self, minutes: f32) {
        self.minutes = minutes.rem_euclid(MINUTES_PER_DAY);
    }

    /// Sets the day counter.
    pub fn set_day(&mut self, day: u32) {
        self.day = day;
    }

    /// Minutes since midnight.
    #[must_use]
    pub fn minutes(&self) -> f32 {
        self.minutes
    }

    /// Current day number, starting at 1.
    #[must_use]
    pub fn day(&self) -> u32 {
        self.day
    }

    /// Fractional hour of day in `[0, 24)`.
    #[must_use]
    pub fn hour(&self) -> f32 {
        self.minutes / MINUTES_PER_HOUR
    }

    /// Whole hour of day (0-23).
    #[must_use]
    pub fn whole_hour(&self) -> u32 {
        (self.hour() as u32) % 24
    }

    /// Night window used by witness detection (21:00 to 05:00).
    #[must_use]
    pub fn is_night(&self) -> bool {
        is_night_hour(self.hour())
    }

    /// Formats the time as `HH:MM`.
    #[must_use]
    pub fn format_hhmm(&self) -> String {
        let total = self.minutes as u32;
        format!("{:02}:{:02}", (total / 60) % 24, total % 60)
    }
}

/// Whether an hour falls in the night window (21:00 to 05:00).
#[must_use]
pub fn is_night_hour(hour: f32) -> bool {
    hour >= 21.0 || hour < 5.0
}
