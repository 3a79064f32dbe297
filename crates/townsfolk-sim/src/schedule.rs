//! Daily schedules per job.
//!
//! A schedule is an ordered list of hour ranges. Resolution is a pure
//! function of `(job, hour)`: the first block containing the hour wins,
//! and a block whose start is later than its end wraps past midnight.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use townsfolk_common::{SchemaVersion, TownsfolkError};

use crate::agent::Job;

/// Errors raised while loading schedule tables.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The RON document could not be parsed
    #[error("Failed to parse schedule table: {0}")]
    Parse(#[from] ron::error::SpannedError),
    /// The table could not be serialized
    #[error("Failed to serialize schedule table: {0}")]
    Serialize(#[from] ron::Error),
    /// An hour bound lies outside 0..=24
    #[error("Invalid hour {hour} in schedule for {job:?}")]
    InvalidHour {
        /// Offending job
        job: Job,
        /// Offending hour
        hour: f32,
    },
    /// A block starts and ends at the same hour
    #[error("Empty block at hour {hour} in schedule for {job:?}")]
    EmptyBlock {
        /// Offending job
        job: Job,
        /// Start and end hour
        hour: f32,
    },
    /// The file was written by an incompatible version
    #[error("Unsupported schedule table version {0}")]
    Version(SchemaVersion),
}

impl From<ScheduleError> for TownsfolkError {
    fn from(err: ScheduleError) -> Self {
        Self::Schedule(err.to_string())
    }
}

/// Activity a schedule block asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activity {
    /// Loiter near home
    Idle,
    /// Walk to work
    Travel,
    /// Work at the work position
    Work,
    /// Gather with others
    Socialize,
    /// Walk the patrol route
    Patrol,
    /// Go home and sleep
    Sleep,
}

/// Optional destination attached to a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScheduleTarget {
    /// The agent's home
    Home,
    /// The agent's work position
    Work,
}

/// One entry of a daily schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleBlock {
    /// Start hour (inclusive)
    pub start: f32,
    /// End hour (exclusive)
    pub end: f32,
    /// Requested activity
    pub activity: Activity,
    /// Optional destination
    #[serde(default)]
    pub target: Option<ScheduleTarget>,
}

impl ScheduleBlock {
    /// Creates a block without a destination.
    #[must_use]
    pub const fn new(start: f32, end: f32, activity: Activity) -> Self {
        Self {
            start,
            end,
            activity,
            target: None,
        }
    }

    /// Attaches a destination.
    #[must_use]
    pub const fn with_target(mut self, target: ScheduleTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Whether the block covers `hour`, wrapping midnight if `start > end`.
    #[must_use]
    pub fn contains(&self, hour: f32) -> bool {
        if self.start < self.end {
            hour >= self.start && hour < self.end
        } else {
            hour >= self.start || hour < self.end
        }
    }
}

/// Serialized form of a schedule table.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScheduleFile {
    version: SchemaVersion,
    jobs: Vec<JobSchedule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct JobSchedule {
    job: Job,
    blocks: Vec<ScheduleBlock>,
}

/// Schedules for every job.
#[derive(Debug, Clone)]
pub struct ScheduleTable {
    jobs: AHashMap<Job, Vec<ScheduleBlock>>,
}

impl Default for ScheduleTable {
    fn default() -> Self {
        use Activity::{Idle, Patrol, Sleep, Socialize, Travel, Work};
        use ScheduleTarget as T;

        let b = ScheduleBlock::new;
        let mut table = Self::empty();
        table.set(
            Job::Farmer,
            vec![
                b(5.0, 7.0, Travel).with_target(T::Work),
                b(7.0, 12.0, Work),
                b(12.0, 13.0, Travel).with_target(T::Home),
                b(13.0, 18.0, Work),
                b(18.0, 20.0, Socialize),
                b(20.0, 5.0, Sleep),
            ],
        );
        table.set(
            Job::Guard,
            vec![b(6.0, 18.0, Patrol), b(18.0, 22.0, Idle), b(22.0, 6.0, Sleep)],
        );
        table.set(
            Job::Merchant,
            vec![
                b(7.0, 8.0, Travel).with_target(T::Work),
                b(8.0, 18.0, Work),
                b(18.0, 20.0, Socialize),
                b(20.0, 7.0, Sleep),
            ],
        );
        table.set(
            Job::Blacksmith,
            vec![b(6.0, 17.0, Work), b(17.0, 20.0, Socialize), b(20.0, 6.0, Sleep)],
        );
        table.set(Job::TavernKeeper, vec![b(9.0, 23.0, Work), b(23.0, 9.0, Sleep)]);
        table.set(
            Job::Noble,
            vec![
                b(9.0, 11.0, Travel),
                b(11.0, 14.0, Socialize),
                b(14.0, 17.0, Idle),
                b(17.0, 21.0, Socialize),
                b(21.0, 9.0, Sleep),
            ],
        );
        table.set(
            Job::King,
            vec![
                b(8.0, 12.0, Work),
                b(12.0, 14.0, Idle),
                b(14.0, 18.0, Work),
                b(18.0, 22.0, Socialize),
                b(22.0, 8.0, Sleep),
            ],
        );
        table.set(Job::Bandit, vec![b(0.0, 24.0, Idle)]);
        table.set(
            Job::Villager,
            vec![
                b(6.0, 8.0, Idle),
                b(8.0, 12.0, Work),
                b(12.0, 14.0, Socialize),
                b(14.0, 18.0, Work),
                b(18.0, 21.0, Socialize),
                b(21.0, 6.0, Sleep),
            ],
        );
        table.set(
            Job::Woodcutter,
            vec![
                b(5.0, 7.0, Travel).with_target(T::Work),
                b(7.0, 16.0, Work),
                b(16.0, 18.0, Travel).with_target(T::Home),
                b(18.0, 21.0, Socialize),
                b(21.0, 5.0, Sleep),
            ],
        );
        table
    }
}

impl ScheduleTable {
    /// Creates a table with no schedules.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            jobs: AHashMap::new(),
        }
    }

    /// Replaces the schedule for a job.
    pub fn set(&mut self, job: Job, blocks: Vec<ScheduleBlock>) {
        self.jobs.insert(job, blocks);
    }

    /// Removes the schedule for a job.
    pub fn remove(&mut self, job: Job) -> Option<Vec<ScheduleBlock>> {
        self.jobs.remove(&job)
    }

    /// Blocks for a job, if any.
    #[must_use]
    pub fn blocks(&self, job: Job) -> Option<&[ScheduleBlock]> {
        self.jobs.get(&job).map(Vec::as_slice)
    }

    /// First block of `job`'s schedule containing `hour`.
    ///
    /// Returns `None` when the job has no schedule or no block matches;
    /// callers then keep the agent's previous activity.
    #[must_use]
    pub fn resolve(&self, job: Job, hour: f32) -> Option<&ScheduleBlock> {
        let mut hour = hour.rem_euclid(24.0);
        if hour >= 24.0 {
            hour = 0.0;
        }
        self.jobs.get(&job)?.iter().find(|block| block.contains(hour))
    }

    /// Parses a table from RON and validates it.
    pub fn from_ron(source: &str) -> Result<Self, ScheduleError> {
        let file: ScheduleFile = ron::from_str(source)?;
        if !SchemaVersion::SCHEDULE_TABLE.can_read(&file.version) {
            return Err(ScheduleError::Version(file.version));
        }
        let mut table = Self::empty();
        for entry in file.jobs {
            validate(entry.job, &entry.blocks)?;
            table.set(entry.job, entry.blocks);
        }
        Ok(table)
    }

    /// Serializes the table to RON, jobs in [`Job::ALL`] order.
    pub fn to_ron(&self) -> Result<String, ScheduleError> {
        let jobs = Job::ALL
            .iter()
            .filter_map(|job| {
                self.jobs.get(job).map(|blocks| JobSchedule {
                    job: *job,
                    blocks: blocks.clone(),
                })
            })
            .collect();
        let file = ScheduleFile {
            version: SchemaVersion::SCHEDULE_TABLE,
            jobs,
        };
        Ok(ron::ser::to_string_pretty(
            &file,
            ron::ser::PrettyConfig::default(),
        )?)
    }
}

fn validate(job: Job, blocks: &[ScheduleBlock]) -> Result<(), ScheduleError> {
    for block in blocks {
        for hour in [block.start, block.end] {
            if !(0.0..=24.0).contains(&hour) {
                return Err(ScheduleError::InvalidHour { job, hour });
            }
        }
        if (block.start - block.end).abs() < f32::EPSILON {
            return Err(ScheduleError::EmptyBlock {
                job,
                hour: block.start,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_guard_schedule() {
        let table = ScheduleTable::default();
        let at = |h: f32| table.resolve(Job::Guard, h).map(|b| b.activity);
        assert_eq!(at(10.0), Some(Activity::Patrol));
        assert_eq!(at(18.0), Some(Activity::Idle));
        assert_eq!(at(23.0), Some(Activity::Sleep));
        assert_eq!(at(3.0), Some(Activity::Sleep));
        assert_eq!(at(6.0), Some(Activity::Patrol));
    }

    #[test]
    fn test_overnight_block_wraps() {
        let block = ScheduleBlock::new(22.0, 6.0, Activity::Sleep);
        assert!(block.contains(23.5));
        assert!(block.contains(0.0));
        assert!(block.contains(5.99));
        assert!(!block.contains(6.0));
        assert!(!block.contains(12.0));
    }

    #[test]
    fn test_missing_job_resolves_none() {
        let mut table = ScheduleTable::default();
        table.remove(Job::Bandit);
        assert!(table.resolve(Job::Bandit, 12.0).is_none());
    }

    #[test]
    fn test_travel_targets_kept() {
        let table = ScheduleTable::default();
        let block = table
            .resolve(Job::Woodcutter, 17.0)
            .expect("woodcutter should have a block at 17h");
        assert_eq!(block.activity, Activity::Travel);
        assert_eq!(block.target, Some(ScheduleTarget::Home));
    }

    #[test]
    fn test_ron_roundtrip() {
        let table = ScheduleTable::default();
        let text = table.to_ron().expect("serialize should succeed");
        let parsed = ScheduleTable::from_ron(&text).expect("parse should succeed");
        for job in Job::ALL {
            assert_eq!(parsed.blocks(job), table.blocks(job));
        }
    }

    #[test]
    fn test_ron_rejects_bad_hour() {
        let source = r"(
            version: (major: 1, minor: 0),
            jobs: [(job: Guard, blocks: [(start: 6.0, end: 30.0, activity: Patrol)])],
        )";
        assert!(matches!(
            ScheduleTable::from_ron(source),
            Err(ScheduleError::InvalidHour { .. })
        ));
    }

    #[test]
    fn test_ron_rejects_newer_major() {
        let source = r"(version: (major: 9, minor: 0), jobs: [])";
        assert!(matches!(
            ScheduleTable::from_ron(source),
            Err(ScheduleError::Version(_))
        ));
    }

    proptest! {
        #[test]
        fn prop_every_job_covers_the_whole_day(hour in 0.0f32..24.0) {
            let table = ScheduleTable::default();
            for job in Job::ALL {
                prop_assert!(table.resolve(job, hour).is_some());
            }
        }

        #[test]
        fn prop_resolution_is_deterministic(hour in -48.0f32..48.0) {
            let table = ScheduleTable::default();
            for job in Job::ALL {
                prop_assert_eq!(table.resolve(job, hour), table.resolve(job, hour));
                prop_assert_eq!(
                    table.resolve(job, hour).map(|b| b.activity),
                    table.resolve(job, hour.rem_euclid(24.0)).map(|b| b.activity)
                );
            }
        }
    }
}
