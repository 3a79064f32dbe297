//! Format versions and file magic.
//!
//! Readers accept any data with their own major version; a minor bump only
//! adds fields with serde defaults.

use serde::{Deserialize, Serialize};

/// Version stamped into snapshots and schedule tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Bumped on breaking layout changes
    pub major: u16,
    /// Bumped when fields are added
    pub minor: u16,
}

impl SchemaVersion {
    /// World snapshot format.
    pub const WORLD_SNAPSHOT: Self = Self::new(1, 0);

    /// Schedule table format.
    pub const SCHEDULE_TABLE: Self = Self::new(1, 0);

    /// Creates a version.
    #[must_use]
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Whether a reader at this version understands `data`.
    #[must_use]
    pub const fn can_read(&self, data: &Self) -> bool {
        self.major == data.major
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}.{}", self.major, self.minor)
    }
}

/// Leading bytes of a binary world snapshot.
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"TFSV";
