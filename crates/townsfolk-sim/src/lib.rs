//! # Townsfolk Sim
//!
//! Simulation core for a persistent town population.
//!
//! This crate provides:
//! - A uniform-grid spatial index rebuilt every tick
//! - Per-job daily schedules (loadable from RON)
//! - A behavior state machine with level-of-detail tiers
//! - A tactical combat sub-machine with group flanking
//! - Crime detection, witness reports and guard dispatch
//! - A persistence projection (bincode and JSON)
//! - An event bus for host notifications
//!
//! Terrain and bark content are supplied by the host through the
//! [`Terrain`] and [`BarkProvider`] traits.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod agent;
pub mod barks;
pub mod behavior;
pub mod clock;
pub mod config;
pub mod damage;
pub mod events;
pub mod law;
pub mod memory;
pub mod movement;
pub mod names;
pub mod player;
pub mod population;
pub mod ring;
pub mod rng;
pub mod schedule;
pub mod simulation;
pub mod snapshot;
pub mod spatial;
pub mod tactics;
pub mod terrain;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::agent::{
        Agent, AgentName, AgentSpec, AlertIcon, Facing, Faction, Gender, Job, PatrolRoute, Personality,
    };
    pub use crate::barks::{BarkContext, BarkProvider, BuiltinBarks};
    pub use crate::behavior::{BehaviorState, SocialVenues, StateTag, UpdateTier};
    pub use crate::clock::GameClock;
    pub use crate::config::SimConfig;
    pub use crate::damage::HitOutcome;
    pub use crate::events::{EventBus, SimEvent};
    pub use crate::law::{CrimeKind, CrimeRecord, LawSystem, WitnessReport};
    pub use crate::memory::{MemoryEvent, MemoryKind, MemoryLog};
    pub use crate::player::{PlayerState, Reputation, Skills, SocialStanding};
    pub use crate::population::spawn_default_population;
    pub use crate::ring::BoundedLog;
    pub use crate::rng::SimRng;
    pub use crate::schedule::{Activity, ScheduleBlock, ScheduleError, ScheduleTable, ScheduleTarget};
    pub use crate::simulation::SimulationWorld;
    pub use crate::snapshot::{AgentRecord, SnapshotError, WorldSnapshot};
    pub use crate::spatial::{IndexedAgent, SpatialIndex};
    pub use crate::tactics::{flank_drift, CombatCause, CombatState, CombatTarget, TacticalPhase};
    pub use crate::terrain::{FlatTerrain, RegionShape, Terrain, TileRect};
}

pub use prelude::*;
