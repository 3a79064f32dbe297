//! # Townsfolk Engine
//!
//! Headless host for the town simulation:
//! - Config loading from `townsfolk.toml`
//! - A valley map built on [`townsfolk_sim::FlatTerrain`]
//! - A scripted player run with event tallies and snapshot export

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod demo;

pub use config::{ConfigError, EngineConfig, CONFIG_FILE};
pub use demo::{run, RunSummary};
