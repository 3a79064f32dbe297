//! # Townsfolk
//!
//! Headless runner for the town population simulation.
//!
//! Usage: `townsfolk [CONFIG]` where `CONFIG` defaults to `townsfolk.toml`.
//! Set `RUST_LOG=townsfolk=debug` to see every bark and state change.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use townsfolk_engine::{demo, EngineConfig, CONFIG_FILE};

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("townsfolk=info".parse()?))
        .init();

    info!("Townsfolk v{}", env!("CARGO_PKG_VERSION"));

    let path = std::env::args().nth(1).unwrap_or_else(|| CONFIG_FILE.to_string());
    let mut config = EngineConfig::load_from(&path);
    config.validate();

    let summary = demo::run(&config)?;
    if summary.agents_killed > 0 {
        info!(killed = summary.agents_killed, "Blood was spilled in the valley");
    }

    info!("Townsfolk shutdown complete");
    Ok(())
}
