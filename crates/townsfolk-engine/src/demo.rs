//! Scripted valley run.
//!
//! Builds a small map around Ashford, spawns the default population and
//! walks a scripted player through town while the simulation ticks.
//! Events are tallied into a [`RunSummary`] and logged.

use anyhow::{Context, Result};
use glam::Vec2;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};
use townsfolk_common::TileCoord;
use townsfolk_sim::{
    spawn_default_population, BuiltinBarks, CrimeKind, FlatTerrain, RegionShape, ScheduleTable, SimEvent,
    SimulationWorld, Terrain, TileRect,
};

use crate::config::EngineConfig;

/// Scripted player speed in world units per second.
pub const PLAYER_SPEED: f32 = 96.0;

/// Player waypoints in tiles: west gate, market, castle yard, tavern.
const PLAYER_ROUTE: [(f32, f32); 4] = [(100.0, 128.0), (128.0, 128.0), (141.0, 116.0), (116.0, 128.0)];

/// Builds the valley map: Ashford, two villages, the bandit camp, two
/// forests and the restricted castle yard.
#[must_use]
pub fn build_valley(tile_size: f32) -> FlatTerrain {
    let mut terrain = FlatTerrain::new().with_size(tile_size, 256);
    terrain.add_region("ashford", RegionShape::Rect(TileRect::new(108, 108, 148, 148)));
    terrain.add_region(
        "millhaven",
        RegionShape::Circle {
            center: TileCoord::new(66, 190),
            radius: 12.0,
        },
    );
    terrain.add_region(
        "thornfield",
        RegionShape::Circle {
            center: TileCoord::new(66, 64),
            radius: 12.0,
        },
    );
    terrain.add_region(
        "banditCamp",
        RegionShape::Circle {
            center: TileCoord::new(200, 80),
            radius: 10.0,
        },
    );
    terrain.add_restricted(TileRect::new(137, 111, 145, 117));
    terrain.add_forest(TileRect::new(30, 20, 90, 50));
    terrain.add_forest(TileRect::new(180, 60, 220, 100));
    terrain
}

/// Loads a RON schedule table from disk.
pub fn load_schedules(path: &Path) -> Result<ScheduleTable> {
    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read schedules from {}", path.display()))?;
    let table = ScheduleTable::from_ron(&source)
        .with_context(|| format!("Invalid schedule table in {}", path.display()))?;
    info!("Loaded schedules from {}", path.display());
    Ok(table)
}

/// Player walking a fixed list of waypoints.
#[derive(Debug, Clone)]
pub struct ScriptedWalk {
    waypoints: Vec<Vec2>,
    next: usize,
}

impl ScriptedWalk {
    /// Creates a walk over world-space waypoints.
    #[must_use]
    pub fn new(waypoints: Vec<Vec2>) -> Self {
        Self { waypoints, next: 0 }
    }

    /// The default route through Ashford.
    #[must_use]
    pub fn ashford(tile_size: f32) -> Self {
        Self::new(
            PLAYER_ROUTE
                .iter()
                .map(|(x, y)| Vec2::new(x * tile_size, y * tile_size))
                .collect(),
        )
    }

    /// Start of the route.
    #[must_use]
    pub fn start(&self) -> Vec2 {
        self.waypoints.first().copied().unwrap_or(Vec2::ZERO)
    }

    /// Whether every waypoint has been reached.
    #[must_use]
    pub fn finished(&self) -> bool {
        self.next >= self.waypoints.len()
    }

    /// Moves `position` toward the next waypoint.
    pub fn step(&mut self, position: Vec2, dt: f32) -> Vec2 {
        let Some(target) = self.waypoints.get(self.next).copied() else {
            return position;
        };
        let to_target = target - position;
        let reach = PLAYER_SPEED * dt;
        if to_target.length() <= reach {
            self.next += 1;
            return target;
        }
        position + to_target.normalize_or_zero() * reach
    }
}

/// Tally of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Ticks simulated
    pub ticks: u32,
    /// Events drained
    pub events: usize,
    /// Barks spoken
    pub barks: usize,
    /// State transitions
    pub state_changes: usize,
    /// Crimes reported
    pub crimes: usize,
    /// Crimes a guard saw
    pub crimes_reported: usize,
    /// Witness reports queued
    pub witness_reports: usize,
    /// Guards sent to investigate
    pub guards_dispatched: usize,
    /// Agents killed
    pub agents_killed: usize,
    /// Damage the player took
    pub player_damage: f32,
    /// Highest bounty seen
    pub peak_bounty: u32,
    /// Bounty at the end of the run
    pub final_bounty: u32,
    /// Clock at the end of the run
    pub clock: String,
}

impl RunSummary {
    /// Counts one event.
    pub fn record(&mut self, event: &SimEvent) {
        self.events += 1;
        match event {
            SimEvent::Bark { .. } => self.barks += 1,
            SimEvent::StateChanged { .. } => self.state_changes += 1,
            SimEvent::CrimeCommitted { reported, .. } => {
                self.crimes += 1;
                if *reported {
                    self.crimes_reported += 1;
                }
            },
            SimEvent::WitnessReportQueued { .. } => self.witness_reports += 1,
            SimEvent::GuardsDispatched { guards, .. } => self.guards_dispatched += guards,
            SimEvent::AgentKilled { .. } => self.agents_killed += 1,
            SimEvent::PlayerDamaged { amount, .. } => self.player_damage += amount,
            SimEvent::BountyChanged { bounty } => self.peak_bounty = self.peak_bounty.max(*bounty),
            SimEvent::AgentDamaged { .. } | SimEvent::BountyCleared { .. } => {},
        }
    }
}

fn log_event(event: &SimEvent) {
    match event {
        SimEvent::Bark { agent, text } => debug!(%agent, "\"{text}\""),
        SimEvent::StateChanged { agent, from, to } => debug!(%agent, ?from, ?to, "state changed"),
        SimEvent::CrimeCommitted {
            kind,
            severity,
            witnessed,
            reported,
        } => info!(?kind, severity, witnessed, reported, "crime committed"),
        SimEvent::WitnessReportQueued { witness, crime, delay } => {
            info!(%witness, ?crime, delay, "witness will report");
        },
        SimEvent::GuardsDispatched {
            witness,
            crime,
            guards,
            target,
        } => info!(%witness, ?crime, guards, x = target.x, y = target.y, "guards dispatched"),
        SimEvent::AgentDamaged {
            agent,
            amount,
            from_player,
        } => debug!(%agent, amount, from_player, "agent damaged"),
        SimEvent::AgentKilled { agent, by_player } => info!(%agent, by_player, "agent killed"),
        SimEvent::PlayerDamaged { attacker, amount } => debug!(%attacker, amount, "player hit"),
        SimEvent::BountyChanged { bounty } => info!(bounty, "bounty changed"),
        SimEvent::BountyCleared { guards_stood_down } => info!(guards_stood_down, "bounty cleared"),
    }
}

/// Builds a world for `config`, loading custom schedules if configured.
pub fn build_world(config: &EngineConfig, terrain: &FlatTerrain) -> Result<SimulationWorld> {
    let mut world = SimulationWorld::new(config.sim.clone());
    if let Some(path) = &config.schedule_path {
        world = world.with_schedules(load_schedules(path)?);
    }
    if config.spawn_population {
        spawn_default_population(&mut world, terrain.tile_size());
    }
    Ok(world)
}

/// Runs the scripted demo and returns its tally.
pub fn run(config: &EngineConfig) -> Result<RunSummary> {
    let terrain = build_valley(townsfolk_sim::terrain::DEFAULT_TILE_SIZE);
    let mut world = build_world(config, &terrain)?;
    let mut walk = ScriptedWalk::ashford(terrain.tile_size());
    world.player_mut().position = walk.start();

    info!(
        agents = world.agents().len(),
        ticks = config.ticks,
        seed = config.sim.seed,
        "Starting run at {}",
        world.clock().format_hhmm()
    );

    let mut summary = RunSummary::default();
    for tick in 0..config.ticks {
        if world.player().alive && !walk.finished() {
            let next = walk.step(world.player().position, config.dt);
            world.player_mut().position = next;
        }

        world.update(config.dt, &terrain, &BuiltinBarks);

        if config.commit_theft && config.theft_tick == tick && world.player().alive {
            let record = world.report_crime(CrimeKind::Theft, None, None, &terrain);
            info!(
                location = %record.location,
                witnesses = record.witnesses.len(),
                "Player stole from a stall"
            );
        }

        for event in world.drain_events() {
            if config.log_events {
                log_event(&event);
            }
            summary.record(&event);
        }
        summary.ticks = tick + 1;

        if !world.player().alive {
            warn!(tick, "Player was killed");
            break;
        }
    }

    if config.pay_bounty && world.player().bounty > 0 {
        info!(bounty = world.player().bounty, "Paying off bounty");
        world.clear_bounty();
        for event in world.drain_events() {
            summary.record(&event);
        }
    }

    summary.final_bounty = world.player().bounty;
    summary.clock = world.clock().format_hhmm();

    info!(
        ticks = summary.ticks,
        events = summary.events,
        barks = summary.barks,
        state_changes = summary.state_changes,
        crimes = summary.crimes,
        crimes_reported = summary.crimes_reported,
        witness_reports = summary.witness_reports,
        guards_dispatched = summary.guards_dispatched,
        killed = summary.agents_killed,
        player_damage = summary.player_damage,
        peak_bounty = summary.peak_bounty,
        bounty = summary.final_bounty,
        "Run finished at {} on day {}",
        summary.clock,
        world.clock().day()
    );

    if let Some(path) = &config.snapshot_path {
        write_snapshot(&world, path)?;
    }

    Ok(summary)
}

fn write_snapshot(world: &SimulationWorld, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = world.snapshot().to_json().context("Failed to encode snapshot")?;
    fs::write(path, json).with_context(|| format!("Failed to write snapshot to {}", path.display()))?;
    info!("Saved snapshot to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use townsfolk_sim::WorldSnapshot;

    fn short_config() -> EngineConfig {
        EngineConfig {
            ticks: 240,
            dt: 0.25,
            theft_tick: 40,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_valley_locations() {
        let terrain = build_valley(32.0);
        let at = |x: f32, y: f32| terrain.location_at(Vec2::new(x * 32.0, y * 32.0));
        assert_eq!(at(128.0, 128.0), "ashford");
        assert_eq!(at(66.0, 190.0), "millhaven");
        assert_eq!(at(66.0, 64.0), "thornfield");
        assert_eq!(at(200.0, 80.0), "banditCamp");
        assert_eq!(at(45.0, 40.0), "forest");
        assert_eq!(at(10.0, 240.0), "wilderness");
        assert!(terrain.is_restricted(TileCoord::new(141, 114)));
        assert!(!terrain.is_restricted(TileCoord::new(128, 128)));
    }

    #[test]
    fn test_scripted_walk_reaches_waypoints() {
        let mut walk = ScriptedWalk::new(vec![Vec2::ZERO, Vec2::new(100.0, 0.0)]);
        let mut pos = walk.start();
        pos = walk.step(pos, 0.1);
        assert_eq!(pos, Vec2::ZERO);
        for _ in 0..20 {
            pos = walk.step(pos, 0.1);
        }
        assert_eq!(pos, Vec2::new(100.0, 0.0));
        assert!(walk.finished());
        assert_eq!(walk.step(pos, 1.0), pos);
    }

    #[test]
    fn test_summary_counts_events() {
        let mut summary = RunSummary::default();
        summary.record(&SimEvent::BountyChanged { bounty: 50 });
        summary.record(&SimEvent::BountyChanged { bounty: 20 });
        summary.record(&SimEvent::CrimeCommitted {
            kind: CrimeKind::Theft,
            severity: 2,
            witnessed: true,
            reported: true,
        });
        assert_eq!(summary.events, 3);
        assert_eq!(summary.peak_bounty, 50);
        assert_eq!(summary.crimes, 1);
        assert_eq!(summary.crimes_reported, 1);
    }

    #[test]
    fn test_run_reports_theft_and_pays_bounty() {
        let summary = run(&short_config()).expect("run");
        assert!(summary.ticks > 0);
        assert!(summary.crimes >= 1);
        assert!(summary.barks > 0 || summary.state_changes > 0);
        assert_eq!(summary.final_bounty, 0);
    }

    #[test]
    fn test_run_is_deterministic() {
        let a = run(&short_config()).expect("first run");
        let b = run(&short_config()).expect("second run");
        assert_eq!(a, b);
    }

    #[test]
    fn test_run_writes_snapshot() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("out").join("snapshot.json");
        let config = EngineConfig {
            ticks: 20,
            commit_theft: false,
            snapshot_path: Some(path.clone()),
            ..EngineConfig::default()
        };
        run(&config).expect("run");

        let json = fs::read_to_string(&path).expect("read snapshot");
        let snapshot = WorldSnapshot::from_json(&json).expect("parse snapshot");
        assert_eq!(snapshot.agents.len(), 47);
    }

    #[test]
    fn test_custom_schedules_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("schedules.ron");
        let ron = ScheduleTable::default().to_ron().expect("encode schedules");
        fs::write(&path, ron).expect("write schedules");

        let table = load_schedules(&path).expect("load schedules");
        assert!(table.resolve(townsfolk_sim::Job::Guard, 12.0).is_some());
        assert!(load_schedules(&temp_dir.path().join("missing.ron")).is_err());
    }
}
