//! Crime, witnesses and law enforcement.
//!
//! Reporting a crime runs witness detection around the player on the
//! spot. Guards who see it react at once; civilian witnesses queue a
//! delayed report that later sends every free guard to investigate.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use townsfolk_common::AgentId;
use tracing::{debug, info, warn};

use crate::agent::{Agent, Faction, Job, Personality};
use crate::barks;
use crate::behavior::BehaviorState;
use crate::clock::is_night_hour;
use crate::events::{EventBus, SimEvent};
use crate::memory::MemoryKind;
use crate::player::{CrimeEntry, PlayerState};
use crate::ring::BoundedLog;
use crate::rng::SimRng;
use crate::spatial::SpatialIndex;
use crate::tactics::{CombatCause, CombatState, CombatTarget};
use crate::terrain::Terrain;

/// Radius around the player searched for potential witnesses.
pub const WITNESS_SEARCH_RADIUS: f32 = 200.0;
/// Base distance at which a witness notices a crime.
pub const DETECTION_RANGE: f32 = 150.0;
/// Detection multiplier between 21:00 and 05:00.
pub const NIGHT_VISIBILITY: f32 = 0.5;
/// Detection multiplier when the crime happens on forest tiles.
pub const FOREST_VISIBILITY: f32 = 0.7;
/// Crimes kept in the recent log.
pub const RECENT_CRIME_CAPACITY: usize = 50;
/// Witness reports that may be pending at once.
pub const REPORT_QUEUE_CAPACITY: usize = 64;
/// Minimum seconds before a witness report reaches the guards.
pub const REPORT_DELAY_MIN: f32 = 10.0;
/// Maximum seconds before a witness report reaches the guards.
pub const REPORT_DELAY_MAX: f32 = 30.0;

// ============================================================================
// Crime types
// ============================================================================

/// Kind of crime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrimeKind {
    /// Taking goods
    Theft,
    /// Entering a forbidden area
    Trespass,
    /// Attacking someone
    Assault,
    /// Killing someone
    Murder,
    /// Lifting a purse
    Pickpocket,
    /// Anything else
    Other,
}

impl CrimeKind {
    /// Severity used for bounty, reputation and relation penalties.
    #[must_use]
    pub const fn severity(self) -> u32 {
        match self {
            Self::Theft | Self::Pickpocket => 2,
            Self::Trespass | Self::Other => 1,
            Self::Assault => 4,
            Self::Murder => 8,
        }
    }

    /// Whether the crime angers the guards as a body.
    #[must_use]
    pub const fn is_violent(self) -> bool {
        matches!(self, Self::Assault | Self::Murder)
    }

    /// Parses a crime name; unknown names become [`CrimeKind::Other`].
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "theft" => Self::Theft,
            "trespass" => Self::Trespass,
            "assault" => Self::Assault,
            "murder" => Self::Murder,
            "pickpocket" => Self::Pickpocket,
            _ => Self::Other,
        }
    }
}

/// A reported crime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrimeRecord {
    /// Kind of crime
    pub kind: CrimeKind,
    /// Derived severity
    pub severity: u32,
    /// Whether any agent saw it
    pub witnessed: bool,
    /// Whether a guard saw it
    pub reported: bool,
    /// Game minute
    pub time: f32,
    /// Player position when reported
    pub position: Vec2,
    /// Location key when reported
    pub location: String,
    /// Victim, if any
    pub victim: Option<AgentId>,
    /// Victim display name
    pub victim_name: String,
    /// Agent that raised the report, if any
    pub reported_by: Option<AgentId>,
    /// Agents that saw it
    pub witnesses: Vec<AgentId>,
}

/// A civilian on the way to tell the guards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WitnessReport {
    /// Witness
    pub witness: AgentId,
    /// Kind of crime
    pub crime: CrimeKind,
    /// Game minute the report was created
    pub created_at: f32,
    /// Seconds until it lands
    pub delay: f32,
    /// Seconds elapsed so far
    pub elapsed: f32,
    /// Where the crime happened, used if the witness is gone
    pub crime_position: Vec2,
}

impl WitnessReport {
    /// Whether the report should be delivered.
    #[must_use]
    pub fn is_due(&self) -> bool {
        self.elapsed >= self.delay
    }
}

/// A crime raised during the agent pass, handled after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrimeTrigger {
    /// Kind of crime
    pub kind: CrimeKind,
    /// Agent raising it
    pub reporter: Option<AgentId>,
    /// Victim, excluded from witnesses
    pub victim: Option<AgentId>,
}

/// Mutable world slices needed to evaluate a crime.
pub(crate) struct CrimeScene<'a> {
    pub agents: &'a mut [Agent],
    pub index: &'a SpatialIndex,
    pub player: &'a mut PlayerState,
    pub rng: &'a mut SimRng,
    pub terrain: &'a dyn Terrain,
    pub events: &'a EventBus,
    pub hour: f32,
    pub now: f32,
}

// ============================================================================
// Law system
// ============================================================================

/// Recent crimes and pending witness reports.
#[derive(Debug, Clone)]
pub struct LawSystem {
    recent: BoundedLog<CrimeRecord>,
    reports: BoundedLog<WitnessReport>,
}

impl Default for LawSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl LawSystem {
    /// Creates an empty law system.
    #[must_use]
    pub fn new() -> Self {
        Self {
            recent: BoundedLog::new(RECENT_CRIME_CAPACITY),
            reports: BoundedLog::new(REPORT_QUEUE_CAPACITY),
        }
    }

    /// Recent crimes, oldest first.
    pub fn recent_crimes(&self) -> impl Iterator<Item = &CrimeRecord> {
        self.recent.iter()
    }

    /// Number of crimes in the recent log.
    #[must_use]
    pub fn recent_count(&self) -> usize {
        self.recent.len()
    }

    /// Pending witness reports, oldest first.
    pub fn pending_reports(&self) -> impl Iterator<Item = &WitnessReport> {
        self.reports.iter()
    }

    /// Number of pending witness reports.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.reports.len()
    }

    /// Replaces the recent log (used when loading).
    pub fn restore_recent(&mut self, crimes: Vec<CrimeRecord>) {
        self.recent.replace_with(crimes);
    }

    /// Runs witness detection for a crime by the player and applies its
    /// consequences. See [`crate::SimulationWorld::report_crime`].
    pub(crate) fn report_crime(&mut self, trigger: CrimeTrigger, scene: CrimeScene<'_>) -> CrimeRecord {
        let CrimeScene {
            agents,
            index,
            player,
            rng,
            terrain,
            events,
            hour,
            now,
        } = scene;

        let kind = trigger.kind;
        let severity = kind.severity();
        let position = player.position;
        let location = terrain.location_at(position);
        let victim_name = trigger
            .victim
            .and_then(|id| agents.get(id.index()))
            .map_or_else(|| "unknown".to_string(), |v| v.name.full.clone());

        let mut record = CrimeRecord {
            kind,
            severity,
            witnessed: false,
            reported: false,
            time: now,
            position,
            location: location.clone(),
            victim: trigger.victim,
            victim_name,
            reported_by: trigger.reporter,
            witnesses: Vec::new(),
        };

        let mut range = DETECTION_RANGE;
        if is_night_hour(hour) {
            range *= NIGHT_VISIBILITY;
        }
        if terrain.is_forest(terrain.tile_at(position)) {
            range *= FOREST_VISIBILITY;
        }
        let evasion = player.skills.stealth / 200.0;
        let penalty = i32::try_from(severity).unwrap_or(i32::MAX);

        for id in index.query_ids(position, WITNESS_SEARCH_RADIUS) {
            if Some(id) == trigger.victim {
                continue;
            }
            let Some(agent) = agents.get_mut(id.index()) else {
                continue;
            };
            if !agent.alive || agent.is_sleeping() {
                continue;
            }
            if agent.distance_to(position) >= range || rng.unit() <= evasion {
                continue;
            }

            record.witnessed = true;
            record.witnesses.push(id);
            agent.remember(MemoryKind::WitnessedCrime { crime: kind }, now);
            agent.adjust_relation(-penalty.saturating_mul(5));

            if agent.job == Job::Guard {
                if !agent.is_fighting() {
                    let combat = CombatState::engage(CombatCause::CrimeWitnessed, rng);
                    agent.set_state(BehaviorState::Fight(combat));
                }
                bark(agent, barks::crime_callout(kind), events);
                record.reported = true;
            } else if agent.personality != Personality::Hostile && agent.faction != Faction::Bandits {
                if agent.personality != Personality::Cowardly {
                    agent.set_state(BehaviorState::Flee);
                }
                let cry = barks::witness_cry(rng);
                bark(agent, cry, events);

                let delay = rng.range(REPORT_DELAY_MIN, REPORT_DELAY_MAX);
                let report = WitnessReport {
                    witness: id,
                    crime: kind,
                    created_at: now,
                    delay,
                    elapsed: 0.0,
                    crime_position: position,
                };
                if let Some(dropped) = self.reports.push(report) {
                    warn!(witness = %dropped.witness, "witness report queue full, oldest report dropped");
                }
                events.publish(SimEvent::WitnessReportQueued {
                    witness: id,
                    crime: kind,
                    delay,
                });
            }
        }

        if record.witnessed {
            player.bounty = player.bounty.saturating_add(severity * 10);
            events.publish(SimEvent::BountyChanged {
                bounty: player.bounty,
            });
        }
        player.reputation.adjust_global(-penalty.saturating_mul(3));
        player.reputation.adjust_location(&location, -penalty.saturating_mul(5));
        if kind.is_violent() {
            player.reputation.adjust_faction("guards", -penalty.saturating_mul(4));
        }

        self.recent.push(record.clone());
        player.crimes.push(CrimeEntry { kind, time: now });

        events.publish(SimEvent::CrimeCommitted {
            kind,
            severity,
            witnessed: record.witnessed,
            reported: record.reported,
        });
        debug!(
            ?kind,
            witnesses = record.witnesses.len(),
            reported = record.reported,
            bounty = player.bounty,
            "crime reported"
        );
        record
    }

    /// Advances pending reports; each due report sends every living,
    /// non-fighting guard to investigate the witness's position and is
    /// then removed. Returns the number of reports delivered.
    pub(crate) fn update(&mut self, dt: f32, agents: &mut [Agent], now: f32, events: &EventBus) -> usize {
        for report in self.reports.iter_mut() {
            report.elapsed += dt;
        }
        let due: Vec<WitnessReport> = self.reports.iter().filter(|r| r.is_due()).cloned().collect();
        if due.is_empty() {
            return 0;
        }
        self.reports.retain(|r| !r.is_due());

        for report in &due {
            let target = agents
                .get(report.witness.index())
                .map_or(report.crime_position, |w| w.position);

            let mut dispatched = 0;
            for guard in agents
                .iter_mut()
                .filter(|a| a.faction == Faction::Guards && a.alive && !a.is_fighting())
            {
                guard.set_state(BehaviorState::Investigate {
                    target: Some(target),
                });
                guard.remember(MemoryKind::CrimeReport { crime: report.crime }, now);
                dispatched += 1;
            }

            info!(
                witness = %report.witness,
                crime = ?report.crime,
                guards = dispatched,
                "witness report delivered"
            );
            events.publish(SimEvent::GuardsDispatched {
                witness: report.witness,
                crime: report.crime,
                guards: dispatched,
                target,
            });
        }
        due.len()
    }

    /// Zeroes the bounty and stands down every guard fighting the player.
    /// Returns the number of guards stood down.
    pub(crate) fn clear_bounty(player: &mut PlayerState, agents: &mut [Agent], events: &EventBus) -> usize {
        player.bounty = 0;
        let mut stood_down = 0;
        for guard in agents.iter_mut().filter(|a| a.faction == Faction::Guards) {
            let fighting_player = matches!(
                &guard.state,
                BehaviorState::Fight(combat) if combat.target == CombatTarget::Player
            );
            if fighting_player {
                guard.blocking = false;
                guard.set_state(BehaviorState::Idle);
                stood_down += 1;
            }
        }
        info!(guards = stood_down, "bounty cleared");
        events.publish(SimEvent::BountyCleared {
            guards_stood_down: stood_down,
        });
        stood_down
    }
}

fn bark(agent: &mut Agent, text: impl Into<String>, events: &EventBus) {
    let text = text.into();
    agent.set_bark(text.clone());
    events.publish(SimEvent::Bark {
        agent: agent.id,
        text,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_mapping() {
        assert_eq!(CrimeKind::Theft.severity(), 2);
        assert_eq!(CrimeKind::Trespass.severity(), 1);
        assert_eq!(CrimeKind::Assault.severity(), 4);
        assert_eq!(CrimeKind::Murder.severity(), 8);
        assert_eq!(CrimeKind::Pickpocket.severity(), 2);
    }

    #[test]
    fn test_unknown_crime_defaults_to_one() {
        let kind = CrimeKind::from_name("arson");
        assert_eq!(kind, CrimeKind::Other);
        assert_eq!(kind.severity(), 1);
        assert_eq!(CrimeKind::from_name("Murder"), CrimeKind::Murder);
    }

    #[test]
    fn test_callouts() {
        assert_eq!(barks::crime_callout(CrimeKind::Theft), "Stop right there, thief!");
        assert_eq!(
            barks::crime_callout(CrimeKind::Other),
            "Halt! You have committed a crime!"
        );
    }

    #[test]
    fn test_report_due() {
        let mut report = WitnessReport {
            witness: AgentId::from_index(0),
            crime: CrimeKind::Theft,
            created_at: 0.0,
            delay: 12.0,
            elapsed: 11.0,
            crime_position: Vec2::ZERO,
        };
        assert!(!report.is_due());
        report.elapsed = 12.0;
        assert!(report.is_due());
    }
}
