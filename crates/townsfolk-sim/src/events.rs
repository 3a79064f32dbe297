//! Event bus carrying simulation notifications to the host.

use crossbeam_channel::{bounded, Receiver, Sender};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use townsfolk_common::AgentId;

use crate::behavior::StateTag;
use crate::law::CrimeKind;

/// Default number of events buffered between drains.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Notifications published during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    /// An agent barked a line
    Bark {
        /// Speaker
        agent: AgentId,
        /// Line
        text: String,
    },
    /// An agent's top-level state changed
    StateChanged {
        /// Agent
        agent: AgentId,
        /// Previous state
        from: StateTag,
        /// New state
        to: StateTag,
    },
    /// A crime was reported
    CrimeCommitted {
        /// Kind of crime
        kind: CrimeKind,
        /// Severity
        severity: u32,
        /// Whether anyone saw it
        witnessed: bool,
        /// Whether a guard saw it
        reported: bool,
    },
    /// A civilian witness will report to the guards
    WitnessReportQueued {
        /// Witness
        witness: AgentId,
        /// Kind of crime
        crime: CrimeKind,
        /// Seconds until the report lands
        delay: f32,
    },
    /// Guards were sent to investigate a report
    GuardsDispatched {
        /// Witness who reported
        witness: AgentId,
        /// Kind of crime
        crime: CrimeKind,
        /// Number of guards sent
        guards: usize,
        /// Investigation target
        target: Vec2,
    },
    /// An agent took damage
    AgentDamaged {
        /// Victim
        agent: AgentId,
        /// Damage dealt
        amount: f32,
        /// Whether the player dealt it
        from_player: bool,
    },
    /// An agent died
    AgentKilled {
        /// Victim
        agent: AgentId,
        /// Whether the player dealt the final blow
        by_player: bool,
    },
    /// An agent hit the player
    PlayerDamaged {
        /// Attacker
        attacker: AgentId,
        /// Damage taken
        amount: f32,
    },
    /// The player's bounty changed
    BountyChanged {
        /// New bounty
        bounty: u32,
    },
    /// The bounty was paid or pardoned
    BountyCleared {
        /// Guards that stopped fighting the player
        guards_stood_down: usize,
    },
}

/// Bounded bus; events are dropped when nobody drains it.
#[derive(Debug)]
pub struct EventBus {
    sender: Sender<SimEvent>,
    receiver: Receiver<SimEvent>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventBus {
    /// Creates a bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Publishes an event.
    pub fn publish(&self, event: SimEvent) {
        // Non-blocking send - if full, event is dropped
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending events.
    pub fn drain(&self) -> Vec<SimEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Handle for publishing from elsewhere.
    #[must_use]
    pub fn sender(&self) -> Sender<SimEvent> {
        self.sender.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_drain() {
        let bus = EventBus::new(8);
        bus.publish(SimEvent::BountyChanged { bounty: 20 });
        bus.publish(SimEvent::BountyCleared {
            guards_stood_down: 2,
        });
        assert_eq!(bus.pending_count(), 2);
        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert_eq!(bus.pending_count(), 0);
    }

    #[test]
    fn test_full_bus_drops() {
        let bus = EventBus::new(1);
        bus.publish(SimEvent::BountyChanged { bounty: 1 });
        bus.publish(SimEvent::BountyChanged { bounty: 2 });
        assert_eq!(bus.drain(), vec![SimEvent::BountyChanged { bounty: 1 }]);
    }
}
