use serde::{Deserialize, Serialize};

use crate::pattern::PhaseKind;
use crate::storage::SessionRecord;
use crate::timer::PhaseTick;

/// Every state change in a practice session produces an Event.
/// The presentation layer renders them; nothing in the core depends on who
/// consumes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SessionStarted {
        pattern: String,
        speech_enabled: bool,
        started_at: String,
    },
    /// Emitted once per non-skipped phase, before its first tick.
    PhaseStarted {
        phase: PhaseKind,
        duration_secs: u32,
        guidance: String,
        cycle_count: u32,
    },
    Tick(PhaseTick),
    CycleCompleted {
        cycle_count: u32,
        elapsed_secs: u64,
    },
    /// The timer loop observed the stop request and returned.
    TimerStopped {
        cycle_count: u32,
        elapsed_secs: u64,
    },
    SessionSaved {
        record: SessionRecord,
    },
    /// The record could not be persisted. The session is idle regardless.
    SessionSaveFailed {
        record: SessionRecord,
        message: String,
    },
}

impl Event {
    pub fn as_tick(&self) -> Option<&PhaseTick> {
        match self {
            Event::Tick(tick) => Some(tick),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_serializes_with_type_tag() {
        let event = Event::Tick(PhaseTick {
            phase: PhaseKind::Exhale,
            remaining_secs: 3,
            elapsed_secs: 9,
            cycle_count: 0,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "tick");
        assert_eq!(json["phase"], "EXHALE");
        assert_eq!(json["remaining_secs"], 3);
    }

    #[test]
    fn as_tick_filters_other_events() {
        let event = Event::CycleCompleted {
            cycle_count: 1,
            elapsed_secs: 16,
        };
        assert!(event.as_tick().is_none());
    }
}
