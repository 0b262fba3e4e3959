//! # Breathroom Core Library
//!
//! This library provides the core logic for the Breathroom guided-breathing
//! timer. Every behavioral contract lives here; the CLI binary is a thin
//! presentation layer that renders [`Event`]s and forwards stop requests.
//!
//! ## Architecture
//!
//! - **Breath Pattern**: the four phase durations of one session
//! - **Cycle Timer**: a cooperative tick-emit-sleep loop sequencing
//!   `INHALE -> HOLD1 -> EXHALE -> HOLD2` until stopped
//! - **Session Controller**: Idle/Running state machine owning the session
//!   state and writing one record per ended session
//! - **Storage**: append-only CSV session log and TOML configuration
//!
//! ## Key Components
//!
//! - [`BreathPattern`]: validated phase durations
//! - [`CycleTimer`]: phase sequencing, countdown and cycle counting
//! - [`SessionController`]: start/stop/save orchestration
//! - [`CsvSessionLog`]: durable session records
//! - [`Config`]: application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod notify;
pub mod pattern;
pub mod session;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, SessionError, StoreError, TimerError, ValidationError};
pub use events::Event;
pub use notify::{CommandNotifier, Notifier, SilentNotifier};
pub use pattern::{BreathPattern, Phase, PhaseKind};
pub use session::{PracticeRun, SaveOutcome, SessionController, SessionSnapshot};
pub use storage::{Config, CsvSessionLog, LogSummary, MemoryStore, SessionRecord, SessionStore};
pub use timer::{CycleTimer, PhaseTick, SessionGate, StopSignal, TimerStats};
