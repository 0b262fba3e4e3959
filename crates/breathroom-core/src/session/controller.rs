//! Session controller: the Idle/Running state machine.
//!
//! ```text
//! Idle --start_practice--> Running --stop_and_save--> Idle
//! ```
//!
//! The controller owns the [`SessionState`] behind a mutex. The cycle timer
//! sees it only through a [`SessionHandle`], which checks a generation number
//! so a timer left over from an earlier session can never observe or mutate a
//! newer one. `stop_and_save` flips `running` under the same lock the timer
//! uses to count cycles, so the record it builds is final.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::clock::{whole_secs_since, Clock, SystemClock};
use crate::error::{SessionError, StoreError, TimerError};
use crate::events::Event;
use crate::notify::Notifier;
use crate::pattern::BreathPattern;
use crate::storage::{SessionRecord, SessionStore};
use crate::timer::{CycleTimer, SessionGate, TimerStats, TICK_INTERVAL};

/// Timestamp format of [`SessionRecord::date`].
pub const RECORD_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// State of the current (or most recent) practice session.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub pattern: BreathPattern,
    pub started_at: DateTime<Local>,
    pub started: Instant,
    pub cycles_completed: u32,
    pub running: bool,
    pub speech_enabled: bool,
    generation: u64,
}

/// Point-in-time view for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub pattern: String,
    pub running: bool,
    pub cycles_completed: u32,
    pub elapsed_secs: u64,
    pub started_at: String,
}

/// Result of [`SessionController::stop_and_save`].
#[derive(Debug)]
pub enum SaveOutcome {
    /// No session was running; nothing was written.
    NotRunning,
    Saved(SessionRecord),
    /// The session ended but its record could not be persisted.
    Failed {
        record: SessionRecord,
        error: StoreError,
    },
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved(_))
    }

    pub fn record(&self) -> Option<&SessionRecord> {
        match self {
            SaveOutcome::NotRunning => None,
            SaveOutcome::Saved(record) | SaveOutcome::Failed { record, .. } => Some(record),
        }
    }

    /// Event for the presentation layer's transient success/failure display.
    pub fn to_event(&self) -> Option<Event> {
        match self {
            SaveOutcome::NotRunning => None,
            SaveOutcome::Saved(record) => Some(Event::SessionSaved {
                record: record.clone(),
            }),
            SaveOutcome::Failed { record, error } => Some(Event::SessionSaveFailed {
                record: record.clone(),
                message: error.to_string(),
            }),
        }
    }
}

type SharedState = Arc<Mutex<Option<SessionState>>>;

fn lock(shared: &SharedState) -> MutexGuard<'_, Option<SessionState>> {
    shared.lock().unwrap_or_else(|e| e.into_inner())
}

/// Orchestrates start/stop/save and owns the session state.
pub struct SessionController<S: SessionStore> {
    store: S,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    tick_interval: Duration,
    state: SharedState,
    next_generation: AtomicU64,
}

impl<S: SessionStore> SessionController<S> {
    pub fn new(store: S, clock: Arc<dyn Clock>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            clock,
            notifier,
            tick_interval: TICK_INTERVAL,
            state: Arc::new(Mutex::new(None)),
            next_generation: AtomicU64::new(1),
        }
    }

    /// Controller on the real clock.
    pub fn with_system_clock(store: S, notifier: Arc<dyn Notifier>) -> Self {
        Self::new(store, Arc::new(SystemClock), notifier)
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_running(&self) -> bool {
        lock(&self.state).as_ref().is_some_and(|s| s.running)
    }

    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        lock(&self.state).as_ref().map(|s| SessionSnapshot {
            pattern: s.pattern.to_string(),
            running: s.running,
            cycles_completed: s.cycles_completed,
            elapsed_secs: whole_secs_since(self.clock.as_ref(), s.started),
            started_at: s.started_at.format(RECORD_DATE_FORMAT).to_string(),
        })
    }

    /// Idle -> Running. The returned [`PracticeRun`] drives the timer and may
    /// be moved to another thread.
    ///
    /// # Errors
    /// [`SessionError::DegeneratePattern`] when every duration is zero,
    /// [`SessionError::AlreadyRunning`] when a session is in progress.
    pub fn start_practice(
        &self,
        pattern: BreathPattern,
        speech_enabled: bool,
    ) -> Result<PracticeRun, SessionError> {
        if pattern.is_degenerate() {
            return Err(SessionError::DegeneratePattern(pattern.to_string()));
        }

        let mut guard = lock(&self.state);
        if guard.as_ref().is_some_and(|s| s.running) {
            return Err(SessionError::AlreadyRunning);
        }

        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let started_at = Local::now();
        let started = self.clock.now();
        *guard = Some(SessionState {
            pattern,
            started_at,
            started,
            cycles_completed: 0,
            running: true,
            speech_enabled,
            generation,
        });
        drop(guard);

        tracing::info!(%pattern, speech_enabled, "practice started");

        Ok(PracticeRun {
            timer: CycleTimer::new(self.clock.clone(), self.notifier.clone())
                .with_tick_interval(self.tick_interval),
            handle: SessionHandle {
                state: self.state.clone(),
                generation,
                started,
                last_cycles: AtomicU32::new(0),
            },
            pattern,
            speech_enabled,
            started_at,
        })
    }

    /// Running -> Idle: halt the timer, then persist one record.
    ///
    /// A no-op returning [`SaveOutcome::NotRunning`] when already idle, so a
    /// duplicate stop never writes a second record. A failed write still
    /// leaves the controller idle.
    pub fn stop_and_save(&self) -> SaveOutcome {
        let record = {
            let mut guard = lock(&self.state);
            let Some(state) = guard.as_mut().filter(|s| s.running) else {
                tracing::debug!("stop requested while idle");
                return SaveOutcome::NotRunning;
            };
            state.running = false;
            SessionRecord {
                date: Local::now().format(RECORD_DATE_FORMAT).to_string(),
                pattern: state.pattern.to_string(),
                cycles: state.cycles_completed,
                total_seconds: whole_secs_since(self.clock.as_ref(), state.started),
            }
        };

        match self.store.append(&record) {
            Ok(()) => {
                tracing::info!(
                    pattern = %record.pattern,
                    cycles = record.cycles,
                    total_seconds = record.total_seconds,
                    "session saved"
                );
                SaveOutcome::Saved(record)
            }
            Err(error) => {
                tracing::warn!(error = %error, "session record could not be saved");
                SaveOutcome::Failed { record, error }
            }
        }
    }
}

impl<S: SessionStore + std::fmt::Debug> std::fmt::Debug for SessionController<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("store", &self.store)
            .field("tick_interval", &self.tick_interval)
            .field("state", &*lock(&self.state))
            .finish_non_exhaustive()
    }
}

/// The timer's view of one session.
#[derive(Debug)]
pub struct SessionHandle {
    state: SharedState,
    generation: u64,
    started: Instant,
    last_cycles: AtomicU32,
}

impl SessionHandle {
    fn with_current<T>(&self, f: impl FnOnce(&mut SessionState) -> T) -> Option<T> {
        let mut guard = lock(&self.state);
        guard
            .as_mut()
            .filter(|s| s.generation == self.generation)
            .map(f)
    }
}

impl SessionGate for SessionHandle {
    fn is_running(&self) -> bool {
        self.with_current(|s| s.running).unwrap_or(false)
    }

    fn cycles(&self) -> u32 {
        match self.with_current(|s| s.cycles_completed) {
            Some(cycles) => {
                self.last_cycles.store(cycles, Ordering::SeqCst);
                cycles
            }
            None => self.last_cycles.load(Ordering::SeqCst),
        }
    }

    fn complete_cycle(&self) -> Option<u32> {
        let cycles = self
            .with_current(|s| {
                s.running.then(|| {
                    s.cycles_completed += 1;
                    s.cycles_completed
                })
            })
            .flatten()?;
        self.last_cycles.store(cycles, Ordering::SeqCst);
        Some(cycles)
    }

    fn reset_cycles(&self) {
        self.with_current(|s| {
            if s.running {
                s.cycles_completed = 0;
            }
        });
        self.last_cycles.store(0, Ordering::SeqCst);
    }

    fn started(&self) -> Option<Instant> {
        Some(self.started)
    }
}

/// A started session whose timer has not been driven yet.
#[derive(Debug)]
pub struct PracticeRun {
    timer: CycleTimer,
    handle: SessionHandle,
    pattern: BreathPattern,
    speech_enabled: bool,
    started_at: DateTime<Local>,
}

impl PracticeRun {
    pub fn pattern(&self) -> BreathPattern {
        self.pattern
    }

    /// Drive the cycle timer until the session is stopped. Blocks.
    ///
    /// # Errors
    /// Propagates [`TimerError`] from the timer; the controller already
    /// refuses patterns that would trigger it.
    pub fn run<F>(self, mut on_event: F) -> Result<TimerStats, TimerError>
    where
        F: FnMut(&Event),
    {
        on_event(&Event::SessionStarted {
            pattern: self.pattern.to_string(),
            speech_enabled: self.speech_enabled,
            started_at: self.started_at.format(RECORD_DATE_FORMAT).to_string(),
        });
        self.timer
            .run(&self.pattern, self.speech_enabled, &self.handle, on_event)
    }
}
