//! Cycle timer implementation.
//!
//! The timer is a cooperative blocking loop: for every second of a non-skipped
//! phase it computes elapsed time from the clock, emits one tick, then sleeps
//! for one tick interval. Stop requests are polled through a [`SessionGate`]
//! immediately before each tick and immediately before each sleep, so a stop
//! takes effect in under one interval.
//!
//! ## Sequencing
//!
//! ```text
//! INHALE -> HOLD1 -> EXHALE -> HOLD2 -> (cycle += 1) -> INHALE -> ...
//! ```
//!
//! Zero-duration phases are skipped without a tick, a notification or any
//! time passing. The cycle counter still advances after HOLD2 even when HOLD2
//! itself was skipped.
//!
//! ## Usage
//!
//! ```ignore
//! let timer = CycleTimer::new(Arc::new(SystemClock), Arc::new(SilentNotifier));
//! let stop = StopSignal::new();
//! let stats = timer.run(&pattern, false, &stop, |event| render(event))?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::gate::SessionGate;
use crate::clock::{whole_secs_since, Clock};
use crate::error::TimerError;
use crate::events::Event;
use crate::notify::Notifier;
use crate::pattern::{BreathPattern, Phase, PhaseKind};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// One per-second update of a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTick {
    pub phase: PhaseKind,
    /// Counts down from the phase duration to 1. Never 0.
    pub remaining_secs: u32,
    /// Whole clock seconds since the session started.
    pub elapsed_secs: u64,
    /// Cycles fully completed before this tick.
    pub cycle_count: u32,
}

/// Final figures of a run, taken when the loop returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerStats {
    pub cycles_completed: u32,
    pub elapsed_secs: u64,
}

/// Drives phase sequencing, countdown and cycle counting.
#[derive(Clone)]
pub struct CycleTimer {
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    tick_interval: Duration,
}

impl CycleTimer {
    pub fn new(clock: Arc<dyn Clock>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            clock,
            notifier,
            tick_interval: TICK_INTERVAL,
        }
    }

    /// Override the suspension between ticks.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Run `pattern` until `gate` stops, feeding every event to `on_event`.
    ///
    /// Blocks the calling thread. Resets the gate's cycle counter first.
    ///
    /// # Errors
    /// Returns [`TimerError::DegeneratePattern`] without emitting anything
    /// when every phase duration is zero.
    pub fn run<G, F>(
        &self,
        pattern: &BreathPattern,
        speech_enabled: bool,
        gate: &G,
        mut on_event: F,
    ) -> Result<TimerStats, TimerError>
    where
        G: SessionGate + ?Sized,
        F: FnMut(&Event),
    {
        if pattern.is_degenerate() {
            return Err(TimerError::DegeneratePattern(pattern.to_string()));
        }

        gate.reset_cycles();
        let started = gate.started().unwrap_or_else(|| self.clock.now());
        let phases = pattern.phases();

        'session: loop {
            for phase in &phases {
                if phase.is_skipped() {
                    continue;
                }
                if !self.run_phase(phase, speech_enabled, gate, started, &mut on_event) {
                    break 'session;
                }
            }

            match gate.complete_cycle() {
                Some(cycle_count) => {
                    let elapsed_secs = whole_secs_since(self.clock.as_ref(), started);
                    tracing::debug!(cycle_count, elapsed_secs, "cycle completed");
                    on_event(&Event::CycleCompleted {
                        cycle_count,
                        elapsed_secs,
                    });
                }
                None => break 'session,
            }
        }

        let stats = TimerStats {
            cycles_completed: gate.cycles(),
            elapsed_secs: whole_secs_since(self.clock.as_ref(), started),
        };
        on_event(&Event::TimerStopped {
            cycle_count: stats.cycles_completed,
            elapsed_secs: stats.elapsed_secs,
        });
        Ok(stats)
    }

    /// Returns `false` when the gate stopped during the phase.
    fn run_phase<G, F>(
        &self,
        phase: &Phase,
        speech_enabled: bool,
        gate: &G,
        started: std::time::Instant,
        on_event: &mut F,
    ) -> bool
    where
        G: SessionGate + ?Sized,
        F: FnMut(&Event),
    {
        if !gate.is_running() {
            return false;
        }

        tracing::debug!(phase = %phase.kind, duration_secs = phase.duration_secs, "phase started");
        let guidance = phase.guidance();
        if speech_enabled && !guidance.is_empty() {
            self.notifier.announce(guidance, speech_enabled);
        }
        on_event(&Event::PhaseStarted {
            phase: phase.kind,
            duration_secs: phase.duration_secs,
            guidance: guidance.to_string(),
            cycle_count: gate.cycles(),
        });

        for remaining_secs in (1..=phase.duration_secs).rev() {
            if !gate.is_running() {
                return false;
            }
            on_event(&Event::Tick(PhaseTick {
                phase: phase.kind,
                remaining_secs,
                elapsed_secs: whole_secs_since(self.clock.as_ref(), started),
                cycle_count: gate.cycles(),
            }));
            if !gate.is_running() {
                return false;
            }
            self.clock.sleep(self.tick_interval);
        }
        true
    }
}

impl std::fmt::Debug for CycleTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CycleTimer")
            .field("tick_interval", &self.tick_interval)
            .finish_non_exhaustive()
    }
}
