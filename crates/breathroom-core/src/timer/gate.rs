use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Run control shared between the timer loop and whoever may stop it.
///
/// The timer polls [`is_running`](SessionGate::is_running) before every tick
/// and before every sleep, and reports each finished pass through the four
/// phases via [`complete_cycle`](SessionGate::complete_cycle).
pub trait SessionGate {
    fn is_running(&self) -> bool;

    /// Cycles fully completed so far.
    fn cycles(&self) -> u32;

    /// Count one finished cycle. Returns the new count, or `None` when the
    /// gate has already been stopped and the cycle must not be recorded.
    fn complete_cycle(&self) -> Option<u32>;

    /// Zero the cycle counter at the start of a run.
    fn reset_cycles(&self);

    /// Instant the session started, when it predates the run. Tick elapsed
    /// time is measured from here; `None` means from the start of the run.
    fn started(&self) -> Option<Instant> {
        None
    }
}

/// Stand-alone gate: a stop flag plus its own cycle counter.
///
/// Cloning shares the same flag, so a clone handed to another thread can stop
/// a timer running elsewhere.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<SignalInner>,
}

#[derive(Debug, Default)]
struct SignalInner {
    stopped: AtomicBool,
    cycles: AtomicU32,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop. Takes effect at the timer's next poll.
    pub fn stop(&self) {
        self.inner.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.inner.stopped.load(Ordering::SeqCst)
    }
}

impl SessionGate for StopSignal {
    fn is_running(&self) -> bool {
        !self.is_stopped()
    }

    fn cycles(&self) -> u32 {
        self.inner.cycles.load(Ordering::SeqCst)
    }

    fn complete_cycle(&self) -> Option<u32> {
        if self.is_stopped() {
            return None;
        }
        Some(self.inner.cycles.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn reset_cycles(&self) {
        self.inner.cycles.store(0, Ordering::SeqCst);
    }
}
