mod engine;
mod gate;

pub use engine::{CycleTimer, PhaseTick, TimerStats, TICK_INTERVAL};
pub use gate::{SessionGate, StopSignal};
