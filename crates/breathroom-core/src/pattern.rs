//! Breath pattern: the four phase durations of one practice session.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const MAX_PHASE_SECS: u32 = 20;
pub const MIN_BREATH_SECS: u32 = 1;
pub const MIN_HOLD_SECS: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PhaseKind {
    Inhale,
    Hold1,
    Exhale,
    Hold2,
}

impl PhaseKind {
    /// Phases in the order they are sequenced within a cycle.
    pub const ORDER: [PhaseKind; 4] = [
        PhaseKind::Inhale,
        PhaseKind::Hold1,
        PhaseKind::Exhale,
        PhaseKind::Hold2,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PhaseKind::Inhale => "INHALE",
            PhaseKind::Hold1 => "HOLD1",
            PhaseKind::Exhale => "EXHALE",
            PhaseKind::Hold2 => "HOLD2",
        }
    }

    /// Text announced by the notifier when the phase begins.
    pub fn guidance(self) -> &'static str {
        match self {
            PhaseKind::Inhale => "Breathe in deeply",
            PhaseKind::Hold1 => "Hold your breath",
            PhaseKind::Exhale => "Breathe out slowly",
            PhaseKind::Hold2 => "Rest with lungs empty",
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of the phase list. A zero duration means the phase is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub kind: PhaseKind,
    pub duration_secs: u32,
}

impl Phase {
    pub fn is_skipped(&self) -> bool {
        self.duration_secs == 0
    }

    pub fn guidance(&self) -> &'static str {
        self.kind.guidance()
    }
}

/// Durations, in whole seconds, of the four phases of a breath cycle.
///
/// Fields are public so callers can deserialize or build values directly;
/// [`BreathPattern::new`] is the validating constructor. Consumers that run a
/// pattern must still tolerate zero holds and reject [`is_degenerate`] input.
///
/// [`is_degenerate`]: BreathPattern::is_degenerate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BreathPattern {
    pub inhale: u32,
    pub hold1: u32,
    pub exhale: u32,
    pub hold2: u32,
}

impl BreathPattern {
    /// Build a pattern, rejecting durations outside their ranges.
    ///
    /// # Errors
    /// Returns [`ValidationError::OutOfRange`] for the first field that is out
    /// of bounds.
    pub fn new(inhale: u32, hold1: u32, exhale: u32, hold2: u32) -> Result<Self, ValidationError> {
        check("inhale", inhale, MIN_BREATH_SECS)?;
        check("hold1", hold1, MIN_HOLD_SECS)?;
        check("exhale", exhale, MIN_BREATH_SECS)?;
        check("hold2", hold2, MIN_HOLD_SECS)?;
        Ok(Self {
            inhale,
            hold1,
            exhale,
            hold2,
        })
    }

    /// Build a pattern by clamping every field into its range.
    pub fn clamped(inhale: u32, hold1: u32, exhale: u32, hold2: u32) -> Self {
        Self {
            inhale: inhale.clamp(MIN_BREATH_SECS, MAX_PHASE_SECS),
            hold1: hold1.clamp(MIN_HOLD_SECS, MAX_PHASE_SECS),
            exhale: exhale.clamp(MIN_BREATH_SECS, MAX_PHASE_SECS),
            hold2: hold2.clamp(MIN_HOLD_SECS, MAX_PHASE_SECS),
        }
    }

    pub fn phases(&self) -> [Phase; 4] {
        let durations = [self.inhale, self.hold1, self.exhale, self.hold2];
        std::array::from_fn(|i| Phase {
            kind: PhaseKind::ORDER[i],
            duration_secs: durations[i],
        })
    }

    /// Nominal length of one full cycle in seconds.
    pub fn cycle_secs(&self) -> u64 {
        [self.inhale, self.hold1, self.exhale, self.hold2]
            .iter()
            .map(|&d| u64::from(d))
            .sum()
    }

    /// True when no phase takes any time.
    pub fn is_degenerate(&self) -> bool {
        self.cycle_secs() == 0
    }
}

impl Default for BreathPattern {
    /// Box breathing.
    fn default() -> Self {
        Self {
            inhale: 4,
            hold1: 4,
            exhale: 4,
            hold2: 4,
        }
    }
}

impl fmt::Display for BreathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.inhale, self.hold1, self.exhale, self.hold2
        )
    }
}

impl FromStr for BreathPattern {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |message: String| ValidationError::InvalidPattern {
            input: s.to_string(),
            message,
        };

        let parts: Vec<&str> = s.trim().split('-').collect();
        if parts.len() != 4 {
            return Err(invalid(format!(
                "expected 4 dash-separated durations, found {}",
                parts.len()
            )));
        }

        let mut values = [0u32; 4];
        for (slot, part) in values.iter_mut().zip(&parts) {
            *slot = part
                .trim()
                .parse()
                .map_err(|_| invalid(format!("'{part}' is not a whole number of seconds")))?;
        }

        Self::new(values[0], values[1], values[2], values[3])
    }
}

fn check(field: &'static str, value: u32, min: u32) -> Result<(), ValidationError> {
    if (min..=MAX_PHASE_SECS).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max: MAX_PHASE_SECS,
        })
    }
}
