use breathroom_core::{BreathPattern, Config};
use clap::Subcommand;
use serde::Serialize;

#[derive(Subcommand)]
pub enum PatternAction {
    /// Show the configured pattern and its phases
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a pattern string and print its canonical form
    Check {
        /// Pattern as inhale-hold1-exhale-hold2 seconds
        pattern: String,
    },
}

#[derive(Serialize)]
struct PhaseView {
    phase: String,
    seconds: u32,
    skipped: bool,
    guidance: &'static str,
}

#[derive(Serialize)]
struct PatternView {
    pattern: String,
    cycle_secs: u64,
    phases: Vec<PhaseView>,
}

impl From<BreathPattern> for PatternView {
    fn from(p: BreathPattern) -> Self {
        Self {
            pattern: p.to_string(),
            cycle_secs: p.cycle_secs(),
            phases: p
                .phases()
                .iter()
                .map(|phase| PhaseView {
                    phase: phase.kind.to_string(),
                    seconds: phase.duration_secs,
                    skipped: phase.is_skipped(),
                    guidance: phase.guidance(),
                })
                .collect(),
        }
    }
}

pub fn run(action: PatternAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PatternAction::Show { json } => {
            let view = PatternView::from(Config::load()?.breath_pattern());
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                println!("{} ({}s per cycle)", view.pattern, view.cycle_secs);
                for phase in &view.phases {
                    if phase.skipped {
                        println!("  {:<7} skipped", phase.phase);
                    } else {
                        println!("  {:<7} {:>2}s  {}", phase.phase, phase.seconds, phase.guidance);
                    }
                }
            }
        }
        PatternAction::Check { pattern } => {
            let parsed: BreathPattern = pattern.parse()?;
            println!("{parsed}");
        }
    }
    Ok(())
}
