use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread;

use breathroom_core::error::Result as CoreResult;
use breathroom_core::storage::PatternConfig;
use breathroom_core::{
    BreathPattern, CommandNotifier, Config, CsvSessionLog, Event, Notifier, SaveOutcome,
    SessionController, SilentNotifier,
};
use clap::Args;

#[derive(Args)]
pub struct PracticeArgs {
    /// Pattern as inhale-hold1-exhale-hold2 seconds (e.g. "4-7-8-0")
    #[arg(long, short)]
    pattern: Option<String>,
    /// Inhale seconds (1-20, clamped)
    #[arg(long)]
    inhale: Option<u32>,
    /// First hold seconds (0-20, clamped; 0 skips the phase)
    #[arg(long)]
    hold1: Option<u32>,
    /// Exhale seconds (1-20, clamped)
    #[arg(long)]
    exhale: Option<u32>,
    /// Second hold seconds (0-20, clamped; 0 skips the phase)
    #[arg(long)]
    hold2: Option<u32>,
    /// Disable spoken phase guidance
    #[arg(long)]
    no_speech: bool,
    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
}

impl PracticeArgs {
    /// Configured pattern, replaced by `--pattern`, then per-phase overrides.
    fn resolve_pattern(&self, config: &Config) -> Result<BreathPattern, Box<dyn std::error::Error>> {
        let mut phases = match &self.pattern {
            Some(text) => PatternConfig::from(text.parse::<BreathPattern>()?),
            None => config.pattern.clone(),
        };
        if let Some(v) = self.inhale {
            phases.inhale = v;
        }
        if let Some(v) = self.hold1 {
            phases.hold1 = v;
        }
        if let Some(v) = self.exhale {
            phases.exhale = v;
        }
        if let Some(v) = self.hold2 {
            phases.hold2 = v;
        }
        Ok(phases.to_pattern())
    }
}

fn build_notifier(config: &Config, speech_enabled: bool) -> Arc<dyn Notifier> {
    if speech_enabled {
        if let Some(notifier) = config.speech_command().and_then(CommandNotifier::from_command_line) {
            return Arc::new(notifier);
        }
    }
    Arc::new(SilentNotifier)
}

fn build_controller(
    config: &Config,
    notifier: Arc<dyn Notifier>,
) -> CoreResult<SessionController<CsvSessionLog>> {
    let log = CsvSessionLog::new(config.log_path()?);
    Ok(SessionController::with_system_clock(log, notifier))
}

/// Renders events as a single updating status line, or as JSON lines.
struct Renderer {
    json: bool,
}

impl Renderer {
    fn render(&self, event: &Event) {
        if self.json {
            if let Ok(line) = serde_json::to_string(event) {
                println!("{line}");
            }
            return;
        }

        let mut out = io::stdout().lock();
        let _ = match event {
            Event::SessionStarted { pattern, .. } => writeln!(out, "Pattern {pattern}"),
            Event::PhaseStarted { phase, guidance, .. } => {
                writeln!(out).and_then(|()| writeln!(out, "{phase}  {guidance}"))
            }
            Event::Tick(tick) => {
                let (mins, secs) = (tick.elapsed_secs / 60, tick.elapsed_secs % 60);
                write!(
                    out,
                    "\r  {:>2}   {mins:02}:{secs:02} | cycles {}   ",
                    tick.remaining_secs, tick.cycle_count
                )
            }
            Event::TimerStopped { .. } => writeln!(out),
            _ => Ok(()),
        };
        let _ = out.flush();
    }

    fn render_outcome(&self, outcome: &SaveOutcome) {
        if self.json {
            if let Some(event) = outcome.to_event() {
                self.render(&event);
            }
            return;
        }
        if let SaveOutcome::Saved(record) = outcome {
            println!(
                "Session saved: {} | {} cycles | {}s",
                record.pattern, record.cycles, record.total_seconds
            );
        }
    }
}

/// Block until the user presses Enter or stdin closes.
fn wait_for_stop() {
    let mut line = String::new();
    if let Err(e) = io::stdin().lock().read_line(&mut line) {
        tracing::debug!(error = %e, "stdin read failed; stopping");
    }
}

pub fn run(args: PracticeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let pattern = args.resolve_pattern(&config)?;
    let speech_enabled = config.speech.enabled && !args.no_speech;

    let controller = build_controller(&config, build_notifier(&config, speech_enabled))?;
    let run = controller.start_practice(pattern, speech_enabled)?;

    let renderer = Renderer { json: args.json };
    let worker = thread::spawn(move || {
        let stats = run.run(|event| renderer.render(event));
        (renderer, stats)
    });

    if !args.json {
        eprintln!("Press Enter to stop and save.");
    }
    wait_for_stop();

    let outcome = controller.stop_and_save();
    let (renderer, stats) = worker
        .join()
        .map_err(|_| "timer thread panicked")?;
    let stats = stats?;
    tracing::debug!(cycles = stats.cycles_completed, elapsed_secs = stats.elapsed_secs, "timer returned");

    renderer.render_outcome(&outcome);
    match outcome {
        SaveOutcome::Failed { error, .. } => {
            Err(format!("session record could not be saved: {error}").into())
        }
        SaveOutcome::Saved(_) | SaveOutcome::NotRunning => Ok(()),
    }
}
