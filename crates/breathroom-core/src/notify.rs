//! Phase-entry announcements.
//!
//! Notifiers are fire-and-forget: the timer never waits on them and any
//! failure is swallowed, so a missing speech engine cannot change timing.

use std::process::{Command, Stdio};

pub trait Notifier: Send + Sync {
    /// Announce `text`. Implementations must return promptly.
    fn announce(&self, text: &str, enabled: bool);
}

/// Notifier that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn announce(&self, _text: &str, _enabled: bool) {}
}

/// Speaks by spawning an external text-to-speech program (`espeak`, `say`, ...)
/// with the text as its last argument. The child is not awaited.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    program: String,
    args: Vec<String>,
}

impl CommandNotifier {
    /// Parse a command line such as `"espeak -s 140"`. Returns `None` when the
    /// command is blank.
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut words = command.split_whitespace().map(str::to_string);
        let program = words.next()?;
        Some(Self {
            program,
            args: words.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Notifier for CommandNotifier {
    fn announce(&self, text: &str, enabled: bool) {
        if !enabled || text.is_empty() {
            return;
        }
        let spawned = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match spawned {
            // Reap off-thread so the child does not linger as a zombie.
            Ok(mut child) => {
                std::thread::spawn(move || {
                    let _ = child.wait();
                });
            }
            Err(e) => {
                tracing::debug!(program = %self.program, error = %e, "speech command failed to start");
            }
        }
    }
}
