mod config;
pub mod csv_log;
pub mod memory;

pub use config::{Config, LogConfig, PatternConfig, SpeechConfig};
pub use csv_log::CsvSessionLog;
pub use memory::MemoryStore;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, StoreError};

/// One ended practice session, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Local time the session was stopped and saved, `%Y-%m-%d %H:%M`.
    pub date: String,
    /// Canonical `i-h1-e-h2` pattern string.
    pub pattern: String,
    pub cycles: u32,
    pub total_seconds: u64,
}

/// Totals over a whole session log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LogSummary {
    pub total_sessions: u64,
    pub total_cycles: u64,
    pub total_seconds: u64,
    pub last_session: Option<String>,
}

/// Append-only store of session records.
pub trait SessionStore: Send + Sync {
    /// Add one record at the end of the log, creating the log if needed.
    fn append(&self, record: &SessionRecord) -> Result<(), StoreError>;

    /// Every record in insertion order. An absent log is an empty one.
    fn load_all(&self) -> Result<Vec<SessionRecord>, StoreError>;

    /// The last `n` records, newest first.
    fn recent(&self, n: usize) -> Result<Vec<SessionRecord>, StoreError> {
        let mut all = self.load_all()?;
        let keep_from = all.len().saturating_sub(n);
        let mut recent = all.split_off(keep_from);
        recent.reverse();
        Ok(recent)
    }

    fn summary(&self) -> Result<LogSummary, StoreError> {
        let all = self.load_all()?;
        Ok(LogSummary {
            total_sessions: all.len() as u64,
            total_cycles: all.iter().map(|r| u64::from(r.cycles)).sum(),
            total_seconds: all.iter().map(|r| r.total_seconds).sum(),
            last_session: all.last().map(|r| r.date.clone()),
        })
    }
}

/// Returns the directory holding config and the session log.
///
/// `BREATHROOM_DATA_DIR` wins when set. Otherwise `~/.config/breathroom`, or
/// `~/.config/breathroom-dev` with `BREATHROOM_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("BREATHROOM_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("BREATHROOM_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("breathroom-dev")
            } else {
                base_dir.join("breathroom")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
