//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - The breath pattern used when `practice` is started without overrides
//! - Speech announcements (on/off and the text-to-speech command)
//! - Session log location and how many recent rows to list
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::csv_log::DEFAULT_FILE_NAME;
use super::data_dir;
use crate::error::ConfigError;
use crate::pattern::BreathPattern;

/// Phase durations in seconds. Out-of-range values are clamped when the
/// pattern is built, never rejected at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternConfig {
    #[serde(default = "default_phase")]
    pub inhale: u32,
    #[serde(default = "default_phase")]
    pub hold1: u32,
    #[serde(default = "default_phase")]
    pub exhale: u32,
    #[serde(default = "default_phase")]
    pub hold2: u32,
}

/// Speech configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Text-to-speech command line, e.g. `espeak -s 140`. The phase guidance
    /// is appended as the last argument. Empty disables speech output.
    #[serde(default)]
    pub command: String,
}

/// Session log configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Custom log file. Empty means `<data_dir>/breathing_log.csv`.
    #[serde(default)]
    pub path: String,
    #[serde(default = "default_recent_count")]
    pub recent_count: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub pattern: PatternConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_phase() -> u32 {
    4
}
fn default_true() -> bool {
    true
}
fn default_recent_count() -> u32 {
    5
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            inhale: default_phase(),
            hold1: default_phase(),
            exhale: default_phase(),
            hold2: default_phase(),
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: String::new(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: String::new(),
            recent_count: default_recent_count(),
        }
    }
}

impl PatternConfig {
    /// Build the session pattern, clamping each duration into its range.
    pub fn to_pattern(&self) -> BreathPattern {
        let pattern = BreathPattern::clamped(self.inhale, self.hold1, self.exhale, self.hold2);
        if (pattern.inhale, pattern.hold1, pattern.exhale, pattern.hold2)
            != (self.inhale, self.hold1, self.exhale, self.hold2)
        {
            tracing::warn!(configured = ?self, used = %pattern, "pattern durations clamped");
        }
        pattern
    }
}

impl From<BreathPattern> for PatternConfig {
    fn from(p: BreathPattern) -> Self {
        Self {
            inhale: p.inhale,
            hold1: p.hold1,
            exhale: p.exhale,
            hold2: p.hold2,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                    ),
                    serde_json::Value::Number(_) => serde_json::Value::Number(
                        value
                            .parse::<u64>()
                            .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?
                            .into(),
                    ),
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        return Err(invalid("cannot set a whole section".into()));
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location, `<data_dir>/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there when the file is absent.
    ///
    /// # Errors
    /// See [`Config::load`].
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    /// See [`Config::save`].
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key in memory. Returns error if key is unknown or
    /// the value does not match the key's type.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    pub fn breath_pattern(&self) -> BreathPattern {
        self.pattern.to_pattern()
    }

    /// Session log path, honoring `log.path` when set.
    ///
    /// # Errors
    /// Returns an error if the default data directory cannot be created.
    pub fn log_path(&self) -> Result<PathBuf, ConfigError> {
        if self.log.path.trim().is_empty() {
            Ok(data_dir()?.join(DEFAULT_FILE_NAME))
        } else {
            Ok(PathBuf::from(self.log.path.trim()))
        }
    }

    /// Speech command, if one is configured.
    pub fn speech_command(&self) -> Option<&str> {
        let command = self.speech.command.trim();
        (!command.is_empty()).then_some(command)
    }
}
