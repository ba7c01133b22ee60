//! Journal configuration and its registry.
//!
//! [`JournalConfig`] is the per-object setting a user supplies: whether the
//! journal is enabled, its total capacity across all partitions and an
//! optional time-to-live. [`StorageConfig`] is the derived per-partition
//! setting handed to the storage engine.
//!
//! [`JournalSettings`] is the in-memory [`JournalConfigRegistry`]. Names may
//! be exact or contain a single `*` wildcard:
//!
//! ```
//! use map_event_journal::config::{JournalConfig, JournalConfigRegistry, JournalSettings};
//!
//! let settings = JournalSettings::from_json(
//!     r#"{ "journals": { "orders-*": { "enabled": true, "capacity": 5000 } } }"#,
//! )
//! .expect("valid settings");
//!
//! let config = settings.find_journal_config("orders-eu").expect("matched");
//! assert!(config.enabled);
//! assert_eq!(config.capacity, 5000);
//! assert!(settings.find_journal_config("trades").is_none());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Default total journal capacity across all partitions.
pub const DEFAULT_CAPACITY: u32 = 10_000;

/// Default time-to-live in seconds. Zero means entries never expire.
pub const DEFAULT_TTL_SECONDS: u32 = 0;

/// Errors raised while building or loading journal settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A journal config failed validation.
    #[error("invalid event journal config for {name}: {reason}")]
    Invalid {
        /// Name or pattern the config was registered under.
        name: String,
        /// Why the config was rejected.
        reason: &'static str,
    },
    /// A name pattern contains more than one wildcard.
    #[error("journal name pattern {pattern} contains more than one '*'")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
    },
    /// The settings document could not be parsed.
    #[error("failed to parse journal settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Per-object event journal configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Whether the journal records events at all.
    pub enabled: bool,
    /// Total capacity across all partitions.
    pub capacity: u32,
    /// Entry time-to-live in seconds; `0` disables expiry.
    pub time_to_live_seconds: u32,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            capacity: DEFAULT_CAPACITY,
            time_to_live_seconds: DEFAULT_TTL_SECONDS,
        }
    }
}

impl JournalConfig {
    /// An enabled journal with the given capacity and no expiry.
    #[must_use]
    pub fn enabled_with_capacity(capacity: u32) -> Self {
        Self {
            enabled: true,
            capacity,
            time_to_live_seconds: DEFAULT_TTL_SECONDS,
        }
    }

    /// Returns a copy with the time-to-live replaced.
    #[must_use]
    pub fn with_time_to_live_seconds(mut self, seconds: u32) -> Self {
        self.time_to_live_seconds = seconds;
        self
    }

    /// Returns a copy with `enabled` replaced.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Checks the config before it is registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when an enabled journal has zero
    /// capacity.
    pub fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if self.enabled && self.capacity == 0 {
            return Err(ConfigError::Invalid {
                name: name.to_string(),
                reason: "capacity must be positive",
            });
        }
        Ok(())
    }
}

/// How the storage engine keeps records in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InMemoryFormat {
    /// Records are kept as deserialized objects.
    #[default]
    Object,
    /// Records are kept in serialized form.
    Binary,
}

/// Per-partition storage configuration derived from a [`JournalConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Number of slots in one partition's ring.
    pub capacity: u32,
    /// Entry time-to-live in seconds; `0` disables expiry.
    pub time_to_live_seconds: u32,
    /// Synchronous backup count. Journals are not replicated, so always `0`.
    pub backup_count: u32,
    /// Asynchronous backup count. Always `0` for journals.
    pub async_backup_count: u32,
    /// In-memory layout of stored records.
    pub in_memory_format: InMemoryFormat,
}

impl StorageConfig {
    /// Returns `true` when entries expire.
    #[must_use]
    #[inline]
    pub fn has_time_to_live(&self) -> bool {
        self.time_to_live_seconds > 0
    }
}

/// Looks up the journal configuration registered for an object name.
pub trait JournalConfigRegistry: Send + Sync + fmt::Debug {
    /// Returns the config for `object_name`, or `None` when nothing matches.
    fn find_journal_config(&self, object_name: &str) -> Option<JournalConfig>;
}

/// In-memory journal configuration registry.
///
/// Deserializing validates every entry, the same way
/// [`add_journal`](Self::add_journal) does.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawJournalSettings")]
pub struct JournalSettings {
    journals: BTreeMap<String, JournalConfig>,
}

/// Unvalidated wire form of [`JournalSettings`].
#[derive(Deserialize)]
struct RawJournalSettings {
    #[serde(default)]
    journals: BTreeMap<String, JournalConfig>,
}

impl TryFrom<RawJournalSettings> for JournalSettings {
    type Error = ConfigError;

    fn try_from(raw: RawJournalSettings) -> Result<Self, Self::Error> {
        for (name, config) in &raw.journals {
            validate_pattern(name)?;
            config.validate(name)?;
        }
        Ok(Self {
            journals: raw.journals,
        })
    }
}

impl JournalSettings {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates settings from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the document is malformed or any entry
    /// fails validation.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let raw: RawJournalSettings = serde_json::from_str(json)?;
        Self::try_from(raw)
    }

    /// Registers `config` under `name`, returning the updated registry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the name or config is invalid.
    pub fn with_journal(
        mut self,
        name: impl Into<String>,
        config: JournalConfig,
    ) -> Result<Self, ConfigError> {
        self.add_journal(name, config)?;
        Ok(self)
    }

    /// Registers `config` under `name`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the name or config is invalid.
    pub fn add_journal(
        &mut self,
        name: impl Into<String>,
        config: JournalConfig,
    ) -> Result<(), ConfigError> {
        let name = name.into();
        validate_pattern(&name)?;
        config.validate(&name)?;
        self.journals.insert(name, config);
        Ok(())
    }

    /// Number of registered names and patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.journals.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.journals.is_empty()
    }
}

impl JournalConfigRegistry for JournalSettings {
    fn find_journal_config(&self, object_name: &str) -> Option<JournalConfig> {
        if let Some(config) = self.journals.get(object_name) {
            return Some(*config);
        }

        let mut best: Option<(usize, &JournalConfig)> = None;
        for (pattern, config) in &self.journals {
            if let Some(score) = wildcard_score(pattern, object_name)
                && best.is_none_or(|(best_score, _)| score > best_score)
            {
                best = Some((score, config));
            }
        }
        best.map(|(_, config)| *config)
    }
}

fn validate_pattern(name: &str) -> Result<(), ConfigError> {
    if name.matches('*').count() > 1 {
        return Err(ConfigError::InvalidPattern {
            pattern: name.to_string(),
        });
    }
    Ok(())
}

/// Length of the literal part of `pattern` if it matches `name`.
fn wildcard_score(pattern: &str, name: &str) -> Option<usize> {
    let (prefix, suffix) = pattern.split_once('*')?;
    let literal = prefix.len() + suffix.len();
    (name.len() >= literal && name.starts_with(prefix) && name.ends_with(suffix))
        .then_some(literal)
}
