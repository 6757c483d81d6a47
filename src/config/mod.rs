//! Configuration for the intent engine

use anyhow::{bail, Context as _, Result};
use serde::{Deserialize, Serialize};

use crate::aggregate::{DEFAULT_DOMINANCE_THRESHOLD, DEFAULT_RECENT_WINDOW};
use crate::intent::NullBehavior;
use crate::taxonomy::TaxonomyKind;

/// Upper bound for `room.analysis_interval_secs` (one week)
pub const MAX_ANALYSIS_INTERVAL_SECS: u64 = 7 * 24 * 60 * 60;

/// Upper bound for `room.recent_message_minutes` (one week)
pub const MAX_RECENT_MESSAGE_MINUTES: i64 = 7 * 24 * 60;

/// Upper bound for `room.idle_ttl_hours` (one year)
pub const MAX_IDLE_TTL_HOURS: i64 = 365 * 24;

/// Main configuration struct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentConfig {
    /// Which taxonomy is active
    #[serde(default)]
    pub taxonomy: TaxonomyKind,

    /// Taxonomy file (TOML or JSON), required when `taxonomy = "custom"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxonomy_path: Option<String>,

    /// Number of trailing messages that get the recency bonus
    #[serde(default = "default_recent_window_size")]
    pub recent_window_size: usize,

    /// Minimum share for an intent to become dominant
    #[serde(default = "default_dominance_threshold")]
    pub dominance_threshold: f64,

    /// Overrides the taxonomy's own default intent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_intent: Option<String>,

    /// What per-message tagging does when nothing matches
    #[serde(default)]
    pub null_behavior: NullBehavior,

    /// Per-room tracking
    #[serde(default)]
    pub room: RoomConfig,
}

/// Settings for per-room rolling analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomConfig {
    /// How often a room is re-aggregated
    #[serde(default = "default_analysis_interval_secs")]
    pub analysis_interval_secs: u64,

    /// Only messages this recent are aggregated
    #[serde(default = "default_recent_message_minutes")]
    pub recent_message_minutes: i64,

    /// Rolling buffer size per room
    #[serde(default = "default_max_buffered_messages")]
    pub max_buffered_messages: usize,

    /// Transition history kept per room
    #[serde(default = "default_max_history")]
    pub max_history: usize,

    /// Characters of conversation stored with each transition
    #[serde(default = "default_sample_chars")]
    pub sample_chars: usize,

    /// Rooms idle longer than this are evicted by `evict_idle`
    #[serde(default = "default_idle_ttl_hours")]
    pub idle_ttl_hours: i64,
}

fn default_recent_window_size() -> usize {
    DEFAULT_RECENT_WINDOW
}

fn default_dominance_threshold() -> f64 {
    DEFAULT_DOMINANCE_THRESHOLD
}

fn default_analysis_interval_secs() -> u64 {
    120
}

fn default_recent_message_minutes() -> i64 {
    5
}

fn default_max_buffered_messages() -> usize {
    500
}

fn default_max_history() -> usize {
    100
}

fn default_sample_chars() -> usize {
    500
}

fn default_idle_ttl_hours() -> i64 {
    24
}

/// Default location of the configuration file
pub fn default_config_path() -> String {
    dirs::config_dir()
        .map(|p| p.join("convo-intent/config.toml").to_string_lossy().to_string())
        .unwrap_or_else(|| "/etc/convo-intent/config.toml".to_string())
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            taxonomy: TaxonomyKind::default(),
            taxonomy_path: None,
            recent_window_size: default_recent_window_size(),
            dominance_threshold: default_dominance_threshold(),
            default_intent: None,
            null_behavior: NullBehavior::default(),
            room: RoomConfig::default(),
        }
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            analysis_interval_secs: default_analysis_interval_secs(),
            recent_message_minutes: default_recent_message_minutes(),
            max_buffered_messages: default_max_buffered_messages(),
            max_history: default_max_history(),
            sample_chars: default_sample_chars(),
            idle_ttl_hours: default_idle_ttl_hours(),
        }
    }
}

// Durations are clamped to the validated range, so an unvalidated
// config still yields a usable value.
impl RoomConfig {
    pub fn analysis_interval(&self) -> chrono::Duration {
        let secs = self.analysis_interval_secs.clamp(1, MAX_ANALYSIS_INTERVAL_SECS);
        chrono::Duration::seconds(secs as i64)
    }

    pub fn recent_messages(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.recent_message_minutes.clamp(1, MAX_RECENT_MESSAGE_MINUTES))
    }

    pub fn idle_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.idle_ttl_hours.clamp(1, MAX_IDLE_TTL_HOURS))
    }
}

impl IntentConfig {
    /// Load configuration from file, with environment variable overrides
    pub fn load(path: &str) -> Result<Self> {
        let mut config = if std::path::Path::new(path).exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path))?;
            Self::from_toml_str(&content).with_context(|| format!("parsing config {}", path))?
        } else {
            Self::default()
        };

        // Environment variable overrides
        if let Ok(taxonomy) = std::env::var("CONVO_INTENT_TAXONOMY") {
            config.taxonomy = taxonomy.parse().map_err(anyhow::Error::msg)?;
        }
        if let Ok(path) = std::env::var("CONVO_INTENT_TAXONOMY_PATH") {
            config.taxonomy_path = Some(path);
        }
        if let Ok(window) = std::env::var("CONVO_INTENT_WINDOW") {
            config.recent_window_size = window
                .parse()
                .with_context(|| format!("CONVO_INTENT_WINDOW={}", window))?;
        }
        if let Ok(threshold) = std::env::var("CONVO_INTENT_THRESHOLD") {
            config.dominance_threshold = threshold
                .parse()
                .with_context(|| format!("CONVO_INTENT_THRESHOLD={}", threshold))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.recent_window_size < 1 {
            bail!("recent_window_size must be at least 1");
        }
        if !(self.dominance_threshold > 0.0 && self.dominance_threshold <= 1.0) {
            bail!(
                "dominance_threshold must be in (0, 1], got {}",
                self.dominance_threshold
            );
        }
        if self.taxonomy == TaxonomyKind::Custom && self.taxonomy_path.is_none() {
            bail!("taxonomy = \"custom\" requires taxonomy_path");
        }
        if !(1..=MAX_ANALYSIS_INTERVAL_SECS).contains(&self.room.analysis_interval_secs) {
            bail!(
                "room.analysis_interval_secs must be in 1..={}, got {}",
                MAX_ANALYSIS_INTERVAL_SECS,
                self.room.analysis_interval_secs
            );
        }
        if !(1..=MAX_RECENT_MESSAGE_MINUTES).contains(&self.room.recent_message_minutes) {
            bail!(
                "room.recent_message_minutes must be in 1..={}, got {}",
                MAX_RECENT_MESSAGE_MINUTES,
                self.room.recent_message_minutes
            );
        }
        if !(1..=MAX_IDLE_TTL_HOURS).contains(&self.room.idle_ttl_hours) {
            bail!(
                "room.idle_ttl_hours must be in 1..={}, got {}",
                MAX_IDLE_TTL_HOURS,
                self.room.idle_ttl_hours
            );
        }
        if self.room.max_buffered_messages == 0 {
            bail!("room.max_buffered_messages must be positive");
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
