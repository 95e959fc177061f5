//! Planbot configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PlanbotError, Result};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanbotConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub evidence: EvidenceConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl PlanbotConfig {
    /// Load config from the default path (~/.planbot/config.toml).
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PlanbotError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| PlanbotError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to the default path.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path())
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| PlanbotError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the Planbot home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".planbot")
    }
}

/// Daily trigger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Daily fire time, "HH:MM". Invalid values fall back to 18:00 at arm
    /// time with a warning.
    #[serde(default = "default_fire_time")]
    pub time: String,
    /// Poll granularity of the scheduler loop, in seconds.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
}

fn default_fire_time() -> String {
    "18:00".into()
}
fn default_tick_secs() -> u64 {
    1
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            time: default_fire_time(),
            tick_secs: default_tick_secs(),
        }
    }
}

/// Holiday data source toggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    /// Use the embedded official-holiday table. When false, only weekends
    /// count as non-workdays.
    #[serde(default = "bool_true")]
    pub official_holidays: bool,
}

fn bool_true() -> bool {
    true
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            official_holidays: bool_true(),
        }
    }
}

/// Plan store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file. Relative paths resolve under the Planbot home
    /// directory.
    #[serde(default = "default_db_file")]
    pub db_file: String,
}

fn default_db_file() -> String {
    "work_plans.db".into()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_file: default_db_file(),
        }
    }
}

/// Notification sink configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Markdown-webhook URL (DingTalk-compatible). Empty disables delivery;
    /// notifications then go to the log only.
    #[serde(default)]
    pub webhook_url: String,
}

/// Evidence archive configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvidenceConfig {
    /// Directory to archive run evidence under. Empty disables archiving.
    #[serde(default)]
    pub dir: String,
}

/// Submission agent configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// External automation program invoked as
    /// `<command> <date> <todo> <progress>`; prints a JSON verdict on stdout.
    #[serde(default)]
    pub command: String,
    /// Hard ceiling on one submission attempt.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            command: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Plan generator configuration (OpenAI-compatible chat API).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// API base URL (e.g. "https://api.openai.com/v1"). Empty disables plan
    /// generation.
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Overrides the built-in system prompt when non-empty.
    #[serde(default)]
    pub system_prompt: String,
}

fn default_model() -> String {
    "gpt-4o-mini".into()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            model: default_model(),
            system_prompt: String::new(),
        }
    }
}
