//! Configuration loading and types for documental
//!
//! Configuration is loaded in layers:
//! 1. Built-in defaults
//! 2. Config file (~/.config/documental/config.toml)
//! 3. Environment variables (DOCUMENTAL_*)
//! 4. CLI arguments (highest priority)
//!
//! A missing or malformed config file is never fatal: the defaults apply
//! and a warning is logged.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fallback LLM endpoint when no config file is present
pub const DEFAULT_ENDPOINT: &str = "http://localhost:1234/v1";

/// Default configuration file content
pub const DEFAULT_CONFIG: &str = r#"# DocuMental Configuration
#
# Location: ~/.config/documental/config.toml
# All settings can be overridden via CLI flags

[llm]
# OpenAI-compatible endpoint of the local LLM server (LM Studio, llama.cpp, ...)
lm_studio_endpoint = "http://localhost:1234/v1"

# Sampling temperature for notification generation
temperature = 0.7

[monitor]
# Seconds between queue polls when the backend has no native change events
poll_interval_secs = 5

# Queues to watch. Empty list = watch every queue on the system.
# queues = ["HP_LaserJet", "Basement_Printer"]
queues = []

[memory]
# Which events bump the per-user/per-document print counters:
# "new_jobs" (default) or "all_events"
update_on = "new_jobs"

# Custom snapshot location (defaults to ~/.local/share/documental/memory.json)
# path = "/var/lib/documental/memory.json"

[notification]
# Show desktop notifications (notify-send)
desktop = true

# Speak notifications aloud (spd-say or espeak, skipped if neither exists)
speech = true
"#;

/// Which events update the context counters
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UpdateOn {
    /// Only fresh submissions bump the counters (default)
    #[default]
    NewJobs,
    /// Every delivered event bumps the counters
    AllEvents,
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub monitor: MonitorConfig,

    #[serde(default)]
    pub memory: MemoryConfig,

    #[serde(default)]
    pub notification: NotificationConfig,
}

/// LLM gateway configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    /// Base URL of the OpenAI-compatible server
    #[serde(default = "default_endpoint")]
    pub lm_studio_endpoint: String,

    /// Sampling temperature for the chat completion
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

/// Queue monitoring configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitorConfig {
    /// Poll interval in seconds for backends without native notifications
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Queue names to watch; empty means all available queues
    #[serde(default)]
    pub queues: Vec<String>,
}

/// Context memory configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct MemoryConfig {
    /// Which events bump the print counters
    #[serde(default)]
    pub update_on: UpdateOn,

    /// Snapshot file path override
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Dispatch sink configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    /// Send desktop notifications via notify-send
    #[serde(default = "default_true")]
    pub desktop: bool,

    /// Speak messages aloud if a speech synthesizer is installed
    #[serde(default = "default_true")]
    pub speech: bool,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_poll_interval() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            lm_studio_endpoint: default_endpoint(),
            temperature: default_temperature(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            queues: vec![],
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            desktop: true,
            speech: true,
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "documental")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path (for the context snapshot)
    pub fn data_dir() -> PathBuf {
        directories::ProjectDirs::from("", "", "documental")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Resolve the context snapshot path from config
    pub fn resolve_memory_path(&self) -> PathBuf {
        self.memory
            .path
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("memory.json"))
    }
}

/// Load configuration from file, falling back to defaults.
///
/// Never fails: a missing file is normal on first run and a malformed file
/// logs a warning and yields the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Config {
    let mut config = Config::default();

    let config_path = path.map(PathBuf::from).or_else(Config::default_path);

    if let Some(ref path) = config_path {
        if path.exists() {
            tracing::debug!("Loading config from {:?}", path);
            match std::fs::read_to_string(path) {
                Ok(contents) => match toml::from_str(&contents) {
                    Ok(parsed) => config = parsed,
                    Err(e) => {
                        tracing::warn!(
                            "Could not parse {:?}, using default settings: {}",
                            path,
                            e
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!("Could not read {:?}, using default settings: {}", path, e);
                }
            }
        } else {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
        }
    }

    // Override from environment variables
    if let Ok(endpoint) = std::env::var("DOCUMENTAL_ENDPOINT") {
        config.llm.lm_studio_endpoint = endpoint;
    }
    if let Ok(secs) = std::env::var("DOCUMENTAL_POLL_INTERVAL") {
        match secs.parse() {
            Ok(secs) => config.monitor.poll_interval_secs = secs,
            Err(_) => tracing::warn!("Ignoring invalid DOCUMENTAL_POLL_INTERVAL: {}", secs),
        }
    }

    config
}
