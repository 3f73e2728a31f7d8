use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::dispatch::CommandEntry;

/// Top-level configuration, loaded from `~/.fitvoice.toml`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Strategy selection and engine model settings.
    #[serde(default)]
    pub recognition: RecognitionConfig,
    /// Offline simulation strategy settings.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Dispatcher feedback and external command lists.
    #[serde(default)]
    pub commands: CommandsConfig,
    /// Logging settings.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// `[recognition]` section.
#[derive(Debug, Deserialize, Clone)]
pub struct RecognitionConfig {
    /// Strategy order for the fallback chain.
    #[serde(default = "default_preferred")]
    pub preferred: Vec<String>,
    /// Where the engine model file must exist.
    #[serde(default = "default_model_path")]
    pub model_path: String,
    /// Operator hint for fetching the model; never downloaded here.
    #[serde(default)]
    pub model_url: Option<String>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            preferred: default_preferred(),
            model_path: default_model_path(),
            model_url: None,
        }
    }
}

/// `[simulation]` section.
#[derive(Debug, Deserialize, Clone)]
pub struct SimulationConfig {
    /// Whether the simulation strategy joins the chain.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Scripted utterances, played in order.
    #[serde(default = "default_utterances")]
    pub utterances: Vec<String>,
    /// Delay before each utterance, in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            utterances: default_utterances(),
            interval_ms: default_interval_ms(),
        }
    }
}

/// `[commands]` section.
#[derive(Debug, Deserialize, Clone)]
pub struct CommandsConfig {
    /// Feedback text when no command matches.
    #[serde(default = "default_not_recognized")]
    pub not_recognized: String,
    /// Similarity floor for "did you mean" hints.
    #[serde(default = "default_suggestion_threshold")]
    pub suggestion_threshold: f64,
    /// Complex-task entries, scanned after the built-in table.
    #[serde(default)]
    pub complex_tasks: Vec<CommandEntry>,
    /// Automation-sequence entries, scanned after complex tasks.
    #[serde(default)]
    pub automations: Vec<CommandEntry>,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            not_recognized: default_not_recognized(),
            suggestion_threshold: default_suggestion_threshold(),
            complex_tasks: Vec::new(),
            automations: Vec::new(),
        }
    }
}

/// `[telemetry]` section.
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetryConfig {
    /// Whether logs also go to a file.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Log file location.
    #[serde(default = "default_log_path")]
    pub log_path: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_path: default_log_path(),
        }
    }
}

fn default_preferred() -> Vec<String> {
    vec![
        "engine".to_owned(),
        "native".to_owned(),
        "simulated".to_owned(),
    ]
}

fn default_model_path() -> String {
    "~/.fitvoice/models/engine.bin".to_owned()
}

fn default_true() -> bool {
    true
}

fn default_utterances() -> Vec<String> {
    vec![
        "start timer".to_owned(),
        "log exercise pushups".to_owned(),
        "stop timer".to_owned(),
    ]
}

fn default_interval_ms() -> u64 {
    1500
}

fn default_not_recognized() -> String {
    "command not recognized".to_owned()
}

fn default_suggestion_threshold() -> f64 {
    0.8
}

fn default_log_path() -> String {
    "~/.fitvoice/fitvoice.log".to_owned()
}

impl Config {
    /// Load config from `~/.fitvoice.toml`, writing a commented default
    /// file on first run.
    ///
    /// # Errors
    /// Returns an error when the home directory cannot be resolved or
    /// the file cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from an explicit path, writing the default file when
    /// it does not exist.
    ///
    /// # Errors
    /// Returns an error when the file cannot be created, read or parsed.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            Self::create_default(config_path).context("failed to create default config")?;
        }

        let contents = fs::read_to_string(config_path).context("failed to read config file")?;

        let config: Self = toml::from_str(&contents).context("failed to parse config TOML")?;

        Ok(config)
    }

    fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").context("HOME environment variable not set")?;
        Ok(PathBuf::from(home).join(".fitvoice.toml"))
    }

    fn create_default(path: &Path) -> Result<()> {
        let default_config = r#"[recognition]
# Strategies are tried in this order each time listening starts.
preferred = ["engine", "native", "simulated"]
model_path = "~/.fitvoice/models/engine.bin"
# model_url = "https://example.com/models/engine.bin"

[simulation]
enabled = true
utterances = ["start timer", "log exercise pushups", "stop timer"]
interval_ms = 1500

[commands]
not_recognized = "command not recognized"
suggestion_threshold = 0.8

# [[commands.complex_tasks]]
# name = "warmup"
# phrases = ["begin warmup", "warm up"]
# action = "task.warmup"
# feedback = "warming up"

# [[commands.automations]]
# name = "morning routine"
# phrases = ["morning routine"]
# action = "auto.morning"

[telemetry]
enabled = true
log_path = "~/.fitvoice/fitvoice.log"
"#;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("failed to create config directory")?;
        }
        fs::write(path, default_config).context("failed to write default config")?;
        Ok(())
    }

    /// Expand `~` in paths to the home directory.
    ///
    /// # Errors
    /// Returns an error when `HOME` is unset and the path needs it.
    pub fn expand_path(path: &str) -> Result<PathBuf> {
        if let Some(stripped) = path.strip_prefix("~/") {
            let home = std::env::var("HOME").context("HOME environment variable not set")?;
            Ok(PathBuf::from(home).join(stripped))
        } else {
            Ok(PathBuf::from(path))
        }
    }
}
