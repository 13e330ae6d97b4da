//! Configuration structures for the access control core
//!
//! This module contains the runtime configuration, the command line arguments
//! of the `door-access-control` binary and the loading/validation logic that
//! merges a JSON configuration file with CLI overrides.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default clock cadence in milliseconds
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;

/// Default length of the unlock-shortly grace period in seconds
pub const DEFAULT_UNLOCK_SHORTLY_SECS: u64 = 10;

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "door-access-control",
    version = "0.1.0",
    about = "Door access control core - authorizes door actions and drives door states",
    long_about = "Seeds the demo building, starts the expiry clock and processes door requests. Each request names a credential, an action and a door (or an area); the result is printed as one JSON line on stdout.

EXAMPLES:
    # Unlock door D3 for a short while as an employee
    door-access-control --credential 74984 --action unlock_shortly --door D3

    # Lock every door of the ground floor as the administrator
    door-access-control --credential 11343 --action lock --area ground_floor

    # Replay a JSON-lines request file and watch the doors expire
    door-access-control --requests requests.jsonl --hold-secs 12 --list-doors

    # Evaluate the schedule at a fixed moment
    door-access-control --credential 95783 --action unlock --door D5 --at \"2025-10-06 10:00:00\"

    # Generate configuration template
    door-access-control --print-config > my-config.json

CONFIGURATION:
    Configuration can be provided via:
    1. Command line arguments (highest priority)
    2. Configuration file (--config flag)
    3. Default values (lowest priority)

    Supported configuration file formats: JSON (.json)"
)]
pub struct CliArgs {
    /// Configuration file path (JSON format)
    #[arg(
        short,
        long,
        help = "Configuration file path (JSON format)",
        long_help = "Path to a JSON configuration file. CLI arguments will override file settings."
    )]
    pub config: Option<String>,

    /// Credential presented by the user
    #[arg(long, help = "Credential presented at the reader")]
    pub credential: Option<String>,

    /// Requested action
    #[arg(
        long,
        help = "Requested action (open, close, lock, unlock, unlock_shortly)",
        long_help = "Requested action. Case-insensitive; \"unlock shortly\" is accepted for unlock_shortly."
    )]
    pub action: Option<String>,

    /// Target door
    #[arg(long, help = "Target door id", conflicts_with = "area")]
    pub door: Option<String>,

    /// Target area (applies the action to every door of the area)
    #[arg(long, help = "Target area id")]
    pub area: Option<String>,

    /// JSON-lines request file
    #[arg(
        long,
        help = "JSON-lines request file",
        long_help = "File with one request per line: {\"credential\": ..., \"action\": ..., \"door\": ...} or with \"area\" instead of \"door\"."
    )]
    pub requests: Option<String>,

    /// Moment used for schedule evaluation
    #[arg(
        long,
        help = "Check group schedules at this moment (YYYY-MM-DD HH:MM:SS)",
        long_help = "Check group schedules at this moment (YYYY-MM-DD HH:MM:SS). Only authorization uses it; unlock-shortly periods are always timed on the real clock."
    )]
    pub at: Option<String>,

    /// Keep the clock running this many seconds after the last request
    #[arg(long, default_value = "0", help = "Seconds to keep the clock running after processing")]
    pub hold_secs: u64,

    /// Clock cadence override
    #[arg(long, help = "Clock tick interval in milliseconds")]
    pub tick_interval_ms: Option<u64>,

    /// Grace period override
    #[arg(long, help = "Unlock-shortly grace period in seconds")]
    pub unlock_shortly_secs: Option<u64>,

    /// Print every door after processing
    #[arg(long, help = "Print every door as JSON after processing")]
    pub list_doors: bool,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Dry run mode - validate configuration without processing requests
    #[arg(long, help = "Validate configuration without processing requests")]
    pub dry_run: bool,

    /// Print default configuration and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Clock cadence in milliseconds
    pub tick_interval_ms: Option<u64>,

    /// Unlock-shortly grace period in seconds
    pub unlock_shortly_secs: Option<u64>,

    /// Whether newly created doors start physically closed
    pub default_door_closed: Option<bool>,

    /// Directory for rolling log files
    pub log_directory: Option<String>,

    /// Emit JSON log lines
    pub json_logs: Option<bool>,
}

/// Runtime configuration of the access control core
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControlConfig {
    /// Clock cadence in milliseconds
    pub tick_interval_ms: u64,

    /// Unlock-shortly grace period in whole seconds
    pub unlock_shortly_secs: u64,

    /// Whether newly created doors start physically closed
    pub default_door_closed: bool,

    /// Directory for rolling log files (console only when unset)
    pub log_directory: Option<String>,

    /// Emit JSON log lines
    pub json_logs: bool,
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),
}

/// Validation errors for the runtime configuration
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigValidationError {
    /// Tick interval is zero
    #[error("Tick interval must be greater than 0 ms, got {0}")]
    InvalidTickInterval(u64),

    /// Grace period is zero
    #[error("Unlock-shortly period must be greater than 0 s, got {0}")]
    InvalidUnlockShortlyPeriod(u64),

    /// The clock would tick less often than the grace period
    #[error("Tick interval ({tick_ms} ms) must not exceed the unlock-shortly period ({window_secs} s)")]
    TickSlowerThanWindow {
        /// Configured tick interval in milliseconds
        tick_ms: u64,
        /// Configured grace period in seconds
        window_secs: u64,
    },
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            unlock_shortly_secs: DEFAULT_UNLOCK_SHORTLY_SECS,
            default_door_closed: true,
            log_directory: None,
            json_logs: false,
        }
    }
}

impl ControlConfig {
    /// Create configuration from parsed CLI arguments
    pub fn from_cli_args(args: CliArgs) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(config_path) = &args.config {
            config = Self::from_file(config_path)?;
        }

        // CLI takes precedence
        Self::apply_cli_overrides(&mut config, &args);

        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => {
                let content = fs::read_to_string(path)?;
                let config_file: ConfigFile = serde_json::from_str(&content)?;
                Ok(Self::from_config_file(config_file))
            }
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => Err(ConfigError::UnsupportedFormat("no extension".to_string())),
        }
    }

    /// Merge a partial config file with defaults
    fn from_config_file(config_file: ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            tick_interval_ms: config_file.tick_interval_ms.unwrap_or(defaults.tick_interval_ms),
            unlock_shortly_secs: config_file
                .unlock_shortly_secs
                .unwrap_or(defaults.unlock_shortly_secs),
            default_door_closed: config_file
                .default_door_closed
                .unwrap_or(defaults.default_door_closed),
            log_directory: config_file.log_directory.or(defaults.log_directory),
            json_logs: config_file.json_logs.unwrap_or(defaults.json_logs),
        }
    }

    fn apply_cli_overrides(config: &mut Self, args: &CliArgs) {
        if let Some(value) = args.tick_interval_ms {
            config.tick_interval_ms = value;
        }
        if let Some(value) = args.unlock_shortly_secs {
            config.unlock_shortly_secs = value;
        }
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Print configuration as JSON
    pub fn print_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigValidationError::InvalidTickInterval(self.tick_interval_ms));
        }

        if self.unlock_shortly_secs == 0 {
            return Err(ConfigValidationError::InvalidUnlockShortlyPeriod(
                self.unlock_shortly_secs,
            ));
        }

        if self.tick_interval_ms > self.unlock_shortly_secs * 1_000 {
            return Err(ConfigValidationError::TickSlowerThanWindow {
                tick_ms: self.tick_interval_ms,
                window_secs: self.unlock_shortly_secs,
            });
        }

        Ok(())
    }

    /// Clock cadence as a std duration
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms)
    }

    /// Grace period as a chrono duration
    pub fn unlock_shortly_window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.unlock_shortly_secs as i64)
    }
}
