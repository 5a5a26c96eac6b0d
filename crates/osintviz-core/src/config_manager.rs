use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Failed to read config: {0}")]
    ReadError(String),

    #[error("Failed to parse config: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration for the OSINT visualizer service
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OsintVizConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Search lifecycle timing and limits
    #[serde(default)]
    pub tracker: TrackerConfig,

    /// Submission rate limiting
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Delay before the first progress update of a new search
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Interval between progress updates
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Lower bound (inclusive) of the random progress increment
    #[serde(default = "default_min_step")]
    pub min_step: f64,

    /// Upper bound (exclusive) of the random progress increment
    #[serde(default = "default_max_step")]
    pub max_step: f64,

    /// Progress updates allowed before a search is marked failed
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u32,

    /// Spawn a background task per search. Disable to drive ticks manually.
    #[serde(default = "default_auto_advance")]
    pub auto_advance: bool,

    /// Fixed RNG seed for reproducible results
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            tick_interval_ms: default_tick_interval_ms(),
            min_step: default_min_step(),
            max_step: default_max_step(),
            max_ticks: default_max_ticks(),
            auto_advance: default_auto_advance(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Accepted submissions per minute across all clients (0 = unlimited)
    #[serde(default = "default_submits_per_minute")]
    pub submits_per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            submits_per_minute: default_submits_per_minute(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: pretty, compact
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_initial_delay_ms() -> u64 {
    1000
}
fn default_tick_interval_ms() -> u64 {
    2000
}
fn default_min_step() -> f64 {
    5.0
}
fn default_max_step() -> f64 {
    15.0
}
fn default_max_ticks() -> u32 {
    40
}
fn default_auto_advance() -> bool {
    true
}
fn default_submits_per_minute() -> u32 {
    60
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

/// Configuration manager with layered loading
pub struct ConfigManager {
    config: OsintVizConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration with the following precedence:
    /// 1. Environment variables (.env file)
    /// 2. Config file (.osintviz.toml)
    /// 3. Sensible defaults
    pub fn load() -> Result<Self, ConfigError> {
        info!("Loading OSINT visualizer configuration...");

        Self::load_dotenv();

        let (config, config_path) = Self::load_config_file()?;
        Self::finish(config, config_path)
    }

    /// Load from an explicit config file instead of searching for one
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::load_dotenv();

        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let config = Self::read_toml_file(path)?;
        Self::finish(config, Some(path.to_path_buf()))
    }

    /// Wrap an already built configuration, skipping files and environment
    pub fn from_config(config: OsintVizConfig) -> Result<Self, ConfigError> {
        Self::validate_config(&config)?;
        Ok(Self {
            config,
            config_path: None,
        })
    }

    fn finish(config: OsintVizConfig, config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = Self::apply_env_overrides(config);
        Self::validate_config(&config)?;

        info!("Configuration loaded successfully");
        if let Some(ref path) = config_path {
            info!("   Config file: {}", path.display());
        } else {
            info!("   Config file: NONE (using defaults)");
        }
        info!(
            "   Listening on: {}:{}",
            config.server.host, config.server.port
        );
        info!(
            "   Tick interval: {}ms (initial delay {}ms, max {} ticks)",
            config.tracker.tick_interval_ms,
            config.tracker.initial_delay_ms,
            config.tracker.max_ticks
        );

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Load .env file if it exists
    fn load_dotenv() {
        if Path::new(".env").exists() {
            if let Err(e) = dotenv::from_filename(".env") {
                warn!("Failed to load .env file: {}", e);
            } else {
                info!("Loaded .env file from current directory");
            }
            return;
        }

        if let Some(home) = dirs::home_dir() {
            let home_env = home.join(".osintviz.env");
            if home_env.exists() {
                if let Err(e) = dotenv::from_path(&home_env) {
                    warn!("Failed to load .osintviz.env: {}", e);
                } else {
                    info!("Loaded .osintviz.env from home directory");
                }
            }
        }
    }

    /// Find and load config file
    /// Search order:
    /// 1. ./.osintviz.toml (current directory)
    /// 2. ~/.osintviz/config.toml (user config)
    /// 3. Use defaults
    fn load_config_file() -> Result<(OsintVizConfig, Option<PathBuf>), ConfigError> {
        let local_config = Path::new(".osintviz.toml");
        if local_config.exists() {
            let config = Self::read_toml_file(local_config)?;
            return Ok((config, Some(local_config.to_path_buf())));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".osintviz").join("config.toml");
            if user_config.exists() {
                let config = Self::read_toml_file(&user_config)?;
                return Ok((config, Some(user_config)));
            }
        }

        info!("No config file found, using defaults");
        Ok((OsintVizConfig::default(), None))
    }

    fn read_toml_file(path: &Path) -> Result<OsintVizConfig, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: OsintVizConfig) -> OsintVizConfig {
        if let Ok(host) = std::env::var("OSINTVIZ_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("OSINTVIZ_PORT") {
            if let Ok(p) = port.parse() {
                config.server.port = p;
            }
        }

        if let Ok(delay) = std::env::var("OSINTVIZ_INITIAL_DELAY_MS") {
            if let Ok(ms) = delay.parse() {
                config.tracker.initial_delay_ms = ms;
            }
        }
        if let Ok(interval) = std::env::var("OSINTVIZ_TICK_INTERVAL_MS") {
            if let Ok(ms) = interval.parse() {
                config.tracker.tick_interval_ms = ms;
            }
        }
        if let Ok(max_ticks) = std::env::var("OSINTVIZ_MAX_TICKS") {
            if let Ok(n) = max_ticks.parse() {
                config.tracker.max_ticks = n;
            }
        }
        if let Ok(seed) = std::env::var("OSINTVIZ_SEED") {
            if let Ok(s) = seed.parse() {
                config.tracker.seed = Some(s);
            }
        }

        if let Ok(limit) = std::env::var("OSINTVIZ_SUBMITS_PER_MINUTE") {
            if let Ok(n) = limit.parse() {
                config.rate_limit.submits_per_minute = n;
            }
        }

        if let Ok(level) = std::env::var("OSINTVIZ_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(format) = std::env::var("OSINTVIZ_LOG_FORMAT") {
            config.logging.format = format;
        }

        config
    }

    /// Validate configuration
    pub fn validate_config(config: &OsintVizConfig) -> Result<(), ConfigError> {
        let tracker = &config.tracker;
        if !tracker.min_step.is_finite() || !tracker.max_step.is_finite() {
            return Err(ConfigError::ValidationError(format!(
                "tracker steps must be finite, got min_step={} max_step={}",
                tracker.min_step, tracker.max_step
            )));
        }
        if tracker.min_step <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "tracker.min_step must be positive, got {}",
                tracker.min_step
            )));
        }
        if tracker.max_step <= tracker.min_step {
            return Err(ConfigError::ValidationError(format!(
                "tracker.max_step ({}) must be greater than tracker.min_step ({})",
                tracker.max_step, tracker.min_step
            )));
        }
        if tracker.max_ticks == 0 {
            return Err(ConfigError::ValidationError(
                "tracker.max_ticks must be at least 1".to_string(),
            ));
        }
        if tracker.tick_interval_ms == 0 {
            return Err(ConfigError::ValidationError(
                "tracker.tick_interval_ms must be at least 1".to_string(),
            ));
        }

        match config.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    other
                )))
            }
        }

        match config.logging.format.as_str() {
            "pretty" | "compact" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "Invalid log format: {}. Must be one of: pretty, compact",
                    other
                )))
            }
        }

        Ok(())
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &OsintVizConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut OsintVizConfig {
        &mut self.config
    }

    /// Get the path to the config file that was loaded, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Create a default config file
    pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        let config = OsintVizConfig::default();
        let toml_str =
            toml::to_string_pretty(&config).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::ReadError(e.to_string()))?;
        }

        std::fs::write(path, toml_str).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Ok(())
    }
}
