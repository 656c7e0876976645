//! Configuration loading and management.

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server information.
    pub server: ServerConfig,
    /// Network listen configuration.
    pub listen: ListenConfig,
    /// Operator blocks.
    #[serde(default)]
    pub oper: Vec<OperBlock>,
    /// Security configuration (cloaking, rate limiting, anti-abuse).
    #[serde(default)]
    pub security: SecurityConfig,
    /// Message of the Day configuration.
    #[serde(default)]
    pub motd: MotdConfig,
    /// Command output limits (WHO, LIST, NAMES result caps).
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, for interactive terminals.
    #[default]
    Pretty,
    /// Newline-delimited JSON, for log aggregation.
    Json,
}

/// Message of the Day (MOTD) configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct MotdConfig {
    /// Path to MOTD file (one line per MOTD line).
    pub file: Option<String>,
    /// Inline MOTD lines (used when `file` is not set).
    #[serde(default)]
    pub lines: Vec<String>,
}

impl MotdConfig {
    /// Load MOTD lines from file, or return default MOTD.
    pub fn load_lines(&self) -> Vec<String> {
        if let Some(ref path) = self.file {
            match std::fs::read_to_string(path) {
                Ok(content) => {
                    return content.lines().map(|s| s.to_string()).collect();
                }
                Err(e) => {
                    tracing::warn!("Failed to read MOTD file {}: {}", path, e);
                }
            }
        }

        if !self.lines.is_empty() {
            return self.lines.clone();
        }

        // Default MOTD
        vec![
            "Welcome to hearthd!".to_string(),
            "A high-performance IRC daemon.".to_string(),
        ]
    }
}

/// Operator block configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OperBlock {
    /// Operator name (used in OPER command).
    pub name: String,
    /// Password (plaintext or bcrypt hash).
    pub password: String,
    /// Optional hostmask restriction (e.g., "*!*@trusted.host").
    pub hostmask: Option<String>,
}

impl OperBlock {
    /// Verify the provided password against the stored password (plaintext or bcrypt).
    pub fn verify_password(&self, password: &str) -> bool {
        if self.password.starts_with("$2") {
            bcrypt::verify(password, &self.password).unwrap_or(false)
        } else {
            // Fallback to plaintext check
            self.password == password
        }
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server name (e.g., "irc.straylight.net").
    pub name: String,
    /// Network name (e.g., "Straylight").
    pub network: String,
    /// Server ID for TS6 (3 characters).
    pub sid: String,
    /// Server description.
    pub description: String,
    /// Global connection password (optional).
    pub password: Option<String>,
    /// Admin info line 1 (RPL_ADMINLOC1) - typically organization name.
    #[serde(default)]
    pub admin_info1: Option<String>,
    /// Admin info line 2 (RPL_ADMINLOC2) - typically location.
    #[serde(default)]
    pub admin_info2: Option<String>,
    /// Admin email address (RPL_ADMINEMAIL).
    #[serde(default)]
    pub admin_email: Option<String>,
    /// Idle timeout configuration for ping/pong keepalive.
    #[serde(default)]
    pub idle_timeouts: IdleTimeoutsConfig,
}

/// Idle timeout configuration for client connection keepalive.
///
/// IRC servers send periodic PING messages to detect dead connections.
/// If the client doesn't respond with PONG within the timeout, they are
/// disconnected with "Ping timeout".
///
/// Based on Ergo's three-phase model:
/// - `ping`: Seconds of idle before sending PING (default: 90)
/// - `timeout`: Seconds to wait for PONG after PING (default: 120)
/// - `registration`: Seconds allowed for initial registration (default: 60)
#[derive(Debug, Clone, Deserialize)]
pub struct IdleTimeoutsConfig {
    /// Seconds of idle before sending PING to client (default: 90).
    #[serde(default = "default_ping_interval")]
    pub ping: u64,

    /// Seconds to wait for PONG after sending PING before disconnect (default: 120).
    /// Total idle time before disconnect = ping + timeout.
    #[serde(default = "default_ping_timeout")]
    pub timeout: u64,

    /// Seconds allowed for registration handshake (NICK/USER/CAP) before disconnect (default: 60).
    #[serde(default = "default_registration_timeout")]
    pub registration: u64,
}

impl Default for IdleTimeoutsConfig {
    fn default() -> Self {
        Self {
            ping: default_ping_interval(),
            timeout: default_ping_timeout(),
            registration: default_registration_timeout(),
        }
    }
}

fn default_ping_interval() -> u64 {
    90
}

fn default_ping_timeout() -> u64 {
    120
}

fn default_registration_timeout() -> u64 {
    60
}

/// Network listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind to (e.g., "0.0.0.0:6667").
    pub address: SocketAddr,
}

/// Security configuration for cloaking, rate limiting, and anti-abuse.
#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Secret key for HMAC-based host cloaking.
    /// MUST be kept private and should be at least 32 characters.
    #[serde(default = "default_cloak_secret")]
    pub cloak_secret: String,
    /// Suffix for cloaked IP addresses (default: "ip").
    #[serde(default = "default_cloak_suffix")]
    pub cloak_suffix: String,
    /// Rate limiting configuration.
    #[serde(default)]
    pub rate_limits: RateLimitConfig,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            cloak_secret: default_cloak_secret(),
            cloak_suffix: default_cloak_suffix(),
            rate_limits: RateLimitConfig::default(),
        }
    }
}

fn default_cloak_secret() -> String {
    let secret: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect();
    tracing::warn!(
        "No cloak_secret configured - using ephemeral random secret. \
         Cloaked hostnames will NOT be consistent across server restarts. \
         Set [security].cloak_secret in config.toml for production use."
    );
    secret
}

fn default_cloak_suffix() -> String {
    "ip".to_string()
}

/// Command output limits configuration.
///
/// These limits prevent pathologically large result sets from exhausting
/// server resources or causing slow clients to back up.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum results returned by WHO command (default: 500).
    /// Applies to both channel WHO and mask-based WHO queries.
    #[serde(default = "default_max_who_results")]
    pub max_who_results: usize,
    /// Maximum channels returned by LIST command (default: 1000).
    #[serde(default = "default_max_list_channels")]
    pub max_list_channels: usize,
    /// Maximum channels listed by NAMES without argument (default: 50).
    /// NAMES #channel is unlimited since it's a single channel.
    #[serde(default = "default_max_names_channels")]
    pub max_names_channels: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_who_results: default_max_who_results(),
            max_list_channels: default_max_list_channels(),
            max_names_channels: default_max_names_channels(),
        }
    }
}

fn default_max_who_results() -> usize {
    500
}

fn default_max_list_channels() -> usize {
    1000
}

fn default_max_names_channels() -> usize {
    50
}

/// Rate limiting configuration for anti-flood protection.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Messages allowed per client per second (default: 2).
    #[serde(default = "default_message_rate")]
    pub message_rate_per_second: u32,
    /// Connection burst allowed per IP in 10 seconds (default: 3).
    #[serde(default = "default_connection_burst")]
    pub connection_burst_per_ip: u32,
    /// Channel join burst allowed per client in 10 seconds (default: 5).
    #[serde(default = "default_join_burst")]
    pub join_burst_per_client: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            message_rate_per_second: default_message_rate(),
            connection_burst_per_ip: default_connection_burst(),
            join_burst_per_client: default_join_burst(),
        }
    }
}

fn default_message_rate() -> u32 {
    2
}

fn default_connection_burst() -> u32 {
    3
}

fn default_join_burst() -> u32 {
    5
}

/// Problems found while validating a loaded [`Config`].
///
/// `Config::load` only checks that the TOML parses; `validate` catches
/// values that parse fine but would misconfigure the server (e.g. an
/// empty server name, or an operator block with a blank password).
fn validate(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if config.server.name.trim().is_empty() {
        errors.push("server.name must not be empty".to_string());
    }
    if config.server.sid.len() != 3 {
        errors.push("server.sid must be exactly 3 characters".to_string());
    }
    for block in &config.oper {
        if block.password.trim().is_empty() {
            errors.push(format!("oper block '{}' has an empty password", block.name));
        }
    }
    if config.security.cloak_secret.len() < 16 {
        errors.push("security.cloak_secret should be at least 16 characters".to_string());
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        if let Err(errors) = validate(&config) {
            for error in &errors {
                tracing::error!(%error, "invalid configuration");
            }
            return Err(ConfigError::Invalid(errors));
        }
        Ok(config)
    }
}
