//! Configuration schema types
//!
//! Every section has defaults, so an empty file (or no file at all) yields a
//! configuration that talks to a dashboard on `localhost`.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Runtime environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Development environment
    #[default]
    Development,
    /// Staging environment
    Staging,
    /// Production environment
    Production,
}

/// Order in which the offline queue is drained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DrainOrder {
    /// Most recently enqueued entry first
    #[default]
    NewestFirst,
    /// Oldest entry first (FIFO)
    OldestFirst,
}

impl fmt::Display for DrainOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrainOrder::NewestFirst => f.write_str("newest_first"),
            DrainOrder::OldestFirst => f.write_str("oldest_first"),
        }
    }
}

impl FromStr for DrainOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "newest_first" => Ok(DrainOrder::NewestFirst),
            "oldest_first" => Ok(DrainOrder::OldestFirst),
            other => Err(format!(
                "Invalid drain order '{other}'. Must be one of: newest_first, oldest_first"
            )),
        }
    }
}

/// Payload encryption scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EncryptionAlgorithm {
    /// Reversible base64 encoding; NOT encryption, development only
    #[default]
    #[serde(rename = "simulation-base64")]
    SimulationBase64,
    /// AES-256-GCM with a key derived from the configured device key
    #[serde(rename = "aes-256-gcm")]
    Aes256Gcm,
}

impl EncryptionAlgorithm {
    /// Name carried in the payload's `algorithm` field
    pub fn as_str(&self) -> &'static str {
        match self {
            EncryptionAlgorithm::SimulationBase64 => "simulation-base64",
            EncryptionAlgorithm::Aes256Gcm => "aes-256-gcm",
        }
    }
}

impl FromStr for EncryptionAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simulation-base64" => Ok(EncryptionAlgorithm::SimulationBase64),
            "aes-256-gcm" => Ok(EncryptionAlgorithm::Aes256Gcm),
            other => Err(format!(
                "Invalid encryption algorithm '{other}'. Must be one of: simulation-base64, aes-256-gcm"
            )),
        }
    }
}

/// Main QuickScan configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct QuickScanConfig {
    /// Runtime environment (development, staging, production)
    #[serde(default)]
    pub environment: Environment,

    #[serde(default)]
    pub application: ApplicationConfig,

    /// Remote dashboard endpoint settings
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Offline queue settings
    #[serde(default)]
    pub queue: QueueConfig,

    /// Live session settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Payload encryption settings
    #[serde(default)]
    pub encryption: EncryptionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl QuickScanConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid setting
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.dashboard.validate(&self.environment)?;
        self.queue.validate()?;
        self.session.validate()?;
        self.encryption.validate(&self.environment)?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Remote dashboard configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Base URL of the dashboard API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path records are POSTed to, appended to `base_url`
    #[serde(default = "default_transmit_path")]
    pub transmit_path: String,

    /// Path requested by the health check, appended to `base_url`
    #[serde(default = "default_health_path")]
    pub health_path: String,

    /// Timeout for a transmission request in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Timeout for the health check in seconds
    #[serde(default = "default_health_timeout_seconds")]
    pub health_timeout_seconds: u64,

    /// Value of the `X-QuickScan-Version` header
    #[serde(default = "default_protocol_version")]
    pub protocol_version: String,

    /// Value of the `X-Device-Type` header
    #[serde(default = "default_client_type")]
    pub client_type: String,

    /// Application version reported in request metadata
    #[serde(default = "default_app_version")]
    pub app_version: String,

    /// TLS certificate verification enabled
    ///
    /// Must stay `true` in production (enforced by validation).
    #[serde(default = "default_true")]
    pub tls_verify: bool,
}

impl DashboardConfig {
    /// Full URL records are POSTed to
    pub fn transmit_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.transmit_path)
    }

    /// Full URL of the health endpoint
    pub fn health_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.health_path)
    }

    fn validate(&self, environment: &Environment) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("dashboard.base_url cannot be empty".to_string());
        }

        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| format!("dashboard.base_url is not a valid URL: {e}"))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err("dashboard.base_url must start with http:// or https://".to_string());
        }

        for (name, path) in [
            ("dashboard.transmit_path", &self.transmit_path),
            ("dashboard.health_path", &self.health_path),
        ] {
            if !path.starts_with('/') {
                return Err(format!("{name} must start with '/', got '{path}'"));
            }
        }

        if self.timeout_seconds == 0 || self.timeout_seconds > 120 {
            return Err(format!(
                "dashboard.timeout_seconds must be between 1 and 120, got {}",
                self.timeout_seconds
            ));
        }

        if self.health_timeout_seconds == 0 || self.health_timeout_seconds > 30 {
            return Err(format!(
                "dashboard.health_timeout_seconds must be between 1 and 30, got {}",
                self.health_timeout_seconds
            ));
        }

        if self.protocol_version.is_empty() || self.client_type.is_empty() {
            return Err(
                "dashboard.protocol_version and dashboard.client_type cannot be empty".to_string(),
            );
        }

        if *environment == Environment::Production {
            if parsed.scheme() != "https" {
                return Err(
                    "dashboard.base_url must use https:// in production environments".to_string(),
                );
            }
            if !self.tls_verify {
                return Err(
                    "TLS certificate verification cannot be disabled in production environments"
                        .to_string(),
                );
            }
        }

        Ok(())
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            transmit_path: default_transmit_path(),
            health_path: default_health_path(),
            timeout_seconds: default_timeout_seconds(),
            health_timeout_seconds: default_health_timeout_seconds(),
            protocol_version: default_protocol_version(),
            client_type: default_client_type(),
            app_version: default_app_version(),
            tls_verify: true,
        }
    }
}

/// Offline queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Directory the queue document and device identity are stored in
    #[serde(default = "default_storage_path")]
    pub storage_path: String,

    /// Failed drain attempts after which an entry is dropped
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Drain order (newest_first or oldest_first)
    #[serde(default)]
    pub drain_order: DrainOrder,

    /// Interval between drains when running `drain --watch`
    #[serde(default = "default_drain_interval_seconds")]
    pub drain_interval_seconds: u64,
}

impl QueueConfig {
    fn validate(&self) -> Result<(), String> {
        if self.storage_path.trim().is_empty() {
            return Err("queue.storage_path cannot be empty".to_string());
        }

        if self.max_retries == 0 || self.max_retries > 10 {
            return Err(format!(
                "queue.max_retries must be between 1 and 10, got {}",
                self.max_retries
            ));
        }

        if self.drain_interval_seconds == 0 {
            return Err("queue.drain_interval_seconds must be > 0".to_string());
        }

        Ok(())
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            max_retries: default_max_retries(),
            drain_order: DrainOrder::default(),
            drain_interval_seconds: default_drain_interval_seconds(),
        }
    }
}

/// Live session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Delay between confirmed transmission and disposal of the session
    #[serde(default = "default_grace_period_ms")]
    pub grace_period_ms: u64,
}

impl SessionConfig {
    fn validate(&self) -> Result<(), String> {
        if self.grace_period_ms > 60_000 {
            return Err(format!(
                "session.grace_period_ms must be <= 60000, got {}",
                self.grace_period_ms
            ));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: default_grace_period_ms(),
        }
    }
}

/// Payload encryption configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EncryptionConfig {
    /// Encryption scheme applied before transmission
    #[serde(default)]
    pub algorithm: EncryptionAlgorithm,

    /// Device key material (required for aes-256-gcm)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub key: Option<SecretString>,
}

impl EncryptionConfig {
    fn validate(&self, environment: &Environment) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.algorithm == EncryptionAlgorithm::Aes256Gcm {
            let has_key = self
                .key
                .as_ref()
                .map(|k| !k.expose_secret().is_empty())
                .unwrap_or(false);
            if !has_key {
                return Err(
                    "encryption.key cannot be empty when algorithm is 'aes-256-gcm'".to_string(),
                );
            }
        }

        if *environment == Environment::Production
            && self.algorithm == EncryptionAlgorithm::SimulationBase64
        {
            return Err(
                "encryption.algorithm 'simulation-base64' is not encryption and cannot be used \
                in production environments. Set algorithm = \"aes-256-gcm\" and provide encryption.key."
                    .to_string(),
            );
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_transmit_path() -> String {
    "/quickscan/transmit".to_string()
}

fn default_health_path() -> String {
    "/health".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_health_timeout_seconds() -> u64 {
    5
}

fn default_protocol_version() -> String {
    "1.0".to_string()
}

fn default_client_type() -> String {
    "nurse-assistant".to_string()
}

fn default_app_version() -> String {
    "1.0.0".to_string()
}

fn default_true() -> bool {
    true
}

fn default_storage_path() -> String {
    "./data".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_drain_interval_seconds() -> u64 {
    60
}

fn default_grace_period_ms() -> u64 {
    3000
}

fn default_local_path() -> String {
    "./logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
