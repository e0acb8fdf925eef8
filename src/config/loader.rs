//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::QuickScanConfig;
use super::secret::secret_string;
use crate::domain::errors::QuickScanError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Environment variable that overrides `dashboard.base_url`
pub const BASE_URL_ENV: &str = "QUICKSCAN_API_BASE_URL";

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("placeholder pattern is a valid regex")
    })
}

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (`${VAR}` syntax)
/// 3. Parses the TOML into [`QuickScanConfig`]
/// 4. Applies environment variable overrides (`QUICKSCAN_*` prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns [`QuickScanError::Configuration`] if the file is missing or
/// unreadable, a referenced variable is unset, parsing fails, or validation
/// rejects the result.
///
/// # Examples
///
/// ```no_run
/// use quickscan::config::loader::load_config;
///
/// let config = load_config("quickscan.toml").expect("Failed to load config");
/// println!("{}", config.dashboard.transmit_url());
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<QuickScanConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(QuickScanError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        QuickScanError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let mut config = parse_config(&contents)?;
    finish(&mut config)?;
    Ok(config)
}

/// Loads configuration, falling back to defaults when the file does not exist
///
/// Environment overrides and validation still apply, so a device can be
/// pointed at a dashboard with nothing but `QUICKSCAN_API_BASE_URL`.
///
/// # Errors
///
/// Same as [`load_config`], except that a missing file is not an error.
pub fn load_config_or_default(path: impl AsRef<Path>) -> Result<QuickScanConfig> {
    let path = path.as_ref();
    if path.exists() {
        return load_config(path);
    }

    tracing::debug!(path = %path.display(), "Configuration file not found, using defaults");
    let mut config = QuickScanConfig::default();
    finish(&mut config)?;
    Ok(config)
}

/// Parses TOML text after `${VAR}` substitution, without overrides or validation
pub fn parse_config(contents: &str) -> Result<QuickScanConfig> {
    let contents = substitute_env_vars(contents)?;
    toml::from_str(&contents)
        .map_err(|e| QuickScanError::Configuration(format!("Failed to parse TOML: {}", e)))
}

fn finish(config: &mut QuickScanConfig) -> Result<()> {
    apply_overrides(config, |name| std::env::var(name).ok())?;

    config.validate().map_err(|e| {
        QuickScanError::Configuration(format!("Configuration validation failed: {}", e))
    })
}

/// Substitutes environment variables in the format `${VAR_NAME}`
///
/// Comment lines are copied through untouched.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = placeholder_regex();
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.split_inclusive('\n') {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
    }

    if !missing_vars.is_empty() {
        return Err(QuickScanError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

fn parse_override<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        QuickScanError::Configuration(format!("Invalid value '{}' for {}", value, name))
    })
}

/// Applies `QUICKSCAN_*` overrides read through `lookup`
///
/// Variables follow the pattern `QUICKSCAN_<SECTION>_<KEY>`, except for the
/// dashboard URL which uses [`BASE_URL_ENV`].
fn apply_overrides<F>(config: &mut QuickScanConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("QUICKSCAN_ENVIRONMENT") {
        config.environment = match val.to_lowercase().as_str() {
            "development" => super::schema::Environment::Development,
            "staging" => super::schema::Environment::Staging,
            "production" => super::schema::Environment::Production,
            _ => {
                return Err(QuickScanError::Configuration(format!(
                    "Invalid value '{}' for QUICKSCAN_ENVIRONMENT",
                    val
                )))
            }
        };
    }

    // Application overrides
    if let Some(val) = lookup("QUICKSCAN_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Dashboard overrides
    if let Some(val) = lookup(BASE_URL_ENV) {
        config.dashboard.base_url = val;
    }
    if let Some(val) = lookup("QUICKSCAN_DASHBOARD_TIMEOUT_SECONDS") {
        config.dashboard.timeout_seconds =
            parse_override("QUICKSCAN_DASHBOARD_TIMEOUT_SECONDS", &val)?;
    }
    if let Some(val) = lookup("QUICKSCAN_DASHBOARD_TLS_VERIFY") {
        config.dashboard.tls_verify = parse_override("QUICKSCAN_DASHBOARD_TLS_VERIFY", &val)?;
    }

    // Queue overrides
    if let Some(val) = lookup("QUICKSCAN_QUEUE_STORAGE_PATH") {
        config.queue.storage_path = val;
    }
    if let Some(val) = lookup("QUICKSCAN_QUEUE_MAX_RETRIES") {
        config.queue.max_retries = parse_override("QUICKSCAN_QUEUE_MAX_RETRIES", &val)?;
    }
    if let Some(val) = lookup("QUICKSCAN_QUEUE_DRAIN_ORDER") {
        config.queue.drain_order = val.parse().map_err(QuickScanError::Configuration)?;
    }
    if let Some(val) = lookup("QUICKSCAN_QUEUE_DRAIN_INTERVAL_SECONDS") {
        config.queue.drain_interval_seconds =
            parse_override("QUICKSCAN_QUEUE_DRAIN_INTERVAL_SECONDS", &val)?;
    }

    // Session overrides
    if let Some(val) = lookup("QUICKSCAN_SESSION_GRACE_PERIOD_MS") {
        config.session.grace_period_ms = parse_override("QUICKSCAN_SESSION_GRACE_PERIOD_MS", &val)?;
    }

    // Encryption overrides
    if let Some(val) = lookup("QUICKSCAN_ENCRYPTION_ALGORITHM") {
        config.encryption.algorithm = val.parse().map_err(QuickScanError::Configuration)?;
    }
    if let Some(val) = lookup("QUICKSCAN_ENCRYPTION_KEY") {
        config.encryption.key = Some(secret_string(val));
    }

    // Logging overrides
    if let Some(val) = lookup("QUICKSCAN_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = parse_override("QUICKSCAN_LOGGING_LOCAL_ENABLED", &val)?;
    }
    if let Some(val) = lookup("QUICKSCAN_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }

    Ok(())
}
