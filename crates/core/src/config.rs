use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub dataset: DatasetConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Connection settings for the model backend. One synchronous call per
/// prompt with a deliberately generous timeout; generation can take minutes.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    pub base_url: String,
    pub app_name: String,
    pub username: String,
    pub password: SecretString,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct DatasetConfig {
    pub leads_path: PathBuf,
    pub details_path: PathBuf,
    pub cache_path: Option<PathBuf>,
    pub merge_key: String,
    pub origin_column: String,
    pub origin_value: String,
    pub required_column: String,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub requests_per_minute: u32,
    pub auth_username: String,
    pub auth_password: SecretString,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub gateway_base_url: Option<String>,
    pub gateway_username: Option<String>,
    pub gateway_password: Option<String>,
    pub leads_path: Option<PathBuf>,
    pub details_path: Option<PathBuf>,
    pub auth_username: Option<String>,
    pub auth_password: Option<String>,
    pub requests_per_minute: Option<u32>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig {
                base_url: "http://127.0.0.1:8300/model/inference/get-response".to_string(),
                app_name: "prospector-agent".to_string(),
                username: String::new(),
                password: String::new().into(),
                timeout_secs: 300,
            },
            dataset: DatasetConfig {
                leads_path: PathBuf::from("data/leads.csv"),
                details_path: PathBuf::from("data/lead_details.csv"),
                cache_path: Some(PathBuf::from("data/filtered_leads.csv")),
                merge_key: "Lead Number".to_string(),
                origin_column: "Lead Origin".to_string(),
                origin_value: "Landing Page Submission".to_string(),
                required_column: "Company".to_string(),
            },
            server: ServerConfig {
                bind_address: "0.0.0.0".to_string(),
                port: 8301,
                requests_per_minute: 10,
                auth_username: String::new(),
                auth_password: String::new().into(),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("prospector.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(gateway) = patch.gateway {
            if let Some(base_url) = gateway.base_url {
                self.gateway.base_url = base_url;
            }
            if let Some(app_name) = gateway.app_name {
                self.gateway.app_name = app_name;
            }
            if let Some(username) = gateway.username {
                self.gateway.username = username;
            }
            if let Some(password) = gateway.password {
                self.gateway.password = secret_value(password);
            }
            if let Some(timeout_secs) = gateway.timeout_secs {
                self.gateway.timeout_secs = timeout_secs;
            }
        }

        if let Some(dataset) = patch.dataset {
            if let Some(leads_path) = dataset.leads_path {
                self.dataset.leads_path = leads_path;
            }
            if let Some(details_path) = dataset.details_path {
                self.dataset.details_path = details_path;
            }
            if let Some(cache_path) = dataset.cache_path {
                self.dataset.cache_path = Some(cache_path);
            }
            if let Some(merge_key) = dataset.merge_key {
                self.dataset.merge_key = merge_key;
            }
            if let Some(origin_column) = dataset.origin_column {
                self.dataset.origin_column = origin_column;
            }
            if let Some(origin_value) = dataset.origin_value {
                self.dataset.origin_value = origin_value;
            }
            if let Some(required_column) = dataset.required_column {
                self.dataset.required_column = required_column;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(requests_per_minute) = server.requests_per_minute {
                self.server.requests_per_minute = requests_per_minute;
            }
            if let Some(auth_username) = server.auth_username {
                self.server.auth_username = auth_username;
            }
            if let Some(auth_password) = server.auth_password {
                self.server.auth_password = secret_value(auth_password);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("PROSPECTOR_GATEWAY_BASE_URL") {
            self.gateway.base_url = value;
        }
        if let Some(value) = read_env("PROSPECTOR_GATEWAY_APP_NAME") {
            self.gateway.app_name = value;
        }
        if let Some(value) = read_env("PROSPECTOR_GATEWAY_USERNAME") {
            self.gateway.username = value;
        }
        if let Some(value) = read_env("PROSPECTOR_GATEWAY_PASSWORD") {
            self.gateway.password = secret_value(value);
        }
        if let Some(value) = read_env("PROSPECTOR_GATEWAY_TIMEOUT_SECS") {
            self.gateway.timeout_secs = parse_u64("PROSPECTOR_GATEWAY_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("PROSPECTOR_DATASET_LEADS_PATH") {
            self.dataset.leads_path = PathBuf::from(value);
        }
        if let Some(value) = read_env("PROSPECTOR_DATASET_DETAILS_PATH") {
            self.dataset.details_path = PathBuf::from(value);
        }
        if let Some(value) = read_env("PROSPECTOR_DATASET_CACHE_PATH") {
            self.dataset.cache_path = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("PROSPECTOR_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("PROSPECTOR_SERVER_PORT") {
            self.server.port = parse_u16("PROSPECTOR_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("PROSPECTOR_SERVER_REQUESTS_PER_MINUTE") {
            self.server.requests_per_minute =
                parse_u32("PROSPECTOR_SERVER_REQUESTS_PER_MINUTE", &value)?;
        }
        if let Some(value) = read_env("PROSPECTOR_SERVER_AUTH_USERNAME") {
            self.server.auth_username = value;
        }
        if let Some(value) = read_env("PROSPECTOR_SERVER_AUTH_PASSWORD") {
            self.server.auth_password = secret_value(value);
        }

        let log_level =
            read_env("PROSPECTOR_LOGGING_LEVEL").or_else(|| read_env("PROSPECTOR_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("PROSPECTOR_LOGGING_FORMAT").or_else(|| read_env("PROSPECTOR_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(gateway_base_url) = overrides.gateway_base_url {
            self.gateway.base_url = gateway_base_url;
        }
        if let Some(gateway_username) = overrides.gateway_username {
            self.gateway.username = gateway_username;
        }
        if let Some(gateway_password) = overrides.gateway_password {
            self.gateway.password = secret_value(gateway_password);
        }
        if let Some(leads_path) = overrides.leads_path {
            self.dataset.leads_path = leads_path;
        }
        if let Some(details_path) = overrides.details_path {
            self.dataset.details_path = details_path;
        }
        if let Some(auth_username) = overrides.auth_username {
            self.server.auth_username = auth_username;
        }
        if let Some(auth_password) = overrides.auth_password {
            self.server.auth_password = secret_value(auth_password);
        }
        if let Some(requests_per_minute) = overrides.requests_per_minute {
            self.server.requests_per_minute = requests_per_minute;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_gateway(&self.gateway)?;
        validate_dataset(&self.dataset)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("prospector.toml"), PathBuf::from("config/prospector.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_gateway(gateway: &GatewayConfig) -> Result<(), ConfigError> {
    let base_url = gateway.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "gateway.base_url must start with http:// or https://".to_string(),
        ));
    }

    if gateway.app_name.trim().is_empty() {
        return Err(ConfigError::Validation("gateway.app_name must not be empty".to_string()));
    }

    if gateway.username.trim().is_empty() {
        return Err(ConfigError::Validation(
            "gateway.username is required to authenticate against the model backend".to_string(),
        ));
    }
    if gateway.password.expose_secret().is_empty() {
        return Err(ConfigError::Validation(
            "gateway.password is required to authenticate against the model backend".to_string(),
        ));
    }

    if gateway.timeout_secs == 0 || gateway.timeout_secs > 3600 {
        return Err(ConfigError::Validation(
            "gateway.timeout_secs must be in range 1..=3600".to_string(),
        ));
    }

    Ok(())
}

fn validate_dataset(dataset: &DatasetConfig) -> Result<(), ConfigError> {
    if dataset.leads_path.as_os_str().is_empty() || dataset.details_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "dataset.leads_path and dataset.details_path must not be empty".to_string(),
        ));
    }

    for (name, value) in [
        ("dataset.merge_key", &dataset.merge_key),
        ("dataset.origin_column", &dataset.origin_column),
        ("dataset.origin_value", &dataset.origin_value),
        ("dataset.required_column", &dataset.required_column),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{name} must not be empty")));
        }
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.requests_per_minute == 0 {
        return Err(ConfigError::Validation(
            "server.requests_per_minute must be greater than zero".to_string(),
        ));
    }

    if server.auth_username.trim().is_empty() {
        return Err(ConfigError::Validation(
            "server.auth_username is required. Inbound requests are Basic Auth protected"
                .to_string(),
        ));
    }
    if server.auth_password.expose_secret().is_empty() {
        return Err(ConfigError::Validation(
            "server.auth_password is required. Inbound requests are Basic Auth protected"
                .to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    gateway: Option<GatewayPatch>,
    dataset: Option<DatasetPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct GatewayPatch {
    base_url: Option<String>,
    app_name: Option<String>,
    username: Option<String>,
    password: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct DatasetPatch {
    leads_path: Option<PathBuf>,
    details_path: Option<PathBuf>,
    cache_path: Option<PathBuf>,
    merge_key: Option<String>,
    origin_column: Option<String>,
    origin_value: Option<String>,
    required_column: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    requests_per_minute: Option<u32>,
    auth_username: Option<String>,
    auth_password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
