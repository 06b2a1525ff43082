use crate::leads::{ExportProfile, QuoteMode};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub search: SearchConfig,
    pub export: ExportConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let ansi = match env::var("APP_LOG_ANSI") {
            Ok(value) => parse_flag("APP_LOG_ANSI", &value)?,
            Err(_) => false,
        };

        let base_url =
            env::var("LEADS_API_BASE_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
        validate_base_url(&base_url)?;

        let output_dir = env::var("LEADS_EXPORT_DIR").unwrap_or_else(|_| ".".to_string());
        let profile = match env::var("LEADS_CSV_PROFILE") {
            Ok(value) => {
                ExportProfile::parse(&value).ok_or(ConfigError::InvalidProfile { value })?
            }
            Err(_) => ExportProfile::default(),
        };
        let quoting = match env::var("LEADS_CSV_QUOTING") {
            Ok(value) => QuoteMode::parse(&value).ok_or(ConfigError::InvalidQuoting { value })?,
            Err(_) => QuoteMode::default(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, ansi },
            search: SearchConfig { base_url },
            export: ExportConfig {
                output_dir: PathBuf::from(output_dir),
                profile,
                quoting,
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Log filter and formatting controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

/// Location of the lead-search API.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub base_url: String,
}

/// Defaults applied to CSV exports.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub profile: ExportProfile,
    pub quoting: QuoteMode,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidBaseUrl { value: String },
    InvalidProfile { value: String },
    InvalidQuoting { value: String },
    InvalidFlag { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidBaseUrl { value } => write!(
                f,
                "LEADS_API_BASE_URL must be an absolute http(s) URL, got '{value}'"
            ),
            ConfigError::InvalidProfile { value } => write!(
                f,
                "LEADS_CSV_PROFILE must be one of contact, standard, extended; got '{value}'"
            ),
            ConfigError::InvalidQuoting { value } => write!(
                f,
                "LEADS_CSV_QUOTING must be standard or legacy; got '{value}'"
            ),
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be true or false; got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}

fn validate_base_url(value: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidBaseUrl {
        value: value.to_string(),
    };
    let url = reqwest::Url::parse(value.trim()).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(invalid()),
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: value.to_string(),
        }),
    }
}
