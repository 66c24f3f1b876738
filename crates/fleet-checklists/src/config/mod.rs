use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::checklists::schema::limits::{DEFAULT_HINT_MAX_CHARS, DEFAULT_NAME_MAX_CHARS};
use crate::checklists::schema::ValidationLimits;
use crate::checklists::targeting::DeploymentMode;

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
    pub checklists: ChecklistConfig,
    pub fleet: FleetConfig,
    pub access: AccessConfig,
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

        let limits = ValidationLimits {
            name_max_chars: limit_var("CHECKLIST_NAME_MAX_CHARS", DEFAULT_NAME_MAX_CHARS)?,
            hint_max_chars: limit_var("CHECKLIST_HINT_MAX_CHARS", DEFAULT_HINT_MAX_CHARS)?,
        };
        let targeting_mode = match env::var("CHECKLIST_TARGETING_MODE") {
            Ok(raw) => DeploymentMode::parse(&raw)
                .ok_or(ConfigError::InvalidTargetingMode { value: raw })?,
            Err(_) => DeploymentMode::default(),
        };

        let roster = match (path_var("FLEET_VEHICLES_CSV"), path_var("FLEET_USERS_CSV")) {
            (Some(vehicles), Some(users)) => Some(RosterPaths { vehicles, users }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteRoster),
        };

        let bootstrap_admin = env::var("CHECKLIST_ADMIN_PROFILE")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| "admin".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            checklists: ChecklistConfig {
                limits,
                targeting_mode,
            },
            fleet: FleetConfig { roster },
            access: AccessConfig { bootstrap_admin },
        })
    }
}

fn limit_var(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse::<usize>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(ConfigError::InvalidLimit { name, value: raw }),
        },
        Err(_) => Ok(default),
    }
}

fn path_var(name: &str) -> Option<PathBuf> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Validation limits and the deployment mode used when resolving assignments.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChecklistConfig {
    pub limits: ValidationLimits,
    pub targeting_mode: DeploymentMode,
}

/// Where the server reads its fleet snapshot from. Without a roster the fleet starts empty.
#[derive(Debug, Clone, Default)]
pub struct FleetConfig {
    pub roster: Option<RosterPaths>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterPaths {
    pub vehicles: PathBuf,
    pub users: PathBuf,
}

/// The administrator profile seeded at startup so profiles can be managed at all.
#[derive(Debug, Clone)]
pub struct AccessConfig {
    pub bootstrap_admin: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLimit { name: &'static str, value: String },
    InvalidTargetingMode { value: String },
    IncompleteRoster,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLimit { name, value } => {
                write!(f, "{name} must be a positive integer, got '{value}'")
            }
            ConfigError::InvalidTargetingMode { value } => write!(
                f,
                "CHECKLIST_TARGETING_MODE must be vehicle_user, vehicle or user, got '{value}'"
            ),
            ConfigError::IncompleteRoster => write!(
                f,
                "FLEET_VEHICLES_CSV and FLEET_USERS_CSV must be set together"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidLimit { .. }
            | ConfigError::InvalidTargetingMode { .. }
            | ConfigError::IncompleteRoster => None,
        }
    }
}
