use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

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
    pub mocks: MockConfig,
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
        let format = match environment {
            AppEnvironment::Production => LogFormat::Full,
            _ => LogFormat::Compact,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, format },
            mocks: MockConfig::from_env()?,
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

/// Tracing output controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Full,
}

/// How long the mock services pretend to wait on the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyProfile {
    Realistic,
    Instant,
}

/// Strategy the mock CRA lookup uses to report progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMode {
    /// Independent weighted draw on every status check.
    Random,
    /// Per-pack counter that only moves forward.
    Monotonic,
}

/// Knobs for the simulated authentication and verification backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockConfig {
    pub latency: LatencyProfile,
    pub status_mode: StatusMode,
    pub poll_max_attempts: u32,
    pub status_seed: Option<u64>,
}

pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 60;

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            latency: LatencyProfile::Realistic,
            status_mode: StatusMode::Random,
            poll_max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
            status_seed: None,
        }
    }
}

impl MockConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let latency = match env::var("EFV_MOCK_LATENCY") {
            Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "realistic" | "" => LatencyProfile::Realistic,
                "instant" | "none" => LatencyProfile::Instant,
                _ => return Err(ConfigError::InvalidLatencyProfile(raw)),
            },
            Err(_) => LatencyProfile::Realistic,
        };

        let status_mode = match env::var("EFV_STATUS_MODE") {
            Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "random" | "" => StatusMode::Random,
                "monotonic" => StatusMode::Monotonic,
                _ => return Err(ConfigError::InvalidStatusMode(raw)),
            },
            Err(_) => StatusMode::Random,
        };

        let poll_max_attempts = match env::var("EFV_POLL_MAX_ATTEMPTS") {
            Ok(raw) => match raw.trim().parse::<u32>() {
                Ok(value) if value > 0 => value,
                _ => return Err(ConfigError::InvalidPollAttempts),
            },
            Err(_) => DEFAULT_POLL_MAX_ATTEMPTS,
        };

        let status_seed = env::var("EFV_STATUS_SEED")
            .ok()
            .map(|raw| raw.trim().parse::<u64>())
            .transpose()
            .map_err(|_| ConfigError::InvalidStatusSeed)?;

        Ok(Self {
            latency,
            status_mode,
            poll_max_attempts,
            status_seed,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLatencyProfile(String),
    InvalidStatusMode(String),
    InvalidPollAttempts,
    InvalidStatusSeed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLatencyProfile(value) => write!(
                f,
                "EFV_MOCK_LATENCY must be 'realistic' or 'instant' (found '{value}')"
            ),
            ConfigError::InvalidStatusMode(value) => write!(
                f,
                "EFV_STATUS_MODE must be 'random' or 'monotonic' (found '{value}')"
            ),
            ConfigError::InvalidPollAttempts => {
                write!(f, "EFV_POLL_MAX_ATTEMPTS must be a positive integer")
            }
            ConfigError::InvalidStatusSeed => write!(f, "EFV_STATUS_SEED must be a valid u64"),
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
