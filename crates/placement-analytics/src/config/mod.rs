use crate::placements::{AnalyticsPolicy, PolicyPreset, ReportingCalendar};
use std::env;
use std::fmt;
use std::fs;
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
    pub analytics: AnalyticsConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            analytics: AnalyticsConfig::from_env()?,
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Reporting calendar and dashboard policy defaults.
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    pub calendar: ReportingCalendar,
    pub preset: PolicyPreset,
    /// JSON `AnalyticsPolicy` that replaces the preset when set.
    pub policy_file: Option<PathBuf>,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            calendar: ReportingCalendar::utc(),
            preset: PolicyPreset::Operations,
            policy_file: None,
        }
    }
}

impl AnalyticsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let calendar = match env::var("APP_REPORT_UTC_OFFSET_MINUTES") {
            Ok(raw) => raw
                .trim()
                .parse::<i32>()
                .ok()
                .and_then(ReportingCalendar::from_offset_minutes)
                .ok_or(ConfigError::InvalidUtcOffset { value: raw })?,
            Err(_) => ReportingCalendar::utc(),
        };

        let preset = match env::var("APP_ANALYTICS_POLICY") {
            Ok(raw) => {
                PolicyPreset::from_code(&raw).ok_or(ConfigError::UnknownPolicy { value: raw })?
            }
            Err(_) => PolicyPreset::Operations,
        };

        let policy_file = env::var("APP_ANALYTICS_POLICY_FILE")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            calendar,
            preset,
            policy_file,
        })
    }

    /// Resolves the effective policy, reading the override file if one is
    /// configured.
    pub fn policy(&self) -> Result<AnalyticsPolicy, ConfigError> {
        let Some(path) = &self.policy_file else {
            return Ok(AnalyticsPolicy::from_preset(self.preset));
        };

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::PolicyFileRead {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::PolicyFileParse {
            path: path.clone(),
            source,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidUtcOffset {
        value: String,
    },
    UnknownPolicy {
        value: String,
    },
    PolicyFileRead {
        path: PathBuf,
        source: std::io::Error,
    },
    PolicyFileParse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidUtcOffset { value } => write!(
                f,
                "APP_REPORT_UTC_OFFSET_MINUTES must be whole minutes within one day, got '{}'",
                value
            ),
            ConfigError::UnknownPolicy { value } => write!(
                f,
                "APP_ANALYTICS_POLICY must be 'operations' or 'manager', got '{}'",
                value
            ),
            ConfigError::PolicyFileRead { path, .. } => {
                write!(f, "unable to read policy file {}", path.display())
            }
            ConfigError::PolicyFileParse { path, .. } => {
                write!(f, "policy file {} is not a valid policy", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort
            | ConfigError::InvalidUtcOffset { .. }
            | ConfigError::UnknownPolicy { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::PolicyFileRead { source, .. } => Some(source),
            ConfigError::PolicyFileParse { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placements::StaleStateMeasure;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_REPORT_UTC_OFFSET_MINUTES");
        env::remove_var("APP_ANALYTICS_POLICY");
        env::remove_var("APP_ANALYTICS_POLICY_FILE");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.analytics.calendar, ReportingCalendar::utc());
        assert_eq!(config.analytics.preset, PolicyPreset::Operations);
        assert_eq!(
            config.analytics.policy().expect("preset policy"),
            AnalyticsPolicy::operations()
        );
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn reads_calendar_offset_and_manager_preset() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_REPORT_UTC_OFFSET_MINUTES", "-300");
        env::set_var("APP_ANALYTICS_POLICY", "manager");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.analytics.calendar.offset_minutes(), -300);
        let policy = config.analytics.policy().expect("preset policy");
        assert_eq!(policy.stale_measure, StaleStateMeasure::StaleThreshold);
        assert!(!policy.include_unknown_states);
        reset_env();
    }

    #[test]
    fn rejects_out_of_range_offset_and_unknown_preset() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_REPORT_UTC_OFFSET_MINUTES", "1440");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidUtcOffset { .. })
        ));

        reset_env();
        env::set_var("APP_ANALYTICS_POLICY", "regional");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::UnknownPolicy { .. })
        ));
        reset_env();
    }

    #[test]
    fn policy_file_overrides_preset() {
        let path = env::temp_dir().join(format!("placement-policy-{}.json", std::process::id()));
        fs::write(
            &path,
            r#"{"stale_days_threshold": 45, "top_n": {"pareto": 3}}"#,
        )
        .expect("write policy file");

        let config = AnalyticsConfig {
            policy_file: Some(path.clone()),
            ..AnalyticsConfig::default()
        };
        let policy = config.policy().expect("policy file parses");
        assert_eq!(policy.stale_days_threshold, 45);
        assert_eq!(policy.top_n.pareto, 3);
        assert_eq!(policy.top_n.cities, 10);

        fs::write(&path, "not json").expect("rewrite policy file");
        assert!(matches!(
            config.policy(),
            Err(ConfigError::PolicyFileParse { .. })
        ));
        fs::remove_file(&path).ok();
    }
}
