use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

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
    pub app_name: String,
    pub seed_listings: bool,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );
        let app_name = env::var("APP_NAME").unwrap_or_else(|_| "Loob".to_string());

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let seed_listings = match env::var("APP_SEED_LISTINGS") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                name: "APP_SEED_LISTINGS",
                value: raw,
            })?,
            Err(_) => true,
        };

        let mail = MailConfig::from_env(&app_name)?;

        Ok(Self {
            environment,
            app_name,
            seed_listings,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            mail,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
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

/// Outbound mail settings handed to the notification dispatcher at construction.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub transport: MailTransport,
    pub from_address: String,
    pub from_name: String,
    pub timeout: Duration,
    pub delivery: DeliveryPolicy,
}

impl MailConfig {
    /// Log transport, best-effort delivery, ten second timeout.
    pub fn log_only(app_name: &str) -> Self {
        Self {
            transport: MailTransport::Log,
            from_address: DEFAULT_FROM_ADDRESS.to_string(),
            from_name: app_name.to_string(),
            timeout: Duration::from_secs(DEFAULT_MAIL_TIMEOUT_SECS),
            delivery: DeliveryPolicy::BestEffort,
        }
    }

    fn from_env(app_name: &str) -> Result<Self, ConfigError> {
        let transport = match env::var("MAIL_MAILER")
            .unwrap_or_else(|_| "log".to_string())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "log" => MailTransport::Log,
            "smtp" => MailTransport::Smtp(SmtpSettings::from_env()?),
            other => return Err(ConfigError::UnknownMailer(other.to_string())),
        };

        let from_address =
            env::var("MAIL_FROM_ADDRESS").unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string());
        let from_name = env::var("MAIL_FROM_NAME").unwrap_or_else(|_| app_name.to_string());

        let timeout_secs = env::var("MAIL_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_MAIL_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidMailTimeout)?;

        let delivery = match env::var("MAIL_DELIVERY")
            .unwrap_or_else(|_| "best_effort".to_string())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "best_effort" | "best-effort" => DeliveryPolicy::BestEffort,
            "strict" => DeliveryPolicy::Strict,
            other => return Err(ConfigError::UnknownDeliveryPolicy(other.to_string())),
        };

        Ok(Self {
            transport,
            from_address,
            from_name,
            timeout: Duration::from_secs(timeout_secs),
            delivery,
        })
    }
}

const DEFAULT_FROM_ADDRESS: &str = "no-reply@loob.example";
const DEFAULT_MAIL_TIMEOUT_SECS: u64 = 10;

/// Which mail transport the dispatcher is built on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailTransport {
    /// Render messages into the log instead of sending them.
    Log,
    Smtp(SmtpSettings),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub encryption: SmtpEncryption,
}

impl SmtpSettings {
    fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("MAIL_HOST")
            .ok()
            .filter(|host| !host.trim().is_empty())
            .ok_or(ConfigError::MissingMailHost)?;
        let port = env::var("MAIL_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidMailPort)?;
        let encryption = match env::var("MAIL_ENCRYPTION")
            .unwrap_or_else(|_| "starttls".to_string())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "starttls" => SmtpEncryption::StartTls,
            "tls" | "ssl" => SmtpEncryption::Tls,
            "none" | "" => SmtpEncryption::None,
            other => return Err(ConfigError::UnknownEncryption(other.to_string())),
        };

        Ok(Self {
            host,
            port,
            username: env::var("MAIL_USERNAME").ok().filter(|v| !v.is_empty()),
            password: env::var("MAIL_PASSWORD").ok().filter(|v| !v.is_empty()),
            encryption,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpEncryption {
    StartTls,
    Tls,
    None,
}

/// How a failed confirmation dispatch is reported to the submitter.
///
/// The application record is persisted before dispatch under both policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryPolicy {
    /// Report the submission as accepted and flag the confirmation as failed.
    BestEffort,
    /// Report the submission as failed when the confirmation could not be sent.
    Strict,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidFlag { name: &'static str, value: String },
    UnknownMailer(String),
    MissingMailHost,
    InvalidMailPort,
    UnknownEncryption(String),
    InvalidMailTimeout,
    UnknownDeliveryPolicy(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be a boolean flag, found '{value}'")
            }
            ConfigError::UnknownMailer(value) => {
                write!(f, "MAIL_MAILER must be 'log' or 'smtp', found '{value}'")
            }
            ConfigError::MissingMailHost => {
                write!(f, "MAIL_HOST is required when MAIL_MAILER=smtp")
            }
            ConfigError::InvalidMailPort => write!(f, "MAIL_PORT must be a valid u16"),
            ConfigError::UnknownEncryption(value) => write!(
                f,
                "MAIL_ENCRYPTION must be 'starttls', 'tls' or 'none', found '{value}'"
            ),
            ConfigError::InvalidMailTimeout => {
                write!(f, "MAIL_TIMEOUT_SECS must be a positive number of seconds")
            }
            ConfigError::UnknownDeliveryPolicy(value) => write!(
                f,
                "MAIL_DELIVERY must be 'best_effort' or 'strict', found '{value}'"
            ),
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
