use crate::config::TelemetryConfig;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Targets whose chatter drowns out intake logs unless a directive asks for them.
const QUIET_TARGETS: [&str; 3] = ["lettre", "hyper", "rustls"];

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid APP_LOG_LEVEL '{value}'")]
    Filter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("tracing subscriber already installed: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Directive string for `log_level`, with mail and HTTP internals held at `warn`
/// unless the level already names them.
pub fn filter_directives(log_level: &str) -> String {
    let level = log_level.trim();
    let mut directives = vec![level.to_string()];
    directives.extend(
        QUIET_TARGETS
            .iter()
            .filter(|target| !level.contains(*target))
            .map(|target| format!("{target}=warn")),
    );
    directives.join(",")
}

/// Install the global subscriber. `RUST_LOG` replaces the configured level entirely.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(filter_directives(&config.log_level)).map_err(|source| {
            TelemetryError::Filter {
                value: config.log_level.clone(),
                source,
            }
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}
