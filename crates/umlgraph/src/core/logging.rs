//! Tracing setup for the library and the CLI
//!
//! Spans cover hierarchy analysis, each layout stage and store mutations.
//! Output always goes to stderr so stdout stays free for diagram JSON.
//!
//! ```rust,no_run
//! use umlgraph::core::logging::init_logging;
//!
//! init_logging(None, None).unwrap();
//! ```
//!
//! Settings resolve from the explicit argument first, then from
//! `UMLGRAPH_LOG_LEVEL` (or `RUST_LOG`) and `UMLGRAPH_LOG_FORMAT`.
//! The level accepts any `EnvFilter` directive:
//!
//! ```bash
//! RUST_LOG="info,umlgraph::layout::general=debug" umlgraph layout -i diagram.json
//! ```

use std::env;
use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

const LEVEL_VAR: &str = "UMLGRAPH_LOG_LEVEL";
const FORMAT_VAR: &str = "UMLGRAPH_LOG_FORMAT";
const DEFAULT_LEVEL: &str = "info";

/// Failure to install the global subscriber
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Unknown log format '{0}' (expected compact, pretty or json)")]
    UnknownFormat(String),

    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(#[from] tracing_subscriber::util::TryInitError),
}

/// How log lines are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One line per event, no source locations
    #[default]
    Compact,
    /// Multi-line with colors, targets and span enter/exit
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(LoggingError::UnknownFormat(s.to_string())),
        }
    }
}

impl LogFormat {
    pub fn variants() -> &'static [&'static str] {
        &["compact", "pretty", "json"]
    }

    fn layer(self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let base = fmt::layer().with_writer(std::io::stderr).with_level(true);
        match self {
            Self::Compact => base
                .with_target(false)
                .with_span_events(FmtSpan::NONE)
                .compact()
                .boxed(),
            Self::Pretty => base
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::ACTIVE)
                .pretty()
                .boxed(),
            Self::Json => base
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_span_events(FmtSpan::ACTIVE)
                .json()
                .boxed(),
        }
    }
}

/// Resolve the effective log level from an explicit value or the environment
pub fn resolve_log_level(level: Option<&str>) -> String {
    level
        .map(str::to_string)
        .or_else(|| env::var(LEVEL_VAR).ok())
        .or_else(|| env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string())
}

/// Resolve the effective log format from an explicit value or the environment
pub fn resolve_log_format(format: Option<&str>) -> Result<LogFormat, LoggingError> {
    match format.map(str::to_string).or_else(|| env::var(FORMAT_VAR).ok()) {
        Some(name) => name.parse(),
        None => Ok(LogFormat::default()),
    }
}

/// Install the global subscriber.
///
/// An unparseable level directive degrades to `info` rather than failing.
pub fn init_logging(level: Option<&str>, format: Option<&str>) -> Result<(), LoggingError> {
    let format = resolve_log_format(format)?;
    let filter = EnvFilter::try_new(resolve_log_level(level))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL));

    Registry::default()
        .with(format.layer())
        .with(filter)
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_names_are_case_insensitive() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Pretty".parse::<LogFormat>().unwrap(), LogFormat::Pretty);
    }

    #[test]
    fn test_unknown_format_names_the_input() {
        let err = "xml".parse::<LogFormat>().unwrap_err();
        assert!(err.to_string().contains("'xml'"));
    }

    #[test]
    fn test_explicit_values_win() {
        assert_eq!(resolve_log_level(Some("trace")), "trace");
        assert_eq!(resolve_log_format(Some("json")).unwrap(), LogFormat::Json);
    }
}
