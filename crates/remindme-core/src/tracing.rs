//! Log output for the `remindme` binary.
//!
//! Library code only emits events through `tracing` macros. The binary picks
//! a [`TracingConfig`], optionally overrides its [`LogFormat`] from
//! `--log-format` or `log_format` in `config.toml`, and installs the
//! subscriber once. Events always go to stderr so stdout stays parseable with
//! `--json`.
//!
//! ```ignore
//! use remindme_core::tracing::{init_tracing, LogFormat, TracingConfig};
//!
//! init_tracing(TracingConfig::cli().with_format(LogFormat::Json))?;
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan, prelude::*};

#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to set global tracing subscriber: {0}")]
    SetGlobalSubscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("failed to parse env filter: {0}")]
    EnvFilter(#[from] tracing_subscriber::filter::ParseError),

    #[error("unknown log format '{0}' (expected pretty, compact or json)")]
    UnknownFormat(String),
}

/// How each event is laid out on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Multi-line, for reading a debug session.
    Pretty,
    /// One line per event.
    #[default]
    Compact,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = TracingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(TracingError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pretty => "pretty",
            Self::Compact => "compact",
            Self::Json => "json",
        })
    }
}

#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Level for `remindme*` targets when `RUST_LOG` is unset.
    pub level: Level,
    pub format: LogFormat,
    /// File and line of the call site.
    pub location: bool,
    /// Module path of the call site.
    pub target: bool,
    pub timestamp: bool,
    /// Log span open/close, useful around backend calls.
    pub span_events: bool,
    /// Directive used instead of `RUST_LOG` and `level`.
    pub env_filter: Option<String>,
}

impl TracingConfig {
    /// Normal runs: warnings and errors only, bare lines.
    #[must_use]
    pub fn cli() -> Self {
        Self {
            level: Level::WARN,
            format: LogFormat::Compact,
            location: false,
            target: false,
            timestamp: false,
            span_events: false,
            env_filter: None,
        }
    }

    /// `--debug`: everything from our crates, with call sites.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            level: Level::DEBUG,
            location: true,
            target: true,
            span_events: true,
            ..Self::cli()
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        // Machine readers want the time on every record.
        if format == LogFormat::Json {
            self.timestamp = true;
        }
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    fn filter(&self) -> Result<EnvFilter, TracingError> {
        if let Some(ref directive) = self.env_filter {
            return Ok(EnvFilter::try_new(directive)?);
        }
        Ok(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("remindme={}", self.level))))
    }
}

/// Installs the global subscriber described by `config`.
///
/// `RUST_LOG` overrides the configured level unless an explicit filter was
/// set with [`TracingConfig::with_env_filter`].
///
/// # Errors
///
/// Fails if a subscriber is already installed or the filter does not parse.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.filter()?;

    let spans = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let base = tracing_subscriber::fmt::layer()
        .with_file(config.location)
        .with_line_number(config.location)
        .with_target(config.target)
        .with_span_events(spans)
        .with_writer(std::io::stderr);

    let layer = match (config.format, config.timestamp) {
        (LogFormat::Pretty, true) => base.pretty().boxed(),
        (LogFormat::Pretty, false) => base.pretty().without_time().boxed(),
        (LogFormat::Compact, true) => base.compact().boxed(),
        (LogFormat::Compact, false) => base.compact().without_time().boxed(),
        (LogFormat::Json, _) => base.json().boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
