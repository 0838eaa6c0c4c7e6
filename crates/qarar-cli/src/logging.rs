//! Logging setup for the analyzer CLI
//!
//! Log lines go to stderr so that `--output json` keeps stdout clean.
//! `RUST_LOG` takes precedence over the configured default filter.

use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default log level filter
    pub default_filter: String,

    /// Whether to include file/line information in logs
    pub include_location: bool,

    /// Whether to log span open/close events
    pub enable_spans: bool,

    /// Whether to colorize output
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default_filter: "warn,qarar_cli=info,qarar_analyzer=info,qarar_driver_sqlite=info"
                .to_string(),
            include_location: false,
            enable_spans: false,
            ansi: true,
        }
    }
}

impl LoggingConfig {
    /// Verbose configuration for `--verbose`
    pub fn verbose() -> Self {
        Self {
            default_filter: "info,qarar_cli=debug,qarar_core=debug,qarar_analyzer=debug,qarar_driver_sqlite=debug"
                .to_string(),
            include_location: cfg!(debug_assertions),
            enable_spans: true,
            ansi: true,
        }
    }

    pub fn for_cli(verbose: bool) -> Self {
        if verbose {
            Self::verbose()
        } else {
            Self::default()
        }
    }
}

/// Initialize the logging system with the given configuration
pub fn init(config: LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    let span_events = if config.enable_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_span_events(span_events)
        .with_ansi(config.ansi)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(console_layer)
        .try_init()?;

    tracing::debug!(filter = %config.default_filter, "logging initialized");
    Ok(())
}
