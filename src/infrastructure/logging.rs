use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::{LogFormat, LoggingConfig};

/// Level used when `--debug` is passed
pub const DEBUG_LEVEL: &str = "debug";

/// Installs the global subscriber.
///
/// Log lines go to stderr so that stdout carries only the report.
/// `RUST_LOG` takes precedence over the configured level unless `debug` is set.
pub fn init_logging(config: &LoggingConfig, debug: bool) {
    let filter = build_filter(config, debug);

    match config.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_span_events(FmtSpan::CLOSE),
                )
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .pretty()
                        .with_writer(std::io::stderr)
                        .with_target(true)
                        .with_span_events(FmtSpan::CLOSE),
                )
                .init();
        }
    }

    let debug_enabled = debug;
    tracing::debug!(level = %config.level, debug_enabled, "Logging initialized");
}

fn build_filter(config: &LoggingConfig, debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new(DEBUG_LEVEL)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
    }
}
