//! Tracing subscriber setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::domain::models::LoggingConfig;

/// The log filter for this process: `RUST_LOG` wins, the configured level is
/// the fallback.
fn filter_for(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.clone()))
}

/// Install the global tracing subscriber per the logging configuration.
///
/// Logs go to stderr so they never interleave with command output on stdout,
/// which `--json` consumers parse.
pub fn init_tracing(config: &LoggingConfig) {
    let registry = tracing_subscriber::registry().with(filter_for(config));
    if config.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_falls_back_to_configured_level() {
        std::env::remove_var("RUST_LOG");
        let config = LoggingConfig { level: "debug".to_string(), format: "pretty".to_string() };
        assert_eq!(filter_for(&config).to_string(), "debug");
    }
}
