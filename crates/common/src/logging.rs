//! Tracing setup for VBatch tools and hosts.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Level used when neither `RUST_LOG` nor the configured level parses.
const FALLBACK_LEVEL: &str = "info";

/// Build the filter: `RUST_LOG` first, then `config.level`, then `info`.
fn build_filter(config: &LoggingConfig) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}

/// Install the global subscriber described by `config`.
///
/// Returns `false` when a subscriber was already installed; the first one
/// stays in place.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let filter = build_filter(config);
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish()).is_ok()
    } else {
        tracing::subscriber::set_global_default(builder.compact().finish()).is_ok()
    };

    if installed {
        tracing::debug!(level = %config.level, json = config.json, "logging initialized");
    }
    installed
}

/// Human-readable logging at the default level.
pub fn init_default_logging() -> bool {
    init_logging(&LoggingConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_level_falls_back() {
        let config = LoggingConfig {
            level: "not a level[".to_string(),
            json: false,
        };
        // Only checks that a filter is produced without panicking.
        let _ = build_filter(&config);
    }

    #[test]
    fn test_second_init_keeps_first() {
        init_default_logging();
        assert!(!init_default_logging());
    }
}
