//! # Structured Logging
//!
//! Diagnostics go to stderr through `tracing`; stdout is reserved for the
//! run report and the metrics exposition, so `sapphire-node run -o json`
//! can be piped straight into `jq`.
//!
//! `RUST_LOG` wins over `--log-level` when it is set and parses.

use clap::ValueEnum;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `--log-level` nor `RUST_LOG` says otherwise.
pub const DEFAULT_DIRECTIVE: &str = "sapphire_node=info,sapphire_protocol=warn";

/// Log line shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Colored, multi-field lines with source locations.
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Resolve the active filter: a parseable `RUST_LOG` value, else `directive`.
fn resolve_filter(env_value: Option<&str>, directive: &str) -> EnvFilter {
    env_value
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(directive))
}

/// Install the global subscriber. Must be called at most once per process.
pub fn init_logging(directive: &str, format: LogFormat) {
    let env_value = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = resolve_filter(env_value.as_deref(), directive);
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(false),
            )
            .init(),
    }

    tracing::debug!(?format, directive, "logging ready");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_directive_without_env() {
        let filter = resolve_filter(None, DEFAULT_DIRECTIVE);
        assert_eq!(filter.to_string(), EnvFilter::new(DEFAULT_DIRECTIVE).to_string());
    }

    #[test]
    fn env_value_overrides_directive() {
        let filter = resolve_filter(Some("sapphire_protocol=trace"), DEFAULT_DIRECTIVE);
        assert_eq!(filter.to_string(), "sapphire_protocol=trace");
    }

    #[test]
    fn unparseable_env_value_is_ignored() {
        let filter = resolve_filter(Some("sapphire_node=notalevel"), "warn");
        assert_eq!(filter.to_string(), "warn");
    }
}
