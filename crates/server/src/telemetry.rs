//! Log subscriber initialization.
//!
//! Installs a [`tracing_subscriber`] registry with an `EnvFilter` and the
//! standard `fmt` layer. Output goes to stderr so the `invoke` subcommand can
//! keep stdout for its JSON response.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::TelemetryConfig;

/// Directives added when SMTP debugging is switched on.
const SMTP_DEBUG_DIRECTIVES: [&str; 2] = ["lettre=debug", "formrelay_smtp=debug"];

/// Build the filter: `RUST_LOG` if set, else the configured default, plus the
/// SMTP dialogue when `smtp_debug` is on.
pub fn build_filter(
    from_env: Option<EnvFilter>,
    config: &TelemetryConfig,
    smtp_debug: bool,
) -> EnvFilter {
    let mut filter = from_env.unwrap_or_else(|| {
        EnvFilter::try_new(&config.default_filter).unwrap_or_else(|_| EnvFilter::new("info"))
    });

    if smtp_debug {
        for directive in SMTP_DEBUG_DIRECTIVES {
            if let Ok(directive) = directive.parse() {
                filter = filter.add_directive(directive);
            }
        }
    }

    filter
}

/// Install the global subscriber. Call once, early in `main`.
pub fn init(config: &TelemetryConfig, smtp_debug: bool) {
    let filter = build_filter(EnvFilter::try_from_default_env().ok(), config, smtp_debug);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
