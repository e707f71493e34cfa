use serde::Deserialize;

/// Log output configuration.
///
/// `RUST_LOG` always wins over `default_filter`.
#[derive(Debug, Deserialize)]
pub struct TelemetryConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub default_filter: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            default_filter: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "info".to_owned()
}
