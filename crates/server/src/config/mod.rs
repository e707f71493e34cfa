mod providers;
mod server;
mod telemetry;


pub use providers::*;
pub use server::*;
pub use telemetry::*;

use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::ServerError;

/// Top-level configuration for the relay.
///
/// Resolved once at startup: TOML file (optional), then environment, then CLI
/// overrides. The result is handed to the dispatcher and never re-read.
#[derive(Debug, Default, Deserialize)]
pub struct RelayConfig {
    /// HTTP server bind configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Recipient and site labelling.
    #[serde(default)]
    pub contact: ContactConfig,
    /// Resend HTTP API settings.
    #[serde(default)]
    pub resend: ResendSection,
    /// SMTP settings.
    #[serde(default)]
    pub smtp: SmtpSection,
    /// Log output configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl RelayConfig {
    /// Load from a TOML file, or use defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ServerError> {
        let contents = if path.exists() {
            std::fs::read_to_string(path)?
        } else {
            String::new()
        };
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ServerError> {
        toml::from_str(contents).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Overlay environment variables onto the loaded configuration.
    ///
    /// `lookup` returns the value of one variable; pass
    /// `|key| std::env::var(key).ok()` for the process environment. Empty
    /// values are treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("HOST") {
            self.server.host = v;
        }
        if let Some(v) = get("PORT") {
            self.server.port = parse("PORT", &v)?;
        }
        if let Some(v) = get("FORMRELAY_MODE") {
            self.server.mode = DeploymentMode::from_str(&v).map_err(ServerError::Config)?;
        }
        if let Some(v) = get("STATIC_DIR") {
            self.server.static_dir = Some(v.into());
        }

        if let Some(v) = get("CONTACT_TO") {
            self.contact.to = v;
        }
        if let Some(v) = get("SITE_NAME") {
            self.contact.site_name = v;
        }

        if let Some(v) = get("RESEND_API_KEY") {
            self.resend.api_key = Some(v);
        }
        if let Some(v) = get("RESEND_FROM") {
            self.resend.from = v;
        }
        if let Some(v) = get("RESEND_API_URL") {
            self.resend.api_url = v;
        }

        let smtp = &mut self.smtp;
        if let Some(v) = get("SMTP_HOST") {
            smtp.host = Some(v);
        }
        if let Some(v) = get("SMTP_PORT") {
            smtp.port = parse("SMTP_PORT", &v)?;
        }
        if let Some(v) = get("SMTP_USER") {
            smtp.user = Some(v);
        }
        if let Some(v) = get("SMTP_PASS") {
            smtp.pass = Some(v);
        }
        if let Some(v) = get("SMTP_SECURE") {
            smtp.secure = Some(parse_bool("SMTP_SECURE", &v)?);
        }
        if let Some(v) = get("SMTP_REQUIRE_TLS") {
            smtp.require_tls = parse_bool("SMTP_REQUIRE_TLS", &v)?;
        }
        if let Some(v) = get("SMTP_TLS_REJECT_UNAUTHORIZED") {
            smtp.tls_reject_unauthorized = parse_bool("SMTP_TLS_REJECT_UNAUTHORIZED", &v)?;
        }
        if let Some(v) = get("SMTP_CONNECTION_TIMEOUT_MS") {
            smtp.connection_timeout_ms = parse("SMTP_CONNECTION_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = get("SMTP_GREETING_TIMEOUT_MS") {
            smtp.greeting_timeout_ms = parse("SMTP_GREETING_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = get("SMTP_SOCKET_TIMEOUT_MS") {
            smtp.socket_timeout_ms = parse("SMTP_SOCKET_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = get("SMTP_DEBUG") {
            smtp.debug = parse_bool("SMTP_DEBUG", &v)?;
        }

        Ok(())
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T, ServerError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ServerError::Config(format!("invalid {key} `{value}`: {e}")))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ServerError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ServerError::Config(format!(
            "invalid {key} `{value}`: expected true or false"
        ))),
    }
}
