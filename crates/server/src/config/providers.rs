use std::time::Duration;

use formrelay_core::is_placeholder;
use formrelay_resend::{DEFAULT_FROM_ADDRESS, ResendConfig};
use formrelay_smtp::SmtpConfig;
use serde::Deserialize;

/// Where submissions are delivered and how they are labelled.
#[derive(Debug, Deserialize)]
pub struct ContactConfig {
    /// Inbox that receives every submission.
    #[serde(default = "default_contact_to")]
    pub to: String,
    /// Site name used in the subject, body footer and SMTP sender name.
    #[serde(default = "default_site_name")]
    pub site_name: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            to: default_contact_to(),
            site_name: default_site_name(),
        }
    }
}

fn default_contact_to() -> String {
    "info@imobilebi.com".to_owned()
}

fn default_site_name() -> String {
    "ImobileBI".to_owned()
}

/// Resend HTTP API settings.
#[derive(Deserialize)]
pub struct ResendSection {
    /// API key. Resend is used whenever this is non-empty.
    pub api_key: Option<String>,
    /// `From` header for Resend messages.
    #[serde(default = "default_resend_from")]
    pub from: String,
    /// API base URL.
    #[serde(default = "default_resend_url")]
    pub api_url: String,
    /// Request timeout in seconds. Zero is raised to one.
    #[serde(default = "default_resend_timeout")]
    pub timeout_seconds: u64,
}

impl std::fmt::Debug for ResendSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendSection")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("from", &self.from)
            .field("api_url", &self.api_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

impl Default for ResendSection {
    fn default() -> Self {
        Self {
            api_key: None,
            from: default_resend_from(),
            api_url: default_resend_url(),
            timeout_seconds: default_resend_timeout(),
        }
    }
}

impl ResendSection {
    /// Whether an API key is present.
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }

    /// Provider configuration, or `None` when no key is set.
    pub fn to_provider_config(&self) -> Option<ResendConfig> {
        let key = self.api_key.as_deref().filter(|_| self.is_configured())?;
        Some(
            ResendConfig::new(key.trim())
                .with_from_address(&self.from)
                .with_api_base_url(&self.api_url)
                .with_timeout(Duration::from_secs(self.timeout_seconds.max(1))),
        )
    }
}

fn default_resend_from() -> String {
    DEFAULT_FROM_ADDRESS.to_owned()
}

fn default_resend_url() -> String {
    "https://api.resend.com".to_owned()
}

fn default_resend_timeout() -> u64 {
    15
}

/// SMTP settings.
#[derive(Deserialize)]
pub struct SmtpSection {
    pub host: Option<String>,
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    pub user: Option<String>,
    pub pass: Option<String>,
    /// Implicit TLS. Defaults to `port == 465` when unset.
    pub secure: Option<bool>,
    /// Fail instead of sending in plaintext when STARTTLS is unavailable.
    #[serde(default)]
    pub require_tls: bool,
    /// Validate server certificates.
    #[serde(default = "default_true")]
    pub tls_reject_unauthorized: bool,
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,
    #[serde(default = "default_greeting_timeout_ms")]
    pub greeting_timeout_ms: u64,
    #[serde(default = "default_socket_timeout_ms")]
    pub socket_timeout_ms: u64,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    #[serde(default = "default_max_messages")]
    pub max_messages: u32,
    /// Log the SMTP dialogue at debug level.
    #[serde(default)]
    pub debug: bool,
}

impl std::fmt::Debug for SmtpSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSection")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("pass", &self.pass.as_ref().map(|_| "[REDACTED]"))
            .field("secure", &self.secure)
            .field("require_tls", &self.require_tls)
            .field("tls_reject_unauthorized", &self.tls_reject_unauthorized)
            .field("connection_timeout_ms", &self.connection_timeout_ms)
            .field("greeting_timeout_ms", &self.greeting_timeout_ms)
            .field("socket_timeout_ms", &self.socket_timeout_ms)
            .field("max_connections", &self.max_connections)
            .field("max_messages", &self.max_messages)
            .field("debug", &self.debug)
            .finish()
    }
}

impl Default for SmtpSection {
    fn default() -> Self {
        Self {
            host: None,
            port: default_smtp_port(),
            user: None,
            pass: None,
            secure: None,
            require_tls: false,
            tls_reject_unauthorized: true,
            connection_timeout_ms: default_connection_timeout_ms(),
            greeting_timeout_ms: default_greeting_timeout_ms(),
            socket_timeout_ms: default_socket_timeout_ms(),
            max_connections: default_max_connections(),
            max_messages: default_max_messages(),
            debug: false,
        }
    }
}

impl SmtpSection {
    /// SMTP counts as configured only when host, user and password are all
    /// present and none of them is a placeholder.
    pub fn is_configured(&self) -> bool {
        [&self.host, &self.user, &self.pass]
            .into_iter()
            .all(|value| !is_placeholder(value.as_deref()))
    }

    /// Provider configuration, or `None` when SMTP is not configured.
    pub fn to_provider_config(&self, site_name: &str) -> Option<SmtpConfig> {
        if !self.is_configured() {
            return None;
        }
        let (host, user, pass) = (self.host.as_ref()?, self.user.as_ref()?, self.pass.as_ref()?);

        let mut config = SmtpConfig::new(host.trim(), self.port)
            .with_credentials(user.trim(), pass.clone())
            .with_require_tls(self.require_tls)
            .with_reject_unauthorized(self.tls_reject_unauthorized)
            .with_sender_name(format!("{site_name} Website"))
            .with_timeouts(
                Duration::from_millis(self.connection_timeout_ms),
                Duration::from_millis(self.greeting_timeout_ms),
                Duration::from_millis(self.socket_timeout_ms),
            )
            .with_pool_limits(self.max_connections, self.max_messages);
        if let Some(secure) = self.secure {
            config = config.with_secure(secure);
        }
        Some(config)
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn default_true() -> bool {
    true
}

fn default_connection_timeout_ms() -> u64 {
    10_000
}

fn default_greeting_timeout_ms() -> u64 {
    7_000
}

fn default_socket_timeout_ms() -> u64 {
    15_000
}

fn default_max_connections() -> usize {
    2
}

fn default_max_messages() -> u32 {
    20
}
