use std::time::Duration;

/// Default connection establishment timeout.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);
/// Default wait for the server greeting.
pub const DEFAULT_GREETING_TIMEOUT: Duration = Duration::from_secs(7);
/// Default per-operation socket timeout.
pub const DEFAULT_SOCKET_TIMEOUT: Duration = Duration::from_secs(15);

/// Connection and pool settings for the SMTP provider.
///
/// Construct with [`SmtpConfig::new`] and refine with the `with_*` builders:
///
/// ```
/// use formrelay_smtp::SmtpConfig;
///
/// let config = SmtpConfig::new("smtp.example.com", 465)
///     .with_credentials("relay@example.com", "secret")
///     .with_sender_name("Acme Website");
/// assert!(config.is_secure());
/// ```
#[derive(Clone)]
pub struct SmtpConfig {
    /// SMTP server hostname.
    pub host: String,

    /// SMTP server port.
    pub port: u16,

    /// Login name. Also used as the envelope and header sender.
    pub username: Option<String>,

    /// Login password.
    pub password: Option<String>,

    /// Implicit TLS from the first byte. `None` means "only on port 465".
    pub secure: Option<bool>,

    /// Refuse to continue in plaintext when the server does not offer STARTTLS.
    pub require_tls: bool,

    /// Reject certificates that fail validation. Turning this off accepts
    /// self-signed and mismatched certificates.
    pub reject_unauthorized: bool,

    /// Display name placed in front of the sender address.
    pub sender_name: String,

    /// Time allowed to open the TCP connection. Also bounds the wait for a
    /// free pooled session.
    pub connection_timeout: Duration,

    /// Time allowed for the server greeting and the `EHLO` reply.
    pub greeting_timeout: Duration,

    /// Time allowed for each later exchange: `STARTTLS`, `AUTH` and the
    /// message itself.
    pub socket_timeout: Duration,

    /// Maximum simultaneous SMTP connections.
    pub max_connections: usize,

    /// Messages sent over one connection before it is replaced.
    pub max_messages: u32,

    /// How long an unused connection may sit in the pool before it is closed.
    pub idle_timeout: Duration,
}

impl std::fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("secure", &self.secure)
            .field("require_tls", &self.require_tls)
            .field("reject_unauthorized", &self.reject_unauthorized)
            .field("sender_name", &self.sender_name)
            .field("connection_timeout", &self.connection_timeout)
            .field("greeting_timeout", &self.greeting_timeout)
            .field("socket_timeout", &self.socket_timeout)
            .field("max_connections", &self.max_connections)
            .field("max_messages", &self.max_messages)
            .field("idle_timeout", &self.idle_timeout)
            .finish()
    }
}

impl SmtpConfig {
    /// Create a configuration for `host:port` with default timeouts and a
    /// pool of two connections carrying at most 20 messages each.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            username: None,
            password: None,
            secure: None,
            require_tls: false,
            reject_unauthorized: true,
            sender_name: "ImobileBI Website".to_owned(),
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            greeting_timeout: DEFAULT_GREETING_TIMEOUT,
            socket_timeout: DEFAULT_SOCKET_TIMEOUT,
            max_connections: 2,
            max_messages: 20,
            idle_timeout: Duration::from_secs(60),
        }
    }

    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    #[must_use]
    pub fn with_require_tls(mut self, require: bool) -> Self {
        self.require_tls = require;
        self
    }

    #[must_use]
    pub fn with_reject_unauthorized(mut self, reject: bool) -> Self {
        self.reject_unauthorized = reject;
        self
    }

    #[must_use]
    pub fn with_sender_name(mut self, name: impl Into<String>) -> Self {
        self.sender_name = name.into();
        self
    }

    /// Override the three session timeouts.
    #[must_use]
    pub fn with_timeouts(
        mut self,
        connection: Duration,
        greeting: Duration,
        socket: Duration,
    ) -> Self {
        self.connection_timeout = connection;
        self.greeting_timeout = greeting;
        self.socket_timeout = socket;
        self
    }

    /// Override the pool limits. Zero values are raised to one.
    #[must_use]
    pub fn with_pool_limits(mut self, max_connections: usize, max_messages: u32) -> Self {
        self.max_connections = max_connections.max(1);
        self.max_messages = max_messages.max(1);
        self
    }

    /// Whether the connection uses implicit TLS.
    pub fn is_secure(&self) -> bool {
        self.secure.unwrap_or(self.port == 465)
    }
}
