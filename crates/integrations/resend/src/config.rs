use std::time::Duration;

/// Sender used when no `RESEND_FROM` is configured.
///
/// `onboarding@resend.dev` is the shared test sender Resend accepts before a
/// custom domain has been verified.
pub const DEFAULT_FROM_ADDRESS: &str = "ImobileBI <onboarding@resend.dev>";

/// Configuration for the Resend provider.
#[derive(Clone)]
pub struct ResendConfig {
    /// API key sent as a bearer token.
    pub api_key: String,

    /// `From` header, either `addr@host` or `Name <addr@host>`.
    pub from_address: String,

    /// Base URL for the Resend API. Override this for testing against a
    /// mock server.
    pub api_base_url: String,

    /// Upper bound on the whole request, including connect.
    pub timeout: Duration,
}

impl std::fmt::Debug for ResendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResendConfig")
            .field("api_key", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .field("api_base_url", &self.api_base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ResendConfig {
    /// Create a new configuration with the given API key.
    ///
    /// Uses the default Resend API base URL (`https://api.resend.com`), the
    /// shared test sender and a 15 second request timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            from_address: DEFAULT_FROM_ADDRESS.to_owned(),
            api_base_url: "https://api.resend.com".to_owned(),
            timeout: Duration::from_secs(15),
        }
    }

    /// Set the `From` address.
    #[must_use]
    pub fn with_from_address(mut self, from: impl Into<String>) -> Self {
        self.from_address = from.into();
        self
    }

    /// Override the API base URL (useful for testing).
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Override the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
