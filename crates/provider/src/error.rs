use thiserror::Error;

/// Why delivery was refused before any provider was contacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotConfiguredReason {
    /// No HTTP-API key and the SMTP settings are absent or placeholders.
    SmtpNotConfigured,
    /// No HTTP-API key, and this deployment cannot open SMTP sessions.
    SmtpNotSupported,
}

impl NotConfiguredReason {
    /// Stable error code reported to callers.
    pub fn code(self) -> &'static str {
        match self {
            Self::SmtpNotConfigured => "SMTP_NOT_CONFIGURED",
            Self::SmtpNotSupported => "SMTP_NOT_SUPPORTED",
        }
    }

    /// Operator-facing hint on how to fix the deployment.
    pub fn hint(self) -> &'static str {
        match self {
            Self::SmtpNotConfigured => {
                "set SMTP_HOST, SMTP_PORT, SMTP_USER and SMTP_PASS (or RESEND_API_KEY) and retry"
            }
            Self::SmtpNotSupported => "set RESEND_API_KEY, RESEND_FROM and CONTACT_TO and retry",
        }
    }
}

/// Errors that can occur while delivering a contact message.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// No usable provider is configured. Nothing was sent.
    #[error("mail delivery is not configured ({})", .0.code())]
    NotConfigured(NotConfiguredReason),

    /// The HTTP-API provider answered with a non-success status.
    #[error("{provider} API returned HTTP {status}")]
    ProviderApi {
        /// Provider name, e.g. `"resend"`.
        provider: String,
        /// HTTP status code returned by the provider.
        status: u16,
        /// Parsed JSON error body, if the provider sent one.
        body: Option<serde_json::Value>,
    },

    /// The HTTP-API request never completed (transport error or timeout).
    #[error("{provider} send failed: {message}")]
    ProviderSendFailed {
        /// Provider name, e.g. `"resend"`.
        provider: String,
        /// Underlying transport error.
        message: String,
    },

    /// The SMTP session failed (auth, connection, timeout or protocol).
    #[error("SMTP send failed: {message}")]
    SmtpSendFailed {
        /// Short error class such as `EAUTH` or `ETIMEDOUT`, when known.
        code: Option<String>,
        /// Underlying error message.
        message: String,
    },
}

impl DeliveryError {
    /// Build a [`DeliveryError::SmtpSendFailed`] with a known error class.
    pub fn smtp(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SmtpSendFailed {
            code: Some(code.into()),
            message: message.into(),
        }
    }

    /// Stable, machine-readable error code.
    ///
    /// SMTP failures without a classified code report `MAIL_SEND_FAILED`.
    pub fn code(&self) -> String {
        match self {
            Self::NotConfigured(reason) => reason.code().to_owned(),
            Self::ProviderApi { provider, .. } => {
                format!("{}_API_ERROR", provider.to_ascii_uppercase())
            }
            Self::ProviderSendFailed { provider, .. } => {
                format!("{}_SEND_FAILED", provider.to_ascii_uppercase())
            }
            Self::SmtpSendFailed { code, .. } => {
                code.clone().unwrap_or_else(|| "MAIL_SEND_FAILED".to_owned())
            }
        }
    }
}
