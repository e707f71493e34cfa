use std::time::Duration;

use formrelay_provider::DeliveryError;
use thiserror::Error;

/// SMTP reply codes that mean the server refused our credentials.
const AUTH_FAILURE_CODES: [&str; 3] = ["530", "534", "535"];

/// Errors specific to the SMTP provider.
///
/// Every variant maps onto a short error class (see [`SmtpError::code`]) that
/// is reported to callers through [`DeliveryError::SmtpSendFailed`].
#[derive(Debug, Error)]
pub enum SmtpError {
    /// The sender or recipient is not a valid mailbox.
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The message could not be assembled.
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    /// The TCP connection could not be opened.
    #[error("failed to connect to SMTP server: {0}")]
    Connect(#[from] std::io::Error),

    /// The SMTP session failed.
    #[error("{0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The server refused our credentials or offered no usable mechanism.
    #[error("SMTP authentication failed: {0}")]
    Auth(lettre::transport::smtp::Error),

    /// The session did not finish within its time budget.
    #[error("SMTP {stage} timed out after {after:?}")]
    Timeout { stage: &'static str, after: Duration },

    /// TLS is required but the server does not offer STARTTLS.
    #[error("SMTP server does not offer STARTTLS")]
    TlsUnavailable,

    /// The connection pool was shut down.
    #[error("SMTP connection pool is closed")]
    PoolClosed,
}

impl SmtpError {
    /// Short error class: `EAUTH`, `ETIMEDOUT`, `ECONNECTION`, `EPROTOCOL` or
    /// `EMESSAGE`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Address(_) | Self::Message(_) => "EMESSAGE",
            Self::Transport(e) => transport_code(e),
            Self::Auth(e) if e.is_timeout() => "ETIMEDOUT",
            Self::Auth(_) => "EAUTH",
            Self::Timeout { .. } => "ETIMEDOUT",
            Self::TlsUnavailable => "EPROTOCOL",
            Self::Connect(_) | Self::PoolClosed => "ECONNECTION",
        }
    }
}

fn transport_code(error: &lettre::transport::smtp::Error) -> &'static str {
    if error.is_timeout() {
        return "ETIMEDOUT";
    }
    if error
        .status()
        .is_some_and(|status| AUTH_FAILURE_CODES.contains(&status.to_string().as_str()))
    {
        return "EAUTH";
    }
    if error.is_client() {
        "EMESSAGE"
    } else if error.is_response() || error.is_transient() || error.is_permanent() {
        "EPROTOCOL"
    } else {
        "ECONNECTION"
    }
}

impl From<SmtpError> for DeliveryError {
    fn from(err: SmtpError) -> Self {
        DeliveryError::smtp(err.code(), err.to_string())
    }
}
