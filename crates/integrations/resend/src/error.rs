use formrelay_provider::DeliveryError;
use thiserror::Error;

use crate::provider::PROVIDER_NAME;

/// Errors specific to the Resend provider.
///
/// These are internal errors that get converted into [`DeliveryError`] at the
/// public API boundary.
#[derive(Debug, Error)]
pub enum ResendError {
    /// An HTTP-level transport error occurred (connect, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Resend API returned a non-success status.
    #[error("Resend API error: HTTP {status}")]
    Api {
        status: u16,
        body: Option<serde_json::Value>,
    },
}

impl From<ResendError> for DeliveryError {
    fn from(err: ResendError) -> Self {
        match err {
            ResendError::Http(e) => DeliveryError::ProviderSendFailed {
                provider: PROVIDER_NAME.to_owned(),
                message: e.to_string(),
            },
            ResendError::Api { status, body } => DeliveryError::ProviderApi {
                provider: PROVIDER_NAME.to_owned(),
                status,
                body,
            },
        }
    }
}
