use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use formrelay_core::ValidationError;
use formrelay_provider::{DeliveryError, NotConfiguredReason};
use thiserror::Error;

use crate::api::schemas::{ErrorResponse, MessageResponse};

/// Errors that can occur when running the relay.
#[derive(Debug, Error)]
pub enum ServerError {
    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O error (e.g. binding the listener).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A function-form request could not be turned into an HTTP request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Config(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

/// Failure of a `sendEmail` request, rendered as the public JSON contract.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Delivery(DeliveryError::NotConfigured(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Delivery(DeliveryError::ProviderApi { .. }) => StatusCode::BAD_GATEWAY,
            Self::Delivery(
                DeliveryError::ProviderSendFailed { .. } | DeliveryError::SmtpSendFailed { .. },
            ) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Caller-facing text for a delivery that was refused up front.
pub fn not_configured_message(reason: NotConfiguredReason) -> &'static str {
    match reason {
        NotConfiguredReason::SmtpNotConfigured => {
            "The mail service is not configured yet, please try again later."
        }
        NotConfiguredReason::SmtpNotSupported => {
            "SMTP is not available in function deployments, configure the Resend API instead."
        }
    }
}

fn delivery_body(error: &DeliveryError) -> ErrorResponse {
    let code = error.code();
    match error {
        DeliveryError::NotConfigured(reason) => ErrorResponse {
            code,
            message: not_configured_message(*reason).to_owned(),
            details: None,
            hint: Some(reason.hint().to_owned()),
        },
        DeliveryError::ProviderApi { status, body, .. } => {
            let hint = body
                .as_ref()
                .and_then(|b| b.get("message"))
                .and_then(serde_json::Value::as_str)
                .unwrap_or("check the Resend API key and from address")
                .to_owned();
            ErrorResponse {
                code,
                message: "The mail service rejected the request.".to_owned(),
                details: Some(
                    body.clone()
                        .unwrap_or_else(|| serde_json::json!({ "status": status })),
                ),
                hint: Some(hint),
            }
        }
        DeliveryError::ProviderSendFailed { message, .. } => ErrorResponse {
            code,
            message: "The mail service could not be reached.".to_owned(),
            details: Some(serde_json::Value::String(message.clone())),
            hint: None,
        },
        DeliveryError::SmtpSendFailed { message, .. } => ErrorResponse {
            code,
            message: "Server error, the message was not sent.".to_owned(),
            details: Some(serde_json::Value::String(message.clone())),
            hint: None,
        },
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Validation(e) => (
                status,
                Json(MessageResponse {
                    message: e.to_string(),
                }),
            )
                .into_response(),
            Self::Delivery(e) => (status, Json(delivery_body(e))).into_response(),
        }
    }
}
