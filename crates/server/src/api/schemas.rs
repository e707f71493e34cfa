use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Plain message body, used for success and validation failures.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Your message was sent successfully.")]
    pub message: String,
}

/// Delivery failure body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Stable machine-readable error code.
    #[schema(example = "SMTP_NOT_CONFIGURED")]
    pub code: String,
    /// Human-readable summary.
    pub message: String,
    /// Provider error body, provider status, or underlying error text.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub details: Option<serde_json::Value>,
    /// What an operator should do about it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub ok: bool,
    /// Provider the next submission would use.
    #[schema(example = "resend")]
    pub provider: String,
    /// SMTP host, user and password are set and not placeholders.
    pub smtp_configured: bool,
    /// A Resend API key is set.
    pub resend_configured: bool,
    /// Deployment mode, `server` or `function`.
    #[schema(example = "server")]
    pub mode: String,
    /// Relay version.
    pub version: String,
    /// Configured listen port.
    pub port: u16,
}

/// SMTP verification response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}
