use serde::{Deserialize, Serialize};

/// JSON request body for `POST /emails`.
#[derive(Debug, Clone, Serialize)]
pub struct ResendSendRequest {
    /// Sender, `addr@host` or `Name <addr@host>`.
    pub from: String,

    /// Recipients. The relay always sends to a single inbox.
    pub to: Vec<String>,

    /// Subject line.
    pub subject: String,

    /// HTML body.
    pub html: String,
}

/// Success response from `POST /emails`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResendSendResponse {
    /// Resend message identifier.
    pub id: Option<String>,
}
