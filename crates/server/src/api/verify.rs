use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use formrelay_provider::DeliveryError;

use super::AppState;
use super::schemas::VerifyResponse;
use crate::error::not_configured_message;

/// `GET /api/verifySMTP` -- opens and authenticates an SMTP session without sending.
#[utoipa::path(
    get,
    path = "/api/verifySMTP",
    tag = "Health",
    summary = "Verify SMTP",
    description = "Performs the SMTP handshake and authentication with the configured server. Placeholder or missing settings are refused without connecting.",
    responses(
        (status = 200, description = "Handshake succeeded", body = VerifyResponse),
        (status = 500, description = "Handshake failed", body = VerifyResponse),
        (status = 503, description = "SMTP is not configured or not available", body = VerifyResponse)
    )
)]
pub async fn verify_smtp(State(state): State<AppState>) -> impl IntoResponse {
    match state.dispatcher.verify_smtp().await {
        Ok(()) => (
            StatusCode::OK,
            Json(VerifyResponse {
                ok: true,
                code: None,
                message: None,
                hint: None,
            }),
        ),
        Err(DeliveryError::NotConfigured(reason)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(VerifyResponse {
                ok: false,
                code: Some(reason.code().to_owned()),
                message: Some(not_configured_message(reason).to_owned()),
                hint: Some(reason.hint().to_owned()),
            }),
        ),
        Err(e) => {
            tracing::warn!(code = %e.code(), error = %e, "SMTP verification failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(VerifyResponse {
                    ok: false,
                    code: Some(e.code()),
                    message: Some(e.to_string()),
                    hint: None,
                }),
            )
        }
    }
}
