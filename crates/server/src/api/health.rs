use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::schemas::HealthResponse;

/// `GET /api/health` -- reports which provider would be used, without touching the network.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    summary = "Health check",
    description = "Returns the selected mail provider and whether each provider's settings look populated. Never opens a connection.",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let dispatcher = &state.dispatcher;

    let body = HealthResponse {
        ok: true,
        provider: dispatcher.selected_provider().to_owned(),
        smtp_configured: dispatcher.smtp_configured(),
        resend_configured: dispatcher.http_api_configured(),
        mode: dispatcher.mode().as_str().to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        port: state.port,
    };

    (StatusCode::OK, Json(body))
}
