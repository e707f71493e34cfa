use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use bytes::Bytes;
use formrelay_core::{FormInput, Submission};
use tracing::{info, instrument};

use super::AppState;
use super::schemas::{ErrorResponse, MessageResponse};
use crate::error::ApiError;

/// Message returned when a provider accepted the submission.
pub const SENT_MESSAGE: &str = "Your message was sent successfully.";

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Decode a request body as either an HTML form post or JSON.
///
/// The content type picks the decoder. A JSON body must be an object; anything
/// else, or anything that fails to decode, is treated as an empty form, so
/// the request fails validation rather than parsing.
pub fn parse_form(headers: &HeaderMap, body: &[u8]) -> FormInput {
    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.trim_start().starts_with(FORM_URLENCODED));

    if is_form {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body).unwrap_or_default();
        let mut input = FormInput::default();
        for (key, value) in pairs {
            let field = match key.as_str() {
                "name" => &mut input.name,
                "company" => &mut input.company,
                "email" => &mut input.email,
                "phone" => &mut input.phone,
                _ => continue,
            };
            *field = Some(value);
        }
        input
    } else {
        match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(fields @ serde_json::Value::Object(_)) => {
                serde_json::from_value(fields).unwrap_or_default()
            }
            _ => FormInput::default(),
        }
    }
}

/// `POST /api/sendEmail` -- validate a contact form and deliver it through one provider.
#[utoipa::path(
    post,
    path = "/api/sendEmail",
    tag = "Contact",
    summary = "Send a contact request",
    description = "Validates the form and delivers it through the Resend API when a key is configured, otherwise through SMTP. Accepts JSON or an urlencoded form post.",
    request_body(content = FormInput, description = "Contact form fields"),
    responses(
        (status = 200, description = "Message accepted by the provider", body = MessageResponse),
        (status = 400, description = "A required field is missing", body = MessageResponse),
        (status = 405, description = "Method other than POST", body = MessageResponse),
        (status = 500, description = "Delivery failed", body = ErrorResponse),
        (status = 502, description = "The Resend API rejected the request", body = ErrorResponse),
        (status = 503, description = "No usable provider is configured", body = ErrorResponse)
    )
)]
#[instrument(skip_all)]
pub async fn send_email(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let submission = Submission::try_from(parse_form(&headers, &body))?;

    info!(
        email = submission.email(),
        has_phone = submission.phone().is_some(),
        "contact form submission received"
    );

    state.dispatcher.dispatch(&submission).await?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: SENT_MESSAGE.to_owned(),
        }),
    ))
}

/// Fallback for `/api/sendEmail` with any method other than POST.
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(MessageResponse {
            message: "Method not allowed".to_owned(),
        }),
    )
}
