#![allow(clippy::needless_for_each)]

use formrelay_core::FormInput;

use super::schemas::{ErrorResponse, HealthResponse, MessageResponse, VerifyResponse};

#[derive(utoipa::OpenApi)]
#[openapi(
    info(
        title = "formrelay API",
        version = "0.1.0",
        description = "Contact-form relay. Accepts demo requests and delivers them by email through the Resend API or SMTP.",
        license(name = "Apache-2.0")
    ),
    tags(
        (name = "Health", description = "Service health and SMTP verification"),
        (name = "Contact", description = "Contact form delivery")
    ),
    paths(
        super::health::health,
        super::verify::verify_smtp,
        super::send_email::send_email,
    ),
    components(schemas(
        FormInput,
        MessageResponse, ErrorResponse, HealthResponse, VerifyResponse,
    ))
)]
pub struct ApiDoc;
