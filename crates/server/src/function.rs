//! Stateless-function adapter.
//!
//! A function host hands the relay one request as a JSON object and expects a
//! JSON object back. [`invoke`] feeds that request through the same
//! [`Router`] the standalone server uses, so both deployments answer
//! identically.

use std::collections::HashMap;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderName, HeaderValue, Method, Request, header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower::ServiceExt;

use crate::error::ServerError;

/// One request as delivered by a function host.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FunctionRequest {
    #[serde(default = "default_method")]
    pub method: String,
    pub path: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// JSON body. A string is sent verbatim, which allows urlencoded forms.
    #[serde(default)]
    pub body: Option<Value>,
}

fn default_method() -> String {
    "GET".to_owned()
}

/// Response handed back to the function host.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FunctionResponse {
    pub status: u16,
    /// The JSON body, or the raw text when the body is not JSON.
    pub body: Value,
}

fn build_request(req: FunctionRequest) -> Result<Request<Body>, ServerError> {
    let method = Method::from_bytes(req.method.to_ascii_uppercase().as_bytes())
        .map_err(|e| ServerError::InvalidRequest(format!("method `{}`: {e}", req.method)))?;

    let mut builder = Request::builder().method(method).uri(&req.path);
    for (name, value) in &req.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ServerError::InvalidRequest(format!("header `{name}`: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ServerError::InvalidRequest(format!("header `{name}`: {e}")))?;
        builder = builder.header(name, value);
    }

    let has_content_type = req
        .headers
        .keys()
        .any(|k| k.eq_ignore_ascii_case(header::CONTENT_TYPE.as_str()));

    let body = match req.body {
        None | Some(Value::Null) => Body::empty(),
        Some(Value::String(raw)) => Body::from(raw),
        Some(json) => {
            if !has_content_type {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
            }
            Body::from(json.to_string())
        }
    };

    builder
        .body(body)
        .map_err(|e| ServerError::InvalidRequest(e.to_string()))
}

/// Run one function request through `router`.
pub async fn invoke(router: Router, req: FunctionRequest) -> Result<FunctionResponse, ServerError> {
    let request = build_request(req)?;

    let response = match router.oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    let status = response.status().as_u16();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(|e| ServerError::InvalidRequest(format!("failed to read response body: {e}")))?;

    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    Ok(FunctionResponse { status, body })
}
