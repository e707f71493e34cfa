use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::http::{self, Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use formrelay_provider::{ContactMessage, DeliveryError, DeliveryReceipt, MailProvider};
use formrelay_server::api::{self, AppState};
use formrelay_server::config::{DeploymentMode, RelayConfig};
use formrelay_server::dispatch::Dispatcher;
use formrelay_server::function::{self, FunctionRequest};

// -- Spy provider ---------------------------------------------------------

#[derive(Clone, Copy)]
enum Behavior {
    Accept,
    ApiStatus(u16),
    SmtpCode(&'static str),
}

struct SpyProvider {
    provider_name: &'static str,
    behavior: Behavior,
    verify_ok: bool,
    sent: Mutex<Vec<ContactMessage>>,
    verified: Mutex<usize>,
}

impl SpyProvider {
    fn new(name: &'static str, behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            provider_name: name,
            behavior,
            verify_ok: true,
            sent: Mutex::new(Vec::new()),
            verified: Mutex::new(0),
        })
    }

    fn failing_verify(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            provider_name: name,
            behavior: Behavior::Accept,
            verify_ok: false,
            sent: Mutex::new(Vec::new()),
            verified: Mutex::new(0),
        })
    }

    fn calls(&self) -> Vec<ContactMessage> {
        self.sent.lock().unwrap().clone()
    }

    fn verifications(&self) -> usize {
        *self.verified.lock().unwrap()
    }
}

impl MailProvider for SpyProvider {
    fn name(&self) -> &str {
        self.provider_name
    }

    async fn send(&self, message: &ContactMessage) -> Result<DeliveryReceipt, DeliveryError> {
        self.sent.lock().unwrap().push(message.clone());
        match self.behavior {
            Behavior::Accept => Ok(DeliveryReceipt::new(self.provider_name).with_message_id("spy-1")),
            Behavior::ApiStatus(status) => Err(DeliveryError::ProviderApi {
                provider: self.provider_name.to_owned(),
                status,
                body: None,
            }),
            Behavior::SmtpCode(code) => Err(DeliveryError::smtp(code, "spy failure")),
        }
    }

    async fn verify(&self) -> Result<(), DeliveryError> {
        *self.verified.lock().unwrap() += 1;
        if self.verify_ok {
            Ok(())
        } else {
            Err(DeliveryError::smtp("EAUTH", "535 authentication failed"))
        }
    }
}

// -- Helpers --------------------------------------------------------------

fn build_app(dispatcher: Dispatcher) -> axum::Router {
    api::router(AppState::from_dispatcher(dispatcher))
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

fn post_json(body: &Value) -> Request<Body> {
    Request::builder()
        .method(http::Method::POST)
        .uri("/api/sendEmail")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn valid_form() -> Value {
    json!({ "name": "A", "company": "B", "email": "a@b.com" })
}

fn populated_smtp(config: &mut RelayConfig) {
    config.smtp.host = Some("smtp.acme.test".into());
    config.smtp.user = Some("relay@acme.test".into());
    config.smtp.pass = Some("secret".into());
}

// -- sendEmail ------------------------------------------------------------

#[tokio::test]
async fn missing_required_fields_is_400_without_provider_call() {
    let resend = SpyProvider::new("resend", Behavior::Accept);
    let smtp = SpyProvider::new("smtp", Behavior::Accept);

    for body in [
        json!({ "company": "B", "email": "a@b.com" }),
        json!({ "name": "A", "email": "a@b.com" }),
        json!({ "name": "A", "company": "B", "email": "" }),
        json!({}),
    ] {
        let app = build_app(
            Dispatcher::builder()
                .http_api(resend.clone())
                .smtp(smtp.clone())
                .build(),
        );
        let (status, json) = send(app, post_json(&body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert!(json["message"].is_string());
        assert!(json.get("code").is_none());
    }

    assert!(resend.calls().is_empty());
    assert!(smtp.calls().is_empty());
}

#[tokio::test]
async fn malformed_body_is_400() {
    let resend = SpyProvider::new("resend", Behavior::Accept);
    let app = build_app(Dispatcher::builder().http_api(resend.clone()).build());

    let request = Request::builder()
        .method(http::Method::POST)
        .uri("/api/sendEmail")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(resend.calls().is_empty());
}

#[tokio::test]
async fn json_array_body_is_400_without_provider_call() {
    let resend = SpyProvider::new("resend", Behavior::Accept);
    let app = build_app(Dispatcher::builder().http_api(resend.clone()).build());

    let (status, json) = send(app, post_json(&json!(["A", "B", "a@b.com"]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].is_string());
    assert!(resend.calls().is_empty());
}

#[tokio::test]
async fn falsy_values_count_as_missing() {
    let resend = SpyProvider::new("resend", Behavior::Accept);

    for body in [
        json!({ "name": false, "company": "B", "email": "a@b.com" }),
        json!({ "name": "A", "company": 0, "email": "a@b.com" }),
        json!({ "name": "A", "company": "B", "email": null }),
    ] {
        let app = build_app(Dispatcher::builder().http_api(resend.clone()).build());
        let (status, _) = send(app, post_json(&body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    }
    assert!(resend.calls().is_empty());
}

#[tokio::test]
async fn valid_submission_goes_through_resend_once() {
    let resend = SpyProvider::new("resend", Behavior::Accept);
    let app = build_app(Dispatcher::builder().http_api(resend.clone()).build());

    let (status, json) = send(app, post_json(&valid_form())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Your message was sent successfully.");

    let calls = resend.calls();
    assert_eq!(calls.len(), 1);
    let message = &calls[0];
    assert_eq!(message.to, "info@imobilebi.com");
    assert!(message.subject.contains("New Demo Request"));
    assert!(message.html.contains("<strong>Name:</strong> A"));
    assert!(message.html.contains("<strong>Company:</strong> B"));
    assert!(message.html.contains("a@b.com"));
}

#[tokio::test]
async fn absent_phone_renders_marker() {
    let resend = SpyProvider::new("resend", Behavior::Accept);
    let app = build_app(Dispatcher::builder().http_api(resend.clone()).build());

    send(app, post_json(&valid_form())).await;
    assert!(resend.calls()[0].html.contains("Not provided"));

    let app = build_app(Dispatcher::builder().http_api(resend.clone()).build());
    let mut form = valid_form();
    form["phone"] = json!("+886 912 345 678");
    send(app, post_json(&form)).await;
    let second = &resend.calls()[1];
    assert!(second.html.contains("+886 912 345 678"));
    assert!(!second.html.contains("Not provided"));
}

#[tokio::test]
async fn resend_takes_priority_over_smtp() {
    let resend = SpyProvider::new("resend", Behavior::Accept);
    let smtp = SpyProvider::new("smtp", Behavior::Accept);
    let app = build_app(
        Dispatcher::builder()
            .http_api(resend.clone())
            .smtp(smtp.clone())
            .build(),
    );

    let (status, _) = send(app, post_json(&valid_form())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resend.calls().len(), 1);
    assert!(smtp.calls().is_empty());
}

#[tokio::test]
async fn smtp_used_without_api_key() {
    let smtp = SpyProvider::new("smtp", Behavior::Accept);
    let app = build_app(
        Dispatcher::builder()
            .site_name("Acme")
            .contact_to("sales@acme.test")
            .smtp(smtp.clone())
            .build(),
    );

    let (status, _) = send(app, post_json(&valid_form())).await;
    assert_eq!(status, StatusCode::OK);

    let calls = smtp.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].to, "sales@acme.test");
    assert_eq!(calls[0].subject, "[New Demo Request] Acme website demo request");
}

#[tokio::test]
async fn resend_rejection_is_502_without_smtp_attempt() {
    let resend = SpyProvider::new("resend", Behavior::ApiStatus(500));
    let smtp = SpyProvider::new("smtp", Behavior::Accept);
    let app = build_app(
        Dispatcher::builder()
            .http_api(resend.clone())
            .smtp(smtp.clone())
            .build(),
    );

    let (status, json) = send(app, post_json(&valid_form())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "RESEND_API_ERROR");
    assert_eq!(json["details"], json!({ "status": 500 }));
    assert!(json["hint"].is_string());
    assert_eq!(resend.calls().len(), 1);
    assert!(smtp.calls().is_empty());
}

#[tokio::test]
async fn smtp_failure_is_500_with_code() {
    let smtp = SpyProvider::new("smtp", Behavior::SmtpCode("ETIMEDOUT"));
    let app = build_app(Dispatcher::builder().smtp(smtp.clone()).build());

    let (status, json) = send(app, post_json(&valid_form())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "ETIMEDOUT");
    assert_eq!(json["details"], "spy failure");
    assert_eq!(smtp.calls().len(), 1);
}

#[tokio::test]
async fn no_provider_is_503_smtp_not_configured() {
    let app = build_app(Dispatcher::builder().build());

    let (status, json) = send(app, post_json(&valid_form())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "SMTP_NOT_CONFIGURED");
    assert!(json["message"].is_string());
    assert!(json["hint"].is_string());
}

#[tokio::test]
async fn function_mode_without_key_is_503_smtp_not_supported() {
    let smtp = SpyProvider::new("smtp", Behavior::Accept);
    let app = build_app(
        Dispatcher::builder()
            .mode(DeploymentMode::Function)
            .smtp(smtp.clone())
            .build(),
    );

    let (status, json) = send(app, post_json(&valid_form())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "SMTP_NOT_SUPPORTED");
    assert!(smtp.calls().is_empty());
}

#[tokio::test]
async fn placeholder_smtp_never_connects() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut config = RelayConfig::default();
    config.smtp.host = Some("127.0.0.1".into());
    config.smtp.port = port;
    config.smtp.user = Some("your-email@example.com".into());
    config.smtp.pass = Some("secret".into());

    let dispatcher = Dispatcher::from_config(&config).unwrap();
    assert_eq!(dispatcher.selected_provider(), "none");
    let app = build_app(dispatcher);

    let (status, json) = send(app.clone(), post_json(&valid_form())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "SMTP_NOT_CONFIGURED");

    let (status, json) = send(app, get("/api/verifySMTP")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["ok"], false);

    let accepted = tokio::time::timeout(Duration::from_millis(200), listener.accept()).await;
    assert!(accepted.is_err(), "placeholder config must not open a connection");
}

#[tokio::test]
async fn urlencoded_form_post_is_accepted() {
    let resend = SpyProvider::new("resend", Behavior::Accept);
    let app = build_app(Dispatcher::builder().http_api(resend.clone()).build());

    let request = Request::builder()
        .method(http::Method::POST)
        .uri("/api/sendEmail")
        .header(
            http::header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        )
        .body(Body::from("name=Ada&company=Engines+Ltd&email=ada%40example.com"))
        .unwrap();

    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    let html = &resend.calls()[0].html;
    assert!(html.contains("Engines Ltd"));
    assert!(html.contains("ada@example.com"));
}

#[tokio::test]
async fn non_post_is_405() {
    let resend = SpyProvider::new("resend", Behavior::Accept);

    for method in [http::Method::GET, http::Method::PUT, http::Method::DELETE] {
        let app = build_app(Dispatcher::builder().http_api(resend.clone()).build());
        let request = Request::builder()
            .method(method.clone())
            .uri("/api/sendEmail")
            .body(Body::empty())
            .unwrap();
        let (status, json) = send(app, request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_eq!(json["message"], "Method not allowed");
    }
    assert!(resend.calls().is_empty());
}

#[tokio::test]
async fn cors_headers_are_permissive() {
    let app = build_app(Dispatcher::builder().build());
    let request = Request::builder()
        .uri("/api/health")
        .header(http::header::ORIGIN, "https://www.example.com")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[http::header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

// -- health ---------------------------------------------------------------

#[tokio::test]
async fn health_flips_with_configuration() {
    let (status, json) = send(
        build_app(Dispatcher::from_config(&RelayConfig::default()).unwrap()),
        get("/api/health"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
    assert_eq!(json["provider"], "none");
    assert_eq!(json["smtpConfigured"], false);
    assert_eq!(json["resendConfigured"], false);
    assert_eq!(json["mode"], "server");
    assert_eq!(json["port"], 3000);
    assert!(json["version"].is_string());

    let mut config = RelayConfig::default();
    populated_smtp(&mut config);
    let (_, json) = send(
        build_app(Dispatcher::from_config(&config).unwrap()),
        get("/api/health"),
    )
    .await;
    assert_eq!(json["provider"], "smtp");
    assert_eq!(json["smtpConfigured"], true);
    assert_eq!(json["resendConfigured"], false);

    config.resend.api_key = Some("re_123".into());
    let (_, json) = send(
        build_app(Dispatcher::from_config(&config).unwrap()),
        get("/api/health"),
    )
    .await;
    assert_eq!(json["provider"], "resend");
    assert_eq!(json["smtpConfigured"], true);
    assert_eq!(json["resendConfigured"], true);
}

#[tokio::test]
async fn health_reports_function_mode() {
    let mut config = RelayConfig::default();
    config.server.mode = DeploymentMode::Function;
    populated_smtp(&mut config);

    let (_, json) = send(
        build_app(Dispatcher::from_config(&config).unwrap()),
        get("/api/health"),
    )
    .await;
    assert_eq!(json["mode"], "function");
    assert_eq!(json["provider"], "none");
    assert_eq!(json["smtpConfigured"], true);
}

// -- verifySMTP -----------------------------------------------------------

#[tokio::test]
async fn verify_succeeds_with_working_smtp() {
    let smtp = SpyProvider::new("smtp", Behavior::Accept);
    let app = build_app(Dispatcher::builder().smtp(smtp.clone()).build());

    let (status, json) = send(app, get("/api/verifySMTP")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "ok": true }));
    assert_eq!(smtp.verifications(), 1);
    assert!(smtp.calls().is_empty());
}

#[tokio::test]
async fn verify_failure_is_500() {
    let smtp = SpyProvider::failing_verify("smtp");
    let app = build_app(Dispatcher::builder().smtp(smtp.clone()).build());

    let (status, json) = send(app, get("/api/verifySMTP")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["ok"], false);
    assert_eq!(json["code"], "EAUTH");
    assert!(json["message"].as_str().unwrap().contains("535"));
    assert!(json.get("hint").is_none());
}

#[tokio::test]
async fn verify_ignores_resend() {
    let resend = SpyProvider::new("resend", Behavior::Accept);
    let app = build_app(Dispatcher::builder().http_api(resend.clone()).build());

    let (status, json) = send(app, get("/api/verifySMTP")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "SMTP_NOT_CONFIGURED");
    assert!(json["hint"].is_string());
    assert_eq!(resend.verifications(), 0);
}

#[tokio::test]
async fn verify_in_function_mode_is_not_supported() {
    let app = build_app(Dispatcher::builder().mode(DeploymentMode::Function).build());

    let (status, json) = send(app, get("/api/verifySMTP")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["code"], "SMTP_NOT_SUPPORTED");
}

// -- openapi & function adapter -------------------------------------------

#[tokio::test]
async fn openapi_document_is_served() {
    let app = build_app(Dispatcher::builder().build());
    let (status, json) = send(app, get("/api/openapi.json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["paths"]["/api/sendEmail"].is_object());
}

#[tokio::test]
async fn function_invoke_matches_server() {
    let resend = SpyProvider::new("resend", Behavior::Accept);
    let app = build_app(Dispatcher::builder().http_api(resend.clone()).build());

    let request: FunctionRequest = serde_json::from_value(json!({
        "method": "POST",
        "path": "/api/sendEmail",
        "body": valid_form(),
    }))
    .unwrap();
    let response = function::invoke(app.clone(), request).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body["message"], "Your message was sent successfully.");
    assert_eq!(resend.calls().len(), 1);

    let request: FunctionRequest = serde_json::from_value(json!({
        "method": "POST",
        "path": "/api/sendEmail",
        "body": { "name": "A" },
    }))
    .unwrap();
    let response = function::invoke(app.clone(), request).await.unwrap();
    assert_eq!(response.status, 400);

    let request: FunctionRequest =
        serde_json::from_value(json!({ "method": "GET", "path": "/api/sendEmail" })).unwrap();
    let response = function::invoke(app, request).await.unwrap();
    assert_eq!(response.status, 405);
    assert_eq!(resend.calls().len(), 1);
}
