use formrelay_provider::{ContactMessage, DeliveryError, DeliveryReceipt, MailProvider};
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::config::ResendConfig;
use crate::error::ResendError;
use crate::types::{ResendSendRequest, ResendSendResponse};

/// Name reported in health output and error codes.
pub(crate) const PROVIDER_NAME: &str = "resend";

/// Resend provider that delivers mail through the Resend HTTP API.
pub struct ResendProvider {
    config: ResendConfig,
    client: Client,
}

impl ResendProvider {
    /// Create a new Resend provider with the given configuration.
    ///
    /// Builds a `reqwest::Client` bounded by the configured timeout.
    pub fn new(config: ResendConfig) -> Result<Self, ResendError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Create a new Resend provider with a custom HTTP client.
    pub fn with_client(config: ResendConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// The configured `From` address.
    pub fn from_address(&self) -> &str {
        &self.config.from_address
    }

    fn emails_url(&self) -> String {
        format!("{}/emails", self.config.api_base_url.trim_end_matches('/'))
    }

    async fn post_email(
        &self,
        request: &ResendSendRequest,
    ) -> Result<ResendSendResponse, ResendError> {
        let response = self
            .client
            .post(self.emails_url())
            .bearer_auth(&self.config.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Resend reports failures as JSON; anything else is dropped and the
            // caller falls back to the bare status.
            let body = response
                .text()
                .await
                .ok()
                .and_then(|text| serde_json::from_str::<serde_json::Value>(&text).ok());
            warn!(status = status.as_u16(), "Resend API rejected message");
            return Err(ResendError::Api {
                status: status.as_u16(),
                body,
            });
        }

        // A 2xx with an unexpected body still means the message was accepted.
        let text = response.text().await?;
        Ok(serde_json::from_str(&text).unwrap_or(ResendSendResponse { id: None }))
    }
}

impl MailProvider for ResendProvider {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    #[instrument(skip(self, message), fields(provider = "resend"))]
    async fn send(&self, message: &ContactMessage) -> Result<DeliveryReceipt, DeliveryError> {
        let request = ResendSendRequest {
            from: self.config.from_address.clone(),
            to: vec![message.to.clone()],
            subject: message.subject.clone(),
            html: message.html.clone(),
        };

        debug!(to = %message.to, "sending mail via Resend");

        let response = self.post_email(&request).await?;

        let receipt = DeliveryReceipt::new(PROVIDER_NAME);
        Ok(match response.id {
            Some(id) => receipt.with_message_id(id),
            None => receipt,
        })
    }
}
