//! Provider selection and delivery.
//!
//! The [`Dispatcher`] is built once from [`RelayConfig`] and shared by every
//! request. It renders a [`Submission`] with the shared template and hands the
//! result to exactly one provider: Resend when an API key is configured,
//! otherwise SMTP. A failing provider is never followed by the other one.

use std::sync::Arc;

use formrelay_core::{MessageTemplate, Submission};
use formrelay_provider::{
    ContactMessage, DeliveryError, DeliveryReceipt, DynMailProvider, NotConfiguredReason,
};
use formrelay_resend::ResendProvider;
use formrelay_smtp::SmtpProvider;
use tracing::{info, instrument, warn};

use crate::config::{DeploymentMode, RelayConfig};
use crate::error::ServerError;

/// Name reported by health when no provider can be used.
pub const NO_PROVIDER: &str = "none";

/// Chooses a provider and delivers contact messages.
pub struct Dispatcher {
    mode: DeploymentMode,
    template: MessageTemplate,
    contact_to: String,
    http_api: Option<Arc<dyn DynMailProvider>>,
    smtp: Option<Arc<dyn DynMailProvider>>,
    smtp_configured: bool,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("mode", &self.mode)
            .field("site_name", &self.template.site_name())
            .field("contact_to", &self.contact_to)
            .field("http_api", &self.http_api.as_ref().map(|p| p.name().to_owned()))
            .field("smtp", &self.smtp.as_ref().map(|p| p.name().to_owned()))
            .field("smtp_configured", &self.smtp_configured)
            .finish()
    }
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    /// Build the dispatcher and its providers from resolved configuration.
    ///
    /// Nothing connects here: the Resend client is idle until the first send
    /// and SMTP sessions are opened lazily by the pool. In function mode the
    /// SMTP provider is never built.
    pub fn from_config(config: &RelayConfig) -> Result<Self, ServerError> {
        let mut builder = Self::builder()
            .mode(config.server.mode)
            .site_name(&config.contact.site_name)
            .contact_to(&config.contact.to)
            .smtp_configured(config.smtp.is_configured());

        if let Some(resend) = config.resend.to_provider_config() {
            let provider = ResendProvider::new(resend)
                .map_err(|e| ServerError::Config(format!("failed to build Resend client: {e}")))?;
            builder = builder.http_api(Arc::new(provider));
        }

        if config.server.mode == DeploymentMode::Server
            && let Some(smtp) = config.smtp.to_provider_config(&config.contact.site_name)
        {
            builder = builder.smtp(Arc::new(SmtpProvider::new(smtp)));
        }

        let dispatcher = builder.build();
        info!(
            provider = dispatcher.selected_provider(),
            mode = dispatcher.mode.as_str(),
            smtp_configured = dispatcher.smtp_configured,
            "mail dispatcher ready"
        );
        Ok(dispatcher)
    }

    pub fn mode(&self) -> DeploymentMode {
        self.mode
    }

    /// The provider the next submission would go to.
    fn selected(&self) -> Option<&Arc<dyn DynMailProvider>> {
        self.http_api.as_ref().or(self.smtp.as_ref())
    }

    /// Name of the provider the next submission would go to, or `"none"`.
    pub fn selected_provider(&self) -> &str {
        self.selected().map_or(NO_PROVIDER, |p| p.name())
    }

    pub fn http_api_configured(&self) -> bool {
        self.http_api.is_some()
    }

    /// Whether the SMTP settings look populated, regardless of mode.
    pub fn smtp_configured(&self) -> bool {
        self.smtp_configured
    }

    fn not_configured(&self) -> DeliveryError {
        DeliveryError::NotConfigured(match self.mode {
            DeploymentMode::Server => NotConfiguredReason::SmtpNotConfigured,
            DeploymentMode::Function => NotConfiguredReason::SmtpNotSupported,
        })
    }

    /// Render a submission into the message every provider sends.
    pub fn render(&self, submission: &Submission) -> ContactMessage {
        ContactMessage {
            to: self.contact_to.clone(),
            subject: self.template.subject(),
            html: self.template.render_html(submission),
        }
    }

    /// Deliver one submission through the selected provider.
    #[instrument(skip_all)]
    pub async fn dispatch(
        &self,
        submission: &Submission,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        let Some(provider) = self.selected() else {
            warn!("no mail provider configured, skipping delivery");
            return Err(self.not_configured());
        };

        let message = self.render(submission);
        let result = provider.send(&message).await;
        match &result {
            Ok(receipt) => info!(provider = %receipt.provider, "contact message delivered"),
            Err(e) => warn!(provider = provider.name(), code = %e.code(), error = %e, "contact message not delivered"),
        }
        result
    }

    /// Open and authenticate an SMTP session without sending.
    #[instrument(skip_all)]
    pub async fn verify_smtp(&self) -> Result<(), DeliveryError> {
        match &self.smtp {
            Some(smtp) => smtp.verify().await,
            None => Err(self.not_configured()),
        }
    }
}

/// Builder for [`Dispatcher`], mainly for wiring test providers.
#[derive(Default)]
pub struct DispatcherBuilder {
    mode: DeploymentMode,
    template: MessageTemplate,
    contact_to: Option<String>,
    http_api: Option<Arc<dyn DynMailProvider>>,
    smtp: Option<Arc<dyn DynMailProvider>>,
    smtp_configured: bool,
}

impl DispatcherBuilder {
    #[must_use]
    pub fn mode(mut self, mode: DeploymentMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn site_name(mut self, site_name: impl Into<String>) -> Self {
        self.template = MessageTemplate::new(site_name);
        self
    }

    #[must_use]
    pub fn contact_to(mut self, to: impl Into<String>) -> Self {
        self.contact_to = Some(to.into());
        self
    }

    /// The HTTP-API provider. Takes priority over SMTP whenever present.
    #[must_use]
    pub fn http_api(mut self, provider: Arc<dyn DynMailProvider>) -> Self {
        self.http_api = Some(provider);
        self
    }

    /// The SMTP provider. Implies the SMTP settings are configured.
    #[must_use]
    pub fn smtp(mut self, provider: Arc<dyn DynMailProvider>) -> Self {
        self.smtp = Some(provider);
        self.smtp_configured = true;
        self
    }

    #[must_use]
    pub fn smtp_configured(mut self, configured: bool) -> Self {
        self.smtp_configured = configured || self.smtp.is_some();
        self
    }

    pub fn build(self) -> Dispatcher {
        let smtp = match self.mode {
            DeploymentMode::Server => self.smtp,
            DeploymentMode::Function => None,
        };
        Dispatcher {
            mode: self.mode,
            template: self.template,
            contact_to: self
                .contact_to
                .unwrap_or_else(|| "info@imobilebi.com".to_owned()),
            http_api: self.http_api,
            smtp,
            smtp_configured: self.smtp_configured,
        }
    }
}
