use formrelay_provider::{ContactMessage, DeliveryError, DeliveryReceipt, MailProvider};
use tracing::{debug, error, info, instrument};

use crate::config::SmtpConfig;
use crate::error::SmtpError;
use crate::pool::{Pool, PoolLimits, PoolStatus};
use crate::transport::{SessionFactory, build_message, close, sender_mailbox, within};

const PROVIDER_NAME: &str = "smtp";

/// A mail provider that submits messages over pooled SMTP sessions.
///
/// Sessions are opened lazily and shared by every request in the process,
/// with at most `max_connections` sockets open at any time. Waiting for a
/// free session is bounded by the connection timeout; opening one is bounded
/// stage by stage (see the connection, greeting and socket timeouts on
/// [`SmtpConfig`]), and the message itself by the socket timeout.
///
/// # Examples
///
/// ```no_run
/// use formrelay_smtp::{SmtpConfig, SmtpProvider};
///
/// let config = SmtpConfig::new("smtp.example.com", 587)
///     .with_credentials("relay@example.com", "pass");
/// let provider = SmtpProvider::new(config);
/// assert_eq!(formrelay_provider::MailProvider::name(&provider), "smtp");
/// ```
pub struct SmtpProvider {
    config: SmtpConfig,
    pool: Pool<SessionFactory>,
}

impl std::fmt::Debug for SmtpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpProvider")
            .field("config", &self.config)
            .field("pool", &self.pool)
            .finish()
    }
}

impl SmtpProvider {
    /// Create a provider. No connection is opened until the first send.
    pub fn new(config: SmtpConfig) -> Self {
        let limits = PoolLimits {
            max_connections: config.max_connections,
            max_messages: config.max_messages,
            idle_timeout: config.idle_timeout,
        };
        let pool = Pool::new(limits, SessionFactory::new(config.clone()));
        Self { config, pool }
    }

    pub fn config(&self) -> &SmtpConfig {
        &self.config
    }

    pub fn pool_status(&self) -> PoolStatus {
        self.pool.status()
    }

    async fn deliver(&self, message: &ContactMessage) -> Result<(), SmtpError> {
        let email = build_message(sender_mailbox(&self.config)?, message)?;
        let raw = email.formatted();

        let mut conn = self.pool.acquire(self.config.connection_timeout).await?;
        debug!(
            slot = conn.id(),
            messages_sent = conn.messages_sent(),
            reused = conn.is_reused(),
            "sending mail via SMTP"
        );

        let outcome = within(
            self.config.socket_timeout,
            "send",
            conn.send(email.envelope(), &raw),
        )
        .await;
        match outcome {
            Ok(response) => {
                conn.mark_sent();
                info!(code = %response.code(), "SMTP server accepted message");
                if conn.is_exhausted() {
                    close(&mut conn, self.config.socket_timeout).await;
                }
                Ok(())
            }
            Err(e) => {
                conn.discard();
                Err(e)
            }
        }
    }
}

impl MailProvider for SmtpProvider {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    #[instrument(skip(self, message), fields(provider = "smtp", host = %self.config.host))]
    async fn send(&self, message: &ContactMessage) -> Result<DeliveryReceipt, DeliveryError> {
        self.deliver(message).await.map_err(|e| {
            error!(error = %e, code = e.code(), "SMTP send failed");
            DeliveryError::from(e)
        })?;
        Ok(DeliveryReceipt::new(PROVIDER_NAME))
    }

    /// Open and authenticate a new session without sending anything. The
    /// session then joins the pool like any other.
    #[instrument(skip(self), fields(provider = "smtp", host = %self.config.host))]
    async fn verify(&self) -> Result<(), DeliveryError> {
        debug!("verifying SMTP connection");
        match self.pool.acquire_fresh(self.config.connection_timeout).await {
            Ok(conn) => {
                info!(slot = conn.id(), "SMTP connection verified");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, code = e.code(), "SMTP verification failed");
                Err(e.into())
            }
        }
    }
}
