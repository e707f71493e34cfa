use std::future::Future;
use std::time::Duration;

use formrelay_provider::ContactMessage;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{AsyncSmtpConnection, TlsParameters};
use lettre::transport::smtp::extension::ClientId;
use lettre::{Address, Message};
use tokio::net::TcpStream;
use tracing::debug;

use crate::config::SmtpConfig;
use crate::error::SmtpError;
use crate::pool::SessionManager;

const AUTH_MECHANISMS: [Mechanism; 2] = [Mechanism::Plain, Mechanism::Login];

/// Run one stage of the SMTP dialogue under its own deadline.
pub(crate) async fn within<T, E>(
    limit: Duration,
    stage: &'static str,
    stage_future: impl Future<Output = Result<T, E>>,
) -> Result<T, SmtpError>
where
    E: Into<SmtpError>,
{
    match tokio::time::timeout(limit, stage_future).await {
        Ok(result) => result.map_err(Into::into),
        Err(_) => Err(SmtpError::Timeout {
            stage,
            after: limit,
        }),
    }
}

fn tls_parameters(config: &SmtpConfig) -> Result<TlsParameters, SmtpError> {
    Ok(TlsParameters::builder(config.host.clone())
        .dangerous_accept_invalid_certs(!config.reject_unauthorized)
        .dangerous_accept_invalid_hostnames(!config.reject_unauthorized)
        .build()?)
}

/// Opens authenticated SMTP sessions, one TCP connection each.
///
/// Every stage has its own deadline: the TCP connect is bounded by the
/// connection timeout, the greeting and `EHLO` by the greeting timeout, and
/// `STARTTLS`, `AUTH` and each later command by the socket timeout. With
/// implicit TLS the handshake happens before the greeting, so connect and
/// handshake share the connection and greeting timeouts.
#[derive(Debug, Clone)]
pub(crate) struct SessionFactory {
    config: SmtpConfig,
}

impl SessionFactory {
    pub(crate) fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    async fn open(&self) -> Result<AsyncSmtpConnection, SmtpError> {
        let config = &self.config;
        let hello = ClientId::default();
        let addr = (config.host.as_str(), config.port);

        let mut conn = if config.is_secure() {
            let budget = config.connection_timeout + config.greeting_timeout;
            within(
                budget,
                "greeting",
                AsyncSmtpConnection::connect_tokio1(
                    addr,
                    Some(config.connection_timeout),
                    &hello,
                    Some(tls_parameters(config)?),
                    None,
                ),
            )
            .await?
        } else {
            let tcp = within(config.connection_timeout, "connection", TcpStream::connect(addr))
                .await?;
            within(
                config.greeting_timeout,
                "greeting",
                AsyncSmtpConnection::connect_with_transport(Box::new(tcp), &hello),
            )
            .await?
        };

        if conn.can_starttls() {
            within(
                config.socket_timeout,
                "STARTTLS",
                conn.starttls(tls_parameters(config)?, &hello),
            )
            .await?;
        } else if config.require_tls && !conn.is_encrypted() {
            return Err(SmtpError::TlsUnavailable);
        }

        if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            let credentials = Credentials::new(user.clone(), pass.clone());
            let outcome = within(
                config.socket_timeout,
                "authentication",
                conn.auth(&AUTH_MECHANISMS, &credentials),
            )
            .await;
            match outcome {
                Ok(_) => {}
                Err(SmtpError::Transport(e)) => return Err(SmtpError::Auth(e)),
                Err(e) => return Err(e),
            }
        }

        debug!(
            host = %config.host,
            encrypted = conn.is_encrypted(),
            "SMTP session ready"
        );
        Ok(conn)
    }
}

impl SessionManager for SessionFactory {
    type Session = AsyncSmtpConnection;

    async fn connect(&self) -> Result<AsyncSmtpConnection, SmtpError> {
        self.open().await
    }

    async fn is_usable(&self, session: &mut AsyncSmtpConnection) -> bool {
        !session.has_broken()
            && tokio::time::timeout(self.config.socket_timeout, session.test_connected())
                .await
                .unwrap_or(false)
    }
}

/// Say goodbye on a session that will not be used again.
pub(crate) async fn close(session: &mut AsyncSmtpConnection, limit: Duration) {
    if let Err(e) = within(limit, "QUIT", session.quit()).await {
        debug!(error = %e, "SMTP session did not close cleanly");
    }
}

/// The `From` mailbox: the configured display name in front of the login.
pub(crate) fn sender_mailbox(config: &SmtpConfig) -> Result<Mailbox, SmtpError> {
    let address: Address = config.username.as_deref().unwrap_or_default().parse()?;
    Ok(Mailbox::new(Some(config.sender_name.clone()), address))
}

/// Build an HTML `lettre::Message` from a rendered [`ContactMessage`].
pub(crate) fn build_message(
    from: Mailbox,
    message: &ContactMessage,
) -> Result<Message, SmtpError> {
    let to: Mailbox = message.to.parse()?;

    let email = Message::builder()
        .from(from)
        .to(to)
        .subject(message.subject.clone())
        .header(ContentType::TEXT_HTML)
        .body(message.html.clone())?;

    Ok(email)
}
