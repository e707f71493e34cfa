//! Resend provider for formrelay.
//!
//! Implements [`MailProvider`](formrelay_provider::MailProvider) on top of the
//! [Resend HTTP API](https://resend.com/docs/api-reference/emails/send-email):
//! one authenticated `POST /emails` per message, no persistent connection.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use formrelay_resend::{ResendConfig, ResendProvider};
//!
//! let config = ResendConfig::new("re_123").with_from_address("Acme <hello@acme.test>");
//! let provider = ResendProvider::new(config).unwrap();
//! ```

pub mod config;
pub mod error;
pub mod provider;
pub mod types;

pub use config::{DEFAULT_FROM_ADDRESS, ResendConfig};
pub use error::ResendError;
pub use provider::ResendProvider;
pub use types::{ResendSendRequest, ResendSendResponse};
