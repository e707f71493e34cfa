pub mod error;
pub mod message;
pub mod provider;

pub use error::{DeliveryError, NotConfiguredReason};
pub use message::{ContactMessage, DeliveryReceipt};
pub use provider::{DynMailProvider, MailProvider};
