//! SMTP provider for formrelay.
//!
//! Submits rendered contact messages through [`lettre`]'s SMTP connections,
//! kept in a small pool where every session is exactly one socket (see
//! [`pool`]). Connecting, greeting and each later exchange run under their
//! own timeouts.

pub mod config;
pub mod error;
pub mod pool;
pub mod provider;
mod transport;

pub use config::SmtpConfig;
pub use error::SmtpError;
pub use pool::{Pool, PoolLimits, PoolStatus, Pooled, SessionManager};
pub use provider::SmtpProvider;
