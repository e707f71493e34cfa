use async_trait::async_trait;

use crate::error::DeliveryError;
use crate::message::{ContactMessage, DeliveryReceipt};

/// Strongly-typed mail provider trait with native `async fn`.
///
/// This trait is **not** object-safe because it uses native `async fn` methods
/// (which desugar to opaque `impl Future` return types). If you need dynamic
/// dispatch, use [`DynMailProvider`] instead -- every `MailProvider`
/// automatically implements `DynMailProvider` via a blanket implementation.
pub trait MailProvider: Send + Sync {
    /// Returns the provider name reported in health output (`"resend"`, `"smtp"`).
    fn name(&self) -> &str;

    /// Deliver a single message. Implementations make exactly one attempt.
    fn send(
        &self,
        message: &ContactMessage,
    ) -> impl std::future::Future<Output = Result<DeliveryReceipt, DeliveryError>> + Send;

    /// Check that the provider is reachable and accepts our credentials
    /// without sending anything.
    ///
    /// Providers without a session to open (plain HTTP APIs) succeed by default.
    fn verify(&self) -> impl std::future::Future<Output = Result<(), DeliveryError>> + Send {
        async { Ok(()) }
    }
}

/// Object-safe provider trait for use behind `Arc<dyn DynMailProvider>`.
///
/// Uses [`macro@async_trait`] to enable dynamic dispatch of async methods.
/// You generally should not implement this trait directly -- instead implement
/// [`MailProvider`] and rely on the blanket implementation.
#[async_trait]
pub trait DynMailProvider: Send + Sync {
    /// Returns the provider name.
    fn name(&self) -> &str;

    /// Deliver a single message.
    async fn send(&self, message: &ContactMessage) -> Result<DeliveryReceipt, DeliveryError>;

    /// Check connectivity and credentials without sending.
    async fn verify(&self) -> Result<(), DeliveryError>;
}

/// Blanket implementation: any type that implements [`MailProvider`] also
/// implements [`DynMailProvider`], bridging the static and dynamic dispatch worlds.
#[async_trait]
impl<T: MailProvider + Sync> DynMailProvider for T {
    fn name(&self) -> &str {
        MailProvider::name(self)
    }

    async fn send(&self, message: &ContactMessage) -> Result<DeliveryReceipt, DeliveryError> {
        MailProvider::send(self, message).await
    }

    async fn verify(&self) -> Result<(), DeliveryError> {
        MailProvider::verify(self).await
    }
}
