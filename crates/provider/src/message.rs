use serde::Serialize;

/// A rendered contact message, ready to hand to exactly one provider.
///
/// The sender address is not part of the message: each provider applies its
/// own configured `From`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    /// Recipient inbox.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
}

/// Result of a successful delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryReceipt {
    /// Name of the provider that accepted the message.
    pub provider: String,
    /// Provider-assigned message identifier, if one was returned.
    pub message_id: Option<String>,
}

impl DeliveryReceipt {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            message_id: None,
        }
    }

    #[must_use]
    pub fn with_message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }
}
