//! Local transport for development and testing.
//!
//! Stores messages in memory for programmatic assertions in tests.
//!
//! ```
//! use postbox::transports::LocalTransport;
//! use postbox::{Composer, Config, Options};
//!
//! let transport = LocalTransport::new();
//! let composer = Composer::new(Config::new()).with_transport(transport.clone());
//!
//! composer
//!     .send(Options::new().to("user@example.com").subject("Welcome"))
//!     .unwrap();
//!
//! assert!(transport.sent_to("user@example.com"));
//! assert!(transport.sent_with_subject_containing("Welcome"));
//! ```

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::error::MailError;
use crate::message::Message;
use crate::transport::{DeliveryResult, Transport};

/// A captured message.
#[derive(Debug, Clone)]
pub struct StoredMessage {
    /// Identifier returned from delivery.
    pub id: String,
    pub message: Message,
    /// When the message was captured.
    pub sent_at: DateTime<Utc>,
}

/// Transport that keeps messages in memory.
///
/// Clones share the captured messages and the failure setting.
#[derive(Debug, Clone, Default)]
pub struct LocalTransport {
    messages: Arc<RwLock<Vec<StoredMessage>>>,
    /// If set, deliver() will return this error (for testing error paths).
    fail_with: Arc<RwLock<Option<String>>>,
}

impl LocalTransport {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Failure Simulation (for testing)
    // =========================================================================

    /// Make every delivery fail with [`MailError::SendError`].
    pub fn set_failure(&self, message: impl Into<String>) {
        *self.fail_with.write() = Some(message.into());
    }

    /// Clear the failure state.
    pub fn clear_failure(&self) {
        *self.fail_with.write() = None;
    }

    // =========================================================================
    // Message Access (for testing assertions)
    // =========================================================================

    /// All captured messages, oldest first.
    pub fn messages(&self) -> Vec<StoredMessage> {
        self.messages.read().clone()
    }

    /// The most recently sent message.
    pub fn last_message(&self) -> Option<StoredMessage> {
        self.messages.read().last().cloned()
    }

    pub fn message_count(&self) -> usize {
        self.messages.read().len()
    }

    /// Check if any message was sent.
    pub fn has_messages(&self) -> bool {
        !self.messages.read().is_empty()
    }

    /// Clear all captured messages.
    pub fn clear(&self) {
        self.messages.write().clear();
    }

    /// Remove and return all captured messages.
    pub fn flush(&self) -> Vec<StoredMessage> {
        std::mem::take(&mut *self.messages.write())
    }

    // =========================================================================
    // Query Helpers (for testing)
    // =========================================================================

    /// Check if a message was delivered to `email` (to, cc, bcc or envelope).
    pub fn sent_to(&self, email: &str) -> bool {
        self.messages.read().iter().any(|stored| {
            stored
                .message
                .destinations()
                .iter()
                .any(|mailbox| mailbox.email.to_string().eq_ignore_ascii_case(email))
        })
    }

    /// Check if a message with exactly this subject was sent.
    pub fn sent_with_subject(&self, subject: &str) -> bool {
        self.messages
            .read()
            .iter()
            .any(|stored| stored.message.subject.as_deref() == Some(subject))
    }

    /// Check if a message with subject containing text was sent.
    pub fn sent_with_subject_containing(&self, text: &str) -> bool {
        self.messages.read().iter().any(|stored| {
            stored
                .message
                .subject
                .as_deref()
                .is_some_and(|s| s.contains(text))
        })
    }

    /// Find messages matching a predicate.
    pub fn find_messages<F>(&self, predicate: F) -> Vec<StoredMessage>
    where
        F: Fn(&Message) -> bool,
    {
        self.messages
            .read()
            .iter()
            .filter(|stored| predicate(&stored.message))
            .cloned()
            .collect()
    }
}

impl Transport for LocalTransport {
    fn deliver(&self, message: &Message) -> Result<DeliveryResult, MailError> {
        if let Some(ref reason) = *self.fail_with.read() {
            return Err(MailError::SendError(reason.clone()));
        }

        let id = message
            .message_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        self.messages.write().push(StoredMessage {
            id: id.clone(),
            message: message.clone(),
            sent_at: Utc::now(),
        });

        Ok(DeliveryResult::new(id))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::MessageBuilder;
    use crate::options::Options;

    fn message(to: &str, subject: &str) -> Message {
        MessageBuilder::new("test.local")
            .build(&Options::new().to(to).subject(subject).body("Hello!"))
            .unwrap()
    }

    #[test]
    fn test_local_transport() {
        let transport = LocalTransport::new();

        let result = transport
            .deliver(&message("recipient@example.com", "Test Email"))
            .unwrap();
        assert!(!result.message_id.is_empty());

        assert_eq!(transport.message_count(), 1);
        let stored = transport.last_message().unwrap();
        assert_eq!(stored.id, result.message_id);
        assert_eq!(stored.message.subject.as_deref(), Some("Test Email"));
    }

    #[test]
    fn test_keeps_message_id() {
        let transport = LocalTransport::new();
        let message = MessageBuilder::new("test.local")
            .build(&Options::new().to("a@example.com").message_id("<id@example.com>"))
            .unwrap();

        let result = transport.deliver(&message).unwrap();
        assert_eq!(result.message_id, "id@example.com");
    }

    #[test]
    fn test_order_and_flush() {
        let transport = LocalTransport::new();
        transport.deliver(&message("a@example.com", "First")).unwrap();
        transport.deliver(&message("b@example.com", "Second")).unwrap();

        let messages = transport.messages();
        assert_eq!(messages[0].message.subject.as_deref(), Some("First"));
        assert_eq!(
            transport.last_message().unwrap().message.subject.as_deref(),
            Some("Second")
        );

        let flushed = transport.flush();
        assert_eq!(flushed.len(), 2);
        assert!(!transport.has_messages());
    }

    #[test]
    fn test_failure_simulation() {
        let transport = LocalTransport::new();
        transport.set_failure("connection refused");

        let result = transport.deliver(&message("a@example.com", "Hi"));
        assert!(matches!(result, Err(MailError::SendError(ref m)) if m == "connection refused"));
        assert_eq!(transport.message_count(), 0);

        transport.clear_failure();
        assert!(transport.deliver(&message("a@example.com", "Hi")).is_ok());
    }

    #[test]
    fn test_clones_share_storage() {
        let transport = LocalTransport::new();
        let clone = transport.clone();
        clone.deliver(&message("a@example.com", "Hi")).unwrap();
        assert_eq!(transport.message_count(), 1);

        transport.clear();
        assert_eq!(clone.message_count(), 0);
    }

    #[test]
    fn test_queries() {
        let transport = LocalTransport::new();
        transport
            .deliver(&message("Alice <alice@example.com>", "Welcome aboard"))
            .unwrap();

        assert!(transport.sent_to("ALICE@example.com"));
        assert!(!transport.sent_to("bob@example.com"));
        assert!(transport.sent_with_subject("Welcome aboard"));
        assert!(!transport.sent_with_subject("Welcome"));
        assert!(transport.sent_with_subject_containing("Welcome"));
        assert_eq!(
            transport
                .find_messages(|m| m.body.as_deref() == Some("Hello!"))
                .len(),
            1
        );
    }
}
