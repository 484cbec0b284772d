//! Transport trait and delivery result types.
//!
//! The composer never talks to a mail server itself; it hands the finished
//! [`Message`] to a [`Transport`]. The default one,
//! [`NativeTransport`](crate::transports::NativeTransport), delivers through
//! sendmail or SMTP as the message says. Tests swap in
//! [`LocalTransport`](crate::transports::LocalTransport) or a closure.

use serde::{Deserialize, Serialize};

use crate::error::MailError;
use crate::message::Message;

/// Result of a successful delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryResult {
    /// Message ID of the delivered message
    pub message_id: String,
    /// Optional transport-specific response data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_response: Option<serde_json::Value>,
}

impl DeliveryResult {
    /// Create a new delivery result with just a message ID.
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            transport_response: None,
        }
    }

    /// Create a delivery result with transport response.
    pub fn with_response(message_id: impl Into<String>, response: serde_json::Value) -> Self {
        Self {
            message_id: message_id.into(),
            transport_response: Some(response),
        }
    }
}

/// Something that can deliver a composed message.
///
/// # Example
///
/// ```
/// use postbox::{DeliveryResult, MailError, Message, Transport};
///
/// struct Discard;
///
/// impl Transport for Discard {
///     fn deliver(&self, _message: &Message) -> Result<DeliveryResult, MailError> {
///         Ok(DeliveryResult::new("discarded"))
///     }
///
///     fn name(&self) -> &'static str {
///         "discard"
///     }
/// }
/// ```
///
/// Closures work too:
///
/// ```
/// use postbox::{Composer, Config, DeliveryResult, MailError, Message};
///
/// let composer = Composer::new(Config::new()).with_transport(|message: &Message| {
///     Ok::<_, MailError>(DeliveryResult::new(message.to.len().to_string()))
/// });
/// ```
pub trait Transport: Send + Sync {
    /// Deliver a single message.
    ///
    /// Errors are returned to the caller unchanged; there is no retry.
    fn deliver(&self, message: &Message) -> Result<DeliveryResult, MailError>;

    /// Get the transport name (for logging/debugging).
    fn name(&self) -> &'static str {
        "unknown"
    }
}

impl<F> Transport for F
where
    F: Fn(&Message) -> Result<DeliveryResult, MailError> + Send + Sync,
{
    fn deliver(&self, message: &Message) -> Result<DeliveryResult, MailError> {
        self(message)
    }

    fn name(&self) -> &'static str {
        "fn"
    }
}
