//! Logger transport that only logs messages.
//!
//! Useful for staging environments or when you want to see what would be sent
//! without actually sending anything.

use crate::error::MailError;
use crate::message::Message;
use crate::transport::{DeliveryResult, Transport};

/// Logger transport that emits tracing events for messages.
#[derive(Debug, Clone, Default)]
pub struct LoggerTransport {
    /// If true, log full message details. If false, just log recipient summary.
    log_full: bool,
}

impl LoggerTransport {
    /// Create a logger transport with brief output (just recipients).
    pub fn new() -> Self {
        Self { log_full: false }
    }

    /// Create a logger transport with full message details.
    pub fn full() -> Self {
        Self { log_full: true }
    }

    /// Set whether to log full message details.
    pub fn log_full(mut self, full: bool) -> Self {
        self.log_full = full;
        self
    }
}

impl Transport for LoggerTransport {
    fn deliver(&self, message: &Message) -> Result<DeliveryResult, MailError> {
        let message_id = message
            .message_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let to: Vec<String> = message.to.iter().map(ToString::to_string).collect();

        if self.log_full {
            tracing::info!(
                message_id = %message_id,
                from = ?message.from.iter().map(ToString::to_string).collect::<Vec<_>>(),
                to = ?to,
                cc = ?message.cc.iter().map(ToString::to_string).collect::<Vec<_>>(),
                bcc = ?message.bcc.iter().map(ToString::to_string).collect::<Vec<_>>(),
                subject = ?message.subject,
                content_type = %message.content_type,
                delivery = message.delivery.name(),
                attachments = message.attachments().len(),
                "Message logged (full)"
            );

            if let Some(text) = message.body.clone().or_else(|| message.text_part().and_then(|p| p.text())) {
                tracing::debug!(body = %text, "Text body");
            }
            if let Some(html) = message.html_part().and_then(|p| p.text()) {
                tracing::debug!(body = %html, "HTML body");
            }
        } else {
            tracing::info!(
                message_id = %message_id,
                to = ?to,
                subject = ?message.subject,
                "Message logged"
            );
        }

        Ok(DeliveryResult::new(message_id))
    }

    fn name(&self) -> &'static str {
        "logger"
    }
}
