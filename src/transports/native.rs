//! Delivery as described by the message itself.

use crate::error::MailError;
use crate::message::{Delivery, Message};
use crate::transport::{DeliveryResult, Transport};

/// Sends each message through the mechanism its [`Delivery`] names.
///
/// A new connection (or sendmail process) is used per message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeTransport;

impl NativeTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for NativeTransport {
    fn deliver(&self, message: &Message) -> Result<DeliveryResult, MailError> {
        match &message.delivery {
            #[cfg(feature = "sendmail")]
            Delivery::Sendmail { location } => {
                super::SendmailTransport::new(location).deliver(message)
            }
            #[cfg(not(feature = "sendmail"))]
            Delivery::Sendmail { .. } => Err(MailError::Configuration(
                "sendmail delivery requires the `sendmail` feature".into(),
            )),
            #[cfg(feature = "smtp")]
            Delivery::Smtp(settings) => super::SmtpTransport::from_settings(settings)?.deliver(message),
            #[cfg(not(feature = "smtp"))]
            Delivery::Smtp(_) => Err(MailError::Configuration(
                "SMTP delivery requires the `smtp` feature".into(),
            )),
        }
    }

    fn name(&self) -> &'static str {
        "native"
    }
}
