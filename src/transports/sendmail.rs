//! Sendmail transport using lettre.
//!
//! ```rust,ignore
//! use postbox::transports::SendmailTransport;
//!
//! let transport = SendmailTransport::new("/usr/sbin/sendmail");
//! ```

use lettre::Transport as LettreTransport;
use std::path::{Path, PathBuf};

use crate::error::MailError;
use crate::message::Message;
use crate::transport::{DeliveryResult, Transport};

use super::wire;

/// Pipes messages to a local sendmail binary.
pub struct SendmailTransport {
    location: PathBuf,
    transport: lettre::SendmailTransport,
}

impl SendmailTransport {
    /// Use the binary at `location`.
    pub fn new(location: impl AsRef<Path>) -> Self {
        let location = location.as_ref().to_path_buf();
        let transport = lettre::SendmailTransport::new_with_command(location.as_os_str());
        Self {
            location,
            transport,
        }
    }

    /// The sendmail binary in use.
    pub fn location(&self) -> &Path {
        &self.location
    }
}

impl Transport for SendmailTransport {
    fn deliver(&self, message: &Message) -> Result<DeliveryResult, MailError> {
        let email = wire::to_lettre(message)?;
        let message_id = wire::delivered_message_id(message, &email);

        tracing::debug!(
            location = %self.location.display(),
            message_id = %message_id,
            "Piping message to sendmail"
        );
        self.transport.send(&email)?;

        Ok(DeliveryResult::new(message_id))
    }

    fn name(&self) -> &'static str {
        "sendmail"
    }
}
