//! Error types for postbox.

use thiserror::Error;

/// Errors that can occur when composing or sending emails.
#[derive(Debug, Clone, Error)]
pub enum MailError {
    /// The resolved request has no `to` recipient.
    #[error(":to is required")]
    MissingRecipient,

    /// A dynamic request carried a key that is not a recognized option.
    #[error("Unknown option: {0}")]
    UnknownOption(String),

    /// Configuration error (missing env var, invalid value, disabled feature, etc.)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid email address or address list.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Invalid header name or value.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Content type that does not parse as a mime type.
    #[error("Invalid content type: {0}")]
    InvalidContentType(String),

    /// Failed to read attachment file.
    #[error("Failed to read attachment: {0}")]
    AttachmentReadError(String),

    /// Error building the email message.
    #[error("Build error: {0}")]
    BuildError(String),

    /// Error sending the email.
    #[error("Send error: {0}")]
    SendError(String),

    /// Feature the selected transport cannot express.
    #[error("Unsupported feature: {0}")]
    UnsupportedFeature(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(String),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for MailError {
    fn from(err: serde_json::Error) -> Self {
        Self::JsonError(err.to_string())
    }
}

impl From<lettre::address::AddressError> for MailError {
    fn from(err: lettre::address::AddressError) -> Self {
        Self::InvalidAddress(err.to_string())
    }
}

impl From<lettre::error::Error> for MailError {
    fn from(err: lettre::error::Error) -> Self {
        Self::BuildError(err.to_string())
    }
}

impl From<mime::FromStrError> for MailError {
    fn from(err: mime::FromStrError) -> Self {
        Self::InvalidContentType(err.to_string())
    }
}

#[cfg(feature = "smtp")]
impl From<lettre::transport::smtp::Error> for MailError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        Self::SendError(err.to_string())
    }
}

#[cfg(feature = "sendmail")]
impl From<lettre::transport::sendmail::Error> for MailError {
    fn from(err: lettre::transport::sendmail::Error) -> Self {
        Self::SendError(err.to_string())
    }
}
