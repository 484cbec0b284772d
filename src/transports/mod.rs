//! Transport implementations.
//!
//! Each transport implements the [`Transport`](crate::Transport) trait.
//!
//! ## Available Transports
//!
//! | Transport | Feature Flag | Description |
//! |-----------|-------------|-------------|
//! | [`NativeTransport`] | (none) | Delivers the way the message says (sendmail or SMTP) |
//! | [`SendmailTransport`] | `sendmail` | Local sendmail binary via lettre |
//! | [`SmtpTransport`] | `smtp` | SMTP relay via lettre |
//! | [`LocalTransport`] | (none) | In-memory storage for dev/testing |
//! | [`LoggerTransport`] | (none) | Logs messages without sending |

mod native;
pub use native::NativeTransport;

#[cfg(feature = "sendmail")]
mod sendmail;
#[cfg(feature = "sendmail")]
pub use sendmail::SendmailTransport;

#[cfg(feature = "smtp")]
mod smtp;
#[cfg(feature = "smtp")]
pub use smtp::{SmtpBuilder, SmtpTransport, TlsMode};

mod local;
pub use local::{LocalTransport, StoredMessage};

mod logger;
pub use logger::LoggerTransport;

pub mod wire;
