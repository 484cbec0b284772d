//! # Postbox
//!
//! Compose and dispatch emails from a flat set of options. Defaults and
//! overrides layer over every request, and messages leave through sendmail
//! or SMTP.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use postbox::{Composer, Config, Options};
//!
//! let composer = Composer::new(Config::from_env()?);
//!
//! composer.send(
//!     Options::new()
//!         .to("user@example.com")
//!         .subject("Welcome!")
//!         .body("Hello"),
//! )?;
//! # Ok::<(), postbox::MailError>(())
//! ```
//!
//! Without an explicit `via`, messages go through sendmail when the binary
//! is executable on this machine, and through SMTP (localhost:25)
//! otherwise.
//!
//! ## Defaults and Overrides
//!
//! ```rust
//! use postbox::{Config, Options};
//!
//! let config = Config::new()
//!     .defaults(Options::new().from("noreply@example.com"))
//!     .overrides(Options::new().to("qa@example.com"))
//!     .subject_prefix("[staging] ");
//! ```
//!
//! A request's own values win over defaults; overrides win over both.
//!
//! ## Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `EMAIL_FROM` | Default sender email |
//! | `EMAIL_FROM_NAME` | Default sender name |
//! | `EMAIL_OVERRIDE_TO` | Send every message to this address instead |
//! | `EMAIL_VIA` | `sendmail` or `smtp` |
//! | `EMAIL_SUBJECT_PREFIX` | Prepended to every subject |
//! | `EMAIL_APPEND_INPUTS` | Append each request to its body |
//! | `SENDMAIL_LOCATION` | Sendmail binary path |
//! | `SMTP_HOST` | SMTP server host (default: localhost) |
//! | `SMTP_PORT` | SMTP server port (default: 25) |
//! | `SMTP_DOMAIN` | HELO domain |
//! | `SMTP_USERNAME` | SMTP username |
//! | `SMTP_PASSWORD` | SMTP password |
//! | `SMTP_TLS` | Implicit TLS |
//! | `SMTP_STARTTLS` | Opportunistic STARTTLS (default: on) |
//!
//! ## Feature Flags
//!
//! - `sendmail` - sendmail transport via lettre (default)
//! - `smtp` - SMTP transport via lettre (default)
//! - `testing` - assertion helpers over [`LocalTransport`](transports::LocalTransport) (default)
//! - `metrics` - Prometheus-style metrics (counters/histograms)
//!
//! ## Metrics
//!
//! Enable `features = ["metrics"]` to emit Prometheus-style metrics:
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `postbox_messages_total` | Counter | transport, status | Total messages sent |
//! | `postbox_delivery_duration_seconds` | Histogram | transport | Delivery duration |
//!
//! Install a recorder (e.g., `metrics-exporter-prometheus`) in your app to collect them.

/// The version of the postbox crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod attachment;
mod builder;
mod composer;
mod config;
mod error;
mod host;
mod message;
mod options;
mod resolve;
mod transport;

pub mod transports;

#[cfg(feature = "testing")]
pub mod testing;

// Re-exports
pub use attachment::{Attachment, AttachmentType};
pub use builder::{MessageBuilder, DEFAULT_CHARSET, DEFAULT_FROM};
pub use composer::Composer;
pub use config::Config;
pub use error::MailError;
pub use host::{Host, StaticHost, SystemHost, DEFAULT_SENDMAIL};
pub use message::{Delivery, Disposition, Message, Part, PartBody, SmtpSettings, TransferEncoding};
pub use options::{Options, Via, ViaOptions, NON_STANDARD_OPTIONS, STANDARD_OPTIONS};
pub use resolve::{default_via, resolve};
pub use transport::{DeliveryResult, Transport};

pub use lettre::message::Mailbox;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::Attachment;
    pub use crate::Composer;
    pub use crate::Config;
    pub use crate::DeliveryResult;
    pub use crate::MailError;
    pub use crate::Message;
    pub use crate::Options;
    pub use crate::Transport;
    pub use crate::Via;
}
