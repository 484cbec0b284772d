//! SMTP transport using lettre.
//!
//! # Example
//!
//! ```rust,ignore
//! use postbox::transports::SmtpTransport;
//!
//! // With authentication
//! let transport = SmtpTransport::new("smtp.example.com", 587)
//!     .credentials("username", "password")
//!     .build()?;
//!
//! // Without authentication (local relay)
//! let transport = SmtpTransport::localhost();
//! ```

use lettre::transport::smtp::{
    authentication::Credentials,
    client::{Tls, TlsParameters},
    extension::ClientId,
    response::Response,
};
use lettre::Transport as LettreTransport;

use crate::error::MailError;
use crate::message::{Message, SmtpSettings};
use crate::transport::{DeliveryResult, Transport};

use super::wire;

/// SMTP transport.
pub struct SmtpTransport {
    host: String,
    port: u16,
    transport: lettre::SmtpTransport,
}

impl SmtpTransport {
    /// Create a new SMTP transport builder using STARTTLS when offered.
    pub fn new(host: &str, port: u16) -> SmtpBuilder {
        SmtpBuilder {
            host: host.to_string(),
            port,
            credentials: None,
            tls: TlsMode::StartTls,
            hello_name: None,
        }
    }

    /// Create a new SMTP transport for localhost (no TLS, no auth).
    pub fn localhost() -> Self {
        let transport = lettre::SmtpTransport::builder_dangerous("localhost")
            .port(25)
            .build();

        Self {
            host: "localhost".to_string(),
            port: 25,
            transport,
        }
    }

    /// Create a transport from the settings carried by a message.
    ///
    /// Implicit TLS wins over STARTTLS; credentials are only used when both
    /// user name and password are present.
    pub fn from_settings(settings: &SmtpSettings) -> Result<Self, MailError> {
        let mut builder = SmtpTransport::new(&settings.address, settings.port);

        builder = match (settings.tls, settings.enable_starttls_auto) {
            (true, _) => builder.tls(TlsMode::Tls),
            (false, true) => builder.tls(TlsMode::StartTls),
            (false, false) => builder.no_tls(),
        };
        if let (Some(user), Some(password)) = (&settings.user_name, &settings.password) {
            builder = builder.credentials(user, password);
        }
        if let Some(domain) = &settings.domain {
            builder = builder.hello_name(domain);
        }

        builder.build()
    }

    /// Relay host and port.
    pub fn server(&self) -> (&str, u16) {
        (&self.host, self.port)
    }
}

impl Transport for SmtpTransport {
    fn deliver(&self, message: &Message) -> Result<DeliveryResult, MailError> {
        let email = wire::to_lettre(message)?;
        let message_id = wire::delivered_message_id(message, &email);

        let response = self.transport.send(&email)?;

        tracing::debug!(
            host = %self.host,
            port = self.port,
            code = %response.code(),
            "SMTP server accepted message"
        );

        Ok(DeliveryResult::with_response(
            message_id,
            response_details(&response),
        ))
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

/// Server reply as `{"code": "250", "message": [lines]}`.
fn response_details(response: &Response) -> serde_json::Value {
    let lines: Vec<&str> = response.message().collect();
    serde_json::json!({
        "code": response.code().to_string(),
        "message": lines,
    })
}

/// TLS mode for SMTP connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// No TLS (dangerous, only for localhost)
    None,
    /// STARTTLS when the server offers it, plain otherwise
    StartTls,
    /// Implicit TLS - connect with TLS from start (port 465)
    Tls,
}

/// Builder for SmtpTransport.
pub struct SmtpBuilder {
    host: String,
    port: u16,
    credentials: Option<Credentials>,
    tls: TlsMode,
    hello_name: Option<String>,
}

impl SmtpBuilder {
    /// Set SMTP credentials.
    pub fn credentials(mut self, username: &str, password: &str) -> Self {
        self.credentials = Some(Credentials::new(username.to_string(), password.to_string()));
        self
    }

    /// Set TLS mode.
    pub fn tls(mut self, mode: TlsMode) -> Self {
        self.tls = mode;
        self
    }

    /// Disable TLS (dangerous, only for localhost/testing).
    pub fn no_tls(mut self) -> Self {
        self.tls = TlsMode::None;
        self
    }

    /// Domain announced in HELO/EHLO.
    pub fn hello_name(mut self, domain: &str) -> Self {
        self.hello_name = Some(domain.to_string());
        self
    }

    /// Build the SmtpTransport.
    pub fn build(self) -> Result<SmtpTransport, MailError> {
        let tls = match self.tls {
            TlsMode::None => Tls::None,
            TlsMode::StartTls => Tls::Opportunistic(TlsParameters::new(self.host.clone())?),
            TlsMode::Tls => Tls::Wrapper(TlsParameters::new(self.host.clone())?),
        };

        let mut builder = lettre::SmtpTransport::builder_dangerous(&self.host)
            .port(self.port)
            .tls(tls);
        if let Some(creds) = self.credentials {
            builder = builder.credentials(creds);
        }
        if let Some(domain) = self.hello_name {
            builder = builder.hello_name(ClientId::Domain(domain));
        }

        Ok(SmtpTransport {
            host: self.host,
            port: self.port,
            transport: builder.build(),
        })
    }
}
