//! The composed message: envelope, body structure and delivery method.
//!
//! A [`Message`] is what the builder produces and what a
//! [`Transport`](crate::Transport) receives. Address fields are already
//! parsed; bodies are kept decoded and carry the transfer encoding they must
//! be written with.

use chrono::{DateTime, Utc};
use lettre::message::Mailbox;
use mime::Mime;
use std::path::PathBuf;

/// Content-Transfer-Encoding of a part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferEncoding {
    SevenBit,
    EightBit,
    QuotedPrintable,
    Base64,
}

impl TransferEncoding {
    /// Header value.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferEncoding::SevenBit => "7bit",
            TransferEncoding::EightBit => "8bit",
            TransferEncoding::QuotedPrintable => "quoted-printable",
            TransferEncoding::Base64 => "base64",
        }
    }
}

/// Content-Disposition of an attachment part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Downloadable attachment.
    Attachment { filename: String },
    /// Rendered in place, referenced by content-id.
    Inline { filename: String },
}

impl Disposition {
    /// The attachment filename.
    pub fn filename(&self) -> &str {
        match self {
            Disposition::Attachment { filename } | Disposition::Inline { filename } => filename,
        }
    }

    /// Check whether this is an inline disposition.
    pub fn is_inline(&self) -> bool {
        matches!(self, Disposition::Inline { .. })
    }
}

/// Content of a part: bytes or nested parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartBody {
    Content(Vec<u8>),
    Multipart(Vec<Part>),
}

/// One MIME part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub content_type: Mime,
    /// Encoding to write the body with; `None` lets the encoder choose.
    pub transfer_encoding: Option<TransferEncoding>,
    pub disposition: Option<Disposition>,
    pub content_id: Option<String>,
    /// Extra headers, in insertion order.
    pub headers: Vec<(String, String)>,
    pub body: PartBody,
}

impl Part {
    /// A leaf part holding `content`.
    pub fn new(content_type: Mime, content: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type,
            transfer_encoding: None,
            disposition: None,
            content_id: None,
            headers: Vec::new(),
            body: PartBody::Content(content.into()),
        }
    }

    /// A part holding nested parts.
    pub fn multipart(content_type: Mime, parts: Vec<Part>) -> Self {
        Self {
            content_type,
            transfer_encoding: None,
            disposition: None,
            content_id: None,
            headers: Vec::new(),
            body: PartBody::Multipart(parts),
        }
    }

    /// Check whether this part holds nested parts.
    pub fn is_multipart(&self) -> bool {
        matches!(self.body, PartBody::Multipart(_))
    }

    /// Check whether this part is an attachment (inline or not).
    pub fn is_attachment(&self) -> bool {
        self.disposition.is_some()
    }

    /// Nested parts, empty for leaf parts.
    pub fn parts(&self) -> &[Part] {
        match &self.body {
            PartBody::Multipart(parts) => parts,
            PartBody::Content(_) => &[],
        }
    }

    /// Raw content of a leaf part.
    pub fn content(&self) -> Option<&[u8]> {
        match &self.body {
            PartBody::Content(bytes) => Some(bytes),
            PartBody::Multipart(_) => None,
        }
    }

    /// Leaf content as text (lossy for non-UTF-8 data).
    pub fn text(&self) -> Option<String> {
        self.content()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// The attachment filename, if this is an attachment.
    pub fn filename(&self) -> Option<&str> {
        self.disposition.as_ref().map(Disposition::filename)
    }

    /// The `charset` parameter of the content type.
    pub fn charset(&self) -> Option<&str> {
        self.content_type.get_param(mime::CHARSET).map(|c| c.as_str())
    }

    /// Look up an extra header by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Depth-first search for the first non-attachment part of the given
    /// essence (`"text/plain"`, `"text/html"`).
    fn find_body_part(&self, essence: &str) -> Option<&Part> {
        if self.is_multipart() {
            return self.parts().iter().find_map(|p| p.find_body_part(essence));
        }
        (!self.is_attachment() && self.content_type.essence_str() == essence).then_some(self)
    }

    fn find_body_part_mut(&mut self, essence: &str) -> Option<&mut Part> {
        if self.is_multipart() {
            return match &mut self.body {
                PartBody::Multipart(parts) => parts
                    .iter_mut()
                    .find_map(|p| p.find_body_part_mut(essence)),
                PartBody::Content(_) => None,
            };
        }
        if !self.is_attachment() && self.content_type.essence_str() == essence {
            Some(self)
        } else {
            None
        }
    }
}

/// SMTP relay settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub address: String,
    pub port: u16,
    /// HELO domain; `None` lets the client pick.
    pub domain: Option<String>,
    pub user_name: Option<String>,
    pub password: Option<String>,
    pub enable_starttls_auto: bool,
    /// Implicit TLS from the first byte.
    pub tls: bool,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            address: "localhost".to_string(),
            port: 25,
            domain: None,
            user_name: None,
            password: None,
            enable_starttls_auto: true,
            tls: false,
        }
    }
}

/// How a message leaves the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sendmail { location: PathBuf },
    Smtp(SmtpSettings),
}

impl Delivery {
    /// Name of the mechanism.
    pub fn name(&self) -> &'static str {
        match self {
            Delivery::Sendmail { .. } => "sendmail",
            Delivery::Smtp(_) => "smtp",
        }
    }

    /// SMTP settings, if this is SMTP delivery.
    pub fn smtp_settings(&self) -> Option<&SmtpSettings> {
        match self {
            Delivery::Smtp(settings) => Some(settings),
            Delivery::Sendmail { .. } => None,
        }
    }

    /// Sendmail binary, if this is sendmail delivery.
    pub fn sendmail_location(&self) -> Option<&PathBuf> {
        match self {
            Delivery::Sendmail { location } => Some(location),
            Delivery::Smtp(_) => None,
        }
    }
}

/// A fully composed email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub from: Vec<Mailbox>,
    pub sender: Option<Mailbox>,
    pub to: Vec<Mailbox>,
    pub cc: Vec<Mailbox>,
    pub bcc: Vec<Mailbox>,
    pub reply_to: Vec<Mailbox>,
    /// Envelope recipients replacing to + cc + bcc when set.
    pub smtp_envelope_to: Vec<Mailbox>,
    pub subject: Option<String>,
    /// Message-ID without angle brackets.
    pub message_id: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub charset: String,
    pub content_type: Mime,
    /// Custom top-level headers, in insertion order.
    pub headers: Vec<(String, String)>,
    /// Flat body of a single-part message.
    pub body: Option<String>,
    /// Parts of a multipart message.
    pub parts: Vec<Part>,
    pub delivery: Delivery,
}

impl Message {
    /// Addresses the message will be delivered to.
    pub fn destinations(&self) -> Vec<&Mailbox> {
        if !self.smtp_envelope_to.is_empty() {
            return self.smtp_envelope_to.iter().collect();
        }
        self.to
            .iter()
            .chain(self.cc.iter())
            .chain(self.bcc.iter())
            .collect()
    }

    /// Check whether the message is multipart.
    pub fn is_multipart(&self) -> bool {
        !self.parts.is_empty()
    }

    /// Check whether the message has any attachments.
    pub fn has_attachments(&self) -> bool {
        self.parts.iter().any(Part::is_attachment)
    }

    /// Attachment parts, in order.
    pub fn attachments(&self) -> Vec<&Part> {
        self.parts.iter().filter(|p| p.is_attachment()).collect()
    }

    /// First plain text body part of a multipart message.
    pub fn text_part(&self) -> Option<&Part> {
        self.parts.iter().find_map(|p| p.find_body_part("text/plain"))
    }

    /// First plain text body part, mutably.
    pub(crate) fn text_part_mut(&mut self) -> Option<&mut Part> {
        self.parts
            .iter_mut()
            .find_map(|p| p.find_body_part_mut("text/plain"))
    }

    /// First HTML body part of a multipart message.
    pub fn html_part(&self) -> Option<&Part> {
        self.parts.iter().find_map(|p| p.find_body_part("text/html"))
    }

    /// Look up a custom header by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Essence of the top-level content type (`"multipart/mixed"`).
    pub fn mime_type(&self) -> &str {
        self.content_type.essence_str()
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
