//! Message builder: turns resolved options into a [`Message`].
//!
//! Content selection, first match wins:
//!
//! | attachments | html_body | body | Result |
//! |-------------|-----------|------|--------|
//! | yes | yes | yes | `multipart/alternative` (HTML, text) followed by attachments |
//! | any | any | any | with attachments or HTML: HTML part, text part, attachments (each if present) |
//! | no | no | yes | flat text body |
//! | no | no | no | empty body |
//!
//! The top-level content type is the caller's `content_type` when given,
//! otherwise `multipart/related` (inline attachments), `multipart/mixed`
//! (attachments), `multipart/alternative` (several body parts) or
//! `text/plain` for flat bodies. Derived types carry the message charset.
//! A caller's type has to match the structure: `multipart/*` when there are
//! parts, single-part otherwise.

use lettre::message::{Mailbox, Mailboxes};
use mime::Mime;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::attachment::Attachment;
use crate::error::MailError;
use crate::host::DEFAULT_SENDMAIL;
use crate::message::{Delivery, Disposition, Message, Part, SmtpSettings, TransferEncoding};
use crate::options::{Options, Via};

/// Sender used when none is configured anywhere.
pub const DEFAULT_FROM: &str = "postbox@unknown";

/// Charset used when none is given.
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Builds messages; holds the hostname used in attachment content-ids.
///
/// Building is deterministic: the same options and hostname always produce
/// an equal [`Message`].
///
/// ```
/// use postbox::{MessageBuilder, Options};
///
/// let message = MessageBuilder::new("mail.example.com")
///     .build(&Options::new().to("joe@example.com").body("Hello, Joe."))
///     .unwrap();
/// assert_eq!(message.body.as_deref(), Some("Hello, Joe."));
/// assert_eq!(message.mime_type(), "text/plain");
/// ```
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    hostname: String,
}

impl MessageBuilder {
    /// Create a builder for messages composed on `hostname`.
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
        }
    }

    /// Hostname used in content-ids.
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Build a message from resolved options.
    ///
    /// Address lists are parsed here; malformed ones fail with
    /// [`MailError::InvalidAddress`].
    pub fn build(&self, options: &Options) -> Result<Message, MailError> {
        let charset = options
            .charset
            .clone()
            .unwrap_or_else(|| DEFAULT_CHARSET.to_string());

        let (body, mut parts) = self.content(options, &charset)?;

        let headers = header_list(options.headers.as_ref(), false)?;

        let attachments = options.attachments.as_deref().unwrap_or_default();
        for attachment in attachments {
            parts.push(self.attachment_part(attachment)?);
        }

        let mut message = Message {
            from: mailboxes(Some(options.from.as_deref().unwrap_or(DEFAULT_FROM)))?,
            sender: match non_blank(options.sender.as_deref()) {
                Some(sender) => Some(sender.parse::<Mailbox>()?),
                None => None,
            },
            to: mailboxes(options.to.as_deref())?,
            cc: mailboxes(options.cc.as_deref())?,
            bcc: mailboxes(options.bcc.as_deref())?,
            reply_to: mailboxes(options.reply_to.as_deref())?,
            smtp_envelope_to: mailboxes(options.smtp_envelope_to.as_deref())?,
            subject: options.subject.clone(),
            message_id: options.message_id.as_deref().map(strip_angle_brackets),
            date: options.date,
            charset: charset.clone(),
            content_type: text_plain(&charset)?,
            headers,
            body,
            parts,
            delivery: delivery(options),
        };

        if let Some(text_charset) = &options.text_part_charset {
            if message.is_multipart() {
                if let Some(text_part) = message.text_part_mut() {
                    text_part.content_type = text_plain(text_charset)?;
                }
            }
        }

        message.content_type = match &options.content_type {
            Some(content_type) => explicit_content_type(content_type, message.is_multipart())?,
            None => self.derived_content_type(&message, &charset)?,
        };

        tracing::trace!(
            content_type = %message.content_type,
            parts = message.parts.len(),
            delivery = message.delivery.name(),
            "Built message"
        );

        Ok(message)
    }

    fn content(
        &self,
        options: &Options,
        charset: &str,
    ) -> Result<(Option<String>, Vec<Part>), MailError> {
        let has_attachments = options.attachments.is_some();

        match (&options.html_body, &options.body) {
            (Some(html), Some(text)) if has_attachments => {
                let alternative = Part::multipart(
                    "multipart/alternative".parse()?,
                    vec![html_part(html, options)?, text_part(text, charset, options)?],
                );
                Ok((None, vec![alternative]))
            }
            (html, text) if has_attachments || html.is_some() => {
                let mut parts = Vec::new();
                if let Some(html) = html {
                    parts.push(html_part(html, options)?);
                }
                if let Some(text) = text {
                    parts.push(text_part(text, charset, options)?);
                }
                Ok((None, parts))
            }
            (None, Some(text)) => Ok((Some(text.clone()), Vec::new())),
            _ => Ok((None, Vec::new())),
        }
    }

    fn attachment_part(&self, attachment: &Attachment) -> Result<Part, MailError> {
        let filename = attachment.normalized_filename();
        let content_type: Mime = attachment.content_type.parse()?;

        let mut part = Part::new(content_type, attachment.data.clone());
        if attachment.requires_base64() {
            part.transfer_encoding = Some(TransferEncoding::Base64);
        }
        part.content_id = Some(format!("<{}@{}>", filename, self.hostname));
        part.disposition = Some(if attachment.is_inline() {
            Disposition::Inline { filename }
        } else {
            Disposition::Attachment { filename }
        });
        Ok(part)
    }

    fn derived_content_type(&self, message: &Message, charset: &str) -> Result<Mime, MailError> {
        let attachments = message.attachments();
        let subtype = if !attachments.is_empty() {
            if attachments
                .iter()
                .any(|p| p.disposition.as_ref().is_some_and(Disposition::is_inline))
            {
                "related"
            } else {
                "mixed"
            }
        } else if message.is_multipart() {
            "alternative"
        } else {
            return text_plain(charset);
        };
        Ok(format!("multipart/{}; charset={}", subtype, charset).parse()?)
    }
}

fn html_part(html: &str, options: &Options) -> Result<Part, MailError> {
    let mut part = Part::new("text/html; charset=UTF-8".parse()?, html);
    part.transfer_encoding = Some(TransferEncoding::QuotedPrintable);
    part.headers = header_list(options.html_body_part_header.as_ref(), true)?;
    Ok(part)
}

fn text_part(text: &str, charset: &str, options: &Options) -> Result<Part, MailError> {
    let mut part = Part::new(text_plain(charset)?, text);
    part.headers = header_list(options.body_part_header.as_ref(), true)?;
    Ok(part)
}

/// A caller-supplied content type must agree with the body structure:
/// `multipart/*` for parts, anything else for a flat body.
fn explicit_content_type(content_type: &str, multipart: bool) -> Result<Mime, MailError> {
    let parsed: Mime = content_type.parse()?;
    if (parsed.type_() == mime::MULTIPART) != multipart {
        let expected = if multipart { "a multipart" } else { "a single-part" };
        return Err(MailError::InvalidContentType(format!(
            "{} given, but the message needs {} type",
            parsed.essence_str(),
            expected
        )));
    }
    Ok(parsed)
}

fn text_plain(charset: &str) -> Result<Mime, MailError> {
    Ok(format!("text/plain; charset={}", charset).parse()?)
}

fn delivery(options: &Options) -> Delivery {
    let via_options = options.via_options.clone().unwrap_or_default();
    match options.via {
        Some(Via::Sendmail) => Delivery::Sendmail {
            location: via_options
                .location
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SENDMAIL)),
        },
        Some(Via::Smtp) | None => {
            let defaults = SmtpSettings::default();
            Delivery::Smtp(SmtpSettings {
                address: via_options.address.unwrap_or(defaults.address),
                port: via_options.port.unwrap_or(defaults.port),
                domain: via_options.domain,
                user_name: via_options.user_name,
                password: via_options.password,
                enable_starttls_auto: options
                    .enable_starttls_auto
                    .or(via_options.enable_starttls_auto)
                    .unwrap_or(defaults.enable_starttls_auto),
                tls: via_options.tls.unwrap_or(defaults.tls),
            })
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn mailboxes(value: Option<&str>) -> Result<Vec<Mailbox>, MailError> {
    match non_blank(value) {
        Some(list) => Ok(list.parse::<Mailboxes>()?.into_iter().collect()),
        None => Ok(Vec::new()),
    }
}

fn strip_angle_brackets(id: &str) -> String {
    id.trim()
        .trim_start_matches('<')
        .trim_end_matches('>')
        .to_string()
}

/// Validate a header map and turn it into an ordered list.
///
/// With `normalize`, `snake_case` keys become `Train-Case` header names.
fn header_list(
    headers: Option<&BTreeMap<String, String>>,
    normalize: bool,
) -> Result<Vec<(String, String)>, MailError> {
    let Some(headers) = headers else {
        return Ok(Vec::new());
    };
    headers
        .iter()
        .map(|(name, value)| {
            let name = if normalize {
                header_name(name)
            } else {
                name.clone()
            };
            if name.is_empty()
                || !name
                    .bytes()
                    .all(|b| b.is_ascii_graphic() && b != b':')
            {
                return Err(MailError::InvalidHeader(format!("bad header name: {:?}", name)));
            }
            if value.contains(['\r', '\n']) {
                return Err(MailError::InvalidHeader(format!(
                    "line break in value of {}",
                    name
                )));
            }
            Ok((name, value.clone()))
        })
        .collect()
}

/// `content_disposition` -> `Content-Disposition`; names without
/// underscores are kept as given.
pub(crate) fn header_name(key: &str) -> String {
    if !key.contains('_') {
        return key.to_string();
    }
    key.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("-")
}
