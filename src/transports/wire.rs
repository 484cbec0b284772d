//! Conversion of a [`Message`] into a `lettre` message.
//!
//! The body structure is carried over as is: flat body, or nested
//! multiparts with the same kinds, parts and transfer encodings.
//! Part-level headers are limited to what lettre has typed headers for
//! (`Content-Disposition`, `Content-ID`).
//!
//! lettre writes multipart `Content-Type` headers itself (kind and
//! boundary), so parameters on a multipart type such as `charset` stay on
//! the [`Message`] and are not sent; the text parts carry their own.

use lettre::address::Envelope;
use lettre::message::header::{
    ContentDisposition, ContentId, ContentTransferEncoding, ContentType, HeaderName, HeaderValue,
};
use lettre::message::{Body, MultiPart, MultiPartBuilder, SinglePart};
use mime::Mime;
use std::time::SystemTime;

use crate::error::MailError;
use crate::message::{Disposition, Message, Part, PartBody, TransferEncoding};

/// Convert to a `lettre` message ready for a lettre transport.
pub fn to_lettre(message: &Message) -> Result<lettre::Message, MailError> {
    let mut builder = lettre::Message::builder();

    for from in &message.from {
        builder = builder.from(from.clone());
    }
    if let Some(sender) = &message.sender {
        builder = builder.sender(sender.clone());
    }
    for to in &message.to {
        builder = builder.to(to.clone());
    }
    for cc in &message.cc {
        builder = builder.cc(cc.clone());
    }
    for bcc in &message.bcc {
        builder = builder.bcc(bcc.clone());
    }
    for reply_to in &message.reply_to {
        builder = builder.reply_to(reply_to.clone());
    }
    if let Some(subject) = &message.subject {
        builder = builder.subject(subject.clone());
    }
    if let Some(date) = message.date {
        builder = builder.date(SystemTime::from(date));
    }
    if let Some(message_id) = &message.message_id {
        builder = builder.message_id(Some(format!("<{}>", message_id)));
    }

    if !message.smtp_envelope_to.is_empty() {
        let envelope = Envelope::new(
            message.from.first().map(|m| m.email.clone()),
            message
                .smtp_envelope_to
                .iter()
                .map(|m| m.email.clone())
                .collect(),
        )?;
        builder = builder.envelope(envelope);
    }

    for (name, value) in &message.headers {
        let name = HeaderName::new_from_ascii(name.clone())
            .map_err(|e| MailError::InvalidHeader(format!("{}: {}", name, e)))?;
        builder = builder.raw_header(HeaderValue::new(name, value.clone()));
    }

    let email = if message.is_multipart() {
        builder.multipart(multipart(&message.content_type, &message.parts)?)?
    } else {
        builder
            .header(content_type(&message.content_type)?)
            .body(message.body.clone().unwrap_or_default())?
    };

    Ok(email)
}

/// Render the message as it would go on the wire.
pub fn formatted(message: &Message) -> Result<Vec<u8>, MailError> {
    Ok(to_lettre(message)?.formatted())
}

/// Message-ID to report for a delivered message.
pub(crate) fn delivered_message_id(message: &Message, email: &lettre::Message) -> String {
    message
        .message_id
        .clone()
        .or_else(|| {
            email
                .headers()
                .get_raw("Message-ID")
                .map(|id| id.trim().trim_matches(['<', '>']).to_string())
        })
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

enum Node {
    Single(SinglePart),
    Multi(MultiPart),
}

fn node(part: &Part) -> Result<Node, MailError> {
    match &part.body {
        PartBody::Multipart(children) => Ok(Node::Multi(multipart(&part.content_type, children)?)),
        PartBody::Content(bytes) => Ok(Node::Single(single_part(part, bytes)?)),
    }
}

fn multipart(content_type: &Mime, parts: &[Part]) -> Result<MultiPart, MailError> {
    let builder: MultiPartBuilder = match content_type.subtype().as_str() {
        "alternative" => MultiPart::alternative(),
        "related" => MultiPart::related(),
        _ => MultiPart::mixed(),
    };

    let (first, rest) = parts
        .split_first()
        .ok_or_else(|| MailError::BuildError("multipart without parts".into()))?;

    let mut multipart = match node(first)? {
        Node::Single(part) => builder.singlepart(part),
        Node::Multi(nested) => builder.multipart(nested),
    };
    for part in rest {
        multipart = match node(part)? {
            Node::Single(part) => multipart.singlepart(part),
            Node::Multi(nested) => multipart.multipart(nested),
        };
    }
    Ok(multipart)
}

fn single_part(part: &Part, bytes: &[u8]) -> Result<SinglePart, MailError> {
    let mut builder = SinglePart::builder().header(content_type(&part.content_type)?);

    match &part.disposition {
        Some(Disposition::Attachment { filename }) => {
            builder = builder.header(ContentDisposition::attachment(filename));
        }
        Some(Disposition::Inline { filename }) => {
            builder = builder.header(ContentDisposition::inline_with_name(filename));
        }
        None => {}
    }
    if let Some(content_id) = &part.content_id {
        builder = builder.header(ContentId::from(content_id.clone()));
    }

    for (name, value) in &part.headers {
        builder = match name.to_ascii_lowercase().as_str() {
            "content-disposition" => builder.header(content_disposition(value)?),
            "content-id" => builder.header(ContentId::from(value.clone())),
            _ => {
                return Err(MailError::UnsupportedFeature(format!(
                    "part header {} cannot be sent",
                    name
                )))
            }
        };
    }

    let body = match part.transfer_encoding {
        Some(encoding) => Body::new_with_encoding(content(bytes), transfer_encoding(encoding))
            .map_err(|_| {
                MailError::BuildError(format!("part cannot be encoded as {}", encoding.as_str()))
            })?,
        None => Body::new(content(bytes)),
    };

    Ok(builder.body(body))
}

/// Text stays text so the encoder can pick a readable encoding.
fn content(bytes: &[u8]) -> lettre::message::MaybeString {
    match String::from_utf8(bytes.to_vec()) {
        Ok(text) => text.into(),
        Err(e) => e.into_bytes().into(),
    }
}

fn content_type(mime: &Mime) -> Result<ContentType, MailError> {
    ContentType::parse(mime.as_ref()).map_err(|e| MailError::InvalidContentType(e.to_string()))
}

fn content_disposition(value: &str) -> Result<ContentDisposition, MailError> {
    let mut params = value.split(';').map(str::trim);
    let kind = params.next().unwrap_or_default().to_ascii_lowercase();
    let filename = params
        .find_map(|p| p.strip_prefix("filename="))
        .map(|f| f.trim_matches('"'));

    match (kind.as_str(), filename) {
        ("inline", None) => Ok(ContentDisposition::inline()),
        ("inline", Some(name)) => Ok(ContentDisposition::inline_with_name(name)),
        ("attachment", Some(name)) => Ok(ContentDisposition::attachment(name)),
        _ => Err(MailError::InvalidHeader(format!(
            "unsupported Content-Disposition: {}",
            value
        ))),
    }
}

fn transfer_encoding(encoding: TransferEncoding) -> ContentTransferEncoding {
    match encoding {
        TransferEncoding::SevenBit => ContentTransferEncoding::SevenBit,
        TransferEncoding::EightBit => ContentTransferEncoding::EightBit,
        TransferEncoding::QuotedPrintable => ContentTransferEncoding::QuotedPrintable,
        TransferEncoding::Base64 => ContentTransferEncoding::Base64,
    }
}
