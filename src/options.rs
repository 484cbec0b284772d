//! Send request options.
//!
//! A request is a flat set of optional fields. *Standard* options map onto
//! envelope fields of the message; *non-standard* options steer how the
//! message is composed and delivered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::attachment::Attachment;
use crate::error::MailError;

/// Options that map directly onto message envelope fields.
pub const STANDARD_OPTIONS: &[&str] = &[
    "to",
    "cc",
    "bcc",
    "from",
    "subject",
    "content_type",
    "message_id",
    "sender",
    "reply_to",
    "smtp_envelope_to",
    "date",
];

/// Options that control composition and delivery.
pub const NON_STANDARD_OPTIONS: &[&str] = &[
    "attachments",
    "body",
    "charset",
    "enable_starttls_auto",
    "headers",
    "html_body",
    "text_part_charset",
    "via",
    "via_options",
    "body_part_header",
    "html_body_part_header",
];

/// Delivery mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Via {
    /// Pipe the message into a local sendmail binary.
    Sendmail,
    /// Talk SMTP to a relay.
    Smtp,
}

impl Via {
    /// Name used in option dumps, logs and env vars.
    pub fn as_str(&self) -> &'static str {
        match self {
            Via::Sendmail => "sendmail",
            Via::Smtp => "smtp",
        }
    }
}

impl fmt::Display for Via {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Via {
    type Err = MailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sendmail" => Ok(Via::Sendmail),
            "smtp" => Ok(Via::Smtp),
            other => Err(MailError::Configuration(format!(
                "Unknown transport: {}. Valid transports are: sendmail, smtp",
                other
            ))),
        }
    }
}

/// Settings for the delivery mechanism.
///
/// `location` is read by sendmail; the rest by SMTP.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ViaOptions {
    /// Path of the sendmail binary.
    pub location: Option<PathBuf>,
    /// SMTP server host.
    pub address: Option<String>,
    /// SMTP server port.
    pub port: Option<u16>,
    /// HELO domain.
    pub domain: Option<String>,
    /// SMTP username.
    pub user_name: Option<String>,
    /// SMTP password.
    #[serde(serialize_with = "redact")]
    pub password: Option<String>,
    /// Upgrade to TLS with STARTTLS when the server offers it.
    pub enable_starttls_auto: Option<bool>,
    /// Connect with TLS from the start (implicit TLS, usually port 465).
    pub tls: Option<bool>,
}

impl ViaOptions {
    /// Create empty settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sendmail binary location.
    pub fn location(mut self, location: impl Into<PathBuf>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the SMTP host.
    pub fn address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Set the SMTP port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the HELO domain.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set SMTP credentials.
    pub fn credentials(mut self, user_name: impl Into<String>, password: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self.password = Some(password.into());
        self
    }

    /// Enable or disable opportunistic STARTTLS.
    pub fn enable_starttls_auto(mut self, enabled: bool) -> Self {
        self.enable_starttls_auto = Some(enabled);
        self
    }

    /// Enable or disable implicit TLS.
    pub fn tls(mut self, enabled: bool) -> Self {
        self.tls = Some(enabled);
        self
    }
}

fn redact<S>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(_) => serializer.serialize_str("[FILTERED]"),
        None => serializer.serialize_none(),
    }
}

/// Address field given either as one raw list or as an array of entries.
#[derive(Deserialize)]
#[serde(untagged)]
enum AddressList {
    Raw(String),
    Entries(Vec<String>),
}

fn address_list<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<AddressList>::deserialize(deserializer)?.map(|list| match list {
            AddressList::Raw(raw) => raw,
            AddressList::Entries(entries) => join_addresses(entries),
        }),
    )
}

fn join_addresses<I, S>(entries: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    entries
        .into_iter()
        .map(|entry| entry.as_ref().trim().to_string())
        .filter(|entry| !entry.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// A send request.
///
/// ```
/// use postbox::{Options, Via};
///
/// let request = Options::new()
///     .to("joe@example.com")
///     .from("sender@example.com")
///     .subject("hi")
///     .body("Hello, Joe.")
///     .via(Via::Smtp);
/// ```
///
/// Address fields hold the raw address list (`"a@example.com, \"B\" <b@example.com>"`)
/// and are parsed when the message is built.
/// In JSON they may also be arrays of entries, which are joined with `", "`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Options {
    #[serde(default, deserialize_with = "address_list")]
    pub to: Option<String>,
    #[serde(default, deserialize_with = "address_list")]
    pub cc: Option<String>,
    #[serde(default, deserialize_with = "address_list")]
    pub bcc: Option<String>,
    #[serde(default, deserialize_with = "address_list")]
    pub from: Option<String>,
    pub subject: Option<String>,
    pub content_type: Option<String>,
    pub message_id: Option<String>,
    pub sender: Option<String>,
    #[serde(default, deserialize_with = "address_list")]
    pub reply_to: Option<String>,
    #[serde(default, deserialize_with = "address_list")]
    pub smtp_envelope_to: Option<String>,
    pub date: Option<DateTime<Utc>>,

    #[serde(
        default,
        with = "crate::attachment::as_map",
        skip_serializing_if = "Option::is_none"
    )]
    pub attachments: Option<Vec<Attachment>>,
    pub body: Option<String>,
    pub charset: Option<String>,
    pub enable_starttls_auto: Option<bool>,
    pub headers: Option<BTreeMap<String, String>>,
    pub html_body: Option<String>,
    pub text_part_charset: Option<String>,
    pub via: Option<Via>,
    pub via_options: Option<ViaOptions>,
    pub body_part_header: Option<BTreeMap<String, String>>,
    pub html_body_part_header: Option<BTreeMap<String, String>>,
}

/// Right-biased, field-wise merge: any field set on `$top` wins.
macro_rules! merge_fields {
    ($base:ident, $top:ident; $($field:ident),* $(,)?) => {
        Options {
            $($field: $top.$field.or($base.$field)),*
        }
    };
}

impl Options {
    /// Create an empty request.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every option name a request may carry.
    pub fn permissible_options() -> Vec<&'static str> {
        STANDARD_OPTIONS
            .iter()
            .chain(NON_STANDARD_OPTIONS.iter())
            .copied()
            .collect()
    }

    /// Check whether `key` names an option.
    pub fn is_permissible(key: &str) -> bool {
        STANDARD_OPTIONS.contains(&key) || NON_STANDARD_OPTIONS.contains(&key)
    }

    /// Parse a request from a JSON object.
    ///
    /// Unknown keys are rejected with [`MailError::UnknownOption`].
    ///
    /// ```
    /// use postbox::{MailError, Options};
    ///
    /// let request = Options::from_json(r#"{"to": "joe@example.com", "body": "hi"}"#).unwrap();
    /// assert_eq!(request.to.as_deref(), Some("joe@example.com"));
    ///
    /// let err = Options::from_json(r#"{"to": "joe@example.com", "too": "x"}"#).unwrap_err();
    /// assert!(matches!(err, MailError::UnknownOption(key) if key == "too"));
    /// ```
    pub fn from_json(json: &str) -> Result<Self, MailError> {
        match serde_json::from_str::<serde_json::Value>(json)? {
            serde_json::Value::Object(map) => Self::from_map(map),
            other => Err(MailError::JsonError(format!(
                "expected an object of options, got {}",
                other
            ))),
        }
    }

    /// Build a request from an already-parsed JSON object.
    pub fn from_map(map: serde_json::Map<String, serde_json::Value>) -> Result<Self, MailError> {
        if let Some(key) = map.keys().find(|key| !Self::is_permissible(key)) {
            return Err(MailError::UnknownOption(key.clone()));
        }
        Ok(serde_json::from_value(serde_json::Value::Object(map))?)
    }

    /// Layer `top` over `self`; every field set on `top` replaces the
    /// corresponding field here.
    ///
    /// Map-valued fields (`headers`, `via_options`, ...) are replaced whole.
    pub fn merge(self, top: Options) -> Options {
        let base = self;
        merge_fields!(base, top;
            to,
            cc,
            bcc,
            from,
            subject,
            content_type,
            message_id,
            sender,
            reply_to,
            smtp_envelope_to,
            date,
            attachments,
            body,
            charset,
            enable_starttls_auto,
            headers,
            html_body,
            text_part_charset,
            via,
            via_options,
            body_part_header,
            html_body_part_header,
        )
    }

    /// Stable one-line rendering of the set options.
    ///
    /// A JSON object with sorted keys; unset fields are left out and
    /// passwords are filtered.
    ///
    /// ```
    /// use postbox::Options;
    ///
    /// let dump = Options::new().to("foo@bar").body("body").dump();
    /// assert_eq!(dump, r#"{"body":"body","to":"foo@bar"}"#);
    /// ```
    pub fn dump(&self) -> String {
        match serde_json::to_value(self) {
            Ok(value) => strip_nulls(value).to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not render options");
                String::from("{}")
            }
        }
    }

    /// Check whether any body content or attachment is set.
    pub fn has_content(&self) -> bool {
        self.body.is_some() || self.html_body.is_some() || self.attachments.is_some()
    }

    // ------------------------------------------------------------------------
    // Standard options
    // ------------------------------------------------------------------------

    /// Set the recipients.
    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to = Some(to.into());
        self
    }

    /// Set the recipients from separate entries.
    ///
    /// ```
    /// use postbox::Options;
    ///
    /// let request = Options::new().to_list(["a@example.com", "\"B\" <b@example.com>"]);
    /// assert_eq!(request.to.as_deref(), Some("a@example.com, \"B\" <b@example.com>"));
    /// ```
    pub fn to_list<I, S>(mut self, to: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.to = Some(join_addresses(to));
        self
    }

    /// Set the CC recipients.
    pub fn cc(mut self, cc: impl Into<String>) -> Self {
        self.cc = Some(cc.into());
        self
    }

    /// Set the BCC recipients.
    pub fn bcc(mut self, bcc: impl Into<String>) -> Self {
        self.bcc = Some(bcc.into());
        self
    }

    /// Set the CC recipients from separate entries.
    pub fn cc_list<I, S>(mut self, cc: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.cc = Some(join_addresses(cc));
        self
    }

    /// Set the BCC recipients from separate entries.
    pub fn bcc_list<I, S>(mut self, bcc: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.bcc = Some(join_addresses(bcc));
        self
    }

    /// Set the sender address.
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Set the subject line.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set an explicit top-level content type.
    ///
    /// It must match the body structure: a `multipart/*` type when the
    /// message has parts (HTML or attachments), a single-part type
    /// otherwise. A mismatch fails the build with
    /// [`MailError::InvalidContentType`].
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Set the Message-ID (with or without angle brackets).
    pub fn message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    /// Set the Sender header.
    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Set the reply-to addresses.
    pub fn reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    /// Override the SMTP envelope recipients.
    pub fn smtp_envelope_to(mut self, recipients: impl Into<String>) -> Self {
        self.smtp_envelope_to = Some(recipients.into());
        self
    }

    /// Set the Date header.
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    // ------------------------------------------------------------------------
    // Non-standard options
    // ------------------------------------------------------------------------

    /// Add an attachment.
    pub fn attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.get_or_insert_with(Vec::new).push(attachment);
        self
    }

    /// Set the plain text body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the message charset.
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Enable or disable opportunistic STARTTLS for SMTP delivery.
    pub fn enable_starttls_auto(mut self, enabled: bool) -> Self {
        self.enable_starttls_auto = Some(enabled);
        self
    }

    /// Add a custom top-level header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Set the HTML body.
    pub fn html_body(mut self, html: impl Into<String>) -> Self {
        self.html_body = Some(html.into());
        self
    }

    /// Set the charset of the text part of a multipart message.
    pub fn text_part_charset(mut self, charset: impl Into<String>) -> Self {
        self.text_part_charset = Some(charset.into());
        self
    }

    /// Choose the delivery mechanism.
    pub fn via(mut self, via: Via) -> Self {
        self.via = Some(via);
        self
    }

    /// Set the delivery mechanism settings.
    pub fn via_options(mut self, via_options: ViaOptions) -> Self {
        self.via_options = Some(via_options);
        self
    }

    /// Add a header to the text part.
    pub fn body_part_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.body_part_header
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    /// Add a header to the HTML part.
    pub fn html_body_part_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.html_body_part_header
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }
}

fn strip_nulls(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => serde_json::Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        other => other,
    }
}
