//! Email attachments with support for inline and regular attachments.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::MailError;

/// Type of attachment disposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AttachmentType {
    /// Regular attachment (shown as downloadable file)
    #[default]
    Attachment,
    /// Inline attachment (embedded in HTML via cid:)
    Inline,
}

/// An email attachment.
///
/// # Examples
///
/// ```
/// use postbox::Attachment;
///
/// let report = Attachment::from_bytes("report.pdf", b"PDF content".to_vec());
/// assert_eq!(report.content_type, "application/pdf");
///
/// // Inline image, referenced from HTML as cid:<logo.png@hostname>
/// let logo = Attachment::from_bytes("logo.png", vec![0x89, 0x50, 0x4E, 0x47]).inline();
/// assert!(logo.is_inline());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Filename for the attachment, as given by the caller
    pub filename: String,
    /// MIME content type (e.g., "application/pdf", "image/png")
    pub content_type: String,
    /// Raw attachment data
    pub data: Vec<u8>,
    /// Whether this is an inline or regular attachment
    pub disposition: AttachmentType,
}

impl Attachment {
    /// Create a new attachment from raw bytes.
    ///
    /// Content type is guessed from the filename extension.
    pub fn from_bytes(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        let filename = filename.into();
        let content_type = mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .to_string();

        Self {
            filename,
            content_type,
            data: data.into(),
            disposition: AttachmentType::Attachment,
        }
    }

    /// Create a new attachment by reading a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MailError> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("attachment")
            .to_string();

        let data = std::fs::read(path)
            .map_err(|e| MailError::AttachmentReadError(format!("{}: {}", path.display(), e)))?;

        Ok(Self::from_bytes(filename, data))
    }

    /// Set the content type explicitly.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Set as inline attachment (for embedding in HTML).
    pub fn inline(mut self) -> Self {
        self.disposition = AttachmentType::Inline;
        self
    }

    /// Check if this is an inline attachment.
    pub fn is_inline(&self) -> bool {
        self.disposition == AttachmentType::Inline
    }

    /// Filename with every run of whitespace collapsed to a single space.
    pub fn normalized_filename(&self) -> String {
        let mut name = String::with_capacity(self.filename.len());
        let mut in_space = false;
        for c in self.filename.chars() {
            if c.is_whitespace() {
                if !in_space {
                    name.push(' ');
                }
                in_space = true;
            } else {
                name.push(c);
                in_space = false;
            }
        }
        name
    }

    /// Whether the attachment must be sent base64 encoded regardless of
    /// what the encoder would pick.
    ///
    /// Everything but `text/*` is, even when the bytes happen to be ASCII.
    /// Spreadsheets get mangled as quoted-printable, so `.xlsx` always is.
    pub fn requires_base64(&self) -> bool {
        let text = self
            .content_type
            .trim_start()
            .get(..5)
            .is_some_and(|kind| kind.eq_ignore_ascii_case("text/"));
        !text || self.normalized_filename().ends_with(".xlsx")
    }

    /// Get the size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Serde adapter for the `name -> content` object form of attachments.
pub(crate) mod as_map {
    use super::Attachment;
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    pub fn serialize<S>(value: &Option<Vec<Attachment>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let attachments = value.as_deref().unwrap_or_default();
        let mut map = serializer.serialize_map(Some(attachments.len()))?;
        for attachment in attachments {
            map.serialize_entry(
                &attachment.filename,
                &String::from_utf8_lossy(&attachment.data),
            )?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<Attachment>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct AttachmentMap;

        impl<'de> Visitor<'de> for AttachmentMap {
            type Value = Option<Vec<Attachment>>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of attachment name to content")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut attachments = Vec::new();
                while let Some((name, content)) = access.next_entry::<String, String>()? {
                    attachments.push(Attachment::from_bytes(name, content));
                }
                Ok(Some(attachments))
            }
        }

        deserializer.deserialize_map(AttachmentMap)
    }
}
