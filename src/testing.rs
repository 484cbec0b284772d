//! Testing utilities and assertion helpers.
//!
//! Assertions run against the messages captured by a [`LocalTransport`].
//! "Last message" means the most recently delivered one.
//!
//! # Example
//!
//! ```
//! use postbox::testing::*;
//! use postbox::transports::LocalTransport;
//! use postbox::{Composer, Config, Options};
//!
//! let transport = LocalTransport::new();
//! let composer = Composer::new(Config::new()).with_transport(transport.clone());
//!
//! composer
//!     .send(Options::new().to("user@example.com").subject("Welcome!").body("Hi"))
//!     .unwrap();
//!
//! assert_message_sent(&transport);
//! assert_message_to(&transport, "user@example.com");
//! assert_message_subject_contains(&transport, "Welcome");
//! refute_message_to(&transport, "admin@example.com");
//!
//! // Regex matching
//! assert_message_subject_matches(&transport, r"^Welcome.*!$");
//! ```

use regex::Regex;

use crate::message::Message;
use crate::transports::{LocalTransport, StoredMessage};

// ============================================================================
// Helper Functions
// ============================================================================

fn addresses(mailboxes: &[lettre::message::Mailbox]) -> String {
    mailboxes
        .iter()
        .map(|m| m.email.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn delivered_to(message: &Message, email: &str) -> bool {
    message
        .destinations()
        .iter()
        .any(|m| m.email.to_string().eq_ignore_ascii_case(email))
}

/// Format a list of messages for error messages.
fn format_message_summary(messages: &[StoredMessage]) -> String {
    if messages.is_empty() {
        return "  (no messages sent)".to_string();
    }

    messages
        .iter()
        .enumerate()
        .map(|(i, stored)| {
            let m = &stored.message;
            format!(
                "  {}. To: [{}], From: [{}], Subject: \"{}\"",
                i + 1,
                addresses(&m.to),
                addresses(&m.from),
                m.subject.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn last(transport: &LocalTransport) -> StoredMessage {
    match transport.last_message() {
        Some(stored) => stored,
        None => panic!("Expected at least one message to be sent, but none were sent"),
    }
}

fn text_body(message: &Message) -> String {
    message
        .body
        .clone()
        .or_else(|| message.text_part().and_then(|p| p.text()))
        .unwrap_or_default()
}

fn html_body(message: &Message) -> String {
    message
        .html_part()
        .and_then(|p| p.text())
        .unwrap_or_default()
}

fn excerpt(body: &str) -> String {
    body.chars().take(500).collect()
}

// ============================================================================
// Basic Assertions
// ============================================================================

/// Assert that at least one message was sent.
///
/// # Panics
///
/// Panics if no messages were sent.
pub fn assert_message_sent(transport: &LocalTransport) {
    assert!(
        transport.has_messages(),
        "Expected at least one message to be sent, but none were sent"
    );
}

/// Assert that no messages were sent.
///
/// # Panics
///
/// Panics if any message was sent.
pub fn assert_no_messages_sent(transport: &LocalTransport) {
    let messages = transport.messages();
    assert!(
        messages.is_empty(),
        "Expected no messages to be sent, but {} were sent.\n\nMessages sent:\n{}",
        messages.len(),
        format_message_summary(&messages)
    );
}

/// Assert that exactly N messages were sent.
///
/// # Panics
///
/// Panics if the count doesn't match.
pub fn assert_message_count(transport: &LocalTransport, expected: usize) {
    let actual = transport.message_count();
    assert!(
        actual == expected,
        "Expected {} message(s) to be sent, but {} were sent.\n\nMessages sent:\n{}",
        expected,
        actual,
        format_message_summary(&transport.messages())
    );
}

/// Assert that a message was delivered to an address (to, cc, bcc or
/// envelope recipient).
///
/// # Panics
///
/// Panics if no message went to the address.
pub fn assert_message_to(transport: &LocalTransport, email: &str) {
    let messages = transport.messages();
    assert!(
        messages.iter().any(|stored| delivered_to(&stored.message, email)),
        "Expected a message to be sent to '{}'.\n\nMessages sent:\n{}",
        email,
        format_message_summary(&messages)
    );
}

/// Assert that no message was delivered to an address.
///
/// # Panics
///
/// Panics if a message went to the address.
pub fn refute_message_to(transport: &LocalTransport, email: &str) {
    let messages = transport.messages();
    if let Some(found) = messages
        .iter()
        .find(|stored| delivered_to(&stored.message, email))
    {
        panic!(
            "Expected no message to be sent to '{}', but found one.\n\nMatching message:\n  Subject: \"{}\"\n  From: [{}]\n\nAll messages:\n{}",
            email,
            found.message.subject.as_deref().unwrap_or(""),
            addresses(&found.message.from),
            format_message_summary(&messages)
        );
    }
}

/// Assert that a message with the exact subject was sent.
///
/// # Panics
///
/// Panics if no message with the subject was found.
pub fn assert_message_subject(transport: &LocalTransport, subject: &str) {
    assert!(
        transport.sent_with_subject(subject),
        "Expected a message with subject '{}'.\n\nMessages sent:\n{}",
        subject,
        format_message_summary(&transport.messages())
    );
}

/// Assert that a message with subject containing text was sent.
///
/// # Panics
///
/// Panics if no matching message was found.
pub fn assert_message_subject_contains(transport: &LocalTransport, text: &str) {
    assert!(
        transport.sent_with_subject_containing(text),
        "Expected a message with subject containing '{}'.\n\nMessages sent:\n{}",
        text,
        format_message_summary(&transport.messages())
    );
}

/// Assert that a message matching a predicate was sent.
///
/// # Panics
///
/// Panics if no matching message was found.
pub fn assert_message_matches<F>(transport: &LocalTransport, predicate: F)
where
    F: Fn(&Message) -> bool,
{
    assert!(
        !transport.find_messages(predicate).is_empty(),
        "Expected a message matching the predicate, but none was found.\n\nMessages sent:\n{}",
        format_message_summary(&transport.messages())
    );
}

/// Get the last message sent, or panic if none.
pub fn get_last_message(transport: &LocalTransport) -> StoredMessage {
    last(transport)
}

/// Get all messages delivered to an address.
pub fn get_messages_to(transport: &LocalTransport, email: &str) -> Vec<StoredMessage> {
    transport.find_messages(|m| delivered_to(m, email))
}

// ============================================================================
// Last Message Assertions
// ============================================================================

/// Assert the last message was sent from a specific address.
///
/// # Panics
///
/// Panics if no message was sent or from address doesn't match.
pub fn assert_message_from(transport: &LocalTransport, from_email: &str) {
    let last = last(transport);
    let from = addresses(&last.message.from);

    assert!(
        last.message
            .from
            .iter()
            .any(|m| m.email.to_string().eq_ignore_ascii_case(from_email)),
        "Expected last message from '{}', but was from '{}'.\n\nMessages sent:\n{}",
        from_email,
        from,
        format_message_summary(&transport.messages())
    );
}

/// Assert the last message has a text body containing text.
///
/// Looks at the flat body, or the text part of a multipart message.
pub fn assert_message_text_contains(transport: &LocalTransport, text: &str) {
    let last = last(transport);
    let body = text_body(&last.message);

    assert!(
        body.contains(text),
        "Expected text body to contain '{}', but it didn't.\n\nLast message:\n{}\n\nText body (first 500 chars):\n{}",
        text,
        format_message_summary(std::slice::from_ref(&last)),
        excerpt(&body)
    );
}

/// Assert the last message has an HTML part containing text.
pub fn assert_message_html_contains(transport: &LocalTransport, text: &str) {
    let last = last(transport);
    let html = html_body(&last.message);

    assert!(
        html.contains(text),
        "Expected HTML body to contain '{}', but it didn't.\n\nLast message:\n{}\n\nHTML body (first 500 chars):\n{}",
        text,
        format_message_summary(std::slice::from_ref(&last)),
        excerpt(&html)
    );
}

/// Assert the last message has an attachment with the given filename.
pub fn assert_message_has_attachment(transport: &LocalTransport, filename: &str) {
    let last = last(transport);
    let attachments: Vec<&str> = last
        .message
        .attachments()
        .iter()
        .filter_map(|p| p.filename())
        .collect();

    assert!(
        attachments.contains(&filename),
        "Expected message to have attachment '{}'.\n\nLast message:\n{}\n\nAttachments: [{}]",
        filename,
        format_message_summary(std::slice::from_ref(&last)),
        attachments.join(", ")
    );
}

// ============================================================================
// Regex Matching
// ============================================================================

fn regex(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => panic!("Invalid regex pattern '{}': {}", pattern, e),
    }
}

/// Assert the last message subject matches a regex pattern.
pub fn assert_message_subject_matches(transport: &LocalTransport, pattern: &str) {
    let last = last(transport);
    let subject = last.message.subject.clone().unwrap_or_default();

    assert!(
        regex(pattern).is_match(&subject),
        "Expected subject to match pattern '{}', but was '{}'.\n\nLast message:\n{}",
        pattern,
        subject,
        format_message_summary(std::slice::from_ref(&last))
    );
}

/// Assert the last message text body matches a regex pattern.
pub fn assert_message_text_matches(transport: &LocalTransport, pattern: &str) {
    let last = last(transport);
    let body = text_body(&last.message);

    assert!(
        regex(pattern).is_match(&body),
        "Expected text body to match pattern '{}', but it didn't.\n\nLast message:\n{}\n\nText body (first 500 chars):\n{}",
        pattern,
        format_message_summary(std::slice::from_ref(&last)),
        excerpt(&body)
    );
}

/// Assert the last message HTML part matches a regex pattern.
pub fn assert_message_html_matches(transport: &LocalTransport, pattern: &str) {
    let last = last(transport);
    let html = html_body(&last.message);

    assert!(
        regex(pattern).is_match(&html),
        "Expected HTML body to match pattern '{}', but it didn't.\n\nLast message:\n{}\n\nHTML body (first 500 chars):\n{}",
        pattern,
        format_message_summary(std::slice::from_ref(&last)),
        excerpt(&html)
    );
}

// ============================================================================
// Refute Assertions
// ============================================================================

/// Refute that any message was sent (alias for assert_no_messages_sent).
pub fn refute_message_sent(transport: &LocalTransport) {
    assert_no_messages_sent(transport);
}

/// Refute that a message with the exact subject was sent.
pub fn refute_message_subject(transport: &LocalTransport, subject: &str) {
    let messages = transport.messages();
    if let Some(found) = messages
        .iter()
        .find(|stored| stored.message.subject.as_deref() == Some(subject))
    {
        panic!(
            "Expected no message with subject '{}', but found one.\n\nMatching message:\n  To: [{}]\n  From: [{}]\n\nAll messages:\n{}",
            subject,
            addresses(&found.message.to),
            addresses(&found.message.from),
            format_message_summary(&messages)
        );
    }
}

/// Refute that a message matching the predicate was sent.
pub fn refute_message_matches<F>(transport: &LocalTransport, predicate: F)
where
    F: Fn(&Message) -> bool,
{
    let matches = transport.find_messages(predicate);
    if !matches.is_empty() {
        panic!(
            "Expected no messages matching the predicate, but {} were found.\n\nMatching messages:\n{}",
            matches.len(),
            format_message_summary(&matches)
        );
    }
}
