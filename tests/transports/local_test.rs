//! LocalTransport tests.

use postbox::testing::*;
use postbox::transports::LocalTransport;
use postbox::{Composer, Config, MailError, Options, StaticHost};

fn setup() -> (Composer, LocalTransport) {
    let transport = LocalTransport::new();
    let composer = Composer::new(Config::new())
        .with_host(StaticHost::new("mail.example.com"))
        .with_transport(transport.clone());
    (composer, transport)
}

fn send_avengers(composer: &Composer) {
    composer
        .send(
            Options::new()
                .from("tony.stark@example.com")
                .reply_to("bruce.banner@example.com")
                .to("steve.rogers@example.com, natasha.romanoff@example.com")
                .cc("thor.odinson@example.com")
                .bcc("loki.odinson@example.com")
                .header("Avengers", "Assemble")
                .subject("Hello, Avengers!")
                .html_body("<h1>Some html</h1>")
                .body("Some text"),
        )
        .unwrap();
}

#[test]
fn test_captures_message() {
    let (composer, transport) = setup();
    send_avengers(&composer);

    assert_message_sent(&transport);
    assert_message_count(&transport, 1);
    let stored = get_last_message(&transport);
    assert_eq!(stored.message.header("Avengers"), Some("Assemble"));
    assert_eq!(stored.message.reply_to[0].email.to_string(), "bruce.banner@example.com");
}

#[test]
fn test_bcc_counts_as_delivered_to() {
    let (composer, transport) = setup();
    send_avengers(&composer);

    assert_message_to(&transport, "loki.odinson@example.com");
    assert_eq!(get_messages_to(&transport, "thor.odinson@example.com").len(), 1);
    assert!(get_messages_to(&transport, "hulk@example.com").is_empty());
}

#[test]
fn test_regex_assertions() {
    let (composer, transport) = setup();
    send_avengers(&composer);

    assert_message_subject_matches(&transport, r"^Hello, \w+!$");
    assert_message_html_matches(&transport, r"<h1>.*</h1>");
    assert_message_text_matches(&transport, r"Some\s+text");
}

#[test]
fn test_predicate_assertions() {
    let (composer, transport) = setup();
    send_avengers(&composer);

    assert_message_matches(&transport, |m| m.cc.len() == 1);
    refute_message_matches(&transport, |m| m.has_attachments());
    refute_message_subject(&transport, "Goodbye, Avengers!");
}

#[test]
#[should_panic(expected = "Expected at least one message to be sent")]
fn test_assert_sent_panics_when_empty() {
    let (_, transport) = setup();
    assert_message_sent(&transport);
}

#[test]
#[should_panic(expected = "Expected no message to be sent to 'steve.rogers@example.com'")]
fn test_refute_to_panics_when_sent() {
    let (composer, transport) = setup();
    send_avengers(&composer);
    refute_message_to(&transport, "steve.rogers@example.com");
}

#[test]
#[should_panic(expected = "Expected 2 message(s) to be sent, but 1 were sent")]
fn test_count_mismatch_panics() {
    let (composer, transport) = setup();
    send_avengers(&composer);
    assert_message_count(&transport, 2);
}

#[test]
fn test_flush_between_phases() {
    let (composer, transport) = setup();
    send_avengers(&composer);
    assert_eq!(transport.flush().len(), 1);

    refute_message_sent(&transport);
    send_avengers(&composer);
    assert_message_count(&transport, 1);
}

#[test]
fn test_simulated_failure_reaches_caller() {
    let (composer, transport) = setup();
    transport.set_failure("SMTP connection refused");

    let err = composer
        .send(Options::new().to("a@example.com"))
        .unwrap_err();
    assert!(matches!(err, MailError::SendError(ref m) if m == "SMTP connection refused"));
    assert_no_messages_sent(&transport);
}
