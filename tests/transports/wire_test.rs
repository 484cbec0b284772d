//! Conversion to lettre messages.

use postbox::transports::wire;
use postbox::{Attachment, MailError, MessageBuilder, Options};

fn formatted(options: Options) -> String {
    let message = MessageBuilder::new("mail.example.com")
        .build(&options)
        .unwrap();
    String::from_utf8(wire::formatted(&message).unwrap()).unwrap()
}

#[test]
fn test_flat_message() {
    let output = formatted(
        Options::new()
            .from("from@example.com")
            .to("to@example.com")
            .subject("Plain hello")
            .body("Hello there")
            .message_id("<fixed@example.com>")
            .header("X-Campaign", "spring"),
    );

    assert!(output.contains("Subject: Plain hello"));
    assert!(output.contains("X-Campaign: spring"));
    assert!(output.contains("Message-ID: <fixed@example.com>"));
    assert!(output.contains("Hello there"));
}

#[test]
fn test_multipart_message() {
    let output = formatted(
        Options::new()
            .to("to@example.com")
            .subject("With parts")
            .body("Some text")
            .html_body("<h1>Some html</h1>")
            .attachment(Attachment::from_bytes("notes.txt", "remember")),
    );

    assert!(output.contains("multipart/mixed"));
    assert!(output.contains("multipart/alternative"));
    assert!(output.contains("boundary="));
    assert!(output.contains("notes.txt"));
    assert!(output.contains("Content-ID: <notes.txt@mail.example.com>"));
}

#[test]
fn test_xlsx_written_as_base64() {
    let output = formatted(
        Options::new()
            .to("to@example.com")
            .attachment(Attachment::from_bytes("f.xlsx", "data")),
    );
    assert!(output.contains("Content-Transfer-Encoding: base64"));
    assert!(output.contains("ZGF0YQ=="));
}

#[test]
fn test_pdf_written_as_base64() {
    let output = formatted(
        Options::new()
            .to("to@example.com")
            .attachment(Attachment::from_bytes("foo.pdf", "content of foo.pdf")),
    );
    assert!(output.contains("Content-Type: application/pdf"));
    assert!(output.contains("Content-Transfer-Encoding: base64"));
    assert!(!output.contains("content of foo.pdf"));
}

#[test]
fn test_supported_part_header() {
    let output = formatted(
        Options::new()
            .to("to@example.com")
            .body("b")
            .html_body("h")
            .body_part_header("content_disposition", "inline"),
    );
    assert!(output.contains("Content-Disposition: inline"));
}

#[test]
fn test_unsupported_part_header() {
    let message = MessageBuilder::new("mail.example.com")
        .build(
            &Options::new()
                .to("to@example.com")
                .body("b")
                .html_body("h")
                .body_part_header("x_mood", "cheerful"),
        )
        .unwrap();

    assert!(matches!(
        wire::to_lettre(&message),
        Err(MailError::UnsupportedFeature(_))
    ));
}

#[test]
fn test_envelope_to_replaces_recipients() {
    let message = MessageBuilder::new("mail.example.com")
        .build(
            &Options::new()
                .to("to@example.com")
                .smtp_envelope_to("relay@example.com"),
        )
        .unwrap();

    let email = wire::to_lettre(&message).unwrap();
    let recipients: Vec<String> = email
        .envelope()
        .to()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(recipients, vec!["relay@example.com"]);
}
