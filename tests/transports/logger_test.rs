//! LoggerTransport tests.

use postbox::transports::LoggerTransport;
use postbox::{Composer, Config, Options, StaticHost, Transport};

#[test]
fn test_logger_accepts_message() {
    let composer = Composer::new(Config::new())
        .with_host(StaticHost::new("mail.example.com"))
        .with_transport(LoggerTransport::full());

    let result = composer
        .send(
            Options::new()
                .to("bob@example.com")
                .subject("Logged")
                .body("Plain text")
                .message_id("<logged@example.com>"),
        )
        .unwrap();
    assert_eq!(result.message_id, "logged@example.com");
}

#[test]
fn test_logger_name() {
    assert_eq!(LoggerTransport::new().name(), "logger");
}
