//! NativeTransport tests that do not need a mail server.

use postbox::transports::NativeTransport;
use postbox::{Composer, Config, MailError, Options, StaticHost, Transport, Via, ViaOptions};

#[test]
fn test_native_name() {
    assert_eq!(NativeTransport::new().name(), "native");
}

#[cfg(feature = "sendmail")]
#[test]
fn test_missing_sendmail_binary_fails_to_send() {
    let composer = Composer::new(Config::new()).with_host(StaticHost::new("mail.example.com"));

    let result = composer.send(
        Options::new()
            .to("a@example.com")
            .via(Via::Sendmail)
            .via_options(ViaOptions::new().location("/nonexistent/postbox/sendmail")),
    );
    assert!(matches!(result, Err(MailError::SendError(_))));
}

#[cfg(feature = "smtp")]
#[test]
fn test_unreachable_smtp_server_fails_to_send() {
    let composer = Composer::new(Config::new()).with_host(StaticHost::new("mail.example.com"));

    // Port 1 on localhost: nothing listens there.
    let result = composer.send(
        Options::new()
            .to("a@example.com")
            .via(Via::Smtp)
            .enable_starttls_auto(false)
            .via_options(ViaOptions::new().address("127.0.0.1").port(1)),
    );
    assert!(matches!(result, Err(MailError::SendError(_))));
}
