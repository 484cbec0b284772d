//! Option resolution tests.

use chrono::{TimeZone, Utc};
use postbox::{default_via, resolve, Config, MailError, Options, StaticHost, Via};
use std::path::PathBuf;

fn host() -> StaticHost {
    StaticHost::new("test.local")
}

// ============================================================================
// Recipients
// ============================================================================

#[test]
fn test_missing_to_fails_regardless_of_other_fields() {
    let requests = [
        Options::new(),
        Options::new().subject("Hi").body("body"),
        Options::new().cc("a@x").bcc("b@x").via(Via::Smtp),
    ];
    for request in requests {
        let result = resolve(&Config::new(), &host(), request);
        assert!(matches!(result, Err(MailError::MissingRecipient)));
    }
}

#[test]
fn test_override_to_satisfies_recipient_check() {
    let config = Config::new().overrides(Options::new().to("qa@example.com"));
    let options = resolve(&config, &host(), Options::new().body("b")).unwrap();
    assert_eq!(options.to.as_deref(), Some("qa@example.com"));
}

// ============================================================================
// Merge Precedence
// ============================================================================

#[test]
fn test_overrides_beat_request_beat_defaults() {
    let config = Config::new()
        .defaults(Options::new().to("d@x").from("d@x").cc("d@x"))
        .overrides(Options::new().to("o@x").bcc("o@x"));
    let request = Options::new().to("r@x").from("r@x").bcc("r@x");

    let options = resolve(&config, &host(), request).unwrap();

    // in all three
    assert_eq!(options.to.as_deref(), Some("o@x"));
    // request and defaults
    assert_eq!(options.from.as_deref(), Some("r@x"));
    // request and overrides
    assert_eq!(options.bcc.as_deref(), Some("o@x"));
    // defaults only
    assert_eq!(options.cc.as_deref(), Some("d@x"));
}

#[test]
fn test_overrides_beat_defaults() {
    let config = Config::new()
        .defaults(Options::new().subject("default"))
        .overrides(Options::new().subject("override"));
    let options = resolve(&config, &host(), Options::new().to("a@x")).unwrap();
    assert_eq!(options.subject.as_deref(), Some("override"));
}

// ============================================================================
// Subject Prefix
// ============================================================================

#[test]
fn test_subject_prefix() {
    let config = Config::new().subject_prefix("First: ");
    let options = resolve(&config, &host(), Options::new().to("a@x").subject("Second")).unwrap();
    assert_eq!(options.subject.as_deref(), Some("First: Second"));
}

#[test]
fn test_subject_prefix_without_subject() {
    let config = Config::new().subject_prefix("First: ");
    let options = resolve(&config, &host(), Options::new().to("a@x")).unwrap();
    assert_eq!(options.subject.as_deref(), Some("First: "));
}

#[test]
fn test_subject_prefix_applies_after_overrides() {
    let config = Config::new()
        .overrides(Options::new().subject("Override"))
        .subject_prefix("First: ");
    let options = resolve(&config, &host(), Options::new().to("a@x").subject("Second")).unwrap();
    assert_eq!(options.subject.as_deref(), Some("First: Override"));
}

// ============================================================================
// Append Inputs
// ============================================================================

#[test]
fn test_append_inputs() {
    let config = Config::new().append_inputs();
    let options = resolve(&config, &host(), Options::new().to("foo@bar").body("body")).unwrap();
    assert_eq!(
        options.body.as_deref(),
        Some(r#"body/n {"body":"body","to":"foo@bar"}"#)
    );
}

#[test]
fn test_append_inputs_without_body() {
    let config = Config::new().append_inputs();
    let options = resolve(&config, &host(), Options::new().to("foo@bar")).unwrap();
    assert_eq!(options.body.as_deref(), Some(r#"/n {"to":"foo@bar"}"#));
}

#[test]
fn test_append_inputs_dumps_request_not_defaults() {
    let config = Config::new()
        .defaults(Options::new().from("noreply@example.com"))
        .append_inputs();
    let options = resolve(&config, &host(), Options::new().to("foo@bar").body("b")).unwrap();
    assert!(!options.body.unwrap().contains("noreply"));
}

// ============================================================================
// Transport Selection
// ============================================================================

#[test]
fn test_via_defaults_to_smtp_without_sendmail() {
    let options = resolve(&Config::new(), &host(), Options::new().to("a@x")).unwrap();
    assert_eq!(options.via, Some(Via::Smtp));
    assert!(options.via_options.is_none());
}

#[test]
fn test_via_defaults_to_smtp_when_sendmail_not_executable() {
    let host = host().with_broken_sendmail("/usr/bin/sendmail");
    assert_eq!(default_via(&host), Via::Smtp);
}

#[test]
fn test_via_defaults_to_sendmail_with_location() {
    let host = host().with_sendmail("/usr/bin/sendmail");
    let options = resolve(&Config::new(), &host, Options::new().to("a@x")).unwrap();
    assert_eq!(options.via, Some(Via::Sendmail));
    assert_eq!(
        options.via_options.unwrap().location,
        Some(PathBuf::from("/usr/bin/sendmail"))
    );
}

#[test]
fn test_explicit_via_is_kept() {
    let host = host().with_sendmail("/usr/bin/sendmail");
    let options = resolve(&Config::new(), &host, Options::new().to("a@x").via(Via::Smtp)).unwrap();
    assert_eq!(options.via, Some(Via::Smtp));
}

#[test]
fn test_explicit_sendmail_gets_fallback_location() {
    let options = resolve(
        &Config::new(),
        &host(),
        Options::new().to("a@x").via(Via::Sendmail),
    )
    .unwrap();
    assert_eq!(
        options.via_options.unwrap().location,
        Some(PathBuf::from(postbox::DEFAULT_SENDMAIL))
    );
}

// ============================================================================
// Date
// ============================================================================

#[test]
fn test_date_comes_from_host_clock() {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let options = resolve(&Config::new(), &host().at(now), Options::new().to("a@x")).unwrap();
    assert_eq!(options.date, Some(now));
}

#[test]
fn test_request_date_is_kept() {
    let date = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let options = resolve(&Config::new(), &host(), Options::new().to("a@x").date(date)).unwrap();
    assert_eq!(options.date, Some(date));
}
