//! Composer configuration: defaults, overrides, subject prefix and
//! append-inputs.
//!
//! A [`Config`] is assembled once and handed to the
//! [`Composer`](crate::Composer), which never changes it.
//!
//! ## Environment Variables
//!
//! [`Config::from_env`] reads:
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `EMAIL_FROM` | Default sender email |
//! | `EMAIL_FROM_NAME` | Default sender name |
//! | `EMAIL_OVERRIDE_TO` | Send every message to this address instead |
//! | `EMAIL_VIA` | `sendmail` or `smtp` (auto-detected if unset) |
//! | `EMAIL_SUBJECT_PREFIX` | Prepended to every subject |
//! | `EMAIL_APPEND_INPUTS` | `true`/`1` appends the request to the body |
//! | `SENDMAIL_LOCATION` | Sendmail binary path |
//! | `SMTP_HOST` | SMTP server host |
//! | `SMTP_PORT` | SMTP server port |
//! | `SMTP_DOMAIN` | HELO domain |
//! | `SMTP_USERNAME` | SMTP username |
//! | `SMTP_PASSWORD` | SMTP password |
//! | `SMTP_TLS` | `true` for implicit TLS |
//! | `SMTP_STARTTLS` | `false` to disable opportunistic STARTTLS |

use std::env;

use crate::error::MailError;
use crate::options::{Options, Via, ViaOptions};

/// Composer configuration.
///
/// ```
/// use postbox::{Config, Options};
///
/// let config = Config::new()
///     .defaults(Options::new().from("noreply@example.com"))
///     .overrides(Options::new().to("qa@example.com"))
///     .subject_prefix("[staging] ");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    defaults: Options,
    overrides: Options,
    subject_prefix: Option<String>,
    append_inputs: bool,
}

impl Config {
    /// Empty configuration: no defaults, no overrides, no prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Options used when the request leaves them unset.
    pub fn defaults(mut self, defaults: Options) -> Self {
        self.defaults = defaults;
        self
    }

    /// Options that win over anything the request sets.
    pub fn overrides(mut self, overrides: Options) -> Self {
        self.overrides = overrides;
        self
    }

    /// Prepend `prefix` to every subject.
    pub fn subject_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.subject_prefix = Some(prefix.into());
        self
    }

    /// Append a dump of each request to its body.
    ///
    /// There is no way to turn this back off on the same configuration.
    pub fn append_inputs(mut self) -> Self {
        self.append_inputs = true;
        self
    }

    /// Configured defaults.
    pub fn default_options(&self) -> &Options {
        &self.defaults
    }

    /// Configured overrides.
    pub fn override_options(&self) -> &Options {
        &self.overrides
    }

    /// Configured subject prefix.
    pub fn prefix(&self) -> Option<&str> {
        self.subject_prefix.as_deref()
    }

    /// Whether requests are appended to bodies.
    pub fn appends_inputs(&self) -> bool {
        self.append_inputs
    }

    /// Build a configuration from environment variables.
    ///
    /// Unset variables leave the corresponding option unset.
    pub fn from_env() -> Result<Self, MailError> {
        let mut defaults = Options::new();

        if let Some(email) = var("EMAIL_FROM") {
            defaults.from = Some(match var("EMAIL_FROM_NAME") {
                Some(name) => format!("\"{}\" <{}>", name.replace('"', "\\\""), email),
                None => email,
            });
        }

        if let Some(via) = var("EMAIL_VIA") {
            defaults.via = Some(via.parse::<Via>()?);
        }

        let via_options = via_options_from_env()?;
        if via_options != ViaOptions::default() {
            defaults.via_options = Some(via_options);
        }

        let mut config = Config::new().defaults(defaults);

        if let Some(to) = var("EMAIL_OVERRIDE_TO") {
            config = config.overrides(Options::new().to(to));
        }
        if let Some(prefix) = var("EMAIL_SUBJECT_PREFIX") {
            config = config.subject_prefix(prefix);
        }
        if flag("EMAIL_APPEND_INPUTS")?.unwrap_or(false) {
            config = config.append_inputs();
        }

        tracing::debug!(
            via = ?config.defaults.via,
            subject_prefix = ?config.subject_prefix,
            append_inputs = config.append_inputs,
            "Loaded email configuration from environment"
        );

        Ok(config)
    }
}

fn via_options_from_env() -> Result<ViaOptions, MailError> {
    let mut via_options = ViaOptions::new();
    via_options.location = var("SENDMAIL_LOCATION").map(Into::into);
    via_options.address = var("SMTP_HOST");
    via_options.port = match var("SMTP_PORT") {
        Some(port) => Some(port.parse().map_err(|_| {
            MailError::Configuration(format!("SMTP_PORT is not a valid port: {}", port))
        })?),
        None => None,
    };
    via_options.domain = var("SMTP_DOMAIN");
    via_options.user_name = var("SMTP_USERNAME");
    via_options.password = var("SMTP_PASSWORD");
    via_options.tls = flag("SMTP_TLS")?;
    via_options.enable_starttls_auto = flag("SMTP_STARTTLS")?;
    Ok(via_options)
}

/// Read a variable, treating empty values as unset.
fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn flag(name: &str) -> Result<Option<bool>, MailError> {
    match var(name) {
        None => Ok(None),
        Some(value) => match value.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(MailError::Configuration(format!(
                "{} must be a boolean, got: {}",
                name, value
            ))),
        },
    }
}
