//! Option resolution: append-inputs, defaults/overrides merge, subject
//! prefix, recipient check and transport selection.

use crate::config::Config;
use crate::error::MailError;
use crate::host::Host;
use crate::options::{Options, Via};

/// Turn a request into the options a message is built from.
///
/// Steps, in order:
///
/// 1. with append-inputs on, the body becomes `"<body>/n <dump of request>"`
/// 2. `defaults`, then the request, then `overrides` are layered
/// 3. the subject prefix is prepended to the subject
/// 4. `to` must be set, otherwise [`MailError::MissingRecipient`]
/// 5. `via` defaults to sendmail when the binary is executable, else SMTP
/// 6. sendmail gets its binary location filled in when not given
/// 7. `date` defaults to the host clock
pub fn resolve(config: &Config, host: &dyn Host, request: Options) -> Result<Options, MailError> {
    let mut request = request;
    if config.appends_inputs() {
        let dump = request.dump();
        let body = request.body.take().unwrap_or_default();
        request.body = Some(format!("{}/n {}", body, dump));
    }

    let mut options = config
        .default_options()
        .clone()
        .merge(request)
        .merge(config.override_options().clone());

    if let Some(prefix) = config.prefix() {
        let subject = options.subject.take().unwrap_or_default();
        options.subject = Some(format!("{}{}", prefix, subject));
    }

    match options.to.as_deref() {
        Some(to) if !to.trim().is_empty() => {}
        _ => return Err(MailError::MissingRecipient),
    }

    if options.via.is_none() {
        let via = default_via(host);
        tracing::debug!(via = %via, "No transport given, using default");
        options.via = Some(via);
    }

    if options.via == Some(Via::Sendmail) {
        let via_options = options.via_options.get_or_insert_with(Default::default);
        if via_options.location.is_none() {
            let location = host.sendmail_binary();
            tracing::debug!(location = %location.display(), "Located sendmail binary");
            via_options.location = Some(location);
        }
    }

    if options.date.is_none() {
        options.date = Some(host.now());
    }

    Ok(options)
}

/// Sendmail when it can be run on this host, SMTP otherwise.
pub fn default_via(host: &dyn Host) -> Via {
    if host.is_executable(&host.sendmail_binary()) {
        Via::Sendmail
    } else {
        Via::Smtp
    }
}
