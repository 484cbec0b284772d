//! The composer: resolve a request, build the message, hand it to the
//! transport.

use std::sync::Arc;

#[cfg(feature = "metrics")]
use std::time::Instant;

use crate::builder::MessageBuilder;
use crate::config::Config;
use crate::error::MailError;
use crate::host::{Host, SystemHost};
use crate::message::Message;
use crate::options::Options;
use crate::resolve::resolve;
use crate::transport::{DeliveryResult, Transport};
use crate::transports::NativeTransport;

/// Composes and sends messages under a fixed [`Config`].
///
/// ```
/// use postbox::transports::LocalTransport;
/// use postbox::{Composer, Config, Options, StaticHost};
///
/// let transport = LocalTransport::new();
/// let composer = Composer::new(Config::new().subject_prefix("[app] "))
///     .with_host(StaticHost::new("mail.example.com"))
///     .with_transport(transport.clone());
///
/// composer
///     .send(Options::new().to("joe@example.com").subject("Hi").body("Hello, Joe."))
///     .unwrap();
///
/// let sent = transport.last_message().unwrap();
/// assert_eq!(sent.message.subject.as_deref(), Some("[app] Hi"));
/// ```
#[derive(Clone)]
pub struct Composer {
    config: Arc<Config>,
    host: Arc<dyn Host>,
    transport: Arc<dyn Transport>,
}

impl Composer {
    /// Composer using the real host and delivering through
    /// [`NativeTransport`].
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            host: Arc::new(SystemHost::new()),
            transport: Arc::new(NativeTransport::new()),
        }
    }

    /// Replace the host.
    pub fn with_host(mut self, host: impl Host + 'static) -> Self {
        self.host = Arc::new(host);
        self
    }

    /// Replace the transport.
    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Arc::new(transport);
        self
    }

    /// Replace the transport with an already shared one.
    pub fn with_shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve a request against the configuration.
    pub fn resolve(&self, request: Options) -> Result<Options, MailError> {
        resolve(&self.config, self.host.as_ref(), request)
    }

    /// Resolve and build a message without sending it.
    pub fn build(&self, request: Options) -> Result<Message, MailError> {
        let options = self.resolve(request)?;
        MessageBuilder::new(self.host.hostname()).build(&options)
    }

    /// Resolve, build and deliver.
    ///
    /// Transport errors are returned unchanged; nothing is retried.
    pub fn send(&self, request: Options) -> Result<DeliveryResult, MailError> {
        let message = self.build(request)?;
        let transport = self.transport.name();

        let span = tracing::info_span!(
            "postbox.send",
            transport = transport,
            delivery = message.delivery.name(),
            to = ?message.to.iter().map(|m| m.email.to_string()).collect::<Vec<_>>(),
            subject = ?message.subject,
        );
        let _guard = span.enter();

        tracing::debug!("Delivering message");

        #[cfg(feature = "metrics")]
        let start = Instant::now();

        let result = self.transport.deliver(&message);

        #[cfg(feature = "metrics")]
        {
            let duration = start.elapsed().as_secs_f64();
            let status = if result.is_ok() { "success" } else { "error" };
            metrics::counter!("postbox_messages_total", "transport" => transport, "status" => status)
                .increment(1);
            metrics::histogram!("postbox_delivery_duration_seconds", "transport" => transport)
                .record(duration);
        }

        match &result {
            Ok(r) => tracing::info!(message_id = %r.message_id, "Message delivered"),
            Err(e) => tracing::error!(error = %e, "Message delivery failed"),
        }

        result
    }

    /// Send a request given as a JSON object.
    ///
    /// Unknown keys are rejected with [`MailError::UnknownOption`].
    pub fn send_json(&self, request: &str) -> Result<DeliveryResult, MailError> {
        self.send(Options::from_json(request)?)
    }
}

impl std::fmt::Debug for Composer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Composer")
            .field("config", &self.config)
            .field("transport", &self.transport.name())
            .finish_non_exhaustive()
    }
}
