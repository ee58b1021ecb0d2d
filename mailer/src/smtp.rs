use async_trait::async_trait;
use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    transport::smtp::client::{Tls, TlsParameters},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use uuid::Uuid;

use crate::config::{SmtpConfig, TlsMode};

/// A fully assembled message, ready for the transport.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub from: Mailbox,
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Something that can deliver an [`Envelope`] and report its message id.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, envelope: Envelope) -> Result<String, anyhow::Error>;
}

pub struct SmtpClient {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpClient {
    /// Build the SMTP transport.
    ///
    /// Nothing is sent or connected here; connection problems surface on the
    /// first [`MailTransport::send`].
    pub fn new(config: &SmtpConfig) -> Result<Self, anyhow::Error> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());

        let tls = match config.tls {
            TlsMode::None => {
                log::warn!(
                    "Using insecure SMTP connection (no TLS) for {}:{}",
                    config.host,
                    config.port
                );
                Tls::None
            }
            mode => {
                if config.accept_invalid_certs {
                    log::warn!("SMTP certificate validation is disabled for {}", config.host);
                }
                let params = TlsParameters::builder(config.host.clone())
                    .dangerous_accept_invalid_certs(config.accept_invalid_certs)
                    .build()?;
                match mode {
                    TlsMode::Implicit => Tls::Wrapper(params),
                    TlsMode::StartTls => Tls::Required(params),
                    _ => Tls::Opportunistic(params),
                }
            }
        };

        log::info!(
            "SMTP transport {}:{} (tls: {:?}, accept_invalid_certs: {})",
            config.host,
            config.port,
            config.tls,
            config.accept_invalid_certs
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.host.as_str())
            .port(config.port)
            .credentials(creds)
            .tls(tls)
            .timeout(Some(config.timeout))
            .build();

        Ok(Self { mailer })
    }
}

#[async_trait]
impl MailTransport for SmtpClient {
    async fn send(&self, envelope: Envelope) -> Result<String, anyhow::Error> {
        let (message_id, email) = build_message(envelope)?;

        log::debug!("Sending email via SMTP...");
        self.mailer.send(email).await?;
        log::debug!("SMTP server accepted {}", message_id);

        Ok(message_id)
    }
}

/// Turn an envelope into a `multipart/alternative` message with a generated
/// `Message-ID`, which is also returned.
pub fn build_message(envelope: Envelope) -> Result<(String, Message), anyhow::Error> {
    let message_id = format!("<{}@{}>", Uuid::new_v4(), envelope.from.email.domain());

    log::debug!(
        "Building email: from={}, to={}, subject={}",
        envelope.from,
        envelope.to,
        envelope.subject
    );

    let to: Mailbox = envelope
        .to
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid recipient address '{}': {}", envelope.to, e))?;

    let email = Message::builder()
        .message_id(Some(message_id.clone()))
        .from(envelope.from)
        .to(to)
        .subject(envelope.subject)
        .multipart(MultiPart::alternative_plain_html(envelope.text, envelope.html))?;

    Ok((message_id, email))
}
