use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;
use lettre::message::Mailbox;
use lettre::Address;

use crate::config::MailConfig;
use crate::models::EmailResult;
use crate::smtp::{Envelope, MailTransport};
use crate::templates::TemplateRenderer;

pub const EMAIL_TEMPLATE: &str = "emailTemplate";

/// Renders a message into the HTML template and hands it to the transport.
#[derive(Clone)]
pub struct Mailer {
    transport: Arc<dyn MailTransport>,
    templates: TemplateRenderer,
    from: Mailbox,
}

impl Mailer {
    pub fn new(config: &MailConfig, transport: Arc<dyn MailTransport>) -> anyhow::Result<Self> {
        let email = config
            .from_email
            .parse::<Address>()
            .with_context(|| format!("invalid sender address '{}'", config.from_email))?;

        Ok(Self {
            transport,
            templates: TemplateRenderer::new(&config.templates_dir),
            from: Mailbox::new(Some(config.from_name.clone()), email),
        })
    }

    /// Send one message. Template and transport failures come back as a
    /// failed [`EmailResult`], never as an error.
    pub async fn send_email(&self, to: &str, subject: &str, message: &str) -> EmailResult {
        match self.try_send(to, subject, message).await {
            Ok(message_id) => {
                log::info!("Message sent successfully to: {}", to);
                log::info!("Message ID: {}", message_id);
                EmailResult::sent(message_id)
            }
            Err(e) => {
                log::error!("Error sending email to {}: {:#}", to, e);
                EmailResult::failed(e.to_string())
            }
        }
    }

    async fn try_send(&self, to: &str, subject: &str, message: &str) -> anyhow::Result<String> {
        let html = self
            .templates
            .render(EMAIL_TEMPLATE, &HashMap::from([("MESSAGE", message)]))
            .await?;

        let envelope = Envelope {
            from: self.from.clone(),
            to: to.to_string(),
            subject: subject.to_string(),
            text: message.to_string(),
            html,
        };

        self.transport.send(envelope).await
    }
}
