pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod models;
pub mod smtp;
pub mod templates;

pub use config::Config;
pub use dispatch::Mailer;
pub use smtp::{MailTransport, SmtpClient};
pub use templates::TemplateRenderer;
