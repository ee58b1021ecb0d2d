use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};

pub const DEFAULT_FROM_NAME: &str = "Glory Plus International";
pub const DEFAULT_SUBJECT: &str = "Message from GloryPlus International";

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// Plain text only, for local relays.
    None,
    /// Start plain and upgrade with STARTTLS when the server offers it.
    Opportunistic,
    /// Start plain and require STARTTLS, typically port 587.
    StartTls,
    /// TLS from the first byte (SMTPS), typically port 465.
    Implicit,
}

impl FromStr for TlsMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "plain" | "off" => Ok(Self::None),
            "opportunistic" => Ok(Self::Opportunistic),
            "starttls" | "required" => Ok(Self::StartTls),
            "implicit" | "smtps" | "wrapper" => Ok(Self::Implicit),
            other => Err(anyhow!(
                "unknown SMTP TLS mode '{other}' (expected none, opportunistic, starttls or implicit)"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub tls: TlsMode,
    pub accept_invalid_certs: bool,
    pub timeout: Duration,
}

/// Sender identity and message defaults.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub from_name: String,
    pub from_email: String,
    pub default_subject: String,
    pub templates_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Exposes raw error text in 500 responses.
    pub dev_mode: bool,
    pub smtp: SmtpConfig,
    pub mail: MailConfig,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| var(key).with_context(|| format!("{key} must be set"));

        let port = parse_or(var("PORT"), "PORT", 3000u16)?;
        let dev_mode = var("APP_ENV").is_some_and(|v| v.eq_ignore_ascii_case("development"));

        let username = required("SMTP_USER")?;
        if !username.contains('@') {
            bail!("SMTP_USER must be the sender email address, got '{username}'");
        }

        let smtp = SmtpConfig {
            host: required("SMTP_HOST")?,
            port: parse_or(var("SMTP_PORT"), "SMTP_PORT", 587u16)?,
            password: required("SMTP_PASS")?,
            tls: parse_or(var("SMTP_TLS"), "SMTP_TLS", TlsMode::Opportunistic)?,
            accept_invalid_certs: parse_or(
                var("SMTP_ACCEPT_INVALID_CERTS"),
                "SMTP_ACCEPT_INVALID_CERTS",
                true,
            )?,
            timeout: Duration::from_secs(parse_or(
                var("SMTP_TIMEOUT_SECS"),
                "SMTP_TIMEOUT_SECS",
                30u64,
            )?),
            username: username.clone(),
        };

        let mail = MailConfig {
            from_name: var("MAIL_FROM_NAME").unwrap_or_else(|| DEFAULT_FROM_NAME.to_string()),
            from_email: username,
            default_subject: var("MAIL_DEFAULT_SUBJECT")
                .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
            templates_dir: var("TEMPLATES_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("templates")),
        };

        Ok(Self {
            port,
            dev_mode,
            smtp,
            mail,
        })
    }
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key} has an invalid value '{raw}': {e}")),
        None => Ok(default),
    }
}
