use anyhow::bail;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /send-email`. Fields holding a falsy JSON value (`null`,
/// `false`, `0`, `""`) are treated as absent.
#[derive(Debug)]
pub struct EmailRequest {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

/// An [`EmailRequest`] whose required fields are present and non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEmail {
    pub to: String,
    pub subject: String,
    pub message: String,
}

impl EmailRequest {
    /// Pick the fields out of a parsed body. Only a `null` body is an error;
    /// any other non-object body simply has no fields.
    pub fn from_value(body: &Value) -> anyhow::Result<Self> {
        if body.is_null() {
            bail!("request body is null");
        }

        Ok(Self {
            to: body.get("to").and_then(truthy_text),
            subject: body.get("subject").and_then(truthy_text),
            message: body.get("message").and_then(truthy_text),
        })
    }

    /// Returns `None` when `to` or `message` is missing or empty. An empty
    /// subject falls back to `default_subject`.
    pub fn validate(self, default_subject: &str) -> Option<ValidatedEmail> {
        let to = self.to.filter(|s| !s.is_empty())?;
        let message = self.message.filter(|s| !s.is_empty())?;
        let subject = self
            .subject
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default_subject.to_string());

        Some(ValidatedEmail {
            to,
            subject,
            message,
        })
    }
}

/// Text of a truthy JSON value, or `None` for a falsy one.
fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// Outcome of a send attempt, returned as-is in the HTTP body.
///
/// Exactly one of `message_id` and `error` is set, matching `success`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl EmailResult {
    pub fn sent(message_id: impl Into<String>) -> Self {
        Self {
            success: true,
            message_id: Some(message_id.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            error: Some(error.into()),
        }
    }
}

/// Error body for every non-200 JSON response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Option<String>) -> Self {
        self.details = details;
        self
    }
}
