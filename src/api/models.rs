use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One contact form submission. Never persisted.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub sender_name: String,
    pub sender_email: String,
    pub subject: String,
    pub body: String,
}

impl ContactMessage {
    pub fn new(
        sender_name: impl Into<String>,
        sender_email: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            sender_name: sender_name.into(),
            sender_email: sender_email.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Key/value payload the provider renders into its template.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct TemplateParams(BTreeMap<String, String>);

impl TemplateParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    pub status: u16,
    pub text: String,
}

/// Raw failure shape reported by the provider. `status` is `None` when the
/// request never got an HTTP response.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ProviderError {
    pub status: Option<u16>,
    pub text: Option<String>,
}

impl ProviderError {
    pub fn http(status: u16, text: impl Into<String>) -> Self {
        let text: String = text.into();
        Self {
            status: Some(status),
            text: Some(text).filter(|t| !t.trim().is_empty()),
        }
    }

    pub fn transport(text: impl Into<String>) -> Self {
        Self {
            status: None,
            text: Some(text.into()),
        }
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.status, self.text.as_deref()) {
            (Some(s), Some(t)) => write!(f, "HTTP {}: {}", s, t),
            (Some(s), None) => write!(f, "HTTP {}", s),
            (None, Some(t)) => write!(f, "{}", t),
            (None, None) => write!(f, "unknown provider error"),
        }
    }
}
