use crate::api::models::ProviderError;
use crate::contact::cooldown::Remaining;
use thiserror::Error;

fn detail(text: &Option<String>) -> String {
    text.as_deref()
        .map(|d| format!(" ({})", d))
        .unwrap_or_default()
}

/// Everything that can stop a contact submission. `Display` is the message
/// shown to the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("Please enter a valid name (at least 2 characters).")]
    InvalidName,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
    #[error("Please enter a subject (at least 3 characters).")]
    InvalidSubject,
    #[error("Please enter a message (at least 10 characters).")]
    InvalidBody,
    #[error("You can send another message in {0}. Please wait before sending another one.")]
    RateLimited(Remaining),
    #[error("Your message could not be sent. Please check the form and try again.")]
    BadRequest,
    #[error("Email service authentication failed. Please try again later.")]
    AuthFailure,
    #[error("The email service is not configured correctly. Please email me directly.")]
    ServiceNotFound,
    #[error("The email service is busy. Please try again in a few minutes.")]
    ProviderRateLimited,
    #[error("Sorry, there was an error sending your message{}. Please try again.", detail(.0))]
    Unknown(Option<String>),
}

impl From<ProviderError> for SubmitError {
    fn from(err: ProviderError) -> Self {
        match err.status {
            Some(400) => Self::BadRequest,
            Some(401) | Some(403) => Self::AuthFailure,
            Some(404) => Self::ServiceNotFound,
            Some(429) => Self::ProviderRateLimited,
            _ => Self::Unknown(err.text),
        }
    }
}
