use crate::api::models::ContactMessage;
use crate::contact::error::SubmitError;
use once_cell::sync::Lazy;
use regex::Regex;

const MIN_NAME: usize = 2;
const MIN_SUBJECT: usize = 3;
const MIN_BODY: usize = 10;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

// Lengths are UTF-16 code units, the same unit the browser form's
// `minLength` checks, so an astral character such as an emoji counts twice.
fn long_enough(value: &str, min: usize) -> bool {
    value.encode_utf16().count() >= min
}

/// Checks fields in form order and returns the trimmed message.
pub fn validate(message: &ContactMessage) -> Result<ContactMessage, SubmitError> {
    let normalized = ContactMessage {
        sender_name: message.sender_name.trim().to_string(),
        sender_email: message.sender_email.trim().to_string(),
        subject: message.subject.trim().to_string(),
        body: message.body.trim().to_string(),
    };

    if !long_enough(&normalized.sender_name, MIN_NAME) {
        return Err(SubmitError::InvalidName);
    }
    if !is_valid_email(&normalized.sender_email) {
        return Err(SubmitError::InvalidEmail);
    }
    if !long_enough(&normalized.subject, MIN_SUBJECT) {
        return Err(SubmitError::InvalidSubject);
    }
    if !long_enough(&normalized.body, MIN_BODY) {
        return Err(SubmitError::InvalidBody);
    }
    Ok(normalized)
}
