//! Payload validators for user, feedback and credential forms.
//!
//! Each validator returns the normalized payload or the first failing field. Validators never
//! panic.

use std::string::{String, ToString};
use std::sync::OnceLock;

use regex::Regex;

/// A single failed field.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub type Validated<T> = Result<T, ValidationError>;

const USERNAME_LEN: (usize, usize) = (3, 20);
const PASSWORD_MIN_LEN: usize = 8;
const NAME_MAX_LEN: usize = 50;
const MESSAGE_LEN: (usize, usize) = (10, 1000);
const EMAIL_MAX_LEN: usize = 254;
const EMAIL_LOCAL_MAX_LEN: usize = 64;

/// Dot-atom local part, `@`, then two or more hostname labels.
fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(concat!(
            r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*",
            r"@(?:[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?\.)+",
            r"[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?$",
        ))
        .expect("email pattern is valid")
    })
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Feedback {
    pub name: String,
    pub email: String,
    pub message: String,
    /// Optional 1..=5 star rating.
    pub rating: Option<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

fn required<'a>(field: &'static str, value: &'a str) -> Validated<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    Ok(value)
}

fn length_between(field: &'static str, value: &str, (min, max): (usize, usize)) -> Validated<()> {
    let n = value.chars().count();
    if n < min {
        return Err(ValidationError::new(
            field,
            format!("must be at least {min} characters"),
        ));
    }
    if n > max {
        return Err(ValidationError::new(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

fn normalize_email(field: &'static str, value: &str) -> Validated<String> {
    let value = required(field, value)?;
    let invalid = || ValidationError::new(field, "must be a valid email address");

    if value.len() > EMAIL_MAX_LEN || !email_pattern().is_match(value) {
        return Err(invalid());
    }
    let local_len = value.find('@').unwrap_or(value.len());
    if local_len > EMAIL_LOCAL_MAX_LEN {
        return Err(invalid());
    }

    Ok(value.to_ascii_lowercase())
}

/// Validates a sign-up payload.
///
/// - `username`: 3 to 20 characters of ASCII letters, digits or `_`
/// - `email`: a well-formed address, lowercased
/// - `password`: at least 8 characters with a letter and a digit (not trimmed)
pub fn validate_user(input: NewUser) -> Validated<NewUser> {
    let username = required("username", &input.username)?;
    length_between("username", username, USERNAME_LEN)?;
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ValidationError::new(
            "username",
            "may only contain letters, digits and underscores",
        ));
    }

    let email = normalize_email("email", &input.email)?;

    let password = &input.password;
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(ValidationError::new(
            "password",
            format!("must be at least {PASSWORD_MIN_LEN} characters"),
        ));
    }
    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        return Err(ValidationError::new(
            "password",
            "must contain a letter and a digit",
        ));
    }

    Ok(NewUser {
        username: username.to_string(),
        email,
        password: input.password,
    })
}

/// Validates a feedback form.
pub fn validate_feedback(input: Feedback) -> Validated<Feedback> {
    let name = required("name", &input.name)?;
    length_between("name", name, (1, NAME_MAX_LEN))?;

    let email = normalize_email("email", &input.email)?;

    let message = required("message", &input.message)?;
    length_between("message", message, MESSAGE_LEN)?;

    if let Some(rating) = input.rating {
        if !(1..=5).contains(&rating) {
            return Err(ValidationError::new("rating", "must be between 1 and 5"));
        }
    }

    Ok(Feedback {
        name: name.to_string(),
        email,
        message: message.to_string(),
        rating: input.rating,
    })
}

/// Validates a sign-in payload. Only presence and shape are checked here.
pub fn validate_credentials(input: Credentials) -> Validated<Credentials> {
    let email = normalize_email("email", &input.email)?;
    if input.password.is_empty() {
        return Err(ValidationError::new("password", "is required"));
    }
    Ok(Credentials {
        email,
        password: input.password,
    })
}

#[cfg(feature = "serde")]
fn from_json<T: serde::de::DeserializeOwned>(json: &str) -> Validated<T> {
    serde_json::from_str(json).map_err(|err| ValidationError::new("payload", err.to_string()))
}

#[cfg(feature = "serde")]
pub fn validate_user_json(json: &str) -> Validated<NewUser> {
    validate_user(from_json(json)?)
}

#[cfg(feature = "serde")]
pub fn validate_feedback_json(json: &str) -> Validated<Feedback> {
    validate_feedback(from_json(json)?)
}

#[cfg(feature = "serde")]
pub fn validate_credentials_json(json: &str) -> Validated<Credentials> {
    validate_credentials(from_json(json)?)
}
