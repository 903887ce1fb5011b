//! Input validation rules for accounts, notes and tags.
//!
//! Each check returns the cleaned value (trimmed or normalized) so callers
//! store exactly what was validated.

use crate::defaults::{
    EMAIL_MAX_LEN, PASSWORD_MIN_LEN, TAG_NAME_MAX_LEN, TITLE_MAX_LEN, USERNAME_MAX_LEN,
    USERNAME_MIN_LEN,
};
use crate::error::{Error, Result};

fn invalid(msg: impl Into<String>) -> Error {
    Error::Validation(msg.into())
}

/// Every field of a form must be present and non-empty.
pub fn required(fields: &[&str]) -> Result<()> {
    if fields.iter().any(|field| field.is_empty()) {
        return Err(invalid("Missing required fields"));
    }
    Ok(())
}

/// Username: 3–20 characters of letters, digits, `_`, `.` or `-`.
pub fn username(raw: &str) -> Result<String> {
    let len = raw.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(invalid(format!(
            "Username must be between {} and {} characters",
            USERNAME_MIN_LEN, USERNAME_MAX_LEN
        )));
    }
    if !raw
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        return Err(invalid(
            "Username may only contain letters, numbers, underscore, dot or hyphen",
        ));
    }
    Ok(raw.to_string())
}

/// Email: trimmed and lower-cased, one `@`, non-empty local part, a dotted
/// domain whose labels are non-empty, no whitespace.
pub fn email(raw: &str) -> Result<String> {
    let normalized = normalize_email(raw);
    let bad = || invalid("The email format is invalid");

    if normalized.is_empty() || normalized.len() > EMAIL_MAX_LEN {
        return Err(bad());
    }
    if normalized.chars().any(char::is_whitespace) {
        return Err(bad());
    }
    let (local, domain) = normalized.split_once('@').ok_or_else(bad)?;
    if local.is_empty() || domain.contains('@') {
        return Err(bad());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|label| label.is_empty()) {
        return Err(bad());
    }
    Ok(normalized)
}

/// Lookup form of an email address; applied before every email comparison.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Password: at least 8 characters with at least one uppercase letter.
pub fn password(raw: &str) -> Result<()> {
    if raw.chars().count() < PASSWORD_MIN_LEN {
        return Err(invalid(format!(
            "Password must be at least {} characters long",
            PASSWORD_MIN_LEN
        )));
    }
    if !raw.chars().any(char::is_uppercase) {
        return Err(invalid(
            "Password must contain at least one uppercase letter",
        ));
    }
    Ok(())
}

/// Note title: required, trimmed, at most 200 characters.
pub fn title(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid("Title is required"));
    }
    if trimmed.chars().count() > TITLE_MAX_LEN {
        return Err(invalid(format!(
            "Title must be at most {} characters",
            TITLE_MAX_LEN
        )));
    }
    Ok(trimmed.to_string())
}

/// Tag name: required, trimmed, at most 50 characters.
pub fn tag_name(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid("Tag name is required"));
    }
    if trimmed.chars().count() > TAG_NAME_MAX_LEN {
        return Err(invalid(format!(
            "Tag name must be at most {} characters",
            TAG_NAME_MAX_LEN
        )));
    }
    Ok(trimmed.to_string())
}
