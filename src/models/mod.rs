// src/models/mod.rs

use std::borrow::Cow;

use serde::{Deserialize, Deserializer};
use validator::ValidationError;

pub mod coverage;
pub mod feedback;
pub mod question;
pub mod session;
pub mod study;

/// Rejects empty or whitespace-only input with a user-facing message.
pub(crate) fn require_text(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(Cow::Borrowed(message)));
    }
    Ok(())
}

/// Limits input length in characters to keep prompts bounded.
pub(crate) fn limit_text(
    value: &str,
    max_chars: usize,
    message: &'static str,
) -> Result<(), ValidationError> {
    if value.chars().count() > max_chars {
        return Err(ValidationError::new("too_long").with_message(Cow::Borrowed(message)));
    }
    Ok(())
}

/// Reads an explicit `null` the same as an absent field, so required-field
/// validation reports it with the field's own message.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
