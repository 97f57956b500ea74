//! Field error maps and the validation rules shared by both wizards.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::StepError;

static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").expect("slug pattern compiles"));

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Mapping from field name to the message rendered beneath it.
///
/// Empty means the step is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    /// Record a step error under the field it names.
    pub fn record(&mut self, error: &StepError) {
        self.insert(error.field(), error.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<StepError> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = StepError>>(iter: I) -> Self {
        let mut errors = Self::new();
        for error in iter {
            errors.record(&error);
        }
        errors
    }
}

/// Fails with `message` under `field` when `value` is blank after trimming.
pub fn require_non_blank(field: &str, value: &str, message: &str) -> Result<(), StepError> {
    if value.trim().is_empty() {
        return Err(StepError::validation(field, message));
    }
    Ok(())
}

/// Whether `slug` is non-empty and made only of `[a-z0-9-]`.
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_PATTERN.is_match(slug)
}

/// Lowercase `name` and replace every character outside `[a-z0-9-]` with `-`.
///
/// Idempotent: the output only contains characters the transform keeps.
pub fn derive_slug(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Slug offered while the user has not typed one: [`derive_slug`] without
/// the leading/trailing hyphens left behind by punctuation and spaces.
pub fn suggest_slug(name: &str) -> String {
    derive_slug(name).trim_matches('-').to_string()
}

/// Simple `local@domain.tld` shape check.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}
