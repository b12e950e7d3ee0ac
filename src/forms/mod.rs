//! Raw HTML form payloads and their validation into typed inputs.
//!
//! Each form struct mirrors the submitted fields as strings so that an
//! invalid submission can be rendered back unchanged. `validate()` either
//! produces the typed input the services accept or the per-field messages
//! to show next to the inputs.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

pub mod artist;
pub mod choices;
pub mod show;
pub mod venue;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_CHOICE: &str = "Not a valid choice.";
pub const INVALID_URL: &str = "Invalid URL.";
pub const INVALID_PHONE: &str = "Invalid phone number.";

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9 ()+.\-]+$").expect("phone pattern is valid"));

const MIN_PHONE_DIGITS: usize = 7;

/// Validation messages keyed by form field name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormErrors {
    errors: BTreeMap<&'static str, String>,
}

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        // First message wins
        self.errors.entry(field).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Message for a field, or an empty string when the field is valid.
    pub fn error_for(&self, field: &str) -> &str {
        self.errors.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    fn finish<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// One `<option>` of a select input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    fn from_choices(choices: &[&str], selected: &[&str]) -> Vec<SelectOption> {
        choices
            .iter()
            .map(|choice| SelectOption {
                value: choice.to_string(),
                label: choice.to_string(),
                selected: selected.contains(choice),
            })
            .collect()
    }
}

pub fn state_options(selected: &str) -> Vec<SelectOption> {
    SelectOption::from_choices(choices::STATES, &[selected])
}

pub fn genre_options(selected: &[String]) -> Vec<SelectOption> {
    let selected: Vec<&str> = selected.iter().map(String::as_str).collect();
    SelectOption::from_choices(choices::GENRES, &selected)
}

fn required(errors: &mut FormErrors, field: &'static str, value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    }
    value.to_string()
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn checkbox(value: &Option<String>) -> bool {
    matches!(value.as_deref(), Some(v) if !v.is_empty() && v != "n" && v != "false")
}

fn choice(
    errors: &mut FormErrors,
    field: &'static str,
    value: &str,
    choices: &[&str],
) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    } else if !choices.contains(&value) {
        errors.add(field, INVALID_CHOICE);
    }
    value.to_string()
}

fn multi_choice(
    errors: &mut FormErrors,
    field: &'static str,
    values: &[String],
    choices: &[&str],
) -> Vec<String> {
    let values: Vec<String> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    if values.is_empty() {
        errors.add(field, REQUIRED);
    } else if let Some(bad) = values.iter().find(|v| !choices.contains(&v.as_str())) {
        errors.add(field, format!("'{bad}' is not a valid choice for this field."));
    }
    values
}

fn phone(errors: &mut FormErrors, field: &'static str, value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
    } else {
        let digits = value.chars().filter(char::is_ascii_digit).count();
        if !PHONE_RE.is_match(value) || digits < MIN_PHONE_DIGITS {
            errors.add(field, INVALID_PHONE);
        }
    }
    value.to_string()
}

fn optional_url(errors: &mut FormErrors, field: &'static str, value: &str) -> Option<String> {
    let value = optional(value)?;
    match url::Url::parse(&value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {
            Some(value)
        }
        _ => {
            errors.add(field, INVALID_URL);
            Some(value)
        }
    }
}
