//! Request payload validation.
//!
//! Raw payloads deserialize with every field optional so that a missing field
//! surfaces as a named validation failure rather than a serde error. Each
//! validator returns either the normalized value or every offending field.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::database::models::EntryDraft;

pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const TITLE_MAX_LENGTH: usize = 255;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Field name → reason, for every field that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, reason: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, reason);
        errors
    }

    pub fn add(&mut self, field: &str, reason: impl Into<String>) {
        self.fields.entry(field.to_string()).or_insert_with(|| reason.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn into_fields(self) -> BTreeMap<String, String> {
        self.fields
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        write!(f, "invalid input: {}", names.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    #[serde(alias = "fullname", alias = "fullName")]
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EntryRequest {
    pub title: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReminderRequest {
    pub reminder: Option<bool>,
    pub subscription: Option<Value>,
}

/// Signup payload after validation. Email is normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signup {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

/// Login payload after validation. Email is normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReminderSettings {
    pub reminder: bool,
    pub subscription: Option<Value>,
}

/// Trim and lowercase, so lookups and the unique index agree.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn required_text(errors: &mut ValidationErrors, field: &str, value: Option<String>) -> String {
    let trimmed = value.as_deref().map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        errors.add(field, format!("{} is required", field));
    }
    trimmed.to_string()
}

pub fn signup(request: SignupRequest) -> Result<Signup, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let full_name = required_text(&mut errors, "full_name", request.full_name);

    let email = normalize_email(request.email.as_deref().unwrap_or_default());
    if email.is_empty() {
        errors.add("email", "email is required");
    } else if !EMAIL_RE.is_match(&email) {
        errors.add("email", "email must be a valid email address");
    }

    let password = request.password.unwrap_or_default();
    if password.is_empty() {
        errors.add("password", "password is required");
    } else if let Err(reason) = check_password_strength(&password) {
        errors.add("password", reason);
    }

    errors.finish(|| Signup {
        full_name,
        email,
        password,
    })
}

fn check_password_strength(password: &str) -> Result<(), String> {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Err(format!(
            "password must be at least {} characters long",
            PASSWORD_MIN_LENGTH
        ));
    }
    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_letter && has_digit) {
        return Err("password must contain at least one letter and one digit".to_string());
    }
    Ok(())
}

pub fn login(request: LoginRequest) -> Result<Credentials, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let email = normalize_email(request.email.as_deref().unwrap_or_default());
    if email.is_empty() {
        errors.add("email", "email is required");
    }

    // Passwords are compared verbatim, whitespace included.
    let password = request.password.unwrap_or_default();
    if password.is_empty() {
        errors.add("password", "password is required");
    }

    errors.finish(|| Credentials { email, password })
}

pub fn entry(request: EntryRequest) -> Result<EntryDraft, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let title = required_text(&mut errors, "title", request.title);
    if title.chars().count() > TITLE_MAX_LENGTH {
        errors.add(
            "title",
            format!("title must be at most {} characters long", TITLE_MAX_LENGTH),
        );
    }
    let body = required_text(&mut errors, "body", request.body);

    errors.finish(|| EntryDraft { title, body })
}

pub fn reminder(request: ReminderRequest) -> Result<ReminderSettings, ValidationErrors> {
    let Some(reminder) = request.reminder else {
        return Err(ValidationErrors::single("reminder", "reminder is required"));
    };

    if !reminder {
        return Ok(ReminderSettings {
            reminder,
            subscription: None,
        });
    }

    let has_endpoint = request
        .subscription
        .as_ref()
        .and_then(|s| s.get("endpoint"))
        .and_then(Value::as_str)
        .is_some_and(|endpoint| !endpoint.trim().is_empty());

    if !has_endpoint {
        return Err(ValidationErrors::single(
            "subscription",
            "a push subscription with an endpoint is required to enable reminders",
        ));
    }

    Ok(ReminderSettings {
        reminder,
        subscription: request.subscription,
    })
}

/// Path ids must be positive integers. Anything else is a validation
/// failure, never a lookup miss.
pub fn entry_id(raw: &str) -> Result<i64, ValidationErrors> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ValidationErrors::single("id", "id must be a positive integer"))
}
