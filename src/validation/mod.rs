//! Validation pipeline for submitted catalog forms
//!
//! Each form goes through the same steps: trim every text field, check the
//! field rules (`validator` derive on the trimmed form), escape markup in the
//! free-text fields, and only then build a draft. A form with any failing rule
//! never yields a draft.

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;

use chrono::{FixedOffset, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::borrow::Cow;
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

pub use author::AuthorForm;
pub use book::BookForm;
pub use book_instance::BookInstanceForm;
pub use genre::GenreForm;

/// One failed rule on one submitted field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Form field name as submitted (`firstName`, `dueBack`, ...)
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Outcome of running a form through the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum Validated<D, F> {
    /// Sanitized draft ready to persist
    Valid(D),
    /// Sanitized form values for re-rendering, plus every failed rule in field order
    Invalid { form: F, errors: Vec<FieldError> },
}

impl<D, F> Validated<D, F> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validated::Valid(_))
    }
}

/// HTML-escape markup-significant characters
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '/' => out.push_str("&#x2F;"),
            '\\' => out.push_str("&#x5C;"),
            '`' => out.push_str("&#96;"),
            _ => out.push(c),
        }
    }
    out
}

pub(crate) fn trim(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<y>\d{4})-(?P<mo>\d{2})-(?P<d>\d{2})(?:[T ](?P<h>[01]\d|2[0-3]):(?P<mi>[0-5]\d)(?::[0-5]\d(?:\.\d+)?)?(?:Z|(?P<sign>[+-])(?P<oh>[01]\d|2[0-3]):?(?P<om>[0-5]\d))?)?$",
    )
    .expect("ISO date pattern is valid")
});

/// Parse an extended-format ISO 8601 date or date-time.
///
/// A date-time with a numeric offset is normalized to its UTC date.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let caps = ISO_DATE.captures(value)?;
    let field = |name: &str| caps.name(name).and_then(|m| m.as_str().parse::<u32>().ok());
    let date = NaiveDate::from_ymd_opt(caps["y"].parse().ok()?, field("mo")?, field("d")?)?;

    let Some(sign) = caps.name("sign") else {
        return Some(date);
    };
    let mut offset = (field("oh")? * 3600 + field("om")? * 60) as i32;
    if sign.as_str() == "-" {
        offset = -offset;
    }
    let local = date.and_hms_opt(field("h")?, field("mi")?, 0)?;
    let utc = local
        .and_local_timezone(FixedOffset::east_opt(offset)?)
        .single()?
        .with_timezone(&Utc);
    Some(utc.date_naive())
}

/// Optional date: an empty submission stays absent
pub(crate) fn optional_date(value: &str) -> Option<NaiveDate> {
    if value.is_empty() {
        None
    } else {
        parse_iso_date(value)
    }
}

pub(crate) fn rule(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

pub(crate) fn check_optional_date(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.is_empty() || parse_iso_date(value).is_some() {
        Ok(())
    } else {
        Err(rule("iso8601", message))
    }
}

pub(crate) fn check_reference(value: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.is_empty() || Uuid::parse_str(value).is_ok() {
        Ok(())
    } else {
        Err(rule("reference", message))
    }
}

/// ASCII letters and digits only; the empty string does not qualify
pub(crate) fn is_alphanumeric(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Flatten `validator` errors into submitted-field order.
///
/// `fields` pairs each struct field with its form name.
pub(crate) fn collect_errors(
    errors: &ValidationErrors,
    fields: &[(&str, &str)],
) -> Vec<FieldError> {
    let by_field = errors.field_errors();
    let mut out = Vec::new();
    for (struct_name, form_name) in fields {
        let found = by_field
            .get(*struct_name)
            .or_else(|| by_field.get(*form_name));
        if let Some(list) = found {
            for err in list.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", form_name));
                out.push(FieldError::new(*form_name, message));
            }
        }
    }
    out
}
