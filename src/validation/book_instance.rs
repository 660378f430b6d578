//! Book copy form rules

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{check_optional_date, check_reference, collect_errors, escape, optional_date, rule, trim, FieldError, Validated};
use crate::models::{book_instance::BookInstanceDraft, enums::BookInstanceStatus};

fn book_reference(value: &str) -> Result<(), ValidationError> {
    check_reference(value, "Invalid book")
}

fn known_status(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.parse::<BookInstanceStatus>().is_ok() {
        Ok(())
    } else {
        Err(rule("status", "Invalid status"))
    }
}

fn due_back(value: &str) -> Result<(), ValidationError> {
    check_optional_date(value, "Invalid date")
}

/// Submitted copy form (`book`, `imprint`, `status`, `dueBack`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct BookInstanceForm {
    #[validate(
        length(min = 1, message = "Book must be specified"),
        custom(function = "book_reference")
    )]
    pub book: String,
    #[validate(length(min = 1, message = "Imprint must be specified"))]
    pub imprint: String,
    #[validate(custom(function = "known_status"))]
    pub status: String,
    #[validate(custom(function = "due_back"))]
    pub due_back: String,
}

const FIELDS: &[(&str, &str)] = &[
    ("book", "book"),
    ("imprint", "imprint"),
    ("status", "status"),
    ("due_back", "dueBack"),
];

impl BookInstanceForm {
    /// Empty status falls back to Maintenance and empty due date to today
    pub fn validate_draft(mut self) -> Validated<BookInstanceDraft, BookInstanceForm> {
        trim(&mut self.book);
        trim(&mut self.imprint);
        trim(&mut self.status);
        trim(&mut self.due_back);

        let result = self.validate();
        self.book = escape(&self.book);
        self.imprint = escape(&self.imprint);
        self.status = escape(&self.status);

        if let Err(errors) = result {
            let errors = collect_errors(&errors, FIELDS);
            return Validated::Invalid { form: self, errors };
        }

        let Ok(book) = Uuid::parse_str(&self.book) else {
            return Validated::Invalid {
                form: self,
                errors: vec![FieldError::new("book", "Invalid book")],
            };
        };

        Validated::Valid(BookInstanceDraft {
            book,
            status: self.status.parse().unwrap_or_default(),
            due_back: optional_date(&self.due_back).unwrap_or_else(|| Utc::now().date_naive()),
            imprint: self.imprint,
        })
    }
}
