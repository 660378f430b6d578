//! Book form rules

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::{check_reference, collect_errors, escape, rule, trim, FieldError, Validated};
use crate::models::book::BookDraft;

fn author_reference(value: &str) -> Result<(), ValidationError> {
    check_reference(value, "Invalid author")
}

fn genre_references(values: &[String]) -> Result<(), ValidationError> {
    if values.iter().all(|v| Uuid::parse_str(v).is_ok()) {
        Ok(())
    } else {
        Err(rule("reference", "Invalid genre"))
    }
}

/// Submitted book form; `genre` may repeat
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct BookForm {
    #[validate(length(min = 1, message = "Title must not be empty."))]
    pub title: String,
    #[validate(
        length(min = 1, message = "Author must not be empty."),
        custom(function = "author_reference")
    )]
    pub author: String,
    #[validate(length(min = 1, message = "Summary must not be empty."))]
    pub summary: String,
    #[validate(length(min = 1, message = "ISBN must not be empty"))]
    pub isbn: String,
    #[validate(custom(function = "genre_references"))]
    pub genre: Vec<String>,
}

const FIELDS: &[(&str, &str)] = &[
    ("title", "title"),
    ("author", "author"),
    ("summary", "summary"),
    ("isbn", "isbn"),
    ("genre", "genre"),
];

impl BookForm {
    pub fn validate_draft(mut self) -> Validated<BookDraft, BookForm> {
        trim(&mut self.title);
        trim(&mut self.author);
        trim(&mut self.summary);
        trim(&mut self.isbn);
        self.genre.iter_mut().for_each(trim);
        self.genre.retain(|g| !g.is_empty());

        let result = self.validate();
        self.title = escape(&self.title);
        self.author = escape(&self.author);
        self.summary = escape(&self.summary);
        self.isbn = escape(&self.isbn);
        self.genre = self.genre.iter().map(|g| escape(g)).collect();

        if let Err(errors) = result {
            let errors = collect_errors(&errors, FIELDS);
            return Validated::Invalid { form: self, errors };
        }

        let Ok(author) = Uuid::parse_str(&self.author) else {
            return Validated::Invalid {
                form: self,
                errors: vec![FieldError::new("author", "Invalid author")],
            };
        };

        Validated::Valid(BookDraft {
            genre: self.genre.iter().filter_map(|g| Uuid::parse_str(g).ok()).collect(),
            title: self.title,
            author,
            summary: self.summary,
            isbn: self.isbn,
        })
    }
}
