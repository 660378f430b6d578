//! Book copy model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{book::BookSummary, enums::BookInstanceStatus, format_date, format_iso_date, Entity, CATALOG_ROOT};

/// Stored copy of a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookInstance {
    pub id: Uuid,
    pub book: Uuid,
    pub imprint: String,
    #[serde(default)]
    pub status: BookInstanceStatus,
    pub due_back: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookInstanceDraft {
    pub book: Uuid,
    pub imprint: String,
    pub status: BookInstanceStatus,
    pub due_back: NaiveDate,
}

impl Entity for BookInstance {
    const COLLECTION: &'static str = "book_instances";
    type Draft = BookInstanceDraft;

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_draft(id: Uuid, draft: BookInstanceDraft) -> Self {
        Self {
            id,
            book: draft.book,
            imprint: draft.imprint,
            status: draft.status,
            due_back: draft.due_back,
        }
    }

    fn url(&self) -> String {
        format!("{}/bookinstance/{}", CATALOG_ROOT, self.id)
    }
}

impl BookInstance {
    pub fn due_back_formatted(&self) -> String {
        format_date(Some(self.due_back))
    }

    pub fn view(&self, book: Option<BookSummary>) -> BookInstanceView {
        BookInstanceView {
            id: self.id,
            imprint: self.imprint.clone(),
            status: self.status,
            due_back: self.due_back,
            url: self.url(),
            due_back_formatted: self.due_back_formatted(),
            due_back_iso: format_iso_date(Some(self.due_back)),
            book_id: self.book,
            book,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInstanceView {
    pub id: Uuid,
    pub imprint: String,
    pub status: BookInstanceStatus,
    pub due_back: NaiveDate,
    pub url: String,
    pub due_back_formatted: String,
    #[serde(rename = "dueBackYYYYMMDD")]
    pub due_back_iso: String,
    pub book_id: Uuid,
    /// Referenced book, absent when it no longer exists
    pub book: Option<BookSummary>,
}
