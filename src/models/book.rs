//! Book model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{author::AuthorView, genre::GenreView, Entity, CATALOG_ROOT};

/// Stored book record; `author` and `genre` hold ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: Uuid,
    pub summary: String,
    pub isbn: String,
    #[serde(default)]
    pub genre: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookDraft {
    pub title: String,
    pub author: Uuid,
    pub summary: String,
    pub isbn: String,
    pub genre: Vec<Uuid>,
}

impl Entity for Book {
    const COLLECTION: &'static str = "books";
    type Draft = BookDraft;

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_draft(id: Uuid, draft: BookDraft) -> Self {
        Self {
            id,
            title: draft.title,
            author: draft.author,
            summary: draft.summary,
            isbn: draft.isbn,
            genre: draft.genre,
        }
    }

    fn url(&self) -> String {
        format!("{}/book/{}", CATALOG_ROOT, self.id)
    }
}

impl Book {
    /// Title-and-summary projection used on author and genre pages
    pub fn summary_view(&self) -> BookSummary {
        BookSummary {
            id: self.id,
            title: self.title.clone(),
            summary: self.summary.clone(),
            url: self.url(),
        }
    }

    /// Book with its references resolved; unresolved ones render as absent
    pub fn view(&self, author: Option<AuthorView>, genre: Vec<GenreView>) -> BookView {
        BookView {
            id: self.id,
            title: self.title.clone(),
            summary: self.summary.clone(),
            isbn: self.isbn.clone(),
            url: self.url(),
            author,
            genre,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookSummary {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookView {
    pub id: Uuid,
    pub title: String,
    pub summary: String,
    pub isbn: String,
    pub url: String,
    pub author: Option<AuthorView>,
    pub genre: Vec<GenreView>,
}
