//! Catalog entities and their derived attributes

pub mod author;
pub mod book;
pub mod book_instance;
pub mod enums;
pub mod genre;

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

pub use author::{Author, AuthorDraft};
pub use book::{Book, BookDraft};
pub use book_instance::{BookInstance, BookInstanceDraft};
pub use enums::BookInstanceStatus;
pub use genre::{Genre, GenreDraft};

/// Path prefix shared by every catalog URL
pub const CATALOG_ROOT: &str = "/catalog";

/// A persisted catalog record.
///
/// Records are stored as JSON documents in the collection named by
/// [`Entity::COLLECTION`]; the serialized field names are the ones store
/// filters and sort keys refer to.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;

    /// Validated field values, without an id
    type Draft: Send + 'static;

    fn id(&self) -> Uuid;

    /// Bind a draft to an id, either freshly minted or an existing one
    fn from_draft(id: Uuid, draft: Self::Draft) -> Self;

    /// Canonical detail page URL
    fn url(&self) -> String;
}

/// Medium date format, e.g. "Jan 5, 1990"; empty when absent
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_default()
}

/// ISO date for form prefill; empty when absent
pub fn format_iso_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}
