//! Genre model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Entity, CATALOG_ROOT};

/// Stored genre record. Names are unique ignoring case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenreDraft {
    pub name: String,
}

impl Entity for Genre {
    const COLLECTION: &'static str = "genres";
    type Draft = GenreDraft;

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_draft(id: Uuid, draft: GenreDraft) -> Self {
        Self { id, name: draft.name }
    }

    fn url(&self) -> String {
        format!("{}/genre/{}", CATALOG_ROOT, self.id)
    }
}

impl Genre {
    pub fn view(&self) -> GenreView {
        GenreView {
            id: self.id,
            name: self.name.clone(),
            url: self.url(),
            checked: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenreView {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    /// Set on book forms for genres already selected
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub checked: bool,
}
