//! Author model and derived attributes

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{format_date, format_iso_date, Entity, CATALOG_ROOT};

/// Stored author record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

/// Validated author fields
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorDraft {
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Entity for Author {
    const COLLECTION: &'static str = "authors";
    type Draft = AuthorDraft;

    fn id(&self) -> Uuid {
        self.id
    }

    fn from_draft(id: Uuid, draft: AuthorDraft) -> Self {
        Self {
            id,
            first_name: draft.first_name,
            family_name: draft.family_name,
            date_of_birth: draft.date_of_birth,
            date_of_death: draft.date_of_death,
        }
    }

    fn url(&self) -> String {
        format!("{}/author/{}", CATALOG_ROOT, self.id)
    }
}

impl Author {
    /// "First Family", or empty when either part is missing
    pub fn name(&self) -> String {
        if self.first_name.is_empty() || self.family_name.is_empty() {
            String::new()
        } else {
            format!("{} {}", self.first_name, self.family_name)
        }
    }

    pub fn date_of_birth_formatted(&self) -> String {
        format_date(self.date_of_birth)
    }

    pub fn date_of_death_formatted(&self) -> String {
        format_date(self.date_of_death)
    }

    /// "birth - death" using the formatted dates; empty when neither is known
    pub fn lifespan(&self) -> String {
        if self.date_of_birth.is_none() && self.date_of_death.is_none() {
            return String::new();
        }
        format!(
            "{} - {}",
            self.date_of_birth_formatted(),
            self.date_of_death_formatted()
        )
    }

    pub fn view(&self) -> AuthorView {
        AuthorView {
            id: self.id,
            first_name: self.first_name.clone(),
            family_name: self.family_name.clone(),
            date_of_birth: self.date_of_birth,
            date_of_death: self.date_of_death,
            name: self.name(),
            url: self.url(),
            lifespan: self.lifespan(),
            date_of_birth_formatted: self.date_of_birth_formatted(),
            date_of_death_formatted: self.date_of_death_formatted(),
            date_of_birth_iso: format_iso_date(self.date_of_birth),
            date_of_death_iso: format_iso_date(self.date_of_death),
        }
    }
}

/// Author as handed to views: stored fields plus derived ones
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorView {
    pub id: Uuid,
    pub first_name: String,
    pub family_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    pub name: String,
    pub url: String,
    pub lifespan: String,
    pub date_of_birth_formatted: String,
    pub date_of_death_formatted: String,
    #[serde(rename = "dateOfBirthYYYYMMDD")]
    pub date_of_birth_iso: String,
    #[serde(rename = "dateOfDeathYYYYMMDD")]
    pub date_of_death_iso: String,
}
