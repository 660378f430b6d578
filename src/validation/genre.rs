//! Genre form rules

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{collect_errors, escape, trim, Validated};
use crate::models::genre::GenreDraft;

/// Submitted genre form (`name`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct GenreForm {
    #[validate(length(min = 3, message = "Genre name must contain at least 3 characters"))]
    pub name: String,
}

impl GenreForm {
    pub fn validate_draft(mut self) -> Validated<GenreDraft, GenreForm> {
        trim(&mut self.name);
        let result = self.validate();
        self.name = escape(&self.name);

        match result {
            Ok(()) => Validated::Valid(GenreDraft { name: self.name }),
            Err(errors) => {
                let errors = collect_errors(&errors, &[("name", "name")]);
                Validated::Invalid { form: self, errors }
            }
        }
    }
}
