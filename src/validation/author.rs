//! Author form rules

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use super::{check_optional_date, collect_errors, escape, is_alphanumeric, optional_date, rule, trim, Validated};
use crate::models::author::AuthorDraft;

const MAX_NAME_LENGTH: usize = 100;

// Names are ASCII letters and digits only, checked after escaping
fn first_name_chars(value: &str) -> Result<(), ValidationError> {
    name_rule(value, "First name", "First name has non-alphanumeric characters")
}

fn family_name_chars(value: &str) -> Result<(), ValidationError> {
    name_rule(value, "Family name", "Family name contains non-alphanumeric characters")
}

fn name_rule(value: &str, label: &str, message: &'static str) -> Result<(), ValidationError> {
    if value.chars().count() > MAX_NAME_LENGTH {
        let mut err = rule("length", "");
        err.message = Some(format!("{} must not exceed {} characters.", label, MAX_NAME_LENGTH).into());
        return Err(err);
    }
    if is_alphanumeric(&escape(value)) {
        Ok(())
    } else {
        Err(rule("alphanumeric", message))
    }
}

fn date_of_birth(value: &str) -> Result<(), ValidationError> {
    check_optional_date(value, "Invalid date of birth")
}

fn date_of_death(value: &str) -> Result<(), ValidationError> {
    check_optional_date(value, "Invalid date of death")
}

/// Submitted author form (`firstName`, `familyName`, `dateOfBirth`, `dateOfDeath`)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthorForm {
    #[validate(
        length(min = 1, message = "First name must be specified."),
        custom(function = "first_name_chars")
    )]
    pub first_name: String,
    #[validate(
        length(min = 1, message = "Family name must be specified."),
        custom(function = "family_name_chars")
    )]
    pub family_name: String,
    #[validate(custom(function = "date_of_birth"))]
    pub date_of_birth: String,
    #[validate(custom(function = "date_of_death"))]
    pub date_of_death: String,
}

const FIELDS: &[(&str, &str)] = &[
    ("first_name", "firstName"),
    ("family_name", "familyName"),
    ("date_of_birth", "dateOfBirth"),
    ("date_of_death", "dateOfDeath"),
];

impl AuthorForm {
    /// Run the author rules and produce a draft or the errors
    pub fn validate_draft(mut self) -> Validated<AuthorDraft, AuthorForm> {
        trim(&mut self.first_name);
        trim(&mut self.family_name);
        trim(&mut self.date_of_birth);
        trim(&mut self.date_of_death);

        let result = self.validate();
        self.first_name = escape(&self.first_name);
        self.family_name = escape(&self.family_name);

        match result {
            Ok(()) => Validated::Valid(AuthorDraft {
                date_of_birth: optional_date(&self.date_of_birth),
                date_of_death: optional_date(&self.date_of_death),
                first_name: self.first_name,
                family_name: self.family_name,
            }),
            Err(errors) => {
                let errors = collect_errors(&errors, FIELDS);
                Validated::Invalid { form: self, errors }
            }
        }
    }
}
