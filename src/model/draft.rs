use chrono::NaiveDate;
use derive_masked::DebugMasked;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::Field;
use crate::validation::{validate_email, validate_full_name, validate_password};

/// Wire and storage format for dates of birth.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The in-progress registration form values.
///
/// The date of birth is held as an ISO `YYYY-MM-DD` string so text inputs and native date pickers
/// share one representation; an empty string means no date has been chosen yet.
#[derive(Validate, Serialize, Deserialize, DebugMasked, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationDraft {
    #[validate(custom(function = "validate_full_name"))]
    pub full_name: String,

    #[validate(custom(function = "validate_email"))]
    pub email: String,

    #[masked]
    #[validate(custom(function = "validate_password"))]
    pub password: String,

    #[masked]
    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,

    pub date_of_birth: String,
}

impl RegistrationDraft {
    pub fn get(&self, field: Field) -> &str {
        use Field::*;

        match field {
            FullName => &self.full_name,
            Email => &self.email,
            Password => &self.password,
            ConfirmPassword => &self.confirm_password,
            DateOfBirth => &self.date_of_birth,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        use Field::*;

        let slot = match field {
            FullName => &mut self.full_name,
            Email => &mut self.email,
            Password => &mut self.password,
            ConfirmPassword => &mut self.confirm_password,
            DateOfBirth => &mut self.date_of_birth,
        };
        *slot = value;
    }

    pub fn set_date_of_birth(&mut self, date: NaiveDate) {
        self.date_of_birth = date.format(DATE_FORMAT).to_string();
    }

    /// `Ok(None)` when no date has been entered.
    pub fn parsed_date_of_birth(&self) -> Result<Option<NaiveDate>, chrono::ParseError> {
        let raw = self.date_of_birth.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        NaiveDate::parse_from_str(raw, DATE_FORMAT).map(Some)
    }
}
