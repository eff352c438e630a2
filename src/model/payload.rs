use chrono::NaiveDate;
use derive_masked::DebugMasked;
use serde::{Deserialize, Serialize};

use crate::model::RegistrationDraft;

/// Request body sent to the registration endpoint.
///
/// Text fields are passed through untrimmed; the date serializes as `YYYY-MM-DD`.
#[derive(Serialize, Deserialize, DebugMasked, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationPayload {
    pub full_name: String,
    pub email: String,
    #[masked]
    pub password: String,
    pub date_of_birth: NaiveDate,
}

impl RegistrationPayload {
    pub fn new(draft: &RegistrationDraft, date_of_birth: NaiveDate) -> Self {
        Self {
            full_name: draft.full_name.clone(),
            email: draft.email.clone(),
            password: draft.password.clone(),
            date_of_birth,
        }
    }
}

/// Body of a successful registration response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationReceipt {
    pub message: String,
    pub user_email: String,
}
