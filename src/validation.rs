use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use tracing::debug;
use validator::{Validate, ValidationError, ValidationErrorsKind};

use crate::model::{Field, FieldErrors, RegistrationDraft, RegistrationPayload};

pub const MINIMUM_AGE: i32 = 18;
pub const MINIMUM_NAME_LENGTH: usize = 2;
pub const MINIMUM_PASSWORD_LENGTH: usize = 8;

pub const FULL_NAME_REQUIRED: &str = "Full Name is required";
pub const FULL_NAME_TOO_SHORT: &str = "Full Name must be at least 2 characters";
pub const EMAIL_REQUIRED: &str = "Email is required";
pub const EMAIL_INVALID: &str = "Please enter a valid email address";
pub const PASSWORD_REQUIRED: &str = "Password is required";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 8 characters";
pub const PASSWORD_TOO_WEAK: &str =
    "Password must contain at least 1 uppercase, 1 lowercase, and 1 number";
pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";
pub const DATE_OF_BIRTH_REQUIRED: &str = "Date of Birth is required";
pub const DATE_OF_BIRTH_INVALID: &str = "Please enter a valid date (YYYY-MM-DD)";
pub const UNDERAGE: &str = "You must be at least 18 years old to register";

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern should compile")
});

/// Source of "today" for the age rule.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Decides whether a draft may be submitted.
///
/// Every field is checked on each pass so all problems can be shown at once. Each field carries
/// at most one message: the first rule it violates.
pub struct Validator {
    clock: Box<dyn Clock>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::system()
    }
}

impl Validator {
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
        }
    }

    pub fn system() -> Self {
        Self::new(SystemClock)
    }

    pub fn validate(&self, draft: &RegistrationDraft) -> FieldErrors {
        let mut errors = FieldErrors::default();

        if let Err(report) = draft.validate() {
            for (name, kind) in report.into_errors() {
                let ValidationErrorsKind::Field(failures) = kind else {
                    continue;
                };
                let Ok(field) = name.parse::<Field>() else {
                    debug!("ignoring validation result for unknown field {name}");
                    continue;
                };
                if let Some(failure) = failures.first() {
                    errors.insert(field, message(failure));
                }
            }
        }

        if let Some(message) = self.date_of_birth_error(draft) {
            errors.insert(Field::DateOfBirth, message);
        }

        errors
    }

    /// Validate and, when clean, build the normalized request body.
    pub fn check(&self, draft: &RegistrationDraft) -> Result<RegistrationPayload, FieldErrors> {
        let errors = self.validate(draft);
        if !errors.is_empty() {
            return Err(errors);
        }

        match draft.parsed_date_of_birth() {
            Ok(Some(date_of_birth)) => Ok(RegistrationPayload::new(draft, date_of_birth)),
            _ => Err(FieldErrors::from([(Field::DateOfBirth, DATE_OF_BIRTH_INVALID)])),
        }
    }

    fn date_of_birth_error(&self, draft: &RegistrationDraft) -> Option<&'static str> {
        match draft.parsed_date_of_birth() {
            Ok(None) => Some(DATE_OF_BIRTH_REQUIRED),
            Err(_) => Some(DATE_OF_BIRTH_INVALID),
            Ok(Some(birth)) => (age_on(birth, self.clock.today()) < MINIMUM_AGE).then_some(UNDERAGE),
        }
    }
}

/// Whole years between `birth` and `today`, one less while this year's birthday is still ahead.
/// Negative for dates in the future.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

pub fn validate_full_name(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(rule("required", FULL_NAME_REQUIRED));
    }
    if trimmed.chars().count() < MINIMUM_NAME_LENGTH {
        return Err(rule("length", FULL_NAME_TOO_SHORT));
    }
    Ok(())
}

pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(rule("required", EMAIL_REQUIRED));
    }
    if !EMAIL_SHAPE.is_match(value) {
        return Err(rule("email", EMAIL_INVALID));
    }
    Ok(())
}

pub fn validate_password(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(rule("required", PASSWORD_REQUIRED));
    }
    if value.chars().count() < MINIMUM_PASSWORD_LENGTH {
        return Err(rule("length", PASSWORD_TOO_SHORT));
    }

    let has_upper = value.chars().any(|c| c.is_ascii_uppercase());
    let has_lower = value.chars().any(|c| c.is_ascii_lowercase());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    if !(has_upper && has_lower && has_digit) {
        return Err(rule("complexity", PASSWORD_TOO_WEAK));
    }
    Ok(())
}

fn rule(code: &'static str, text: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(text));
    error
}

fn message(error: &ValidationError) -> String {
    error
        .message
        .as_deref()
        .map(str::to_owned)
        .unwrap_or_else(|| error.code.to_string())
}
