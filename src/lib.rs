//! Validation and submission core of the new-user registration form.
//!
//! A surface (web, mobile, terminal) owns one [`RegistrationController`], feeds it field edits and
//! calls [`RegistrationController::submit`]. The controller validates the draft, hands a normalized
//! payload to a [`Transport`] and publishes draft, field errors and submission state for binding.

pub mod config;
pub mod controller;
mod error;
pub mod model;
pub mod transport;
pub mod validation;

pub use {
    config::{Config, Platform},
    controller::{RegistrationController, SubmitOutcome},
    error::SignupError,
    model::{
        FailureDetail, FailureKind, Field, FieldErrors, RegistrationDraft, RegistrationPayload,
        RegistrationReceipt, SubmissionState,
    },
    transport::{HttpTransport, Transport, TransportError},
    validation::{Clock, FixedClock, SystemClock, Validator},
};
