use chrono::NaiveDate;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    model::{
        FailureDetail, Field, FieldErrors, RegistrationDraft, RegistrationReceipt, SubmissionState,
    },
    transport::{Transport, TransportError},
    validation::Validator,
};

pub const REJECTED_MESSAGE: &str = "Registration failed. Please try again.";
pub const UNREACHABLE_MESSAGE: &str = "Could not connect to the server. Please try again later.";

/// How a call to [`RegistrationController::submit`] ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The draft failed validation; nothing was sent.
    Invalid(FieldErrors),
    Succeeded(RegistrationReceipt),
    Failed(FailureDetail),
    /// Another submission is still in flight; this call did nothing.
    AlreadySubmitting,
}

/// Owns one registration form: its draft, its field errors and its submission state.
///
/// All three are published through `watch` channels so a surface can bind its widgets to them.
pub struct RegistrationController<T> {
    transport: T,
    validator: Validator,
    draft: watch::Sender<RegistrationDraft>,
    errors: watch::Sender<FieldErrors>,
    state: watch::Sender<SubmissionState>,
}

impl<T: Transport> RegistrationController<T> {
    pub fn new(transport: T, validator: Validator) -> Self {
        let (draft, _) = watch::channel(RegistrationDraft::default());
        let (errors, _) = watch::channel(FieldErrors::default());
        let (state, _) = watch::channel(SubmissionState::Idle);

        Self {
            transport,
            validator,
            draft,
            errors,
            state,
        }
    }

    pub fn draft(&self) -> RegistrationDraft {
        self.draft.borrow().clone()
    }

    pub fn errors(&self) -> FieldErrors {
        self.errors.borrow().clone()
    }

    pub fn state(&self) -> SubmissionState {
        self.state.borrow().clone()
    }

    pub fn watch_draft(&self) -> watch::Receiver<RegistrationDraft> {
        self.draft.subscribe()
    }

    pub fn watch_errors(&self) -> watch::Receiver<FieldErrors> {
        self.errors.subscribe()
    }

    pub fn watch_state(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    /// Overwrite one field. Only that field's error is cleared; the rest of the draft is not
    /// revalidated until the next submit.
    pub fn update_field(&self, field: Field, value: impl Into<String>) {
        let value = value.into();
        self.draft.send_modify(|draft| draft.set(field, value));
        self.after_edit(field);
    }

    /// Typed entry point for native date pickers.
    pub fn set_date_of_birth(&self, date: NaiveDate) {
        self.draft.send_modify(|draft| draft.set_date_of_birth(date));
        self.after_edit(Field::DateOfBirth);
    }

    fn after_edit(&self, field: Field) {
        debug!(%field, "field updated");

        self.errors
            .send_if_modified(|errors| errors.remove(field).is_some());

        // A finished attempt is dismissed by editing; an in-flight one is left alone.
        self.state.send_if_modified(|state| match state {
            SubmissionState::Succeeded | SubmissionState::Failed(_) => {
                *state = SubmissionState::Idle;
                true
            }
            SubmissionState::Idle | SubmissionState::Submitting => false,
        });
    }

    /// Validate the draft and, when it is clean, send it. At most one transport call is in flight
    /// per controller; the state is never left at `Submitting` once this returns.
    pub async fn submit(&self) -> SubmitOutcome {
        let checked = self.validator.check(&self.draft());

        let mut busy = false;
        self.state.send_if_modified(|state| {
            if state.is_submitting() {
                busy = true;
                return false;
            }

            let next = if checked.is_ok() {
                SubmissionState::Submitting
            } else {
                SubmissionState::Idle
            };
            if *state == next {
                false
            } else {
                *state = next;
                true
            }
        });

        if busy {
            debug!("submission already in flight, ignoring submit");
            return SubmitOutcome::AlreadySubmitting;
        }

        let payload = match checked {
            Ok(payload) => payload,
            Err(errors) => {
                debug!(fields = errors.len(), "draft failed validation");
                self.errors.send_replace(errors.clone());
                return SubmitOutcome::Invalid(errors);
            }
        };

        self.clear_errors();
        info!(email = %payload.email, "submitting registration");

        let in_flight = InFlight {
            state: &self.state,
        };
        let result = self.transport.submit(&payload).await;
        std::mem::forget(in_flight);

        match result {
            Ok(receipt) => {
                info!(email = %receipt.user_email, "registration succeeded");
                self.draft.send_replace(RegistrationDraft::default());
                self.clear_errors();
                self.state.send_replace(SubmissionState::Succeeded);

                SubmitOutcome::Succeeded(receipt)
            }
            Err(error) => {
                warn!("registration failed: {error}");
                let detail = failure_detail(&error);
                self.state.send_replace(SubmissionState::Failed(detail.clone()));

                SubmitOutcome::Failed(detail)
            }
        }
    }

    fn clear_errors(&self) {
        self.errors.send_if_modified(|errors| {
            if errors.is_empty() {
                return false;
            }
            errors.clear();
            true
        });
    }
}

/// Returns the state to `Idle` if a `submit` future is dropped while its transport call is
/// pending, so the controller accepts the next submit.
struct InFlight<'a> {
    state: &'a watch::Sender<SubmissionState>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let abandoned = self.state.send_if_modified(|state| {
            if !state.is_submitting() {
                return false;
            }
            *state = SubmissionState::Idle;
            true
        });
        if abandoned {
            warn!("submission dropped before the transport answered");
        }
    }
}

/// Server supplied detail when there is one, otherwise a generic message that still tells a
/// refusal apart from an unreachable server.
pub fn failure_detail(error: &TransportError) -> FailureDetail {
    match error {
        TransportError::Rejected {
            detail: Some(detail),
            ..
        } => FailureDetail::rejected(detail.clone()),
        TransportError::Rejected { detail: None, .. } => FailureDetail::rejected(REJECTED_MESSAGE),
        TransportError::Unreachable(_) | TransportError::MalformedResponse(_) => {
            FailureDetail::unreachable(UNREACHABLE_MESSAGE)
        }
    }
}
