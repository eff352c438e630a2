use async_trait::async_trait;
use chrono::NaiveDate;
use signup::{
    controller::{REJECTED_MESSAGE, UNREACHABLE_MESSAGE},
    validation::PASSWORD_TOO_SHORT,
    FailureDetail, FailureKind, Field, FixedClock, RegistrationController, RegistrationDraft,
    RegistrationPayload, RegistrationReceipt, SubmissionState, SubmitOutcome, Transport,
    TransportError, Validator,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

type Reply = Result<RegistrationReceipt, TransportError>;

/// Answers from a fixed script and records every payload it is handed.
#[derive(Default)]
struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<RegistrationPayload>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedTransport {
    fn replying(replies: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Default::default()
        })
    }

    fn gated(reply: Reply, gate: Arc<Notify>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::from([reply])),
            gate: Some(gate),
            ..Default::default()
        })
    }

    fn calls(&self) -> Vec<RegistrationPayload> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn submit(&self, payload: &RegistrationPayload) -> Reply {
        self.calls.lock().unwrap().push(payload.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("transport called more often than scripted")
    }
}

fn created() -> Reply {
    Ok(RegistrationReceipt {
        message: "User registered successfully".into(),
        user_email: "jo@x.com".into(),
    })
}

fn controller(transport: Arc<ScriptedTransport>) -> RegistrationController<Arc<ScriptedTransport>> {
    let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    RegistrationController::new(transport, Validator::new(FixedClock(today)))
}

fn fill_valid<T: Transport>(controller: &RegistrationController<T>) {
    controller.update_field(Field::FullName, "Jo");
    controller.update_field(Field::Email, "jo@x.com");
    controller.update_field(Field::Password, "Abcdefg1");
    controller.update_field(Field::ConfirmPassword, "Abcdefg1");
    controller.update_field(Field::DateOfBirth, "2000-01-01");
}

#[tokio::test]
async fn valid_draft_is_sent_exactly_once() {
    let transport = ScriptedTransport::replying([created()]);
    let controller = controller(transport.clone());
    fill_valid(&controller);

    let outcome = controller.submit().await;

    assert!(matches!(outcome, SubmitOutcome::Succeeded(_)));
    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    let body = serde_json::to_value(&calls[0]).unwrap();
    assert_eq!(body["dateOfBirth"], "2000-01-01");
    assert_eq!(body["fullName"], "Jo");
    assert!(body.get("confirmPassword").is_none());
}

#[tokio::test]
async fn invalid_draft_never_reaches_transport() {
    let transport = ScriptedTransport::replying([]);
    let controller = controller(transport.clone());
    fill_valid(&controller);
    controller.update_field(Field::Password, "short");
    controller.update_field(Field::ConfirmPassword, "short");

    let outcome = controller.submit().await;

    let SubmitOutcome::Invalid(errors) = outcome else {
        panic!("expected invalid outcome");
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.get(Field::Password), Some(PASSWORD_TOO_SHORT));
    assert_eq!(controller.errors(), errors);
    assert_eq!(controller.state(), SubmissionState::Idle);
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn rejection_detail_is_surfaced_and_draft_kept() {
    let transport = ScriptedTransport::replying([Err(TransportError::Rejected {
        status: 409,
        detail: Some("Email already registered".into()),
    })]);
    let controller = controller(transport);
    fill_valid(&controller);
    let before = controller.draft();

    let outcome = controller.submit().await;

    let expected = FailureDetail::rejected("Email already registered");
    assert_eq!(outcome, SubmitOutcome::Failed(expected.clone()));
    assert_eq!(controller.state(), SubmissionState::Failed(expected));
    assert_eq!(controller.draft(), before);
}

#[tokio::test]
async fn rejection_without_detail_uses_generic_message() {
    let transport = ScriptedTransport::replying([Err(TransportError::Rejected {
        status: 500,
        detail: None,
    })]);
    let controller = controller(transport);
    fill_valid(&controller);

    let outcome = controller.submit().await;

    assert_eq!(
        outcome,
        SubmitOutcome::Failed(FailureDetail::rejected(REJECTED_MESSAGE))
    );
}

#[tokio::test]
async fn network_failure_is_distinguished_from_rejection() {
    let transport = ScriptedTransport::replying([
        Err(TransportError::Unreachable("connection refused".into())),
        Err(TransportError::MalformedResponse("expected value".into())),
    ]);
    let controller = controller(transport);
    fill_valid(&controller);

    for _ in 0..2 {
        let SubmitOutcome::Failed(detail) = controller.submit().await else {
            panic!("expected failure");
        };
        assert_eq!(detail.kind, FailureKind::Unreachable);
        assert_eq!(detail.message, UNREACHABLE_MESSAGE);
        assert_ne!(detail.message, REJECTED_MESSAGE);
    }
}

#[tokio::test]
async fn success_resets_the_draft() {
    let transport = ScriptedTransport::replying([created()]);
    let controller = controller(transport);
    fill_valid(&controller);

    controller.submit().await;

    assert_eq!(controller.state(), SubmissionState::Succeeded);
    assert_eq!(controller.draft(), RegistrationDraft::default());
    assert!(controller.errors().is_empty());
}

#[tokio::test]
async fn retry_after_failure_sends_again() {
    let transport = ScriptedTransport::replying([
        Err(TransportError::Unreachable("timed out".into())),
        created(),
    ]);
    let controller = controller(transport.clone());
    fill_valid(&controller);

    assert!(matches!(controller.submit().await, SubmitOutcome::Failed(_)));
    assert!(matches!(controller.submit().await, SubmitOutcome::Succeeded(_)));
    assert_eq!(transport.calls().len(), 2);
}

#[tokio::test]
async fn editing_clears_only_that_field() {
    let transport = ScriptedTransport::replying([]);
    let controller = controller(transport);

    controller.submit().await;
    let errors = controller.errors();
    assert!(errors.contains(Field::FullName));
    assert!(errors.contains(Field::Email));

    controller.update_field(Field::FullName, "J");

    let after = controller.errors();
    assert!(!after.contains(Field::FullName));
    assert_eq!(after.get(Field::Email), errors.get(Field::Email));
    assert_eq!(after.get(Field::Password), errors.get(Field::Password));
    assert_eq!(after.get(Field::DateOfBirth), errors.get(Field::DateOfBirth));
}

#[tokio::test]
async fn editing_returns_finished_attempt_to_idle() {
    let transport = ScriptedTransport::replying([Err(TransportError::Rejected {
        status: 409,
        detail: Some("Email already registered".into()),
    })]);
    let controller = controller(transport);
    fill_valid(&controller);

    controller.submit().await;
    assert!(matches!(controller.state(), SubmissionState::Failed(_)));

    controller.update_field(Field::Email, "jo2@x.com");
    assert_eq!(controller.state(), SubmissionState::Idle);
}

#[tokio::test]
async fn typed_date_setter_feeds_payload() {
    let transport = ScriptedTransport::replying([created()]);
    let controller = controller(transport.clone());
    fill_valid(&controller);
    controller.set_date_of_birth(NaiveDate::from_ymd_opt(1990, 5, 17).unwrap());

    controller.submit().await;

    let calls = transport.calls();
    assert_eq!(
        calls[0].date_of_birth,
        NaiveDate::from_ymd_opt(1990, 5, 17).unwrap()
    );
}

#[tokio::test]
async fn second_submit_while_in_flight_is_ignored() {
    let gate = Arc::new(Notify::new());
    let transport = ScriptedTransport::gated(created(), gate.clone());
    let controller = controller(transport.clone());
    fill_valid(&controller);
    let mut state = controller.watch_state();

    let (first, second) = tokio::join!(controller.submit(), async {
        state
            .wait_for(SubmissionState::is_submitting)
            .await
            .expect("state channel should stay open");
        let second = controller.submit().await;
        gate.notify_one();
        second
    });

    assert!(matches!(first, SubmitOutcome::Succeeded(_)));
    assert_eq!(second, SubmitOutcome::AlreadySubmitting);
    assert_eq!(transport.calls().len(), 1);
    assert_eq!(controller.state(), SubmissionState::Succeeded);
}

#[tokio::test]
async fn observers_see_state_transitions() {
    let transport = ScriptedTransport::replying([created()]);
    let controller = controller(transport);
    let mut state = controller.watch_state();
    let mut draft = controller.watch_draft();
    fill_valid(&controller);
    assert!(draft.has_changed().unwrap());
    draft.borrow_and_update();

    controller.submit().await;

    assert!(state.has_changed().unwrap());
    assert_eq!(*state.borrow_and_update(), SubmissionState::Succeeded);
    assert!(draft.has_changed().unwrap());
    assert_eq!(*draft.borrow_and_update(), RegistrationDraft::default());
}

#[tokio::test]
async fn dropped_submit_releases_the_controller() {
    let gate = Arc::new(Notify::new());
    let transport = ScriptedTransport::gated(created(), gate.clone());
    let controller = controller(transport.clone());
    fill_valid(&controller);

    let abandoned =
        tokio::time::timeout(std::time::Duration::from_millis(50), controller.submit()).await;
    assert!(abandoned.is_err());
    assert_eq!(controller.state(), SubmissionState::Idle);

    gate.notify_one();
    let retried = controller.submit().await;

    assert!(matches!(retried, SubmitOutcome::Succeeded(_)));
    assert_eq!(transport.calls().len(), 2);
}

#[tokio::test]
async fn edits_while_in_flight_keep_state_and_are_reset_on_success() {
    let gate = Arc::new(Notify::new());
    let transport = ScriptedTransport::gated(created(), gate.clone());
    let controller = controller(transport.clone());
    fill_valid(&controller);
    let mut state = controller.watch_state();

    let (outcome, ()) = tokio::join!(controller.submit(), async {
        state
            .wait_for(SubmissionState::is_submitting)
            .await
            .expect("state channel should stay open");

        controller.update_field(Field::Email, "not-an-email");

        assert_eq!(controller.state(), SubmissionState::Submitting);
        assert!(!controller.errors().contains(Field::Email));
        assert_eq!(controller.draft().email, "not-an-email");
        gate.notify_one();
    });

    assert!(matches!(outcome, SubmitOutcome::Succeeded(_)));
    assert_eq!(transport.calls()[0].email, "jo@x.com");
    assert_eq!(controller.draft(), RegistrationDraft::default());
    assert_eq!(controller.state(), SubmissionState::Succeeded);
}
