//! Submission orchestration
//!
//! A submission goes idle → in progress → success | failure. Only one attempt
//! may be in flight; the dispatch itself runs detached from the orchestrator
//! so the form stays editable while the relay call is pending.

use crate::relay::{EmailRelay, RelayError, RelayMessage};
use crate::state::forms::ValidForm;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Shown to the user whenever an attempt fails, whatever the cause
pub const FAILURE_NOTICE: &str =
    "Something went wrong while sending your application. Please try again.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("A submission is already in progress")]
    AlreadyInProgress,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionOutcome {
    #[default]
    None,
    Success,
    /// Reason as reported by the relay
    Failure(String),
}

#[derive(Debug, Clone, Default)]
pub struct SubmissionState {
    pub in_progress: bool,
    pub outcome: SubmissionOutcome,
    /// Id of the current or most recent attempt
    pub attempt: Option<Uuid>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// Where submissions are delivered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayTarget {
    pub service_id: String,
    pub template_id: String,
}

/// Result of one dispatched attempt
#[derive(Debug)]
pub struct SubmissionReport {
    pub attempt: Uuid,
    pub result: Result<(), RelayError>,
}

/// An attempt that has been started but not yet sent
pub struct PendingSubmission {
    attempt: Uuid,
    relay: Arc<dyn EmailRelay>,
    message: RelayMessage,
}

impl PendingSubmission {
    pub fn attempt(&self) -> Uuid {
        self.attempt
    }

    /// Make the single relay call for this attempt
    pub async fn dispatch(self) -> SubmissionReport {
        debug!("Dispatching submission {}", self.attempt);
        let result = self.relay.send(&self.message).await;
        SubmissionReport {
            attempt: self.attempt,
            result,
        }
    }
}

pub struct SubmissionOrchestrator {
    relay: Arc<dyn EmailRelay>,
    target: RelayTarget,
    state: SubmissionState,
}

impl SubmissionOrchestrator {
    pub fn new(relay: Arc<dyn EmailRelay>, target: RelayTarget) -> Self {
        Self {
            relay,
            target,
            state: SubmissionState::default(),
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn in_progress(&self) -> bool {
        self.state.in_progress
    }

    /// Start an attempt, unless one is already in flight
    pub fn begin(&mut self, form: &ValidForm) -> Result<PendingSubmission, SubmitError> {
        if self.state.in_progress {
            return Err(SubmitError::AlreadyInProgress);
        }

        let attempt = Uuid::new_v4();
        self.state.in_progress = true;
        self.state.attempt = Some(attempt);
        info!("Submission {attempt} started");

        Ok(PendingSubmission {
            attempt,
            relay: Arc::clone(&self.relay),
            message: RelayMessage {
                service_id: self.target.service_id.clone(),
                template_id: self.target.template_id.clone(),
                template_params: form.values().template_params(),
            },
        })
    }

    /// Record the result of a dispatched attempt
    pub fn complete(&mut self, report: SubmissionReport) -> &SubmissionOutcome {
        if !self.state.in_progress || self.state.attempt != Some(report.attempt) {
            warn!("Ignoring result of stale submission {}", report.attempt);
            return &self.state.outcome;
        }

        self.state.outcome = match report.result {
            Ok(()) => {
                info!("Submission {} delivered", report.attempt);
                SubmissionOutcome::Success
            }
            Err(e) => {
                warn!("Submission {} failed: {e}", report.attempt);
                SubmissionOutcome::Failure(e.to_string())
            }
        };
        self.state.in_progress = false;
        self.state.finished_at = Some(Utc::now());
        &self.state.outcome
    }

    /// Begin, dispatch and complete in one call
    pub async fn submit(&mut self, form: &ValidForm) -> Result<&SubmissionOutcome, SubmitError> {
        let pending = self.begin(form)?;
        let report = pending.dispatch().await;
        Ok(self.complete(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::MockEmailRelay;
    use crate::state::forms::{FormSchema, FormStore, ValidationResult};
    use pretty_assertions::assert_eq;

    fn target() -> RelayTarget {
        RelayTarget {
            service_id: "service_h6lo7jb".to_string(),
            template_id: "template_voccwdi".to_string(),
        }
    }

    fn valid_form() -> ValidForm {
        let mut store = FormStore::new(FormSchema::profile());
        for (name, value) in [
            ("firstName", "John"),
            ("lastName", "Doe"),
            ("email", "john@x.com"),
            ("skills", "writing"),
            ("experience", "none"),
        ] {
            store.set_value(name, value.into()).unwrap();
        }
        match store.validate() {
            ValidationResult::Valid(form) => form,
            ValidationResult::Invalid(errors) => panic!("fixture invalid: {errors:?}"),
        }
    }

    fn orchestrator(relay: MockEmailRelay) -> SubmissionOrchestrator {
        SubmissionOrchestrator::new(Arc::new(relay), target())
    }

    #[tokio::test]
    async fn test_successful_submission() {
        let mut relay = MockEmailRelay::new();
        relay
            .expect_send()
            .withf(|message| {
                message.service_id == "service_h6lo7jb"
                    && message.template_params.get("email").map(String::as_str)
                        == Some("john@x.com")
            })
            .times(1)
            .returning(|_| Ok(()));

        let mut orchestrator = orchestrator(relay);
        let outcome = orchestrator.submit(&valid_form()).await.unwrap();
        assert_eq!(outcome, &SubmissionOutcome::Success);

        let state = orchestrator.state();
        assert!(!state.in_progress);
        assert!(state.finished_at.is_some());
    }

    #[tokio::test]
    async fn test_failed_submission_keeps_reason() {
        let mut relay = MockEmailRelay::new();
        relay.expect_send().times(1).returning(|_| {
            Err(RelayError::Rejected {
                status: 400,
                body: "The Public Key is invalid".to_string(),
            })
        });

        let mut orchestrator = orchestrator(relay);
        let outcome = orchestrator.submit(&valid_form()).await.unwrap().clone();
        match outcome {
            SubmissionOutcome::Failure(reason) => {
                assert!(reason.contains("The Public Key is invalid"))
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(!orchestrator.in_progress());
    }

    #[tokio::test]
    async fn test_missing_key_is_a_failed_submission() {
        let mut relay = MockEmailRelay::new();
        relay
            .expect_send()
            .times(1)
            .returning(|_| Err(RelayError::MissingPublicKey));

        let mut orchestrator = orchestrator(relay);
        let outcome = orchestrator.submit(&valid_form()).await.unwrap();
        assert!(matches!(outcome, SubmissionOutcome::Failure(_)));
    }

    #[test]
    fn test_second_begin_rejected_while_in_progress() {
        let mut relay = MockEmailRelay::new();
        relay.expect_send().never();

        let mut orchestrator = orchestrator(relay);
        let form = valid_form();
        let _pending = orchestrator.begin(&form).unwrap();
        assert!(orchestrator.in_progress());

        let err = orchestrator.begin(&form).err();
        assert_eq!(err, Some(SubmitError::AlreadyInProgress));
    }

    #[tokio::test]
    async fn test_resubmission_after_failure() {
        let mut relay = MockEmailRelay::new();
        let mut seq = mockall::Sequence::new();
        relay
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(RelayError::MissingPublicKey));
        relay
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let mut orchestrator = orchestrator(relay);
        let form = valid_form();
        orchestrator.submit(&form).await.unwrap();
        let first = orchestrator.state().attempt;

        let outcome = orchestrator.submit(&form).await.unwrap();
        assert_eq!(outcome, &SubmissionOutcome::Success);
        assert_ne!(orchestrator.state().attempt, first);
    }

    #[tokio::test]
    async fn test_stale_report_is_ignored() {
        let mut relay = MockEmailRelay::new();
        relay.expect_send().never();

        let mut orchestrator = orchestrator(relay);
        let pending = orchestrator.begin(&valid_form()).unwrap();
        let outcome = orchestrator.complete(SubmissionReport {
            attempt: Uuid::new_v4(),
            result: Ok(()),
        });
        assert_eq!(outcome, &SubmissionOutcome::None);
        assert!(orchestrator.in_progress());
        drop(pending);
    }

    #[tokio::test]
    async fn test_pending_dispatch_runs_detached() {
        let mut relay = MockEmailRelay::new();
        relay.expect_send().times(1).returning(|_| Ok(()));

        let mut orchestrator = orchestrator(relay);
        let pending = orchestrator.begin(&valid_form()).unwrap();
        let attempt = pending.attempt();

        let report = tokio::spawn(pending.dispatch()).await.unwrap();
        assert_eq!(report.attempt, attempt);

        orchestrator.complete(report);
        assert_eq!(orchestrator.state().outcome, SubmissionOutcome::Success);
    }
}
