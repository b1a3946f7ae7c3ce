//! End-to-end intake conversation tests
//!
//! Drive the coordinator through full conversations with in-memory
//! service doubles and check the stage machine, the record contents and
//! the applicant-facing replies at each step.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use loan_agent_agent::{IntakeCoordinator, IntakeStage, SessionState};
use loan_agent_config::DialogueSettings;
use loan_agent_core::{
    ApplicationField, ApplicationRecord, EmailReceipt, EmailSender, FieldValue, PredictionResult,
    RecommendationService, ResponseGenerator, RiskLevel, ScoringService, ServiceError,
    ValidatedApplication, NIGERIAN_STATES,
};
use loan_agent_extraction::{FieldExtractor, LexiconRecognizer};

struct RecordingResponder {
    last_input: Mutex<Option<String>>,
}

impl RecordingResponder {
    fn new() -> Self {
        Self {
            last_input: Mutex::new(None),
        }
    }
}

#[async_trait]
impl ResponseGenerator for RecordingResponder {
    async fn reply(&self, augmented_text: &str) -> Result<String, ServiceError> {
        *self.last_input.lock().unwrap() = Some(augmented_text.to_string());
        Ok("Noted, thank you.".to_string())
    }
}

struct FixedScorer {
    score: u8,
}

#[async_trait]
impl ScoringService for FixedScorer {
    async fn predict(
        &self,
        _application: &ValidatedApplication,
    ) -> Result<PredictionResult, ServiceError> {
        Ok(PredictionResult {
            score: Some(self.score),
            risk_level: Some(RiskLevel::from_score(self.score)),
            summary: format!("Repayment probability score: {}/99", self.score),
        })
    }
}

/// Fails on the first call, succeeds afterwards
struct FlakyScorer {
    failed_once: AtomicBool,
}

#[async_trait]
impl ScoringService for FlakyScorer {
    async fn predict(
        &self,
        _application: &ValidatedApplication,
    ) -> Result<PredictionResult, ServiceError> {
        if !self.failed_once.swap(true, Ordering::SeqCst) {
            return Err(ServiceError::Timeout(30));
        }
        Ok(PredictionResult {
            score: Some(55),
            risk_level: Some(RiskLevel::Medium),
            summary: "Repayment probability score: 55/99".to_string(),
        })
    }
}

struct FixedRecommender;

#[async_trait]
impl RecommendationService for FixedRecommender {
    async fn recommend(
        &self,
        _record: &ApplicationRecord,
        _prediction: &PredictionResult,
    ) -> Result<String, ServiceError> {
        Ok("We are pleased to approve your loan application.".to_string())
    }
}

struct RecordingMailer {
    sent: Mutex<Vec<(String, String, String)>>,
    fail_with_receipt: bool,
}

impl RecordingMailer {
    fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with_receipt: false,
        }
    }

    fn rejecting() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with_receipt: true,
        }
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<EmailReceipt, ServiceError> {
        if self.fail_with_receipt {
            return Ok(EmailReceipt::error("mailbox unavailable"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(EmailReceipt::success(format!("delivered to {to}")))
    }
}

fn extractor() -> FieldExtractor {
    FieldExtractor::new(Arc::new(LexiconRecognizer::new(
        NIGERIAN_STATES.iter().map(|s| s.to_string()).collect(),
    )))
}

fn coordinator_with(
    responder: Arc<RecordingResponder>,
    scoring: Arc<dyn ScoringService>,
    mailer: Arc<RecordingMailer>,
) -> IntakeCoordinator {
    IntakeCoordinator::new(
        extractor(),
        DialogueSettings::default(),
        "Your Loan Application Decision".to_string(),
        responder,
        scoring,
        Arc::new(FixedRecommender),
        mailer,
    )
}

/// Full happy path: collect, confirm, decide, email, reset
#[tokio::test]
async fn test_full_intake_conversation() {
    let responder = Arc::new(RecordingResponder::new());
    let mailer = Arc::new(RecordingMailer::new());
    let coordinator =
        coordinator_with(responder.clone(), Arc::new(FixedScorer { score: 82 }), mailer.clone());
    let mut state = SessionState::new();

    let reply = coordinator
        .process("I'm 30 years old, male, single, living in Lagos", &mut state)
        .await
        .unwrap();
    assert_eq!(state.stage, IntakeStage::Collecting);
    assert_eq!(state.record.len(), 4);
    assert_eq!(reply, "Noted, thank you.");

    // The responder sees the utterance first, then the state and extractions
    let seen = responder.last_input.lock().unwrap().clone().unwrap();
    assert!(seen.starts_with("I'm 30 years old, male, single, living in Lagos"));
    assert!(seen.contains("[SYSTEM INFO: Current application state]"));
    assert!(seen.contains("[SYSTEM INFO: Newly extracted fields]"));

    let reply = coordinator
        .process("I need 50000 naira for 90 days", &mut state)
        .await
        .unwrap();
    assert_eq!(state.stage, IntakeStage::Confirming);
    assert!(state.record.is_complete());
    assert!(reply.contains("### Complete Application Summary"));
    assert!(reply.contains("confirm to proceed"));

    let reply = coordinator.process("yes, confirm", &mut state).await.unwrap();
    assert_eq!(state.stage, IntakeStage::EmailPending);
    assert!(reply.contains("Repayment probability score: 82/99"));
    assert!(reply.contains("approve your loan"));
    assert!(reply.contains("email address"));

    let reply = coordinator
        .process("sure, it's jane.doe@example.com", &mut state)
        .await
        .unwrap();
    assert!(reply.contains("has been sent to jane.doe@example.com"));

    // Session closed out for the next application
    assert_eq!(state.stage, IntakeStage::Collecting);
    assert!(state.record.is_empty());

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let (to, subject, body) = &sent[0];
    assert_eq!(to, "jane.doe@example.com");
    assert_eq!(subject, "Your Loan Application Decision");
    assert!(body.contains("# Loan Application Decision"));
    assert!(body.contains("₦50000"));
}

/// Saying "modify" at confirmation reopens collection and overwrites
#[tokio::test]
async fn test_modify_flow_overwrites_field() {
    let responder = Arc::new(RecordingResponder::new());
    let mailer = Arc::new(RecordingMailer::new());
    let coordinator =
        coordinator_with(responder, Arc::new(FixedScorer { score: 82 }), mailer);
    let mut state = SessionState::new();

    coordinator
        .process("I'm 30 years old, male, single, living in Lagos", &mut state)
        .await
        .unwrap();
    coordinator
        .process("I need 50000 naira for 90 days", &mut state)
        .await
        .unwrap();
    assert_eq!(state.stage, IntakeStage::Confirming);

    let reply = coordinator.process("no, change it please", &mut state).await.unwrap();
    assert_eq!(state.stage, IntakeStage::Collecting);
    assert!(reply.contains("What information would you like to modify"));

    let reply = coordinator
        .process("make the loan amount 80000 naira", &mut state)
        .await
        .unwrap();
    assert_eq!(state.stage, IntakeStage::Confirming);
    assert_eq!(
        state.record.get(ApplicationField::Amount),
        Some(&FieldValue::Float(80_000.0))
    );
    assert!(reply.contains("80000"));
}

/// An utterance matching neither token set re-asks the question
#[tokio::test]
async fn test_confirmation_reprompt_on_unmatched_utterance() {
    let responder = Arc::new(RecordingResponder::new());
    let mailer = Arc::new(RecordingMailer::new());
    let coordinator =
        coordinator_with(responder, Arc::new(FixedScorer { score: 82 }), mailer);
    let mut state = SessionState::new();

    coordinator
        .process("I'm 30 years old, male, single, living in Lagos", &mut state)
        .await
        .unwrap();
    coordinator
        .process("I need 50000 naira for 90 days", &mut state)
        .await
        .unwrap();

    let reply = coordinator
        .process("what happens after this?", &mut state)
        .await
        .unwrap();
    assert_eq!(state.stage, IntakeStage::Confirming);
    assert!(reply.contains("confirm"));
    assert!(state.record.is_complete());
}

/// A record that passes extraction but fails the stricter application
/// rules goes back to collection with only the offending field dropped
#[tokio::test]
async fn test_validation_failure_reopens_offending_fields() {
    let responder = Arc::new(RecordingResponder::new());
    let mailer = Arc::new(RecordingMailer::new());
    let coordinator =
        coordinator_with(responder, Arc::new(FixedScorer { score: 82 }), mailer);
    let mut state = SessionState::new();

    coordinator
        .process("I'm 30 years old, male, single, living in Lagos", &mut state)
        .await
        .unwrap();
    // 5 days clears extraction but not the application tenure rule
    coordinator
        .process("I need 50000 naira for 5 days", &mut state)
        .await
        .unwrap();
    assert_eq!(state.stage, IntakeStage::Confirming);

    let reply = coordinator.process("confirm", &mut state).await.unwrap();
    assert_eq!(state.stage, IntakeStage::Collecting);
    assert!(reply.contains("did not pass validation"));
    assert!(reply.contains("Loan Tenure"));

    // Only tenure was dropped; the other five fields survive
    assert!(!state.record.contains(ApplicationField::Tenure));
    assert_eq!(state.record.len(), 5);
    assert_eq!(state.record.get(ApplicationField::Age), Some(&FieldValue::Int(30)));
}

/// A scoring outage surfaces as an error and the turn can be retried
#[tokio::test]
async fn test_service_failure_leaves_turn_retryable() {
    let responder = Arc::new(RecordingResponder::new());
    let mailer = Arc::new(RecordingMailer::new());
    let coordinator = coordinator_with(
        responder,
        Arc::new(FlakyScorer {
            failed_once: AtomicBool::new(false),
        }),
        mailer,
    );
    let mut state = SessionState::new();

    coordinator
        .process("I'm 30 years old, male, single, living in Lagos", &mut state)
        .await
        .unwrap();
    coordinator
        .process("I need 50000 naira for 90 days", &mut state)
        .await
        .unwrap();

    let result = coordinator.process("confirm", &mut state).await;
    assert!(result.is_err());
    assert_eq!(state.stage, IntakeStage::Processing);
    assert!(state.record.is_complete());

    // Any follow-up message retries the decision
    let reply = coordinator.process("hello?", &mut state).await.unwrap();
    assert_eq!(state.stage, IntakeStage::EmailPending);
    assert!(reply.contains("55/99"));
}

/// No parseable address keeps the session waiting for one
#[tokio::test]
async fn test_invalid_email_reprompts() {
    let responder = Arc::new(RecordingResponder::new());
    let mailer = Arc::new(RecordingMailer::new());
    let coordinator =
        coordinator_with(responder, Arc::new(FixedScorer { score: 82 }), mailer.clone());
    let mut state = SessionState::new();

    coordinator
        .process("I'm 30 years old, male, single, living in Lagos", &mut state)
        .await
        .unwrap();
    coordinator
        .process("I need 50000 naira for 90 days", &mut state)
        .await
        .unwrap();
    coordinator.process("confirm", &mut state).await.unwrap();

    let reply = coordinator.process("send it to my inbox", &mut state).await.unwrap();
    assert_eq!(state.stage, IntakeStage::EmailPending);
    assert!(reply.contains("valid email address"));
    assert!(mailer.sent.lock().unwrap().is_empty());
}

/// A provider-side rejection keeps the session open instead of resetting
#[tokio::test]
async fn test_rejected_email_does_not_reset_session() {
    let responder = Arc::new(RecordingResponder::new());
    let mailer = Arc::new(RecordingMailer::rejecting());
    let coordinator =
        coordinator_with(responder, Arc::new(FixedScorer { score: 82 }), mailer);
    let mut state = SessionState::new();

    coordinator
        .process("I'm 30 years old, male, single, living in Lagos", &mut state)
        .await
        .unwrap();
    coordinator
        .process("I need 50000 naira for 90 days", &mut state)
        .await
        .unwrap();
    coordinator.process("confirm", &mut state).await.unwrap();

    let reply = coordinator
        .process("jane.doe@example.com", &mut state)
        .await
        .unwrap();
    assert_eq!(state.stage, IntakeStage::EmailPending);
    assert!(reply.contains("unable to send"));
    assert!(state.record.is_complete());
}
