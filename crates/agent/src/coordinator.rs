//! Intake coordinator
//!
//! Drives one conversation turn at a time: dispatches on the session
//! stage, merges extracted fields, and calls out to the scoring,
//! recommendation, response and email services. Service calls happen
//! before the stage they lead to is committed, so a failed turn leaves
//! the session retryable.

use std::collections::BTreeSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use loan_agent_config::DialogueSettings;
use loan_agent_core::{
    validate, ApplicationField, ApplicationRecord, EmailSender, RecommendationService,
    ResponseGenerator, ScoringService,
};
use loan_agent_extraction::FieldExtractor;

use crate::prompts;
use crate::session::SessionState;
use crate::stage::IntakeStage;
use crate::AgentError;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
        .unwrap_or_else(|e| panic!("invalid email regex: {e}"))
});

pub struct IntakeCoordinator {
    extractor: FieldExtractor,
    dialogue: DialogueSettings,
    email_subject: String,
    responder: Arc<dyn ResponseGenerator>,
    scoring: Arc<dyn ScoringService>,
    recommender: Arc<dyn RecommendationService>,
    mailer: Arc<dyn EmailSender>,
}

impl IntakeCoordinator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        extractor: FieldExtractor,
        dialogue: DialogueSettings,
        email_subject: String,
        responder: Arc<dyn ResponseGenerator>,
        scoring: Arc<dyn ScoringService>,
        recommender: Arc<dyn RecommendationService>,
        mailer: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            extractor,
            dialogue,
            email_subject,
            responder,
            scoring,
            recommender,
            mailer,
        }
    }

    /// Handle one applicant message and produce the reply.
    ///
    /// A returned `Err` means a downstream service failed; the session is
    /// left in a state where re-sending the message retries the turn.
    pub async fn process(
        &self,
        message: &str,
        state: &mut SessionState,
    ) -> Result<String, AgentError> {
        tracing::debug!(
            session = %state.id,
            stage = state.stage.display_name(),
            "processing turn"
        );
        match state.stage {
            IntakeStage::Collecting => self.handle_collecting(message, state).await,
            IntakeStage::Confirming => self.handle_confirming(message, state).await,
            // Only reachable when a prior turn failed mid-decision; retry it
            IntakeStage::Processing => self.run_processing(state).await,
            IntakeStage::EmailPending => self.handle_email(message, state).await,
        }
    }

    async fn handle_collecting(
        &self,
        message: &str,
        state: &mut SessionState,
    ) -> Result<String, AgentError> {
        // A complete record in Collecting means the applicant asked to
        // modify: extract over every field and overwrite what shows up.
        let modifying = state.record.is_complete();

        let extracted = if modifying {
            let all: BTreeSet<_> = ApplicationField::ALL.into_iter().collect();
            self.extractor.extract(message, &all, &ApplicationRecord::new())
        } else {
            self.extractor
                .extract(message, &state.missing_fields(), &state.record)
        };

        for (field, item) in &extracted {
            if modifying {
                state.record.overwrite(*field, item.value.clone());
            } else {
                state.record.set(*field, item.value.clone());
            }
            state.fields_collected.insert(*field);
        }

        if modifying && extracted.is_empty() {
            return Ok(prompts::MODIFY_REPLY.to_string());
        }

        // The responder sees the utterance first, then the application state
        let mut augmented = message.to_string();
        augmented.push('\n');
        augmented.push_str(&prompts::system_info_block(state));
        if !extracted.is_empty() {
            augmented.push('\n');
            augmented.push_str(&prompts::extracted_info_block(&extracted));
        }

        let mut reply = self.responder.reply(&augmented).await?;

        if state.record.is_complete() {
            state.transition(IntakeStage::Confirming)?;
            reply.push_str("\n\n");
            reply.push_str(&prompts::application_summary(&state.record));
        }

        Ok(reply)
    }

    async fn handle_confirming(
        &self,
        message: &str,
        state: &mut SessionState,
    ) -> Result<String, AgentError> {
        if self.dialogue.is_confirmation(message) {
            state.transition(IntakeStage::Processing)?;
            self.run_processing(state).await
        } else if self.dialogue.is_modification(message) {
            state.transition(IntakeStage::Collecting)?;
            Ok(prompts::MODIFY_REPLY.to_string())
        } else {
            // Neither token set matched; stay put and ask again
            Ok(prompts::CONFIRM_REPROMPT.to_string())
        }
    }

    /// Validate, score and recommend for a confirmed application
    async fn run_processing(&self, state: &mut SessionState) -> Result<String, AgentError> {
        let validated = match validate(&state.record) {
            Ok(validated) => validated,
            Err(err) => {
                // Drop only the offending fields; the rest stay collected
                for violation in &err.violations {
                    state.record.remove(violation.field);
                    state.fields_collected.remove(&violation.field);
                }
                state.transition(IntakeStage::Collecting)?;
                let mut reply =
                    String::from("Some of the information you provided did not pass validation:\n");
                for violation in &err.violations {
                    reply.push_str(&format!("- {}\n", violation));
                }
                reply.push('\n');
                reply.push_str(&state.format_progress());
                return Ok(reply);
            },
        };

        let prediction = self.scoring.predict(&validated).await?;
        let recommendation = self.recommender.recommend(&state.record, &prediction).await?;

        tracing::info!(
            session = %state.id,
            score = ?prediction.score,
            risk = ?prediction.risk_level,
            "application decided"
        );

        let reply = format!(
            "Here is our assessment of your application:\n\n{}\n\n{}\n\n{}",
            prediction,
            recommendation,
            prompts::EMAIL_REQUEST
        );

        state.prediction = Some(prediction);
        state.recommendation = Some(recommendation);
        state.transition(IntakeStage::EmailPending)?;

        Ok(reply)
    }

    async fn handle_email(
        &self,
        message: &str,
        state: &mut SessionState,
    ) -> Result<String, AgentError> {
        let Some(found) = EMAIL_RE.find(message) else {
            return Ok(prompts::INVALID_EMAIL_REPLY.to_string());
        };
        let email = found.as_str().to_string();

        let (prediction, recommendation) =
            match (state.prediction.as_ref(), state.recommendation.as_ref()) {
                (Some(p), Some(r)) => (p, r),
                _ => return Err(AgentError::MissingDecision),
            };

        let body = prompts::email_body(&state.record, prediction, recommendation);
        state.user_email = Some(email.clone());
        let receipt = self.mailer.send(&email, &self.email_subject, &body).await?;

        tracing::info!(session = %state.id, %email, status = %receipt, "email dispatch finished");

        match receipt.status {
            loan_agent_core::EmailStatus::Success => {
                let reply = format!(
                    "Thank you! Your loan application summary has been sent to {}. \
                     We appreciate your interest and will be in touch.\n\nEmail Status: {}",
                    email, receipt
                );
                // Only a successful send closes out the application
                state.reset();
                Ok(reply)
            },
            loan_agent_core::EmailStatus::Error => Ok(format!(
                "I was unable to send the email ({}). Please try again or provide a \
                 different address.",
                receipt.message
            )),
        }
    }
}
