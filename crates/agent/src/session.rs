//! Per-conversation session state
//!
//! One `SessionState` per applicant conversation. The coordinator owns the
//! mutable borrow for the duration of a turn; nothing else touches it.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use loan_agent_core::{ApplicationField, ApplicationRecord, PredictionResult};

use crate::stage::IntakeStage;
use crate::AgentError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub id: Uuid,
    pub stage: IntakeStage,
    pub record: ApplicationRecord,
    /// Fields collected so far, in the order the record reports them
    pub fields_collected: BTreeSet<ApplicationField>,
    pub prediction: Option<PredictionResult>,
    pub recommendation: Option<String>,
    pub user_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            stage: IntakeStage::Collecting,
            record: ApplicationRecord::new(),
            fields_collected: BTreeSet::new(),
            prediction: None,
            recommendation: None,
            user_email: None,
            created_at: Utc::now(),
        }
    }

    /// Clear everything back to a fresh Collecting session.
    ///
    /// The session id is kept so logs for one conversation stay
    /// correlated across applications.
    pub fn reset(&mut self) {
        self.stage = IntakeStage::Collecting;
        self.record.clear();
        self.fields_collected.clear();
        self.prediction = None;
        self.recommendation = None;
        self.user_email = None;
        tracing::debug!(session = %self.id, "session reset");
    }

    /// Fields the conversation still has to ask for
    pub fn missing_fields(&self) -> BTreeSet<ApplicationField> {
        ApplicationField::ALL
            .into_iter()
            .filter(|f| !self.record.contains(*f))
            .collect()
    }

    /// Move to a new stage, enforcing the transition table
    pub fn transition(&mut self, to: IntakeStage) -> Result<(), AgentError> {
        if !self.stage.can_transition_to(to) {
            return Err(AgentError::InvalidTransition {
                from: self.stage,
                to,
            });
        }
        tracing::debug!(
            session = %self.id,
            from = self.stage.display_name(),
            to = to.display_name(),
            "stage transition"
        );
        self.stage = to;
        Ok(())
    }

    /// Render the collected/missing field summary shown to the applicant
    pub fn format_progress(&self) -> String {
        let mut out = String::from("### Application Progress\n\n**Collected Information:**\n");

        if self.record.is_empty() {
            out.push_str("- (nothing yet)\n");
        } else {
            for (field, value) in self.record.iter() {
                out.push_str(&format!("- {}: {}\n", field.display_name(), value));
            }
        }

        let missing = self.missing_fields();
        if !missing.is_empty() {
            out.push_str("\n**Information Still Needed:**\n");
            for field in &missing {
                out.push_str(&format!("- {}\n", field.display_name()));
            }
        }

        out
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
