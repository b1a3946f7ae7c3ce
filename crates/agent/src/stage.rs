//! Stage-Based Dialogue Management
//!
//! The intake conversation is a small state machine. Every session is in
//! exactly one stage at any moment, and the coordinator only moves it
//! along the transitions listed here.

use serde::{Deserialize, Serialize};

/// Intake conversation stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum IntakeStage {
    /// Gathering the six application fields
    #[default]
    Collecting,
    /// All fields present; waiting for the applicant to confirm or modify
    Confirming,
    /// Scoring and recommendation in flight for a confirmed application
    Processing,
    /// Decision ready; waiting for an email address to send it to
    EmailPending,
}

impl IntakeStage {
    /// Get stage display name
    pub fn display_name(&self) -> &'static str {
        match self {
            IntakeStage::Collecting => "Collecting",
            IntakeStage::Confirming => "Confirming",
            IntakeStage::Processing => "Processing",
            IntakeStage::EmailPending => "Email Pending",
        }
    }

    /// Get all valid transitions from this stage
    pub fn valid_transitions(&self) -> Vec<IntakeStage> {
        match self {
            IntakeStage::Collecting => vec![IntakeStage::Confirming],
            IntakeStage::Confirming => vec![IntakeStage::Processing, IntakeStage::Collecting],
            // Validation failure sends the applicant back to fix fields
            IntakeStage::Processing => vec![IntakeStage::EmailPending, IntakeStage::Collecting],
            // A successful send resets the whole session instead
            IntakeStage::EmailPending => vec![],
        }
    }

    /// Check whether moving to `to` is allowed from this stage
    pub fn can_transition_to(&self, to: IntakeStage) -> bool {
        self.valid_transitions().contains(&to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stage_is_collecting() {
        assert_eq!(IntakeStage::default(), IntakeStage::Collecting);
    }

    #[test]
    fn test_forward_path() {
        assert!(IntakeStage::Collecting.can_transition_to(IntakeStage::Confirming));
        assert!(IntakeStage::Confirming.can_transition_to(IntakeStage::Processing));
        assert!(IntakeStage::Processing.can_transition_to(IntakeStage::EmailPending));
    }

    #[test]
    fn test_modify_and_validation_failure_paths() {
        assert!(IntakeStage::Confirming.can_transition_to(IntakeStage::Collecting));
        assert!(IntakeStage::Processing.can_transition_to(IntakeStage::Collecting));
    }

    #[test]
    fn test_no_skipping_ahead() {
        assert!(!IntakeStage::Collecting.can_transition_to(IntakeStage::Processing));
        assert!(!IntakeStage::Collecting.can_transition_to(IntakeStage::EmailPending));
        assert!(!IntakeStage::Confirming.can_transition_to(IntakeStage::EmailPending));
        assert!(IntakeStage::EmailPending.valid_transitions().is_empty());
    }
}
