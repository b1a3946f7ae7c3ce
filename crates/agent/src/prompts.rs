//! Conversation text assembly
//!
//! Everything the applicant reads that is not free LLM output is rendered
//! here: the system-info blocks prepended to the responder input, the
//! confirmation summary, and the decision email body.

use std::collections::BTreeMap;

use loan_agent_core::{ApplicationField, ApplicationRecord, PredictionResult};
use loan_agent_extraction::Extracted;

use crate::session::SessionState;

/// Asked once every field has been collected
pub const CONFIRMATION_PROMPT: &str =
    "Is this information correct? Please confirm to proceed or say 'modify' to make changes.";

/// Reply when the applicant asks to change something
pub const MODIFY_REPLY: &str =
    "What information would you like to modify? Please tell me the new value.";

/// Asked again when a Confirming-stage utterance matches neither token set
pub const CONFIRM_REPROMPT: &str =
    "I didn't catch that. Please confirm to submit your application, or say 'modify' to make changes.";

/// Asked once the decision is ready
pub const EMAIL_REQUEST: &str =
    "Your application has been processed. Please provide your email address and I will send you the decision summary.";

/// Reply when no email address can be found in the utterance
pub const INVALID_EMAIL_REPLY: &str = "Please provide a valid email address.";

/// State block appended to every responder input during collection
pub fn system_info_block(state: &SessionState) -> String {
    format!(
        "[SYSTEM INFO: Current application state]\n{}",
        state.format_progress()
    )
}

/// Block describing what the current utterance just yielded
pub fn extracted_info_block(extracted: &BTreeMap<ApplicationField, Extracted>) -> String {
    let mut out = String::from("[SYSTEM INFO: Newly extracted fields]\n");
    for (field, item) in extracted {
        out.push_str(&format!(
            "- {}: {} (confidence {:.2})\n",
            field.display_name(),
            item.value,
            item.confidence
        ));
    }
    out
}

/// Full summary shown when the record becomes complete
pub fn application_summary(record: &ApplicationRecord) -> String {
    let mut out = String::from("### Complete Application Summary\n\n");
    for (field, value) in record.iter() {
        out.push_str(&format!("- **{}**: {}\n", field.display_name(), value));
    }
    out.push('\n');
    out.push_str(CONFIRMATION_PROMPT);
    out
}

/// Render the decision email sent to the applicant
pub fn email_body(
    record: &ApplicationRecord,
    prediction: &PredictionResult,
    recommendation: &str,
) -> String {
    let mut out = String::from("# Loan Application Decision\n\n## Application Summary\n\n");
    for (field, value) in record.iter() {
        if field == ApplicationField::Amount {
            out.push_str(&format!("- **{}**: ₦{}\n", field.display_name(), value));
        } else {
            out.push_str(&format!("- **{}**: {}\n", field.display_name(), value));
        }
    }

    out.push_str("\n## Risk Assessment\n\n");
    match (prediction.score, prediction.risk_level) {
        (Some(score), Some(level)) => {
            out.push_str(&format!(
                "- **Repayment Probability Score**: {}/99\n- **Risk Level**: {}\n",
                score,
                level.as_str()
            ));
        },
        _ => {
            out.push_str(&format!("{}\n", prediction.summary));
        },
    }

    out.push_str("\n## Our Decision\n\n");
    out.push_str(recommendation);
    out.push_str("\n\nThank you for applying with us.\n");
    out
}
