//! External service adapters
//!
//! Concrete implementations of the core service traits: an
//! OpenAI-compatible chat client backing the scoring, recommendation and
//! responder services, and a SendGrid mail adapter.

pub mod email;
pub mod llm;

pub use email::SendGridMailer;
pub use llm::{ChatClient, LlmRecommendationService, LlmResponder, LlmScoringService};
