//! Core types and traits for the loan intake agent
//!
//! This crate provides foundational types used across all other crates:
//! - The closed application field schema and per-field normalization rules
//! - The application record (field -> value map with no silent overwrites)
//! - The record validator applied before scoring
//! - Traits for the external collaborators (scoring, recommendation,
//!   email delivery, conversational response generation)
//! - Error types

pub mod error;
pub mod field;
pub mod record;
pub mod traits;
pub mod validator;

pub use error::{FieldError, ServiceError};
pub use field::{
    ApplicationField, FieldValue, Gender, MaritalStatus, is_region, normalize_and_validate,
    NIGERIAN_STATES,
};
pub use record::ApplicationRecord;
pub use traits::{
    EmailReceipt, EmailSender, EmailStatus, PredictionResult, RecommendationService,
    ResponseGenerator, RiskLevel, ScoringService,
};
pub use validator::{validate, FieldViolation, ValidatedApplication, ValidationError};
