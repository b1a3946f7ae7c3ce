//! Traits for the external collaborators
//!
//! The scoring model, recommendation engine, email provider, and
//! conversational response generator are out-of-process services. They
//! are injected behind these traits so the dialogue engine can be tested
//! with mocks and backends can be swapped without code changes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ServiceError;
use crate::record::ApplicationRecord;
use crate::validator::ValidatedApplication;

/// Risk band derived from the repayment probability score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Score 0-40
    High,
    /// Score 41-70
    Medium,
    /// Score 71-99
    Acceptable,
}

impl RiskLevel {
    /// Band for a repayment probability score in [0, 99]
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=40 => RiskLevel::High,
            41..=70 => RiskLevel::Medium,
            _ => RiskLevel::Acceptable,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "high",
            RiskLevel::Medium => "medium",
            RiskLevel::Acceptable => "acceptable",
        }
    }
}

impl FromStr for RiskLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(RiskLevel::High),
            "medium" => Ok(RiskLevel::Medium),
            "acceptable" => Ok(RiskLevel::Acceptable),
            _ => Err(()),
        }
    }
}

/// Result of the scoring service
///
/// The service's reply is kept verbatim in `summary` for downstream
/// embedding; `score` and `risk_level` are present only when the reply
/// carried them in the expected shape. The core never fails a turn on a
/// score it could not parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Repayment probability score in [0, 99], when parseable
    pub score: Option<u8>,
    /// Risk band, when parseable
    pub risk_level: Option<RiskLevel>,
    /// The service's reply, verbatim
    pub summary: String,
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary)
    }
}

/// Outcome reported by the email provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailStatus {
    Success,
    Error,
}

/// Delivery receipt from the email provider
///
///// A failed send is data, not an error: the receipt's message is shown
/// to the user and the turn completes normally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailReceipt {
    pub status: EmailStatus,
    pub message: String,
}

impl EmailReceipt {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: EmailStatus::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: EmailStatus::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for EmailReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            EmailStatus::Success => write!(f, "success: {}", self.message),
            EmailStatus::Error => write!(f, "error: {}", self.message),
        }
    }
}

/// Repayment scoring service
#[async_trait]
pub trait ScoringService: Send + Sync {
    /// Predict repayment probability for a validated application
    async fn predict(&self, application: &ValidatedApplication)
        -> Result<PredictionResult, ServiceError>;
}

/// Loan recommendation service
#[async_trait]
pub trait RecommendationService: Send + Sync {
    /// Recommend a decision given the application and the scoring result
    async fn recommend(
        &self,
        record: &ApplicationRecord,
        prediction: &PredictionResult,
    ) -> Result<String, ServiceError>;
}

/// Email delivery provider
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send an email; provider-side failure comes back as an error receipt
    async fn send(&self, to: &str, subject: &str, body: &str)
        -> Result<EmailReceipt, ServiceError>;
}

/// Conversational response generator
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Generate the outbound reply for an augmented turn text
    async fn reply(&self, augmented_text: &str) -> Result<String, ServiceError>;
}
