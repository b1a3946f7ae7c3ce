//! LLM-backed decision services
//!
//! One thin chat client over any OpenAI-compatible endpoint, and the
//! three adapters built on it: repayment scoring, decision
//! recommendation, and the conversational responder.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use async_trait::async_trait;
use loan_agent_config::LlmSettings;
use loan_agent_core::{
    ApplicationRecord, PredictionResult, RecommendationService, ResponseGenerator, RiskLevel,
    ScoringService, ServiceError, ValidatedApplication,
};

const SCORING_SYSTEM_PROMPT: &str = "You are a credit risk analyst for a Nigerian retail lender. \
Given an applicant profile, estimate the probability that the loan will be repaid. \
Respond with a single JSON object of the form \
{\"repaymentProbabilityScore\": <integer 0-99>, \"riskLevel\": \"high\"|\"medium\"|\"acceptable\"} \
and nothing else.";

const RECOMMENDATION_SYSTEM_PROMPT: &str = "You are a loan officer writing the decision section \
of an applicant-facing letter. Given the application details and the risk assessment, write a \
short, clear recommendation (approve, approve with conditions, or decline) in two or three \
sentences. Address the applicant directly and do not mention internal scores you were not given.";

const RESPONDER_SYSTEM_PROMPT: &str = "You are a friendly loan application assistant. \
The user message is followed by [SYSTEM INFO] blocks describing the application state; use them \
to acknowledge what was understood and ask naturally for whatever is still needed. Never repeat \
the blocks back verbatim.";

/// Minimal chat-completions client for OpenAI-compatible endpoints
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    settings: LlmSettings,
}

impl ChatClient {
    pub fn new(settings: LlmSettings) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ServiceError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, settings })
    }

    fn chat_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.endpoint.trim_end_matches('/')
        )
    }

    /// Run one system+user exchange and return the assistant text
    pub async fn complete(&self, system: &str, user: &str) -> Result<String, ServiceError> {
        let request = ChatRequest {
            model: self.settings.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature: Some(0.3),
            stream: false,
        };

        let mut builder = self.client.post(self.chat_url()).json(&request);
        if let Some(ref key) = self.settings.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ServiceError::Timeout(self.settings.timeout_secs)
            } else {
                ServiceError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::UnexpectedResponse(format!(
                "HTTP {status}: {body}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::UnexpectedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ServiceError::UnexpectedResponse("no choices in response".to_string()))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Pull a `PredictionResult` out of whatever the model actually returned.
///
/// Models wrap the JSON in prose or fences often enough that this scans
/// for the outermost object instead of parsing the text directly. A
/// missing or malformed payload degrades to `None` fields with the raw
/// text kept as the summary.
fn parse_prediction(text: &str) -> PredictionResult {
    let json = text
        .find('{')
        .and_then(|start| {
            text[start..]
                .rfind('}')
                .map(|offset| &text[start..=start + offset])
        })
        .and_then(|slice| serde_json::from_str::<serde_json::Value>(slice).ok());

    let score = json
        .as_ref()
        .and_then(|v| v.get("repaymentProbabilityScore"))
        .and_then(|v| v.as_u64())
        .and_then(|v| u8::try_from(v).ok())
        .filter(|v| *v <= 99);

    let risk_level = json
        .as_ref()
        .and_then(|v| v.get("riskLevel"))
        .and_then(|v| v.as_str())
        .and_then(|s| s.to_lowercase().parse::<RiskLevel>().ok())
        .or(score.map(RiskLevel::from_score));

    let summary = match (score, risk_level) {
        (Some(score), Some(level)) => {
            format!(
                "Repayment probability score: {}/99 (risk level: {})",
                score,
                level.as_str()
            )
        },
        _ => text.trim().to_string(),
    };

    PredictionResult {
        score,
        risk_level,
        summary,
    }
}

fn describe_applicant(application: &ValidatedApplication) -> String {
    format!(
        "Applicant profile:\n- Age: {}\n- Gender: {}\n- Marital status: {}\n- Location: {}\n\
         - Requested loan amount: ₦{}\n- Repayment tenure: {} days",
        application.age,
        application.gender.as_str(),
        application.marital_status.as_str(),
        application.location,
        application.amount,
        application.tenure
    )
}

/// Repayment scoring via the chat endpoint
pub struct LlmScoringService {
    client: ChatClient,
}

impl LlmScoringService {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ScoringService for LlmScoringService {
    async fn predict(
        &self,
        application: &ValidatedApplication,
    ) -> Result<PredictionResult, ServiceError> {
        let text = self
            .client
            .complete(SCORING_SYSTEM_PROMPT, &describe_applicant(application))
            .await?;
        let prediction = parse_prediction(&text);
        tracing::debug!(score = ?prediction.score, risk = ?prediction.risk_level, "scoring complete");
        Ok(prediction)
    }
}

/// Decision recommendation via the chat endpoint
pub struct LlmRecommendationService {
    client: ChatClient,
}

impl LlmRecommendationService {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecommendationService for LlmRecommendationService {
    async fn recommend(
        &self,
        record: &ApplicationRecord,
        prediction: &PredictionResult,
    ) -> Result<String, ServiceError> {
        let user = format!(
            "Application details:\n{}\n\nRisk assessment:\n{}",
            serde_json::to_string_pretty(&record.to_json())
                .map_err(|e| ServiceError::UnexpectedResponse(e.to_string()))?,
            prediction.summary
        );
        self.client.complete(RECOMMENDATION_SYSTEM_PROMPT, &user).await
    }
}

/// Conversational responder via the chat endpoint
pub struct LlmResponder {
    client: ChatClient,
}

impl LlmResponder {
    pub fn new(client: ChatClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResponseGenerator for LlmResponder {
    async fn reply(&self, augmented_text: &str) -> Result<String, ServiceError> {
        self.client.complete(RESPONDER_SYSTEM_PROMPT, augmented_text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prediction_clean_json() {
        let prediction =
            parse_prediction(r#"{"repaymentProbabilityScore": 82, "riskLevel": "acceptable"}"#);
        assert_eq!(prediction.score, Some(82));
        assert_eq!(prediction.risk_level, Some(RiskLevel::Acceptable));
        assert!(prediction.summary.contains("82/99"));
    }

    #[test]
    fn test_parse_prediction_wrapped_in_prose() {
        let text = "Sure! Here is my assessment:\n```json\n\
                    {\"repaymentProbabilityScore\": 35, \"riskLevel\": \"high\"}\n```\nLet me know.";
        let prediction = parse_prediction(text);
        assert_eq!(prediction.score, Some(35));
        assert_eq!(prediction.risk_level, Some(RiskLevel::High));
    }

    #[test]
    fn test_parse_prediction_missing_risk_derives_from_score() {
        let prediction = parse_prediction(r#"{"repaymentProbabilityScore": 55}"#);
        assert_eq!(prediction.score, Some(55));
        assert_eq!(prediction.risk_level, Some(RiskLevel::Medium));
    }

    #[test]
    fn test_parse_prediction_garbage_keeps_raw_text() {
        let prediction = parse_prediction("I cannot assess this application.");
        assert_eq!(prediction.score, None);
        assert_eq!(prediction.risk_level, None);
        assert_eq!(prediction.summary, "I cannot assess this application.");
    }

    #[test]
    fn test_parse_prediction_stray_close_brace_before_open() {
        let prediction = parse_prediction("score unknown} see notes: {incomplete");
        assert_eq!(prediction.score, None);
        assert_eq!(prediction.risk_level, None);
        assert_eq!(prediction.summary, "score unknown} see notes: {incomplete");
    }

    #[test]
    fn test_parse_prediction_out_of_range_score_dropped() {
        let prediction = parse_prediction(r#"{"repaymentProbabilityScore": 250}"#);
        assert_eq!(prediction.score, None);
    }

    #[test]
    fn test_chat_url_trims_trailing_slash() {
        let mut settings = LlmSettings::default();
        settings.endpoint = "http://localhost:11434/v1/".to_string();
        let client = ChatClient::new(settings).unwrap();
        assert_eq!(client.chat_url(), "http://localhost:11434/v1/chat/completions");
    }
}
