//! SendGrid mail adapter
//!
//! Provider rejections come back as an error receipt rather than an
//! `Err`: the coordinator shows the status to the applicant and keeps
//! the session open. Only transport-level failures are hard errors.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;

use async_trait::async_trait;
use loan_agent_config::EmailSettings;
use loan_agent_core::{EmailReceipt, EmailSender, ServiceError};

const SEND_TIMEOUT_SECS: u64 = 15;

pub struct SendGridMailer {
    client: Client,
    settings: EmailSettings,
}

impl SendGridMailer {
    pub fn new(settings: EmailSettings) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(SEND_TIMEOUT_SECS))
            .build()
            .map_err(|e| ServiceError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, settings })
    }

    fn send_url(&self) -> String {
        format!(
            "{}/v3/mail/send",
            self.settings.api_base.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl EmailSender for SendGridMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<EmailReceipt, ServiceError> {
        let Some(ref api_key) = self.settings.api_key else {
            return Ok(EmailReceipt::error("no email API key configured"));
        };

        let request = MailSendRequest {
            personalizations: vec![Personalization {
                to: vec![Address { email: to }],
            }],
            from: Address {
                email: &self.settings.from_address,
            },
            subject,
            content: vec![Content {
                r#type: "text/plain",
                value: body,
            }],
        };

        let response = self
            .client
            .post(self.send_url())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ServiceError::Timeout(SEND_TIMEOUT_SECS)
                } else {
                    ServiceError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(%to, "email accepted by provider");
            Ok(EmailReceipt::success(format!("accepted for delivery to {to}")))
        } else {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(%to, %status, "email rejected by provider");
            Ok(EmailReceipt::error(format!("provider returned {status}: {detail}")))
        }
    }
}

#[derive(Debug, Serialize)]
struct MailSendRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    r#type: &'a str,
    value: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_url() {
        let mut settings = EmailSettings::default();
        settings.api_base = "https://api.sendgrid.com/".to_string();
        let mailer = SendGridMailer::new(settings).unwrap();
        assert_eq!(mailer.send_url(), "https://api.sendgrid.com/v3/mail/send");
    }

    #[test]
    fn test_request_shape() {
        let request = MailSendRequest {
            personalizations: vec![Personalization {
                to: vec![Address {
                    email: "jane@example.com",
                }],
            }],
            from: Address {
                email: "loans@example.com",
            },
            subject: "Your Loan Application Decision",
            content: vec![Content {
                r#type: "text/plain",
                value: "# Loan Application Decision",
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["personalizations"][0]["to"][0]["email"], "jane@example.com");
        assert_eq!(json["from"]["email"], "loans@example.com");
        assert_eq!(json["content"][0]["type"], "text/plain");
    }

    #[tokio::test]
    async fn test_missing_api_key_is_an_error_receipt() {
        let mut settings = EmailSettings::default();
        settings.api_key = None;
        let mailer = SendGridMailer::new(settings).unwrap();

        let receipt = mailer.send("jane@example.com", "subject", "body").await.unwrap();
        assert_eq!(receipt.status, loan_agent_core::EmailStatus::Error);
    }
}
