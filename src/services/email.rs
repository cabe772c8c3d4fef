use crate::config::EmailSettings;
use crate::core::report::{render_report, Report};
use crate::models::ScholarshipResult;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

use super::ReportMailer;

/// Errors that can occur when delivering report emails
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Email API key is not configured")]
    NotConfigured,
}

/// SendGrid v3 compatible mail client
pub struct EmailClient {
    endpoint: String,
    api_key: String,
    from_address: String,
    from_name: String,
    client: Client,
}

impl EmailClient {
    pub fn new(settings: &EmailSettings) -> Result<Self, EmailError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
            from_address: settings.from_address.clone(),
            from_name: settings.from_name.clone(),
            client,
        })
    }

    fn payload(&self, email: &str, name: &str, report: &Report) -> Value {
        json!({
            "personalizations": [{
                "to": [{ "email": email, "name": name }]
            }],
            "from": { "email": self.from_address, "name": self.from_name },
            "subject": report.subject,
            "content": [
                { "type": "text/plain", "value": report.text },
                { "type": "text/html", "value": report.html }
            ]
        })
    }

    /// Render and send the scholarship report to one recipient
    pub async fn send_scholarship_report(
        &self,
        email: &str,
        name: &str,
        results: &ScholarshipResult,
    ) -> Result<(), EmailError> {
        if self.api_key.trim().is_empty() {
            return Err(EmailError::NotConfigured);
        }

        let report = render_report(name, results);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.payload(email, name, &report))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(EmailError::ApiError(format!("{} - {}", status, body)));
        }

        tracing::debug!("Report \"{}\" accepted for {}", report.subject, email);

        Ok(())
    }
}

#[async_trait]
impl ReportMailer for EmailClient {
    async fn send_scholarship_report(
        &self,
        email: &str,
        name: &str,
        results: &ScholarshipResult,
    ) -> Result<(), EmailError> {
        EmailClient::send_scholarship_report(self, email, name, results).await
    }
}
