use crate::config::SheetsSettings;
use crate::models::LeadCapture;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use super::LeadStore;

const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const TOKEN_CACHE_KEY: &str = "sheets_access_token";
/// Google issues one-hour tokens; refresh well before expiry
const TOKEN_TTL_SECS: u64 = 50 * 60;

/// Errors that can occur when appending leads to Google Sheets
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Invalid service account credentials: {0}")]
    Credentials(String),

    #[error("Failed to sign token request: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("Token exchange failed: {0}")]
    TokenExchange(String),
}

/// Fields of a Google service account key file this client needs
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    pub token_uri: Option<String>,
}

/// How the client authenticates against the Sheets API
#[derive(Debug, Clone)]
pub enum SheetsAuth {
    AccessToken(String),
    ServiceAccount(ServiceAccountKey),
    Disabled,
}

impl SheetsAuth {
    pub fn from_settings(settings: &SheetsSettings) -> Result<Self, SheetsError> {
        if let Some(token) = settings.access_token.as_ref().filter(|t| !t.trim().is_empty()) {
            return Ok(SheetsAuth::AccessToken(token.clone()));
        }

        match settings.credentials_json.as_ref().filter(|c| !c.trim().is_empty()) {
            Some(raw) => {
                let mut key: ServiceAccountKey = serde_json::from_str(raw)
                    .map_err(|e| SheetsError::Credentials(e.to_string()))?;
                // Keys passed through env vars usually carry literal "\n"
                key.private_key = key.private_key.replace("\\n", "\n");
                Ok(SheetsAuth::ServiceAccount(key))
            }
            None => Ok(SheetsAuth::Disabled),
        }
    }
}

#[derive(Debug, Serialize)]
struct TokenClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Google Sheets lead store
///
/// Appends one row per lead via `values:append`. Service account tokens are
/// cached in memory so a burst of submissions does one token exchange.
pub struct SheetsClient {
    base_url: String,
    spreadsheet_id: String,
    range: String,
    token_uri: String,
    auth: SheetsAuth,
    client: Client,
    tokens: moka::future::Cache<String, String>,
}

impl SheetsClient {
    /// Create a new Sheets client
    pub fn new(settings: &SheetsSettings) -> Result<Self, SheetsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        let tokens = moka::future::CacheBuilder::new(1)
            .time_to_live(Duration::from_secs(TOKEN_TTL_SECS))
            .build();

        Ok(Self {
            base_url: settings.endpoint.clone(),
            spreadsheet_id: settings.spreadsheet_id.clone(),
            range: settings.range.clone(),
            token_uri: settings.token_uri.clone(),
            auth: SheetsAuth::from_settings(settings)?,
            client,
            tokens,
        })
    }

    pub fn is_configured(&self) -> bool {
        !self.spreadsheet_id.trim().is_empty() && !matches!(self.auth, SheetsAuth::Disabled)
    }

    /// Append a lead row
    ///
    /// Returns `Ok(false)` when the store is unconfigured or the API rejects
    /// the append. Transport and credential failures are errors.
    pub async fn save_lead(&self, lead: &LeadCapture) -> Result<bool, SheetsError> {
        if !self.is_configured() {
            tracing::warn!("Google Sheets not configured, lead for {} not persisted", lead.email);
            return Ok(false);
        }

        let token = self.access_token().await?;
        let url = format!(
            "{}/spreadsheets/{}/values/{}:append?valueInputOption=USER_ENTERED&insertDataOption=INSERT_ROWS",
            self.base_url.trim_end_matches('/'),
            self.spreadsheet_id,
            urlencoding::encode(&self.range)
        );

        let row = lead_row(lead, Utc::now(), Uuid::new_v4());

        let response = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .json(&json!({ "values": [row] }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to append lead for {}: {} - {}", lead.email, status, body);
            if status == reqwest::StatusCode::UNAUTHORIZED {
                self.tokens.invalidate(TOKEN_CACHE_KEY).await;
            }
            return Ok(false);
        }

        tracing::debug!("Appended lead row for {}", lead.email);

        Ok(true)
    }

    async fn access_token(&self) -> Result<String, SheetsError> {
        let key = match &self.auth {
            SheetsAuth::AccessToken(token) => return Ok(token.clone()),
            SheetsAuth::ServiceAccount(key) => key,
            SheetsAuth::Disabled => {
                return Err(SheetsError::Credentials("no credentials configured".to_string()))
            }
        };

        if let Some(token) = self.tokens.get(TOKEN_CACHE_KEY).await {
            tracing::trace!("Sheets token cache hit");
            return Ok(token);
        }

        let token_uri = key.token_uri.as_deref().unwrap_or(&self.token_uri);
        let assertion = sign_assertion(key, token_uri, Utc::now())?;

        let response = self
            .client
            .post(token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(SheetsError::TokenExchange(format!("{} - {}", status, body)));
        }

        let token: TokenResponse = response.json().await?;
        self.tokens
            .insert(TOKEN_CACHE_KEY.to_string(), token.access_token.clone())
            .await;

        tracing::debug!("Obtained Sheets access token for {}", key.client_email);

        Ok(token.access_token)
    }
}

#[async_trait]
impl LeadStore for SheetsClient {
    async fn save_lead(&self, lead: &LeadCapture) -> Result<bool, SheetsError> {
        SheetsClient::save_lead(self, lead).await
    }
}

/// RS256 JWT for the OAuth2 JWT-bearer grant
fn sign_assertion(
    key: &ServiceAccountKey,
    token_uri: &str,
    now: DateTime<Utc>,
) -> Result<String, SheetsError> {
    let iat = now.timestamp();
    let claims = TokenClaims {
        iss: &key.client_email,
        scope: SHEETS_SCOPE,
        aud: token_uri,
        iat,
        exp: iat + 3600,
    };
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
    Ok(jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)?)
}

/// Column order: submitted_at, lead_id, name, email, phone, match count,
/// top pick, summary probability, profile JSON
pub(crate) fn lead_row(lead: &LeadCapture, submitted_at: DateTime<Utc>, lead_id: Uuid) -> Vec<Value> {
    let results = &lead.scholarship_results;
    let profile = if lead.user_profile.is_null() {
        String::new()
    } else {
        lead.user_profile.to_string()
    };

    vec![
        Value::String(submitted_at.to_rfc3339()),
        Value::String(lead_id.to_string()),
        Value::String(lead.name.clone()),
        Value::String(lead.email.clone()),
        Value::String(lead.phone.clone()),
        json!(results.scholarships.len()),
        Value::String(results.top_pick().map(|s| s.name.clone()).unwrap_or_default()),
        json!(results.summary_probability),
        Value::String(profile),
    ]
}
