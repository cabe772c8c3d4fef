// Adapter tests against mock HTTP servers

use mockito::Matcher;
use scholarship_finder::config::{EmailSettings, GeminiSettings, SheetsSettings};
use scholarship_finder::core::fallback_result;
use scholarship_finder::models::{LeadCapture, UserProfile};
use scholarship_finder::services::{
    EmailClient, EmailError, GeminiClient, GeminiError, SheetsClient, SheetsError,
};
use serde_json::json;

fn profile() -> UserProfile {
    serde_json::from_value(json!({
        "education_level": "Postgraduate",
        "field_of_study": "Physics",
        "academic_percentage": 84.0,
        "annual_family_income": 600000,
        "state": "Maharashtra",
        "category": "General",
        "gender": "female"
    }))
    .unwrap()
}

fn lead() -> LeadCapture {
    LeadCapture {
        name: "Meera Kulkarni".to_string(),
        email: "meera@example.in".to_string(),
        phone: "+91 9123456780".to_string(),
        user_profile: json!({"state": "Maharashtra"}),
        scholarship_results: fallback_result(),
    }
}

fn gemini(url: String) -> GeminiClient {
    GeminiClient::new(&GeminiSettings {
        endpoint: url,
        api_key: "test-key".to_string(),
        max_results: 2,
        ..GeminiSettings::default()
    })
    .unwrap()
}

fn model_reply(text: &str) -> String {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

#[tokio::test]
async fn test_gemini_parses_and_ranks_matches() {
    let mut server = mockito::Server::new_async().await;
    let text = r#"Here are the matches:
```json
{"scholarships": [
  {"name": "Kishore Vaigyanik", "amount": "₹7,000/month", "deadline": "Aug", "match_score": 70, "one_liner_reason": "Science stream"},
  {"name": "INSPIRE SHE", "amount": "₹80,000/year", "deadline": "Dec", "match_score": 92, "one_liner_reason": "Top percentile"},
  {"name": "Post-Graduate Merit", "amount": "₹31,000/year", "deadline": "Nov", "match_score": "81%", "one_liner_reason": "Postgraduate"}
], "summary_probability": 76}
```"#;

    let mock = server
        .mock("POST", "/models/gemini-2.0-flash:generateContent")
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::PartialJson(json!({ "tools": [{ "google_search": {} }] })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(model_reply(text))
        .expect(1)
        .create_async()
        .await;

    let result = gemini(server.url())
        .get_scholarships(&profile())
        .await
        .unwrap()
        .unwrap();

    mock.assert_async().await;
    assert_eq!(result.scholarships.len(), 2);
    assert_eq!(result.scholarships[0].name, "INSPIRE SHE");
    assert_eq!(result.scholarships[1].match_score, 81);
    assert_eq!(result.summary_probability, 76);
}

#[tokio::test]
async fn test_gemini_unparseable_text_is_none() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/models/gemini-2.0-flash:generateContent")
        .with_status(200)
        .with_body(model_reply("I could not find anything, sorry."))
        .create_async()
        .await;

    let result = gemini(server.url()).get_scholarships(&profile()).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_gemini_blocked_prompt_is_none() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/models/gemini-2.0-flash:generateContent")
        .with_status(200)
        .with_body(json!({ "promptFeedback": { "blockReason": "SAFETY" } }).to_string())
        .create_async()
        .await;

    let result = gemini(server.url()).get_scholarships(&profile()).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_gemini_api_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/models/gemini-2.0-flash:generateContent")
        .with_status(429)
        .with_body(r#"{"error": {"status": "RESOURCE_EXHAUSTED"}}"#)
        .create_async()
        .await;

    let err = gemini(server.url()).get_scholarships(&profile()).await.unwrap_err();
    assert!(matches!(err, GeminiError::ApiError(_)));
}

#[tokio::test]
async fn test_gemini_requires_api_key() {
    let client = GeminiClient::new(&GeminiSettings::default()).unwrap();
    let err = client.get_scholarships(&profile()).await.unwrap_err();
    assert!(matches!(err, GeminiError::NotConfigured));
}

fn sheets(url: String) -> SheetsClient {
    SheetsClient::new(&SheetsSettings {
        endpoint: url,
        spreadsheet_id: "sheet-123".to_string(),
        access_token: Some("ya29.static".to_string()),
        ..SheetsSettings::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_sheets_appends_row() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Regex(r"^/spreadsheets/sheet-123/values/.+:append".to_string()))
        .match_query(Matcher::UrlEncoded("valueInputOption".into(), "USER_ENTERED".into()))
        .match_header("authorization", "Bearer ya29.static")
        .match_body(Matcher::Regex("meera@example.in".to_string()))
        .with_status(200)
        .with_body(r#"{"updates": {"updatedRows": 1}}"#)
        .expect(1)
        .create_async()
        .await;

    let saved = sheets(server.url()).save_lead(&lead()).await.unwrap();

    mock.assert_async().await;
    assert!(saved);
}

#[tokio::test]
async fn test_sheets_rejection_reports_false() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", Matcher::Regex(r"^/spreadsheets/sheet-123/values/.+:append".to_string()))
        .with_status(403)
        .with_body(r#"{"error": {"status": "PERMISSION_DENIED"}}"#)
        .create_async()
        .await;

    let saved = sheets(server.url()).save_lead(&lead()).await.unwrap();
    assert!(!saved);
}

const SERVICE_ACCOUNT_KEY: &str = include_str!("fixtures/service_account_key.pem");

fn service_account_sheets(url: String) -> SheetsClient {
    let credentials = json!({
        "type": "service_account",
        "client_email": "leads-writer@scholarship-finder.iam.gserviceaccount.com",
        "private_key": SERVICE_ACCOUNT_KEY,
        "token_uri": format!("{}/token", url),
    });

    SheetsClient::new(&SheetsSettings {
        endpoint: url,
        spreadsheet_id: "sheet-123".to_string(),
        credentials_json: Some(credentials.to_string()),
        ..SheetsSettings::default()
    })
    .unwrap()
}

fn jwt_bearer_grant() -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded(
            "grant_type".into(),
            "urn:ietf:params:oauth:grant-type:jwt-bearer".into(),
        ),
        Matcher::Regex("assertion=eyJ".to_string()),
    ])
}

#[tokio::test]
async fn test_sheets_service_account_token_cached() {
    let mut server = mockito::Server::new_async().await;
    let token = server
        .mock("POST", "/token")
        .match_body(jwt_bearer_grant())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token": "ya29.minted", "expires_in": 3599, "token_type": "Bearer"}"#)
        .expect(1)
        .create_async()
        .await;
    let append = server
        .mock("POST", Matcher::Regex(r"^/spreadsheets/sheet-123/values/.+:append".to_string()))
        .match_header("authorization", "Bearer ya29.minted")
        .with_status(200)
        .with_body(r#"{"updates": {"updatedRows": 1}}"#)
        .expect(2)
        .create_async()
        .await;

    let client = service_account_sheets(server.url());
    assert!(client.is_configured());
    assert!(client.save_lead(&lead()).await.unwrap());
    assert!(client.save_lead(&lead()).await.unwrap());

    token.assert_async().await;
    append.assert_async().await;
}

#[tokio::test]
async fn test_sheets_unauthorized_drops_cached_token() {
    let mut server = mockito::Server::new_async().await;
    let token = server
        .mock("POST", "/token")
        .match_body(jwt_bearer_grant())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token": "ya29.revoked", "expires_in": 3599}"#)
        .expect(2)
        .create_async()
        .await;
    let append = server
        .mock("POST", Matcher::Regex(r"^/spreadsheets/sheet-123/values/.+:append".to_string()))
        .with_status(401)
        .with_body(r#"{"error": {"status": "UNAUTHENTICATED"}}"#)
        .expect(2)
        .create_async()
        .await;

    let client = service_account_sheets(server.url());
    assert!(!client.save_lead(&lead()).await.unwrap());
    assert!(!client.save_lead(&lead()).await.unwrap());

    token.assert_async().await;
    append.assert_async().await;
}

#[tokio::test]
async fn test_sheets_token_exchange_failure_is_error() {
    let mut server = mockito::Server::new_async().await;
    let _token = server
        .mock("POST", "/token")
        .with_status(400)
        .with_body(r#"{"error": "invalid_grant"}"#)
        .create_async()
        .await;
    let append = server
        .mock("POST", Matcher::Regex(r"^/spreadsheets/.+:append".to_string()))
        .expect(0)
        .create_async()
        .await;

    let err = service_account_sheets(server.url()).save_lead(&lead()).await.unwrap_err();

    append.assert_async().await;
    match err {
        SheetsError::TokenExchange(detail) => assert!(detail.contains("invalid_grant")),
        other => panic!("expected token exchange failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_sheets_unconfigured_skips_request() {
    let client = SheetsClient::new(&SheetsSettings::default()).unwrap();
    assert!(!client.save_lead(&lead()).await.unwrap());
}

#[tokio::test]
async fn test_sheets_unreachable_is_error() {
    let client = sheets("http://127.0.0.1:9".to_string());
    let err = client.save_lead(&lead()).await.unwrap_err();
    assert!(matches!(err, SheetsError::RequestError(_)));
}

fn email(url: String) -> EmailClient {
    EmailClient::new(&EmailSettings {
        endpoint: format!("{}/v3/mail/send", url),
        api_key: "SG.test".to_string(),
        ..EmailSettings::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_email_sends_report() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v3/mail/send")
        .match_header("authorization", "Bearer SG.test")
        .match_body(Matcher::PartialJson(json!({
            "personalizations": [{ "to": [{ "email": "meera@example.in", "name": "Meera Kulkarni" }] }],
            "subject": "Meera, your 3 scholarship matches are ready"
        })))
        .with_status(202)
        .expect(1)
        .create_async()
        .await;

    email(server.url())
        .send_scholarship_report("meera@example.in", "Meera Kulkarni", &fallback_result())
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_email_api_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v3/mail/send")
        .with_status(401)
        .with_body(r#"{"errors": [{"message": "invalid key"}]}"#)
        .create_async()
        .await;

    let err = email(server.url())
        .send_scholarship_report("meera@example.in", "Meera", &fallback_result())
        .await
        .unwrap_err();
    assert!(matches!(err, EmailError::ApiError(msg) if msg.starts_with("401")));
}
