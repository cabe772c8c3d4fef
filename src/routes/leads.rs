use actix_web::{web, HttpResponse};
use std::sync::Arc;
use validator::Validate;
use crate::error::ApiError;
use crate::models::{
    EmailTriggerError, LeadCapture, Object, ScholarshipResult, SendEmailRequest, SendEmailResponse,
    SubmitLeadResponse,
};
use crate::services::ReportMailer;
use super::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/submit-lead", web::post().to(submit_lead))
        .route("/send-email", web::post().to(send_email));
}

/// Schedule report delivery without awaiting it
///
/// The request never learns the outcome; failures end up in the log.
pub(crate) fn queue_report(
    mailer: Arc<dyn ReportMailer>,
    email: String,
    name: String,
    results: ScholarshipResult,
) {
    tokio::spawn(async move {
        match mailer.send_scholarship_report(&email, &name, &results).await {
            Ok(()) => tracing::info!(%email, "scholarship report sent"),
            Err(e) => tracing::error!(%email, error = %e, "scholarship report delivery failed"),
        }
    });
}

/// Submit lead endpoint
///
/// POST /api/submit-lead
///
/// Persists the lead, then queues the report email. The email is queued
/// whatever the store reports; only a store error aborts the request.
async fn submit_lead(
    state: web::Data<AppState>,
    web::Json(Object(lead)): web::Json<Object<LeadCapture>>,
) -> Result<HttpResponse, ApiError> {
    lead.validate()?;

    tracing::info!(email = %lead.email, "received lead");

    let sheets_saved = state.leads.save_lead(&lead).await.map_err(|e| {
        tracing::error!(email = %lead.email, error = %e, "lead submission failed");
        ApiError::Internal(format!("Unable to submit lead: {}", e))
    })?;

    tracing::info!(email = %lead.email, sheets_saved, "queuing scholarship report");

    let LeadCapture { name, email, scholarship_results, .. } = lead;
    queue_report(state.mailer.clone(), email.clone(), name, scholarship_results);

    Ok(HttpResponse::Ok().json(SubmitLeadResponse {
        success: true,
        message: "Lead submitted successfully. Check your email for the full report!".to_string(),
        email,
        sheets_saved,
    }))
}

/// Manual email trigger
///
/// POST /api/send-email
///
/// Request body:
/// ```json
/// { "email": "string", "name": "string", "scholarships": { ...ScholarshipResult } }
/// ```
async fn send_email(
    state: web::Data<AppState>,
    web::Json(Object(req)): web::Json<Object<SendEmailRequest>>,
) -> Result<HttpResponse, ApiError> {
    let trigger = req.into_trigger().map_err(|e| match e {
        EmailTriggerError::MissingFields => ApiError::BadRequest(e.to_string()),
        EmailTriggerError::MalformedScholarships(_) => {
            tracing::error!(error = %e, "manual email trigger rejected");
            ApiError::Internal("Unable to send email".to_string())
        }
    })?;

    tracing::info!(email = %trigger.email, "queuing manual scholarship report");

    queue_report(state.mailer.clone(), trigger.email, trigger.name, trigger.scholarships);

    Ok(HttpResponse::Ok().json(SendEmailResponse {
        success: true,
        message: "Email queued successfully".to_string(),
    }))
}
