use actix_web::{web, HttpResponse};
use validator::Validate;
use crate::core::resolve_matches;
use crate::error::ApiError;
use crate::models::{Object, UserProfile};
use super::AppState;

const CALCULATION_FAILED: &str = "Unable to calculate scholarships at this time.";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/calculate-scholarships", web::post().to(calculate_scholarships));
}

/// Calculate scholarships endpoint
///
/// POST /api/calculate-scholarships
///
/// Always answers `{success, data, note?}`: an empty or missing match list is
/// replaced by the fallback result. Matcher failures become a generic 500;
/// the underlying error is only logged.
async fn calculate_scholarships(
    state: web::Data<AppState>,
    web::Json(Object(profile)): web::Json<Object<UserProfile>>,
) -> Result<HttpResponse, ApiError> {
    profile.validate()?;

    tracing::info!(
        state = %profile.state,
        education_level = %profile.education_level,
        "calculating scholarships"
    );

    let result = state.matcher.get_scholarships(&profile).await.map_err(|e| {
        tracing::error!(error = %e, "scholarship calculation failed");
        ApiError::Internal(CALCULATION_FAILED.to_string())
    })?;

    let response = resolve_matches(result);
    if response.note.is_some() {
        tracing::info!("no direct matches, serving fallback result");
    }

    Ok(HttpResponse::Ok().json(response))
}
