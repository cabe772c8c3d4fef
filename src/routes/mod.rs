// Route exports
pub mod health;
pub mod leads;
pub mod scholarships;

use actix_web::web;
use std::sync::Arc;
use crate::services::{LeadStore, ReportMailer, ScholarshipMatcher};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub service_name: String,
    pub matcher: Arc<dyn ScholarshipMatcher>,
    pub leads: Arc<dyn LeadStore>,
    pub mailer: Arc<dyn ReportMailer>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure).service(
        web::scope("/api")
            .configure(scholarships::configure)
            .configure(leads::configure),
    );
}
