//! Scholarship Finder - matching backend for Indian students
//!
//! Forwards student profiles to a generative AI matcher, records leads in
//! Google Sheets and emails full reports in the background. Every response
//! the calculate endpoint produces is a valid result, falling back to a
//! static set of national schemes when the matcher finds nothing.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod server;
pub mod services;

// Re-export commonly used types
pub use crate::core::{fallback_result, resolve_matches, FALLBACK_NOTE};
pub use error::ApiError;
pub use models::{UserProfile, Scholarship, ScholarshipResult, LeadCapture};
pub use routes::AppState;
