// Adapters around the three external collaborators
pub mod email;
pub mod gemini;
pub mod sheets;

use async_trait::async_trait;
use crate::models::{LeadCapture, ScholarshipResult, UserProfile};

pub use email::{EmailClient, EmailError};
pub use gemini::{GeminiClient, GeminiError};
pub use sheets::{SheetsAuth, SheetsClient, SheetsError, ServiceAccountKey};

/// Produces scholarship matches for a profile
#[async_trait]
pub trait ScholarshipMatcher: Send + Sync {
    async fn get_scholarships(
        &self,
        profile: &UserProfile,
    ) -> Result<Option<ScholarshipResult>, GeminiError>;
}

/// Persists captured leads; the boolean reports whether the row was stored
#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn save_lead(&self, lead: &LeadCapture) -> Result<bool, SheetsError>;
}

/// Delivers the scholarship report email
#[async_trait]
pub trait ReportMailer: Send + Sync {
    async fn send_scholarship_report(
        &self,
        email: &str,
        name: &str,
        results: &ScholarshipResult,
    ) -> Result<(), EmailError>;
}
