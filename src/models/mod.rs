// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{UserProfile, Scholarship, ScholarshipResult, LeadCapture, Object};
pub use requests::{SendEmailRequest, RawEmailFields, EmailTrigger, EmailTriggerError};
pub use responses::{HealthResponse, CalculateResponse, SubmitLeadResponse, SendEmailResponse, ErrorResponse};
