use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use crate::models::domain::{Object, ScholarshipResult};

/// Loosely typed body of the manual email trigger
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendEmailRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub scholarships: Option<Value>,
}

/// Required fields present and non-empty, scholarships still untyped
#[derive(Debug, Clone, PartialEq)]
pub struct RawEmailFields {
    pub email: String,
    pub name: String,
    pub scholarships: Value,
}

/// Fully typed manual email job
#[derive(Debug, Clone, PartialEq)]
pub struct EmailTrigger {
    pub email: String,
    pub name: String,
    pub scholarships: ScholarshipResult,
}

#[derive(Debug, Error)]
pub enum EmailTriggerError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Malformed scholarship data: {0}")]
    MalformedScholarships(#[from] serde_json::Error),
}

impl SendEmailRequest {
    /// Stage one: presence check. Empty strings, `null`, empty objects and
    /// empty arrays all count as missing; whitespace-only strings do not.
    pub fn require_fields(self) -> Result<RawEmailFields, EmailTriggerError> {
        let email = non_empty(self.email).ok_or(EmailTriggerError::MissingFields)?;
        let name = non_empty(self.name).ok_or(EmailTriggerError::MissingFields)?;
        let scholarships = self
            .scholarships
            .filter(is_present)
            .ok_or(EmailTriggerError::MissingFields)?;

        Ok(RawEmailFields { email, name, scholarships })
    }

    /// Both stages
    pub fn into_trigger(self) -> Result<EmailTrigger, EmailTriggerError> {
        self.require_fields()?.into_trigger()
    }
}

impl RawEmailFields {
    /// Stage two: shape check against `ScholarshipResult`, which must be a JSON object
    pub fn into_trigger(self) -> Result<EmailTrigger, EmailTriggerError> {
        let Object(scholarships) = serde_json::from_value::<Object<ScholarshipResult>>(self.scholarships)?;
        Ok(EmailTrigger {
            email: self.email,
            name: self.name,
            scholarships,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
    }
}
