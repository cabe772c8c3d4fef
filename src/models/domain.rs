use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

/// Academic and demographic profile submitted for matching
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserProfile {
    #[validate(length(min = 1, message = "education_level is required"))]
    pub education_level: String,
    #[validate(length(min = 1, message = "field_of_study is required"))]
    pub field_of_study: String,
    #[validate(range(min = 0.0, max = 100.0, message = "academic_percentage must be between 0 and 100"))]
    pub academic_percentage: f32,
    /// Annual family income in INR
    pub annual_family_income: u64,
    #[validate(length(min = 1, message = "state is required"))]
    pub state: String,
    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,
    #[validate(length(min = 1, message = "gender is required"))]
    pub gender: String,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(default = "default_destination")]
    pub study_destination: String,
    #[serde(default)]
    pub extracurriculars: Vec<String>,
}

fn default_destination() -> String { "India".to_string() }

/// A single scholarship match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scholarship {
    pub name: String,
    pub amount: String,
    pub deadline: String,
    #[serde(deserialize_with = "deserialize_percentage")]
    pub match_score: u8,
    pub one_liner_reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy_tip: Option<String>,
}

/// Collection of matches returned by the matching service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScholarshipResult {
    #[serde(deserialize_with = "deserialize_objects")]
    pub scholarships: Vec<Scholarship>,
    #[serde(deserialize_with = "deserialize_percentage")]
    pub summary_probability: u8,
}

impl ScholarshipResult {
    pub fn is_empty(&self) -> bool {
        self.scholarships.is_empty()
    }

    pub fn top_pick(&self) -> Option<&Scholarship> {
        self.scholarships.first()
    }

    /// Highest match score first, capped at `limit` entries
    pub fn ranked(mut self, limit: usize) -> Self {
        self.scholarships
            .sort_by(|a, b| b.match_score.cmp(&a.match_score));
        self.scholarships.truncate(limit);
        self
    }
}

/// Contact details plus the results the visitor was shown
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LeadCapture {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: String,
    #[validate(length(min = 1, message = "phone is required"))]
    pub phone: String,
    /// Profile snapshot as the client sent it; stored verbatim
    #[serde(default)]
    pub user_profile: Value,
    #[serde(deserialize_with = "deserialize_object")]
    pub scholarship_results: ScholarshipResult,
}

/// JSON body that must be an object.
///
/// Derived struct deserializers also accept arrays and fill fields by
/// position, so `[[], 50]` would otherwise decode as a `ScholarshipResult`.
#[derive(Debug, Clone)]
pub struct Object<T>(pub T);

impl<'de, T: DeserializeOwned> Deserialize<'de> for Object<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_object(deserializer).map(Object)
    }
}

fn from_map<T: DeserializeOwned>(map: Map<String, Value>) -> Result<T, serde_json::Error> {
    T::deserialize(Value::Object(map))
}

fn deserialize_object<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let map = Map::<String, Value>::deserialize(deserializer)?;
    from_map(map).map_err(D::Error::custom)
}

fn deserialize_objects<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Vec::<Map<String, Value>>::deserialize(deserializer)?
        .into_iter()
        .map(|map| from_map(map).map_err(D::Error::custom))
        .collect()
}

/// Accepts `85`, `85.4`, `"85"` or `"85%"`, rounded and clamped to 0..=100
fn deserialize_percentage<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    let value = match &raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
    .ok_or_else(|| D::Error::custom(format!("expected a percentage, got {}", raw)))?;

    Ok(value.round().clamp(0.0, 100.0) as u8)
}
