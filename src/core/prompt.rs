use crate::models::{ScholarshipResult, UserProfile};

/// Build the matching prompt for a profile
///
/// Grounded search calls cannot ask for a JSON MIME type, so the expected
/// shape is spelled out in the prompt and parsed back out of free text by
/// [`parse_result`].
pub fn build_prompt(profile: &UserProfile, max_results: usize) -> String {
    let extracurriculars = if profile.extracurriculars.is_empty() {
        "none listed".to_string()
    } else {
        profile.extracurriculars.join(", ")
    };

    format!(
        r#"You are a scholarship counsellor for Indian students. Search for currently open scholarships
this student is eligible for and rank them by how likely the student is to win.

Student profile:
- Education level: {education_level}
- Field of study: {field_of_study}
- Academic percentage: {percentage:.1}%
- Annual family income: INR {income}
- State of domicile: {state}
- Category: {category}
- Gender: {gender}
- Person with disability: {disabled}
- Preferred study destination: {destination}
- Extracurriculars: {extracurriculars}

Return at most {max_results} scholarships. Respond with a single JSON object and nothing else:
{{
  "scholarships": [
    {{
      "name": "official scholarship name",
      "amount": "award amount with currency, e.g. ₹50,000/year",
      "deadline": "next application deadline",
      "match_score": 0-100,
      "one_liner_reason": "one sentence on why this student fits",
      "provider": "awarding body",
      "apply_url": "official application link",
      "strategy_tip": "one concrete tip to strengthen the application"
    }}
  ],
  "summary_probability": 0-100
}}
If nothing matches, return {{"scholarships": [], "summary_probability": 0}}."#,
        education_level = profile.education_level,
        field_of_study = profile.field_of_study,
        percentage = profile.academic_percentage,
        income = profile.annual_family_income,
        state = profile.state,
        category = profile.category,
        gender = profile.gender,
        disabled = if profile.is_disabled { "yes" } else { "no" },
        destination = profile.study_destination,
        extracurriculars = extracurriculars,
        max_results = max_results,
    )
}

/// Locate the JSON object inside model output
///
/// Prefers a fenced ```json block, otherwise the span from the first `{`
/// to the last `}`.
pub fn extract_json(text: &str) -> Option<&str> {
    if let Some(start) = text.find("```") {
        let after_fence = &text[start + 3..];
        let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
        let body = &after_fence[body_start..];
        if let Some(end) = body.find("```") {
            let candidate = body[..end].trim();
            if candidate.starts_with('{') {
                return Some(candidate);
            }
        }
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse model output into a result; `None` when no usable JSON is present
pub fn parse_result(text: &str) -> Option<ScholarshipResult> {
    let json = extract_json(text)?;
    match serde_json::from_str::<ScholarshipResult>(json) {
        Ok(result) => Some(result),
        Err(e) => {
            tracing::warn!(error = %e, "model output did not match the scholarship schema");
            None
        }
    }
}
