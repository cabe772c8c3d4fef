use crate::models::{CalculateResponse, Scholarship, ScholarshipResult};

/// Advisory attached whenever the fallback result is served
pub const FALLBACK_NOTE: &str = "No direct matches found. Consultation recommended.";

/// Broad national schemes most students can apply to. Served when the
/// matching service yields nothing usable so the client always has a
/// top pick to render.
pub fn fallback_result() -> ScholarshipResult {
    ScholarshipResult {
        scholarships: vec![
            Scholarship {
                name: "Central Sector Scheme of Scholarships for College and University Students".to_string(),
                amount: "₹12,000 - ₹20,000 per year".to_string(),
                deadline: "Typically October-November (National Scholarship Portal)".to_string(),
                match_score: 60,
                one_liner_reason: "Merit-based central scheme open to top Class 12 scorers from low and middle income families.".to_string(),
                provider: Some("Ministry of Education, Government of India".to_string()),
                apply_url: Some("https://scholarships.gov.in".to_string()),
                strategy_tip: None,
            },
            Scholarship {
                name: "Post Matric Scholarship Schemes (State and Central)".to_string(),
                amount: "Tuition plus maintenance allowance".to_string(),
                deadline: "Varies by state".to_string(),
                match_score: 55,
                one_liner_reason: "Need-based support for reserved and economically weaker categories across most courses.".to_string(),
                provider: Some("National Scholarship Portal".to_string()),
                apply_url: Some("https://scholarships.gov.in".to_string()),
                strategy_tip: None,
            },
            Scholarship {
                name: "Private and CSR Scholarship Programmes".to_string(),
                amount: "Varies".to_string(),
                deadline: "Rolling".to_string(),
                match_score: 50,
                one_liner_reason: "Foundations and corporates fund many profiles not covered by government schemes; a counsellor can shortlist them.".to_string(),
                provider: None,
                apply_url: None,
                strategy_tip: Some("Book a consultation to get a personalised shortlist.".to_string()),
            },
        ],
        summary_probability: 50,
    }
}

/// Turn whatever the matcher produced into a response the client can always
/// parse: real matches pass through, `None` or an empty list become the
/// fallback result with an advisory note.
pub fn resolve_matches(result: Option<ScholarshipResult>) -> CalculateResponse {
    match result {
        Some(result) if !result.is_empty() => CalculateResponse {
            success: true,
            data: result,
            note: None,
        },
        _ => CalculateResponse {
            success: true,
            data: fallback_result(),
            note: Some(FALLBACK_NOTE.to_string()),
        },
    }
}
