// Request-independent logic: fallback guarantee, prompt handling, report rendering
pub mod fallback;
pub mod prompt;
pub mod report;

pub use fallback::{fallback_result, resolve_matches, FALLBACK_NOTE};
pub use prompt::{build_prompt, extract_json, parse_result};
pub use report::{render_report, Report};
