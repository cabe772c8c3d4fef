use crate::models::{Scholarship, ScholarshipResult};

/// Rendered scholarship report email
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Render the full report sent after lead capture
pub fn render_report(name: &str, results: &ScholarshipResult) -> Report {
    let count = results.scholarships.len();
    let first_name = name.split_whitespace().next().unwrap_or(name);

    let subject = match count {
        0 => format!("{}, your scholarship report is ready", first_name),
        1 => format!("{}, your scholarship match is ready", first_name),
        n => format!("{}, your {} scholarship matches are ready", first_name, n),
    };

    Report {
        subject,
        text: render_text(first_name, results),
        html: render_html(first_name, results),
    }
}

fn render_text(first_name: &str, results: &ScholarshipResult) -> String {
    let mut out = format!(
        "Hi {},\n\nHere is your full scholarship report. Estimated success probability: {}%.\n\n",
        first_name, results.summary_probability
    );

    for (idx, s) in results.scholarships.iter().enumerate() {
        out.push_str(&format!(
            "{}. {} ({}% match)\n   Amount: {}\n   Deadline: {}\n   Why you fit: {}\n",
            idx + 1,
            s.name,
            s.match_score,
            s.amount,
            s.deadline,
            s.one_liner_reason
        ));
        if let Some(provider) = &s.provider {
            out.push_str(&format!("   Provider: {}\n", provider));
        }
        if let Some(tip) = &s.strategy_tip {
            out.push_str(&format!("   Strategy: {}\n", tip));
        }
        if let Some(url) = &s.apply_url {
            out.push_str(&format!("   Apply: {}\n", url));
        }
        out.push('\n');
    }

    if results.scholarships.is_empty() {
        out.push_str("We could not find direct matches yet. Reply to this email to book a free consultation.\n\n");
    }

    out.push_str("All the best,\nScholarship Finder\n");
    out
}

fn render_html(first_name: &str, results: &ScholarshipResult) -> String {
    let mut out = format!(
        "<div style=\"font-family:Arial,sans-serif;max-width:640px;margin:auto\">\
         <h2>Hi {},</h2>\
         <p>Here is your full scholarship report.</p>\
         <p><strong>Estimated success probability: {}%</strong></p>",
        escape_html(first_name),
        results.summary_probability
    );

    for (idx, s) in results.scholarships.iter().enumerate() {
        out.push_str(&scholarship_card(idx, s));
    }

    if results.scholarships.is_empty() {
        out.push_str("<p>We could not find direct matches yet. Reply to this email to book a free consultation.</p>");
    }

    out.push_str("<p>All the best,<br/>Scholarship Finder</p></div>");
    out
}

fn scholarship_card(idx: usize, s: &Scholarship) -> String {
    let badge = if idx == 0 { " &#11088; Top Pick" } else { "" };
    let mut card = format!(
        "<div style=\"border:1px solid #e2e8f0;border-radius:8px;padding:16px;margin:12px 0\">\
         <h3 style=\"margin:0 0 8px\">{}{}</h3>\
         <p style=\"margin:4px 0\"><strong>{}</strong> &middot; Deadline: {} &middot; {}% match</p>\
         <p style=\"margin:4px 0\">{}</p>",
        escape_html(&s.name),
        badge,
        escape_html(&s.amount),
        escape_html(&s.deadline),
        s.match_score,
        escape_html(&s.one_liner_reason),
    );
    if let Some(provider) = &s.provider {
        card.push_str(&format!("<p style=\"margin:4px 0;color:#64748b\">{}</p>", escape_html(provider)));
    }
    if let Some(tip) = &s.strategy_tip {
        card.push_str(&format!("<p style=\"margin:4px 0\"><em>Strategy:</em> {}</p>", escape_html(tip)));
    }
    if let Some(url) = &s.apply_url {
        card.push_str(&format!("<p style=\"margin:4px 0\"><a href=\"{0}\">{0}</a></p>", escape_html(url)));
    }
    card.push_str("</div>");
    card
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
