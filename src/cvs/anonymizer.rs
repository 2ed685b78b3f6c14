// src/cvs/anonymizer.rs
//! Personal-information removal from raw CV text
//!
//! The model-backed path asks for bracketed placeholder substitution; the
//! fallback applies a fixed, ordered set of regex substitutions. Either way
//! the caller always gets redacted text back.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{info, warn};

use crate::cvs::structurer::DegradedError;
use crate::services::OpenAiService;

const SYSTEM_PROMPT: &str = "You are a privacy-focused assistant that removes personal \
    information from documents while preserving their professional value. Return only the \
    processed text without any additional comments.";

/// Redact identifying details from CV text. Never fails outward.
pub async fn remove_personal_info(openai: &OpenAiService, cv_text: &str) -> String {
    match remove_with_model(openai, cv_text).await {
        Ok(redacted) => {
            info!(
                original_chars = cv_text.len(),
                redacted_chars = redacted.len(),
                "Personal info removed via model"
            );
            redacted
        }
        Err(e) => {
            warn!(error = %e, "Anonymization degraded to regex fallback");
            remove_personal_info_fallback(cv_text)
        }
    }
}

async fn remove_with_model(openai: &OpenAiService, cv_text: &str) -> Result<String, DegradedError> {
    let prompt = format!(
        r#"Remove all personal identifying information from this CV/Resume text while preserving the professional content.

REMOVE:
- Full names (replace with "[CANDIDATE NAME]")
- Email addresses (replace with "[EMAIL]")
- Phone numbers (replace with "[PHONE]")
- Home addresses (replace with "[ADDRESS]")
- Personal websites/portfolios (replace with "[WEBSITE]")
- LinkedIn profiles (replace with "[LINKEDIN]")

KEEP:
- All work experience, job titles, and company names
- All education details and institution names
- All skills and technologies
- Professional achievements and certifications
- Dates and durations

CV TEXT:
{cv_text}

Return the processed text with personal information removed:"#
    );

    let reply = openai.complete(SYSTEM_PROMPT, &prompt, 0.1, 2000).await?;
    Ok(reply.trim().to_string())
}

static EMAIL_SUB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid regex")
});
static PHONE_SUB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b").expect("valid regex"));
static NAME_SUB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][a-z]+ [A-Z][a-z]+(?: [A-Z][a-z]+)?\b").expect("valid regex"));
static LINKEDIN_SUB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"linkedin\.com/in/[A-Za-z0-9-]+").expect("valid regex"));
static WEBSITE_SUB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid regex"));

/// Ordered regex substitution. Emails and phones go first so the looser name
/// and website patterns cannot eat into them.
pub fn remove_personal_info_fallback(cv_text: &str) -> String {
    let redacted = EMAIL_SUB.replace_all(cv_text, "[EMAIL]");
    let redacted = PHONE_SUB.replace_all(&redacted, "[PHONE]");
    let redacted = NAME_SUB.replace_all(&redacted, "[CANDIDATE NAME]");
    let redacted = LINKEDIN_SUB.replace_all(&redacted, "[LINKEDIN]");
    let redacted = WEBSITE_SUB.replace_all(&redacted, "[WEBSITE]");
    redacted.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_redacts_contact_details() {
        let text = "Contact Jane Doe at jane.doe@example.com or 555-123-4567";
        let redacted = remove_personal_info_fallback(text);

        assert!(redacted.contains("[CANDIDATE NAME]"));
        assert!(redacted.contains("[EMAIL]"));
        assert!(redacted.contains("[PHONE]"));
        assert!(!redacted.contains("Jane Doe"));
        assert!(!redacted.contains("jane.doe@example.com"));
        assert!(!redacted.contains("555-123-4567"));
    }

    #[test]
    fn test_fallback_redacts_links() {
        let text = "See linkedin.com/in/jane-doe or https://janedoe.dev for more";
        let redacted = remove_personal_info_fallback(text);

        assert!(redacted.contains("[LINKEDIN]"));
        assert!(redacted.contains("[WEBSITE]"));
        assert!(!redacted.contains("jane-doe"));
    }

    #[test]
    fn test_fallback_keeps_professional_content() {
        let text = "Senior developer, 8 years with SQL and Docker.";
        let redacted = remove_personal_info_fallback(text);
        assert!(redacted.contains("SQL"));
        assert!(redacted.contains("Docker"));
    }
}
