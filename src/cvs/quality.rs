// src/cvs/quality.rs
//! Document quality assessment
//!
//! Model path asks for a scored JSON report; the fallback scores the document
//! from its structural signals alone.

use tracing::{info, warn};

use crate::cvs::models::QualityReport;
use crate::cvs::structurer::{parse_json_reply, DegradedError};
use crate::extract::detect_document_structure;
use crate::services::OpenAiService;

const SYSTEM_PROMPT: &str = "You are an expert CV/Resume reviewer. Provide constructive, \
    actionable feedback. Always return valid JSON without any additional text.";

/// Score the CV and list strengths/weaknesses/suggestions. Never fails
/// outward.
pub async fn analyze_cv_quality(openai: &OpenAiService, cv_text: &str) -> QualityReport {
    match analyze_with_model(openai, cv_text).await {
        Ok(report) => {
            info!(score = report.overall_score, "CV quality analyzed via model");
            report
        }
        Err(e) => {
            warn!(error = %e, "Quality analysis degraded to heuristic scoring");
            analyze_cv_quality_fallback(cv_text)
        }
    }
}

async fn analyze_with_model(
    openai: &OpenAiService,
    cv_text: &str,
) -> Result<QualityReport, DegradedError> {
    let prompt = format!(
        r#"Analyze the quality of this CV/Resume and return a JSON object with this exact structure:

{{
  "overallScore": 75,
  "strengths": ["array of specific strengths found in the CV"],
  "weaknesses": ["array of specific weaknesses or gaps"],
  "suggestions": ["array of actionable improvement suggestions"]
}}

SCORING CRITERIA:
- overallScore is an integer from 0 to 100
- Consider completeness of contact information, work experience, education, and skills
- Consider clarity, structure, and professional presentation
- Consider quantified achievements and concrete details

CV TEXT:
{cv_text}

Return ONLY the JSON object:"#
    );

    let reply = openai.complete(SYSTEM_PROMPT, &prompt, 0.3, 1000).await?;
    let mut report: QualityReport = parse_json_reply(&reply)?;
    report.overall_score = report.overall_score.min(100);
    Ok(report)
}

/// Heuristic scoring from structural signals: base 70, bonuses per detected
/// section, matching weakness/suggestion pairs for whatever is missing
pub fn analyze_cv_quality_fallback(cv_text: &str) -> QualityReport {
    let structure = detect_document_structure(cv_text);

    let mut score: u8 = 70;
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let mut suggestions = Vec::new();

    if structure.has_contact_info {
        score += 10;
        strengths.push("Contact information present".to_string());
    } else {
        weaknesses.push("Missing contact information".to_string());
        suggestions.push("Add email and phone number".to_string());
    }

    if structure.has_experience {
        score += 10;
        strengths.push("Work experience included".to_string());
    } else {
        weaknesses.push("No work experience found".to_string());
        suggestions.push("Include relevant work experience".to_string());
    }

    if structure.has_education {
        score += 5;
        strengths.push("Education section present".to_string());
    } else {
        weaknesses.push("Education information missing".to_string());
        suggestions.push("Add educational background".to_string());
    }

    if structure.has_skills {
        score += 5;
        strengths.push("Skills section identified".to_string());
    } else {
        weaknesses.push("Skills not clearly listed".to_string());
        suggestions.push("Add a dedicated skills section".to_string());
    }

    if structure.confidence > 80 {
        strengths.push("High document structure confidence".to_string());
    }

    QualityReport {
        overall_score: score.min(100),
        strengths,
        weaknesses,
        suggestions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_full_document_scores_100() {
        let text = "Email: a@b.com\nExperience at a company\nEducation: university\nSkills: tools";
        let report = analyze_cv_quality_fallback(text);

        assert_eq!(report.overall_score, 100);
        // all four section strengths plus the confidence note
        assert_eq!(report.strengths.len(), 5);
        assert!(report.weaknesses.is_empty());
        assert!(report.suggestions.is_empty());
    }

    #[test]
    fn test_fallback_empty_document_scores_base() {
        let report = analyze_cv_quality_fallback("");

        assert_eq!(report.overall_score, 70);
        assert!(report.strengths.is_empty());
        assert_eq!(report.weaknesses.len(), 4);
        assert_eq!(report.suggestions.len(), 4);
    }

    #[test]
    fn test_fallback_pairs_weaknesses_with_suggestions() {
        let text = "Experience: engineer at a company\nSkills: programming";
        let report = analyze_cv_quality_fallback(text);

        assert_eq!(report.weaknesses.len(), report.suggestions.len());
        assert!(report
            .weaknesses
            .iter()
            .any(|w| w.contains("contact information")));
        assert!(report.suggestions.iter().any(|s| s.contains("email")));
    }
}
