// src/extract/structure.rs
//! Keyword-probe detection of CV sections
//!
//! Pure function over the cleaned text: four independent keyword alternations
//! produce boolean flags and a coarse confidence score used as prompt context
//! and as the quality analyzer's fallback signal.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static CONTACT_MARKERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"email|phone|mobile|address|@|\.com|\.org|\.net").expect("valid regex"));
static EXPERIENCE_MARKERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"experience|work|employment|job|position|role|company|employer").expect("valid regex")
});
static EDUCATION_MARKERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"education|degree|university|college|school|bachelor|master|phd|diploma|certificate")
        .expect("valid regex")
});
static SKILLS_MARKERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"skills|technologies|tools|programming|languages|frameworks|software")
        .expect("valid regex")
});

/// Structure signals derived deterministically from the cleaned text
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureSignals {
    /// One of 0, 25, 50, 75, 100: four flags, no partial credit
    pub confidence: u8,
    pub has_contact_info: bool,
    pub has_experience: bool,
    pub has_education: bool,
    pub has_skills: bool,
}

/// Scan cleaned text for the presence of contact, experience, education and
/// skills sections
pub fn detect_document_structure(text: &str) -> StructureSignals {
    let lower_text = text.to_lowercase();

    let has_contact_info = CONTACT_MARKERS.is_match(&lower_text);
    let has_experience = EXPERIENCE_MARKERS.is_match(&lower_text);
    let has_education = EDUCATION_MARKERS.is_match(&lower_text);
    let has_skills = SKILLS_MARKERS.is_match(&lower_text);

    let detected_sections = [has_contact_info, has_experience, has_education, has_skills]
        .iter()
        .filter(|&&flag| flag)
        .count() as u8;
    let confidence = detected_sections * 25;

    StructureSignals {
        confidence,
        has_contact_info,
        has_experience,
        has_education,
        has_skills,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_has_zero_confidence() {
        let signals = detect_document_structure("");
        assert_eq!(signals.confidence, 0);
        assert!(!signals.has_contact_info);
        assert!(!signals.has_experience);
        assert!(!signals.has_education);
        assert!(!signals.has_skills);
    }

    #[test]
    fn test_full_cv_has_full_confidence() {
        let text = "Email: jane@example.com\nWork Experience\nEducation\nSkills: Rust";
        let signals = detect_document_structure(text);
        assert_eq!(signals.confidence, 100);
    }

    #[test]
    fn test_detection_is_case_insensitive() {
        let signals = detect_document_structure("EDUCATION: PHD");
        assert!(signals.has_education);
    }

    #[test]
    fn test_confidence_is_quantized() {
        let samples = [
            "",
            "jane@example.com",
            "jane@example.com work history",
            "jane@example.com work history university",
            "jane@example.com work history university skills",
        ];
        for (i, sample) in samples.iter().enumerate() {
            let signals = detect_document_structure(sample);
            assert_eq!(signals.confidence, (i as u8) * 25);
        }
    }
}
