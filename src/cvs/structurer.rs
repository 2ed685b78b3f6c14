// src/cvs/structurer.rs
//! CV structuring: model-backed extraction with a deterministic fallback
//!
//! `extract_cv_data` never fails outward. The primary path prompts the
//! language model for a single JSON candidate record; any failure along the
//! way (missing key, network, rate limit, malformed reply) degrades to the
//! regex/heuristic fallback extractor, which always fabricates a minimally
//! valid record.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{info, warn};

use crate::cvs::models::{
    Candidate, CvSection, EducationEntry, ExperienceEntry, LinkedInQuestion,
};
use crate::extract::{
    detect_document_structure, extract_contact_info, ContactSignals, StructureSignals,
};
use crate::services::openai::OpenAIError;
use crate::services::OpenAiService;

/// Why a model-backed stage fell back to its deterministic path
#[derive(Debug, thiserror::Error)]
pub(crate) enum DegradedError {
    #[error("model call failed: {0}")]
    Model(#[from] OpenAIError),

    #[error("model reply was not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Strip a markdown code fence if the model wrapped its JSON in one
pub(crate) fn strip_code_fences(reply: &str) -> &str {
    let trimmed = reply.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix("```").unwrap_or(trimmed);
    trimmed.trim()
}

/// Strict JSON parse of a model reply. No brace-slicing: a reply that is not
/// a JSON document after fence stripping is a structured parse error, which
/// callers turn into their fallback path.
pub(crate) fn parse_json_reply<T: DeserializeOwned>(reply: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(strip_code_fences(reply))
}

/// Partial candidate as the model returns it; every field optional so a
/// sparse reply still parses and merges over defaults
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LlmCandidate {
    full_name: Option<String>,
    title: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    location: Option<String>,
    website: Option<String>,
    profile_pic: Option<String>,
    summary: Option<String>,
    section_order: Option<Vec<CvSection>>,
    skills: Option<Vec<String>>,
    education: Option<Vec<EducationEntry>>,
    experience: Option<Vec<ExperienceEntry>>,
    cultural_fit_rating: Option<f64>,
    linkedin_questions: Option<Vec<LinkedInQuestion>>,
}

const SYSTEM_PROMPT: &str = "You are a professional CV data extraction assistant with expertise in \
    parsing resumes and extracting structured information. Always return valid JSON without any \
    additional text or explanations.";

/// Structure cleaned CV text into a candidate record. Never fails outward.
pub async fn extract_cv_data(openai: &OpenAiService, cv_text: &str) -> Candidate {
    let structure = detect_document_structure(cv_text);
    let contact = extract_contact_info(cv_text);

    match extract_with_model(openai, cv_text, &structure, &contact).await {
        Ok(candidate) => {
            info!(
                confidence = structure.confidence,
                skills = candidate.skills.len(),
                experience = candidate.experience.len(),
                "CV structured via model"
            );
            candidate
        }
        Err(e) => {
            warn!(error = %e, "CV structuring degraded to fallback extraction");
            extract_cv_data_fallback(cv_text, &contact)
        }
    }
}

async fn extract_with_model(
    openai: &OpenAiService,
    cv_text: &str,
    structure: &StructureSignals,
    contact: &ContactSignals,
) -> Result<Candidate, DegradedError> {
    let prompt = build_extraction_prompt(cv_text, structure, contact);
    let reply = openai.complete(SYSTEM_PROMPT, &prompt, 0.2, 3000).await?;
    let parsed: LlmCandidate = parse_json_reply(&reply)?;
    Ok(merge_with_defaults(parsed, contact))
}

fn build_extraction_prompt(
    cv_text: &str,
    structure: &StructureSignals,
    contact: &ContactSignals,
) -> String {
    format!(
        r#"You are an advanced CV/Resume data extraction system.

DOCUMENT ANALYSIS:
- Document confidence: {confidence}%
- Has contact info: {has_contact}
- Has experience: {has_experience}
- Has education: {has_education}
- Has skills: {has_skills}

EXTRACTED CONTACT INFO:
- Email: {email}
- Phone: {phone}
- Name: {name}
- Location: {location}

TASK: Extract comprehensive information from this CV/Resume and return it as a JSON object matching this exact structure:

{{
  "fullName": "string (extract from document or use provided name)",
  "title": "string (current or most recent job title/position)",
  "email": "string (extract email address)",
  "phone": "string (extract phone number)",
  "location": "string (city, state/province, country)",
  "website": "string (personal website/portfolio if available)",
  "profilePic": "string (leave empty, will be handled separately)",
  "summary": "string (professional summary/objective, generate if not present)",
  "sectionOrder": ["skills", "experience", "education"],
  "skills": ["array", "of", "technical", "and", "soft", "skills"],
  "education": [
    {{"school": "string", "degree": "string", "period": "string (e.g., 2018-2022)"}}
  ],
  "experience": [
    {{"company": "string", "role": "string", "period": "string (e.g., 2020-Present)", "details": ["array", "of", "achievements"]}}
  ],
  "culturalFitRating": 4,
  "linkedinQuestions": [
    {{"id": "1", "question": "string", "answer": "string (generated from the candidate's background)", "category": "personal"}}
  ]
}}

EXTRACTION RULES:
1. Extract ALL available information from the CV text
2. For missing information, use reasonable defaults or empty strings
3. Generate a professional summary if not present, based on experience and skills
4. Identify and extract technical skills, soft skills, and tools/technologies
5. Parse work experience with company names, roles, dates, and key achievements
6. Extract education details including institutions, degrees, and graduation periods
7. Generate exactly 5 LinkedIn-style questions with contextual answers based on the candidate's background
8. Set culturalFitRating (1-5) based on experience level, skills diversity, and professional achievements
9. Ensure all dates are in consistent format (YYYY-YYYY or YYYY-Present)
10. Return ONLY valid JSON, no additional text or explanations

CV TEXT TO ANALYZE:
{cv_text}

Return the extracted data as a valid JSON object:"#,
        confidence = structure.confidence,
        has_contact = structure.has_contact_info,
        has_experience = structure.has_experience,
        has_education = structure.has_education,
        has_skills = structure.has_skills,
        email = contact.email.as_deref().unwrap_or("Not found"),
        phone = contact.phone.as_deref().unwrap_or("Not found"),
        name = contact.name.as_deref().unwrap_or("Not found"),
        location = contact.location.as_deref().unwrap_or("Not found"),
        cv_text = cv_text,
    )
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Merge the model's partial record over deterministic defaults: contact
/// fields fall back to the regex-derived signals and then to placeholders;
/// summary/order/rating/questions fall back to the generators
fn merge_with_defaults(parsed: LlmCandidate, contact: &ContactSignals) -> Candidate {
    let skills = parsed.skills.unwrap_or_default();
    let education = parsed.education.unwrap_or_default();
    let experience = parsed.experience.unwrap_or_default();

    let section_order = match parsed.section_order {
        Some(order) if !order.is_empty() => order,
        _ => determine_section_order(!skills.is_empty(), !experience.is_empty(), !education.is_empty()),
    };

    let summary = non_empty(parsed.summary)
        .unwrap_or_else(|| generate_default_summary(experience.len(), skills.len()));

    let cultural_fit_rating = match parsed.cultural_fit_rating {
        Some(rating) => (rating.round() as i64).clamp(1, 5) as u8,
        None => calculate_cultural_fit(experience.len(), skills.len(), education.len()),
    };

    let linkedin_questions = match parsed.linkedin_questions {
        Some(questions) if questions.len() == 5 => questions,
        _ => fallback_linkedin_questions(),
    };

    Candidate {
        full_name: non_empty(parsed.full_name)
            .or_else(|| contact.name.clone())
            .unwrap_or_else(|| "Unknown Candidate".to_string()),
        title: non_empty(parsed.title).unwrap_or_else(|| "Professional".to_string()),
        email: non_empty(parsed.email)
            .or_else(|| contact.email.clone())
            .unwrap_or_else(|| "email@example.com".to_string()),
        phone: non_empty(parsed.phone)
            .or_else(|| contact.phone.clone())
            .unwrap_or_else(|| "+1 (000) 000-0000".to_string()),
        location: non_empty(parsed.location)
            .or_else(|| contact.location.clone())
            .unwrap_or_else(|| "Location Not Specified".to_string()),
        website: non_empty(parsed.website).unwrap_or_default(),
        profile_pic: non_empty(parsed.profile_pic).unwrap_or_default(),
        summary,
        section_order,
        skills,
        education,
        experience,
        cultural_fit_rating,
        linkedin_questions,
    }
}

// ============================================================================
// Fallback extraction (no model, or primary path failed)
// ============================================================================

static NAME_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-z]+ [A-Z][a-z]+(?: [A-Z][a-z]+)?$").expect("valid regex"));
static NON_NAME_KEYWORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)email|phone|address|experience|education|skills").expect("valid regex"));
static COMPANY_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Za-z\s&]+$").expect("valid regex"));
static BULLET_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\u{2022}\u{00b7}\u{25aa}\u{25ab}\-*]\s").expect("valid regex"));
static INSTITUTION_KEYWORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)university|college|institute|school").expect("valid regex"));
static DEGREE_KEYWORDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)bachelor|master|phd|diploma|certificate").expect("valid regex"));

static SKILL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)javascript|js|react|angular|vue|node\.js|python|java|c\+\+|c#|php|ruby|go|rust|swift|kotlin",
        r"(?i)html|css|sass|less|bootstrap|tailwind|material-ui",
        r"(?i)sql|mysql|postgresql|mongodb|redis|elasticsearch",
        r"(?i)docker|kubernetes|aws|azure|gcp|heroku",
        r"(?i)git|github|gitlab|bitbucket|jenkins|ci/cd",
        r"(?i)agile|scrum|kanban|waterfall",
        r"(?i)leadership|management|communication|teamwork",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid regex"))
    .collect()
});

/// Deterministic extraction used when the model is unavailable or its reply
/// is unusable. Always returns a structurally valid record.
pub fn extract_cv_data_fallback(cv_text: &str, contact: &ContactSignals) -> Candidate {
    let lines: Vec<&str> = cv_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let full_name = lines
        .iter()
        .find(|line| NAME_LINE.is_match(line) && !NON_NAME_KEYWORDS.is_match(line))
        .map(|line| line.to_string())
        .or_else(|| contact.name.clone())
        .unwrap_or_else(|| "Unknown Candidate".to_string());

    let skills = extract_skills_from_text(cv_text);
    let experience = extract_experience_from_text(cv_text);
    let education = extract_education_from_text(cv_text);

    let summary = generate_default_summary(experience.len(), skills.len());
    let section_order =
        determine_section_order(!skills.is_empty(), !experience.is_empty(), !education.is_empty());
    let cultural_fit_rating =
        calculate_cultural_fit(experience.len(), skills.len(), education.len());

    Candidate {
        full_name,
        title: "Professional".to_string(),
        email: contact
            .email
            .clone()
            .unwrap_or_else(|| "email@example.com".to_string()),
        phone: contact
            .phone
            .clone()
            .unwrap_or_else(|| "+1 (000) 000-0000".to_string()),
        location: contact
            .location
            .clone()
            .unwrap_or_else(|| "Location Not Specified".to_string()),
        website: String::new(),
        profile_pic: String::new(),
        summary,
        section_order,
        skills,
        education,
        experience,
        cultural_fit_rating,
        linkedin_questions: fallback_linkedin_questions(),
    }
}

/// Union of matches across the fixed category battery, case-folded, capped at
/// ten entries in first-match insertion order
pub fn extract_skills_from_text(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut skills = Vec::new();

    for pattern in SKILL_PATTERNS.iter() {
        for found in pattern.find_iter(text) {
            let skill = found.as_str().to_lowercase();
            if seen.insert(skill.clone()) {
                skills.push(skill);
            }
        }
    }

    skills.truncate(10);
    skills
}

/// Line-scan heuristic: a company-looking line opens an entry, bullet lines
/// append details, the next company line closes it
pub fn extract_experience_from_text(text: &str) -> Vec<ExperienceEntry> {
    let mut experience: Vec<ExperienceEntry> = Vec::new();
    let mut current: Option<ExperienceEntry> = None;

    for raw_line in text.lines() {
        let line = raw_line.trim();

        if COMPANY_LINE.is_match(line) && line.len() > 3 && line.len() < 50 {
            if let Some(entry) = current.take() {
                experience.push(entry);
            }
            current = Some(ExperienceEntry {
                company: line.to_string(),
                role: "Professional".to_string(),
                period: "2020-Present".to_string(),
                details: Vec::new(),
            });
        } else if let Some(entry) = current.as_mut() {
            if BULLET_PREFIX.is_match(line) {
                entry
                    .details
                    .push(BULLET_PREFIX.replace(line, "").to_string());
            }
        }
    }

    if let Some(entry) = current.take() {
        experience.push(entry);
    }

    if experience.is_empty() {
        experience.push(ExperienceEntry {
            company: "Example Company".to_string(),
            role: "Professional".to_string(),
            period: "2020-Present".to_string(),
            details: vec![
                "Demonstrated expertise in various professional areas".to_string(),
                "Contributed to team success and project delivery".to_string(),
            ],
        });
    }

    experience
}

/// Any line carrying an institution or degree keyword becomes one entry
pub fn extract_education_from_text(text: &str) -> Vec<EducationEntry> {
    let mut education: Vec<EducationEntry> = text
        .lines()
        .map(str::trim)
        .filter(|line| {
            !line.is_empty()
                && (INSTITUTION_KEYWORDS.is_match(line) || DEGREE_KEYWORDS.is_match(line))
        })
        .map(|line| EducationEntry {
            school: line.to_string(),
            degree: "Degree".to_string(),
            period: "2018-2022".to_string(),
        })
        .collect();

    if education.is_empty() {
        education.push(EducationEntry {
            school: "University".to_string(),
            degree: "Bachelor's Degree".to_string(),
            period: "2018-2022".to_string(),
        });
    }

    education
}

/// Templated summary keyed on which counts are nonzero
pub fn generate_default_summary(experience_count: usize, skills_count: usize) -> String {
    if experience_count > 0 && skills_count > 0 {
        format!(
            "Experienced professional with {} years of experience and expertise in {} key areas. \
             Demonstrated track record of delivering results and contributing to organizational success.",
            experience_count, skills_count
        )
    } else if experience_count > 0 {
        format!(
            "Professional with {} years of experience in various roles. \
             Committed to continuous learning and professional development.",
            experience_count
        )
    } else {
        "Motivated professional seeking opportunities to apply skills and contribute to organizational success."
            .to_string()
    }
}

/// Fixed decision table keyed by which sections are non-empty
pub fn determine_section_order(
    has_skills: bool,
    has_experience: bool,
    has_education: bool,
) -> Vec<CvSection> {
    match (has_skills, has_experience, has_education) {
        (true, true, true) => vec![CvSection::Skills, CvSection::Experience, CvSection::Education],
        (false, true, true) => vec![CvSection::Experience, CvSection::Skills, CvSection::Education],
        (true, false, true) => vec![CvSection::Skills, CvSection::Education, CvSection::Experience],
        _ => vec![CvSection::Experience, CvSection::Education, CvSection::Skills],
    }
}

/// Base 3, bumped by experience/skills volume and education presence, clamped
/// to the 1..=5 rating scale
pub fn calculate_cultural_fit(
    experience_count: usize,
    skills_count: usize,
    education_count: usize,
) -> u8 {
    let mut score: u8 = 3;

    if experience_count > 2 {
        score += 1;
    }
    if experience_count > 5 {
        score += 1;
    }
    if skills_count > 5 {
        score += 1;
    }
    if skills_count > 10 {
        score += 1;
    }
    if education_count > 0 {
        score += 1;
    }

    score.clamp(1, 5)
}

/// Fixed, non-personalized question set used on the fallback path. The
/// `fallback-` id prefix marks these as synthetic placeholder content.
pub fn fallback_linkedin_questions() -> Vec<LinkedInQuestion> {
    vec![
        LinkedInQuestion {
            id: "fallback-1".to_string(),
            question: "What motivates you to work in a global environment?".to_string(),
            answer: "My passion for innovation and cross-cultural collaboration drives me to work \
                     with global firms. I believe technology can bridge cultural gaps and create \
                     meaningful impact worldwide."
                .to_string(),
            category: "personal".to_string(),
        },
        LinkedInQuestion {
            id: "fallback-2".to_string(),
            question: "How has your upbringing or background shaped your approach to building \
                       professional relationships?"
                .to_string(),
            answer: "Growing up in a diverse community taught me to value different perspectives \
                     and communicate effectively across cultural boundaries. This helps me build \
                     authentic professional relationships."
                .to_string(),
            category: "personal".to_string(),
        },
        LinkedInQuestion {
            id: "fallback-3".to_string(),
            question: "What's a personal story you'd share on LinkedIn to showcase your journey?"
                .to_string(),
            answer: "I'd share about my first hackathon where I collaborated with developers from \
                     5 different countries. Despite language barriers, we created an accessibility \
                     tool that won first place - showing how diversity fuels innovation."
                .to_string(),
            category: "linkedin".to_string(),
        },
        LinkedInQuestion {
            id: "fallback-4".to_string(),
            question: "How do you define success in your personal and professional life?"
                .to_string(),
            answer: "Success means creating technology that makes a positive impact while \
                     continuously learning and growing. Large firms offer the scale and resources \
                     to achieve meaningful change globally."
                .to_string(),
            category: "linkedin".to_string(),
        },
        LinkedInQuestion {
            id: "fallback-5".to_string(),
            question: "What personal qualities do you bring to a team, and how have you developed \
                       them through your experiences?"
                .to_string(),
            answer: "I bring adaptability, empathy, and a growth mindset. Working on open-source \
                     projects with international contributors taught me to appreciate different \
                     working styles and time zones."
                .to_string(),
            category: "linkedin".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("  {} "), "{}");
    }

    #[test]
    fn test_parse_json_reply_is_strict() {
        // Prose around the JSON is a parse error, not silently sliced out
        let reply = "Here is the data: {\"overallScore\": 80} hope that helps";
        let parsed: Result<serde_json::Value, _> = parse_json_reply(reply);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_sparse_model_reply_merges_over_defaults() {
        let parsed: LlmCandidate =
            parse_json_reply(r#"{"fullName": "Jane Doe", "skills": ["rust"]}"#).unwrap();
        let candidate = merge_with_defaults(parsed, &ContactSignals::default());

        assert_eq!(candidate.full_name, "Jane Doe");
        assert_eq!(candidate.title, "Professional");
        assert_eq!(candidate.email, "email@example.com");
        assert_eq!(candidate.phone, "+1 (000) 000-0000");
        assert_eq!(candidate.location, "Location Not Specified");
        assert_eq!(candidate.skills, vec!["rust".to_string()]);
        assert_eq!(candidate.linkedin_questions.len(), 5);
        assert!((1..=5).contains(&candidate.cultural_fit_rating));
    }

    #[test]
    fn test_merge_prefers_contact_signals_over_placeholders() {
        let contact = ContactSignals {
            email: Some("jane@example.com".to_string()),
            phone: Some("555-123-4567".to_string()),
            name: Some("Jane Doe".to_string()),
            location: Some("Austin".to_string()),
        };
        let candidate = merge_with_defaults(LlmCandidate::default(), &contact);

        assert_eq!(candidate.full_name, "Jane Doe");
        assert_eq!(candidate.email, "jane@example.com");
        assert_eq!(candidate.phone, "555-123-4567");
        assert_eq!(candidate.location, "Austin");
    }

    #[test]
    fn test_merge_rejects_wrong_question_count() {
        let parsed: LlmCandidate = parse_json_reply(
            r#"{"linkedinQuestions": [{"id": "1", "question": "q", "answer": "a", "category": "personal"}]}"#,
        )
        .unwrap();
        let candidate = merge_with_defaults(parsed, &ContactSignals::default());

        assert_eq!(candidate.linkedin_questions.len(), 5);
        assert!(candidate.linkedin_questions[0].id.starts_with("fallback-"));
    }

    #[test]
    fn test_merge_clamps_model_rating() {
        let parsed: LlmCandidate = parse_json_reply(r#"{"culturalFitRating": 9}"#).unwrap();
        let candidate = merge_with_defaults(parsed, &ContactSignals::default());
        assert_eq!(candidate.cultural_fit_rating, 5);

        let parsed: LlmCandidate = parse_json_reply(r#"{"culturalFitRating": 0}"#).unwrap();
        let candidate = merge_with_defaults(parsed, &ContactSignals::default());
        assert_eq!(candidate.cultural_fit_rating, 1);
    }

    #[test]
    fn test_extraction_prompt_embeds_signals_and_text() {
        let structure = detect_document_structure("skills: rust");
        let contact = extract_contact_info("reach me at jane@example.com");
        let prompt = build_extraction_prompt("CV BODY HERE", &structure, &contact);

        assert!(prompt.contains("CV BODY HERE"));
        assert!(prompt.contains("jane@example.com"));
        assert!(prompt.contains("\"sectionOrder\""));
        assert!(prompt.contains("exactly 5 LinkedIn-style questions"));
    }
}
