// src/cvs/models.rs

use serde::{Deserialize, Serialize};

use crate::common::generate_candidate_id;

/// CV display sections; `section_order` lists these in render order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CvSection {
    Skills,
    Experience,
    Education,
}

/// A reflective question/answer pair shown alongside the CV
///
/// Fallback-generated questions carry ids prefixed `fallback-` so consumers
/// can tell templated placeholder content from model-personalized answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedInQuestion {
    pub id: String,
    pub question: String,
    pub answer: String,
    /// One of: personal, veteran, visa, linkedin
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub school: String,
    pub degree: String,
    pub period: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    pub company: String,
    pub role: String,
    pub period: String,
    pub details: Vec<String>,
}

/// The structured candidate record produced once per upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub full_name: String,
    pub title: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub profile_pic: String,
    pub summary: String,
    pub section_order: Vec<CvSection>,
    pub skills: Vec<String>,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
    /// Clamped to 1..=5
    pub cultural_fit_rating: u8,
    /// Exactly five entries
    pub linkedin_questions: Vec<LinkedInQuestion>,
}

/// Candidate record with the identifying fields removed and an opaque
/// internal identifier substituted for "who this is"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymousCandidate {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub section_order: Vec<CvSection>,
    pub skills: Vec<String>,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
    pub cultural_fit_rating: u8,
    pub linkedin_questions: Vec<LinkedInQuestion>,
}

impl AnonymousCandidate {
    /// Derive the anonymous record: every non-identifying field is copied
    /// verbatim; fullName/email/phone/location/website/profilePic are dropped
    pub fn from_candidate(candidate: &Candidate) -> Self {
        Self {
            id: generate_candidate_id(),
            title: candidate.title.clone(),
            summary: candidate.summary.clone(),
            section_order: candidate.section_order.clone(),
            skills: candidate.skills.clone(),
            education: candidate.education.clone(),
            experience: candidate.experience.clone(),
            cultural_fit_rating: candidate.cultural_fit_rating,
            linkedin_questions: candidate.linkedin_questions.clone(),
        }
    }
}

/// Heuristic or model-derived quality assessment of the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub overall_score: u8,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Full processing result for one upload, as returned to the caller
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedCvData {
    pub id: String,
    pub original_file_name: String,
    pub original_content: String,
    pub extracted_data: Candidate,
    pub personal_info_removed: String,
    pub created_at: String,
}

/// Database row for a processed CV
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProcessedCvRow {
    pub id: String,
    pub original_file_name: String,
    pub original_content: String,
    pub extracted_data: String,
    pub personal_info_removed: String,
    pub quality_report: Option<String>,
    pub created_at: String,
}

/// Database row for an internal (anonymous) CV
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InternalCvRow {
    pub id: String,
    pub candidate_id: String,
    pub original_file_name: String,
    pub anonymous_data: String,
    pub created_at: String,
    pub updated_at: String,
}
