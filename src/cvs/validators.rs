// src/cvs/validators.rs

use std::collections::HashSet;

use crate::common::{ValidationResult, Validator};
use crate::cvs::models::AnonymousCandidate;
use crate::extract::FileFormat;

/// Validates an incoming upload before any bytes are processed
pub struct UploadValidator {
    pub max_upload_bytes: usize,
}

/// Minimal view of an upload needed for validation
pub struct UploadRequest<'a> {
    pub filename: &'a str,
    pub size_bytes: usize,
}

impl<'a> Validator<UploadRequest<'a>> for UploadValidator {
    fn validate(&self, data: &UploadRequest<'a>) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.filename.trim().is_empty() {
            result.add_error("file", "Filename is required");
        } else if FileFormat::from_filename(data.filename).is_none() {
            result.add_error(
                "file",
                "Unsupported file type. Please upload PDF, DOC, DOCX, or TXT files",
            );
        }

        if data.size_bytes == 0 {
            result.add_error("file", "Uploaded file is empty");
        } else if data.size_bytes > self.max_upload_bytes {
            result.add_error(
                "file",
                &format!(
                    "File exceeds the maximum upload size of {} bytes",
                    self.max_upload_bytes
                ),
            );
        }

        result
    }
}

/// Validates anonymous candidate records on internal updates
pub struct AnonymousCandidateValidator;

impl Validator<AnonymousCandidate> for AnonymousCandidateValidator {
    fn validate(&self, data: &AnonymousCandidate) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.id.trim().is_empty() {
            result.add_error("id", "Candidate id is required");
        }

        if !(1..=5).contains(&data.cultural_fit_rating) {
            result.add_error("culturalFitRating", "Rating must be between 1 and 5");
        }

        if data.linkedin_questions.len() != 5 {
            result.add_error("linkedinQuestions", "Exactly 5 questions are required");
        }

        if data.section_order.len() > 3 {
            result.add_error("sectionOrder", "Section order lists at most 3 sections");
        }
        let mut seen = HashSet::new();
        if !data.section_order.iter().all(|s| seen.insert(*s)) {
            result.add_error("sectionOrder", "Section order must not repeat sections");
        }

        result
    }
}
