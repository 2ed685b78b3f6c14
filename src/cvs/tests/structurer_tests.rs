// src/cvs/tests/structurer_tests.rs
//! Behavior tests for the deterministic structuring fallback

use crate::cvs::models::CvSection;
use crate::cvs::structurer::{
    calculate_cultural_fit, determine_section_order, extract_cv_data_fallback,
    extract_education_from_text, extract_experience_from_text, extract_skills_from_text,
    fallback_linkedin_questions, generate_default_summary,
};
use crate::extract::{extract_contact_info, ContactSignals};

const SAMPLE_CV: &str = "\
Jane Doe
Senior Software Engineer
jane.doe@example.com
555-123-4567
Austin, TX

Experience

Acme Corporation
- Built data pipelines in Python and SQL
- Led migration to Docker and Kubernetes

Globex
- Managed a team using Scrum

Education

State University
Bachelor of Science

Skills
JavaScript, React, PostgreSQL, Git, Leadership";

#[test]
fn test_fallback_on_empty_text_is_structurally_valid() {
    let candidate = extract_cv_data_fallback("", &ContactSignals::default());

    assert_eq!(candidate.full_name, "Unknown Candidate");
    assert_eq!(candidate.title, "Professional");
    assert_eq!(candidate.email, "email@example.com");
    assert_eq!(candidate.phone, "+1 (000) 000-0000");
    assert_eq!(candidate.location, "Location Not Specified");
    assert!(!candidate.summary.is_empty());
    assert_eq!(candidate.section_order.len(), 3);
    assert!(!candidate.experience.is_empty());
    assert!(!candidate.education.is_empty());
    assert_eq!(candidate.linkedin_questions.len(), 5);
    assert!((1..=5).contains(&candidate.cultural_fit_rating));
}

#[test]
fn test_fallback_on_sample_cv_picks_up_fields() {
    let contact = extract_contact_info(SAMPLE_CV);
    let candidate = extract_cv_data_fallback(SAMPLE_CV, &contact);

    assert_eq!(candidate.full_name, "Jane Doe");
    assert_eq!(candidate.email, "jane.doe@example.com");
    assert_eq!(candidate.phone, "555-123-4567");
    assert!(candidate.skills.contains(&"python".to_string()));
    assert!(candidate.skills.contains(&"docker".to_string()));
    assert!(candidate
        .experience
        .iter()
        .any(|entry| entry.company == "Acme Corporation"));
    assert!(candidate
        .education
        .iter()
        .any(|entry| entry.school.contains("University")));
}

#[test]
fn test_fallback_name_skips_section_headings() {
    // A two-word capitalized line that carries a section keyword is not a name
    let text = "Work Experience\nJohn Smith\nDeveloper";
    let candidate = extract_cv_data_fallback(text, &ContactSignals::default());
    assert_eq!(candidate.full_name, "John Smith");
}

#[test]
fn test_skills_are_lowercased_deduped_and_capped() {
    let text = "Python PYTHON python Java java RUST rust Go SQL MySQL Redis \
                Docker AWS Git Jenkins Agile Scrum Leadership Teamwork HTML CSS";
    let skills = extract_skills_from_text(text);

    assert_eq!(skills.len(), 10);
    let unique: std::collections::HashSet<_> = skills.iter().collect();
    assert_eq!(unique.len(), skills.len());
    assert!(skills.iter().all(|s| s.chars().all(|c| !c.is_uppercase())));
}

#[test]
fn test_experience_bullets_attach_to_preceding_company() {
    let text = "Acme Corporation\n- Shipped the flagship product\n- Mentored juniors\nGlobex\n- Ran operations";
    let experience = extract_experience_from_text(text);

    assert_eq!(experience.len(), 2);
    assert_eq!(experience[0].company, "Acme Corporation");
    assert_eq!(experience[0].details.len(), 2);
    assert_eq!(experience[0].details[0], "Shipped the flagship product");
    assert_eq!(experience[1].company, "Globex");
    assert_eq!(experience[1].details, vec!["Ran operations".to_string()]);
}

#[test]
fn test_experience_placeholder_when_nothing_matches() {
    let experience = extract_experience_from_text("no companies here, just prose.");
    assert_eq!(experience.len(), 1);
    assert_eq!(experience[0].company, "Example Company");
    assert_eq!(experience[0].details.len(), 2);
}

#[test]
fn test_education_placeholder_when_nothing_matches() {
    let education = extract_education_from_text("nothing relevant");
    assert_eq!(education.len(), 1);
    assert_eq!(education[0].school, "University");
    assert_eq!(education[0].degree, "Bachelor's Degree");
}

#[test]
fn test_section_order_decision_table() {
    // (skills, experience, education)
    assert_eq!(
        determine_section_order(true, true, true),
        vec![CvSection::Skills, CvSection::Experience, CvSection::Education]
    );
    assert_eq!(
        determine_section_order(false, true, true),
        vec![CvSection::Experience, CvSection::Skills, CvSection::Education]
    );
    assert_eq!(
        determine_section_order(true, false, true),
        vec![CvSection::Skills, CvSection::Education, CvSection::Experience]
    );
    for (skills, experience, education) in [
        (true, true, false),
        (false, false, true),
        (false, true, false),
        (true, false, false),
        (false, false, false),
    ] {
        assert_eq!(
            determine_section_order(skills, experience, education),
            vec![CvSection::Experience, CvSection::Education, CvSection::Skills]
        );
    }
}

#[test]
fn test_cultural_fit_baseline_and_ceiling() {
    assert_eq!(calculate_cultural_fit(0, 0, 0), 3);
    assert_eq!(calculate_cultural_fit(6, 11, 1), 5);
    // Score never leaves the rating scale even with every bonus applied
    assert!((1..=5).contains(&calculate_cultural_fit(100, 100, 100)));
}

#[test]
fn test_cultural_fit_is_monotonic_in_each_input() {
    for count in 0..20 {
        assert!(calculate_cultural_fit(count + 1, 0, 0) >= calculate_cultural_fit(count, 0, 0));
        assert!(calculate_cultural_fit(0, count + 1, 0) >= calculate_cultural_fit(0, count, 0));
        assert!(calculate_cultural_fit(0, 0, count + 1) >= calculate_cultural_fit(0, 0, count));
    }
}

#[test]
fn test_fallback_questions_are_flagged_and_complete() {
    let questions = fallback_linkedin_questions();

    assert_eq!(questions.len(), 5);
    for (i, question) in questions.iter().enumerate() {
        assert_eq!(question.id, format!("fallback-{}", i + 1));
        assert!(!question.question.is_empty());
        assert!(!question.answer.is_empty());
        assert!(["personal", "linkedin"].contains(&question.category.as_str()));
    }
}

#[test]
fn test_default_summary_templates() {
    let both = generate_default_summary(4, 6);
    assert!(both.contains("4 years"));
    assert!(both.contains("6 key areas"));

    let experience_only = generate_default_summary(2, 0);
    assert!(experience_only.contains("2 years"));

    let neither = generate_default_summary(0, 0);
    assert!(neither.contains("Motivated professional"));
}
