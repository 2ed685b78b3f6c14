// src/extract/contact.rs
//! Best-effort regex extraction of contact details
//!
//! Each field is derived independently and unvalidated. The name and location
//! patterns are capitalized-word probes and will false-positive on arbitrary
//! proper nouns; consumers must treat these as hints, never as verified data.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("valid regex")
});
static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b").expect("valid regex"));
static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][a-z]+ [A-Z][a-z]+(?: [A-Z][a-z]+)?\b").expect("valid regex"));
static LOCATION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][a-z]+(?:[,\s]+[A-Z]{2})?\b").expect("valid regex"));

/// Contact details pulled from the cleaned text, first match per field
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContactSignals {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
}

/// Extract email, phone, name and location hints from cleaned text
pub fn extract_contact_info(text: &str) -> ContactSignals {
    ContactSignals {
        email: EMAIL_PATTERN.find(text).map(|m| m.as_str().to_string()),
        phone: PHONE_PATTERN.find(text).map(|m| m.as_str().to_string()),
        name: NAME_PATTERN.find(text).map(|m| m.as_str().to_string()),
        location: LOCATION_PATTERN.find(text).map(|m| m.as_str().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_email_and_phone() {
        let text = "Contact: jane.doe@example.com, 555-123-4567";
        let contact = extract_contact_info(text);
        assert_eq!(contact.email.as_deref(), Some("jane.doe@example.com"));
        assert_eq!(contact.phone.as_deref(), Some("555-123-4567"));
    }

    #[test]
    fn test_phone_with_dots_and_without_separators() {
        assert_eq!(
            extract_contact_info("call 555.123.4567").phone.as_deref(),
            Some("555.123.4567")
        );
        assert_eq!(
            extract_contact_info("call 5551234567").phone.as_deref(),
            Some("5551234567")
        );
    }

    #[test]
    fn test_extracts_first_name_match() {
        let text = "Jane Doe\nSenior Engineer\nJohn Smith was a reference";
        let contact = extract_contact_info(text);
        assert_eq!(contact.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_missing_fields_are_none() {
        let contact = extract_contact_info("lowercase text only 12");
        assert!(contact.email.is_none());
        assert!(contact.name.is_none());
    }

    #[test]
    fn test_three_word_name() {
        let contact = extract_contact_info("Mary Jane Watson applied");
        assert_eq!(contact.name.as_deref(), Some("Mary Jane Watson"));
    }
}
