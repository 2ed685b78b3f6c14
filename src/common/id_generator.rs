// src/common/id_generator.rs
//! Identifier generation for CV records
//!
//! Three ID families are in play:
//! - Anonymous candidate IDs: `CV-<base36 millis>-<base36 random>`, uppercased.
//!   These are the opaque identifiers the internal recruiter tool shows in
//!   place of a name.
//! - Processed CV record IDs: `cv-<millis>-<random>` (lowercase).
//! - Internal CV record IDs: `internal-<millis>-<random>` (lowercase).

use rand::Rng;

const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Encode a number as lowercase base36
fn to_base36(mut value: u128) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_else(|_| "0".to_string())
}

/// Generate a random lowercase base36 string of the given length
fn random_base36(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..36);
            BASE36_ALPHABET[idx] as char
        })
        .collect()
}

fn now_millis() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Generate an opaque anonymous candidate ID: `CV-<base36 millis>-<random>`,
/// uppercased (e.g. `CV-LX2K9QF1-A3B7C9`)
pub fn generate_candidate_id() -> String {
    format!("CV-{}-{}", to_base36(now_millis()), random_base36(6)).to_uppercase()
}

/// Generate a processed CV record ID (e.g. `cv-1719850000000-a3b7c9`)
pub fn generate_processed_cv_id() -> String {
    format!("cv-{}-{}", now_millis(), random_base36(6))
}

/// Generate an internal (anonymous) CV record ID
/// (e.g. `internal-1719850000000-a3b7c9`)
pub fn generate_internal_cv_id() -> String {
    format!("internal-{}-{}", now_millis(), random_base36(6))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_base36_encoding() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1295), "zz");
    }

    #[test]
    fn test_candidate_id_format() {
        let id = generate_candidate_id();
        assert!(id.starts_with("CV-"));
        assert_eq!(id, id.to_uppercase());

        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].len(), 6);
    }

    #[test]
    fn test_processed_cv_id_format() {
        let id = generate_processed_cv_id();
        assert!(id.starts_with("cv-"));
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_internal_cv_id_format() {
        let id = generate_internal_cv_id();
        assert!(id.starts_with("internal-"));
    }

    #[test]
    fn test_uniqueness() {
        let mut ids = HashSet::new();
        for _ in 0..1000 {
            let id = generate_candidate_id();
            assert!(ids.insert(id), "Duplicate ID generated");
        }
    }
}
