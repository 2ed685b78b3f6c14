// src/extract/mod.rs
//
// Document text extraction pipeline: format dispatch and cleanup, plus the
// deterministic structure/contact probes that feed prompts and fallbacks

pub mod contact;
pub mod structure;
pub mod text;

// Re-export commonly used items
pub use contact::{extract_contact_info, ContactSignals};
pub use structure::{detect_document_structure, StructureSignals};
pub use text::{extract_text_from_file, ExtractError, FileFormat};
