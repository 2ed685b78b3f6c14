// src/extract/text.rs
//! Text extraction and cleanup for uploaded CV documents
//!
//! Dispatches on the filename extension to a format-specific parser
//! (pdf-extract for PDF, docx-rs for Word, plain UTF-8 for text) and then
//! applies format-specific cleanup so downstream stages always see normalized
//! text.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

/// Supported upload formats, determined from the filename extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Pdf,
    Doc,
    Docx,
    Txt,
}

impl FileFormat {
    /// Parse the format from a filename extension, case-insensitive
    pub fn from_filename(filename: &str) -> Option<Self> {
        let extension = filename.rsplit('.').next()?.to_lowercase();
        match extension.as_str() {
            "pdf" => Some(FileFormat::Pdf),
            "doc" => Some(FileFormat::Doc),
            "docx" => Some(FileFormat::Docx),
            "txt" => Some(FileFormat::Txt),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Pdf => "pdf",
            FileFormat::Doc => "doc",
            FileFormat::Docx => "docx",
            FileFormat::Txt => "txt",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("failed to extract text from {format} document")]
    ExtractionFailed { format: &'static str },
}

/// Extract cleaned text from raw file bytes
///
/// Fails only on unrecognized extensions or a parser failure. An empty result
/// after cleanup is a valid output; the caller decides whether empty text is
/// an error.
pub fn extract_text_from_file(bytes: &[u8], filename: &str) -> Result<String, ExtractError> {
    let format = FileFormat::from_filename(filename).ok_or_else(|| {
        let extension = filename.rsplit('.').next().unwrap_or(filename);
        ExtractError::UnsupportedFormat(extension.to_lowercase())
    })?;

    let raw_text = match format {
        FileFormat::Pdf => extract_text_from_pdf(bytes)?,
        FileFormat::Doc | FileFormat::Docx => extract_text_from_word(bytes, format)?,
        // Best effort: malformed sequences are replaced, never rejected
        FileFormat::Txt => String::from_utf8_lossy(bytes).into_owned(),
    };

    Ok(clean_extracted_text(&raw_text, format))
}

fn extract_text_from_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
        warn!(error = %e, "PDF parsing failed");
        ExtractError::ExtractionFailed { format: "pdf" }
    })
}

// The error reports the declared format, so a failed `.doc` upload says
// "doc" even though both Word variants share the docx parser
fn extract_text_from_word(bytes: &[u8], format: FileFormat) -> Result<String, ExtractError> {
    let doc = docx_rs::read_docx(bytes).map_err(|e| {
        warn!(error = ?e, format = format.as_str(), "Word document parsing failed");
        ExtractError::ExtractionFailed {
            format: format.as_str(),
        }
    })?;

    let mut text = String::new();
    for child in doc.document.children {
        collect_docx_text(&child, &mut text);
    }
    Ok(text)
}

fn collect_docx_text(element: &docx_rs::DocumentChild, output: &mut String) {
    match element {
        docx_rs::DocumentChild::Paragraph(para) => {
            for child in &para.children {
                collect_paragraph_text(child, output);
            }
            output.push('\n');
        }
        docx_rs::DocumentChild::Table(table) => {
            for row in &table.rows {
                let docx_rs::TableChild::TableRow(tr) = row;
                for cell in &tr.cells {
                    let docx_rs::TableRowChild::TableCell(tc) = cell;
                    for content in &tc.children {
                        if let docx_rs::TableCellContent::Paragraph(para) = content {
                            for child in &para.children {
                                collect_paragraph_text(child, output);
                            }
                            output.push('\n');
                        }
                    }
                }
            }
        }
        _ => {}
    }
}

fn collect_paragraph_text(child: &docx_rs::ParagraphChild, output: &mut String) {
    match child {
        docx_rs::ParagraphChild::Run(run) => {
            for run_child in &run.children {
                if let docx_rs::RunChild::Text(text) = run_child {
                    output.push_str(&text.text);
                }
            }
        }
        docx_rs::ParagraphChild::Hyperlink(link) => {
            for nested in &link.children {
                if let docx_rs::ParagraphChild::Run(run) = nested {
                    for run_child in &run.children {
                        if let docx_rs::RunChild::Text(text) = run_child {
                            output.push_str(&text.text);
                        }
                    }
                }
            }
        }
        _ => {}
    }
}

/// Apply format-specific cleanup to raw extracted text
pub fn clean_extracted_text(text: &str, format: FileFormat) -> String {
    match format {
        FileFormat::Pdf => clean_pdf_text(text),
        FileFormat::Doc | FileFormat::Docx => clean_word_text(text),
        FileFormat::Txt => normalize_whitespace(text),
    }
}

// Characters kept during cleanup: word characters, whitespace, and common
// punctuation. Everything else in PDF output tends to be an artifact of the
// text layer.
static UNWANTED_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s\-.,;:!?@#$%&*()+=<>\[\]{}|\\/]").expect("valid regex"));

static HORIZONTAL_WS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t\r\x0b\x0c]+").expect("valid regex"));
static WS_AROUND_NEWLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r" *\n *").expect("valid regex"));
static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

fn clean_pdf_text(text: &str) -> String {
    let stripped = UNWANTED_CHARS.replace_all(text, "");
    let normalized = normalize_whitespace(&stripped);
    fix_ocr_confusions(&normalized)
}

fn clean_word_text(text: &str) -> String {
    let stripped = UNWANTED_CHARS.replace_all(text, "");
    normalize_whitespace(&stripped)
}

/// Collapse runs of horizontal whitespace to single spaces and runs of three
/// or more newlines to exactly two. Idempotent.
pub fn normalize_whitespace(text: &str) -> String {
    let collapsed = HORIZONTAL_WS.replace_all(text, " ");
    let trimmed_lines = WS_AROUND_NEWLINE.replace_all(&collapsed, "\n");
    EXCESS_NEWLINES
        .replace_all(&trimmed_lines, "\n\n")
        .trim()
        .to_string()
}

/// Repair common OCR character confusions in PDF text layers
///
/// `|` is rewritten to `I` everywhere; `0`->`O` and `1`->`l` only when the
/// digit sits between two ASCII letters. The source material applied the digit
/// substitutions to every occurrence, which corrupts phone numbers and years,
/// so the rewrite is gated on word context instead.
fn fix_ocr_confusions(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut fixed = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        let prev_is_letter = i > 0 && chars[i - 1].is_ascii_alphabetic();
        let next_is_letter = i + 1 < chars.len() && chars[i + 1].is_ascii_alphabetic();

        let replacement = match c {
            '|' => 'I',
            '0' if prev_is_letter && next_is_letter => 'O',
            '1' if prev_is_letter && next_is_letter => 'l',
            other => other,
        };
        fixed.push(replacement);
    }

    fixed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_filename() {
        assert_eq!(FileFormat::from_filename("resume.pdf"), Some(FileFormat::Pdf));
        assert_eq!(FileFormat::from_filename("RESUME.PDF"), Some(FileFormat::Pdf));
        assert_eq!(FileFormat::from_filename("cv.docx"), Some(FileFormat::Docx));
        assert_eq!(FileFormat::from_filename("cv.doc"), Some(FileFormat::Doc));
        assert_eq!(FileFormat::from_filename("notes.txt"), Some(FileFormat::Txt));
        assert_eq!(FileFormat::from_filename("image.png"), None);
        assert_eq!(FileFormat::from_filename("no_extension"), None);
    }

    #[test]
    fn test_unsupported_extension_fails() {
        let result = extract_text_from_file(b"data", "photo.png");
        assert!(matches!(result, Err(ExtractError::UnsupportedFormat(ext)) if ext == "png"));
    }

    #[test]
    fn test_word_parse_failure_reports_declared_format() {
        let doc = extract_text_from_file(b"not a word document", "legacy.doc");
        assert!(matches!(
            doc,
            Err(ExtractError::ExtractionFailed { format }) if format == "doc"
        ));

        let docx = extract_text_from_file(b"not a word document", "modern.docx");
        assert!(matches!(
            docx,
            Err(ExtractError::ExtractionFailed { format }) if format == "docx"
        ));
    }

    #[test]
    fn test_txt_extraction_is_best_effort() {
        // Invalid UTF-8 is replaced, not rejected
        let bytes = [b'h', b'i', 0xFF, b'!', b'\n'];
        let result = extract_text_from_file(&bytes, "note.txt").unwrap();
        assert!(result.starts_with("hi"));
    }

    #[test]
    fn test_normalize_whitespace_collapses_runs() {
        assert_eq!(normalize_whitespace("a   b\t\tc"), "a b c");
        assert_eq!(normalize_whitespace("a\n\n\n\nb"), "a\n\nb");
        assert_eq!(normalize_whitespace("  padded  "), "padded");
    }

    #[test]
    fn test_normalize_whitespace_is_idempotent() {
        let inputs = [
            "Jane Doe\n\n\n\nEngineer   at\tAcme\n \n \nSkills",
            "  a  b  \n\nc",
            "",
        ];
        for input in inputs {
            let once = normalize_whitespace(input);
            let twice = normalize_whitespace(&once);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_clean_pdf_text_is_idempotent() {
        let input = "S\u{00e9}an | 0racle\n\n\n\nW0rking   with App1e tools";
        let once = clean_pdf_text(input);
        let twice = clean_pdf_text(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_ocr_fix_pipe_is_unconditional() {
        assert_eq!(fix_ocr_confusions("| am here"), "I am here");
    }

    #[test]
    fn test_ocr_fix_digits_only_inside_words() {
        assert_eq!(fix_ocr_confusions("App1e"), "Apple");
        assert_eq!(fix_ocr_confusions("W0rd"), "WOrd");
        // Standalone numbers stay intact
        assert_eq!(fix_ocr_confusions("2010-2014"), "2010-2014");
        assert_eq!(fix_ocr_confusions("555-123-4567"), "555-123-4567");
        assert_eq!(fix_ocr_confusions("10 years"), "10 years");
    }

    #[test]
    fn test_clean_pdf_strips_unwanted_characters() {
        let cleaned = clean_pdf_text("Name\u{2022} \u{00a9}2020 ok");
        assert!(!cleaned.contains('\u{2022}'));
        assert!(!cleaned.contains('\u{00a9}'));
        assert!(cleaned.contains("2020 ok"));
    }

    #[test]
    fn test_clean_word_preserves_newlines() {
        let cleaned = clean_word_text("Jane Doe\nEngineer\n\nSkills");
        assert_eq!(cleaned.lines().count(), 4);
    }
}
