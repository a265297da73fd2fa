//! Word-to-PDF conversion pipeline
//!
//! Each `.docx` in the input directory is converted through an external
//! LibreOffice process and renamed to `MB-<identifier>.pdf`, where the
//! identifier is a 6-20 digit number announced by a `CC` label inside the
//! document. DOCX files are ZIP containers; the identifier search walks
//! `word/document.xml` directly with a streaming XML reader, since the
//! only structure needed is table rows, cells, and paragraph text.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use zip::ZipArchive;

use crate::error::{CasemergeError, CasemergeResult};
use crate::models::{ConvertOutcome, ConvertStatus};

/// Fixed prefix distinguishing conversion outputs from merge outputs
pub const CONVERT_PREFIX: &str = "MB";

/// Inline form: `CC: 123456789`, `cc - 123456789`, `CC 123456789`
static RE_INLINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bCC\b\s*[:\-]?\s*([0-9]{6,20})").expect("inline pattern compiles")
});

/// A table cell that is nothing but the `CC` label
static RE_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*CC\s*[:\-]?\s*$").expect("label pattern compiles"));

/// A bare identifier value
static RE_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]{6,20}").expect("value pattern compiles"));

/// Text blocks pulled from `word/document.xml`, in document order.
#[derive(Debug, PartialEq, Eq)]
enum Block {
    /// Cell texts of one table row
    Row(Vec<String>),
    /// Text of one paragraph outside any table
    Paragraph(String),
}

/// Extract the document identifier from a Word file.
///
/// Search order, most structured first:
/// 1. a row where one cell is the `CC` label and the next cell holds the
///    value
/// 2. a cell containing the inline `CC: <digits>` form
/// 3. row fallback: label in any cell, value in any other
/// 4. the inline form in any paragraph
///
/// Returns `Ok(None)` when the document simply has no identifier; errors
/// only for unreadable or malformed containers.
pub fn extract_identifier(path: &Path) -> CasemergeResult<Option<String>> {
    let invalid = |message: String| CasemergeError::InvalidDocx {
        path: path.to_path_buf(),
        message,
    };

    let file = File::open(path)?;
    let mut archive = ZipArchive::new(file).map_err(|err| invalid(err.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|err| invalid(err.to_string()))?
        .read_to_string(&mut xml)?;

    let blocks = read_blocks(&xml, path)?;
    Ok(find_identifier(&blocks))
}

/// Walk the document XML and collect table rows and top-level paragraphs.
fn read_blocks(xml: &str, path: &Path) -> CasemergeResult<Vec<Block>> {
    let invalid = |message: String| CasemergeError::InvalidDocx {
        path: path.to_path_buf(),
        message,
    };

    let mut reader = Reader::from_str(xml);
    let mut blocks = Vec::new();
    let mut row_depth = 0usize;
    let mut cell_depth = 0usize;
    let mut in_text = false;
    let mut row_cells: Vec<String> = Vec::new();
    let mut cell_text = String::new();
    let mut para_text = String::new();

    loop {
        match reader.read_event().map_err(|err| invalid(err.to_string()))? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tr" => {
                    row_depth += 1;
                    if row_depth == 1 {
                        row_cells.clear();
                    }
                }
                b"w:tc" => {
                    cell_depth += 1;
                    if cell_depth == 1 {
                        cell_text.clear();
                    }
                }
                b"w:p" if row_depth == 0 && cell_depth == 0 => para_text.clear(),
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::End(e) => match e.name().as_ref() {
                b"w:tr" => {
                    if row_depth == 1 {
                        blocks.push(Block::Row(std::mem::take(&mut row_cells)));
                    }
                    row_depth = row_depth.saturating_sub(1);
                }
                b"w:tc" => {
                    if cell_depth == 1 {
                        row_cells.push(std::mem::take(&mut cell_text));
                    }
                    cell_depth = cell_depth.saturating_sub(1);
                }
                b"w:p" if row_depth == 0 && cell_depth == 0 => {
                    if !para_text.trim().is_empty() {
                        blocks.push(Block::Paragraph(std::mem::take(&mut para_text)));
                    }
                }
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Text(t) => {
                if in_text {
                    let text = t.unescape().map_err(|err| invalid(err.to_string()))?;
                    if cell_depth > 0 {
                        cell_text.push_str(&text);
                    } else {
                        para_text.push_str(&text);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(blocks)
}

fn find_identifier(blocks: &[Block]) -> Option<String> {
    // Tables take priority over running text.
    for block in blocks {
        let Block::Row(cells) = block else { continue };
        for (idx, cell) in cells.iter().enumerate() {
            if RE_LABEL.is_match(cell) {
                if let Some(next) = cells.get(idx + 1) {
                    if let Some(found) = RE_VALUE.find(next) {
                        return Some(found.as_str().to_string());
                    }
                }
            }
            if let Some(caps) = RE_INLINE.captures(cell) {
                return Some(caps[1].to_string());
            }
        }
        // Row fallback: label and value in non-adjacent cells.
        if cells.iter().any(|c| RE_LABEL.is_match(c)) {
            for cell in cells.iter().filter(|c| !RE_LABEL.is_match(c)) {
                if let Some(found) = RE_VALUE.find(cell) {
                    return Some(found.as_str().to_string());
                }
            }
        }
    }

    for block in blocks {
        let Block::Paragraph(text) = block else { continue };
        if let Some(caps) = RE_INLINE.captures(text) {
            return Some(caps[1].to_string());
        }
    }
    None
}

/// Convert one `.docx` to PDF via LibreOffice.
///
/// Runs `<soffice> --headless --convert-to pdf --outdir <dir> <file>` and
/// returns the path LibreOffice wrote (`<dir>/<stem>.pdf`).
pub fn convert_docx(soffice: &str, docx: &Path, output_dir: &Path) -> CasemergeResult<PathBuf> {
    let failed = |message: String| CasemergeError::ConversionFailed {
        path: docx.to_path_buf(),
        message,
    };

    let output = Command::new(soffice)
        .arg("--headless")
        .arg("--convert-to")
        .arg("pdf")
        .arg("--outdir")
        .arg(output_dir)
        .arg(docx)
        .output()
        .map_err(|err| failed(format!("cannot run {soffice}: {err}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = if stderr.trim().is_empty() {
            format!("converter exited with {}", output.status)
        } else {
            stderr.trim().to_string()
        };
        return Err(failed(message));
    }

    let stem = docx
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| failed("non-UTF-8 file name".to_string()))?;
    let pdf = output_dir.join(format!("{stem}.pdf"));
    if !pdf.is_file() {
        return Err(failed("converter produced no output".to_string()));
    }
    Ok(pdf)
}

/// Convert every `.docx` in the input directory, renaming each output by
/// its extracted identifier.
///
/// Failures are isolated per file and recorded in the returned outcomes;
/// only a missing input directory or an unusable output directory aborts
/// the batch. A document without an identifier falls back to its file
/// stem (recorded as `identifier: None` in the outcome).
pub fn convert_directory(
    soffice: &str,
    input_dir: &Path,
    output_dir: &Path,
) -> CasemergeResult<Vec<ConvertOutcome>> {
    if !input_dir.is_dir() {
        return Err(CasemergeError::DirectoryNotFound {
            path: input_dir.to_path_buf(),
        });
    }
    fs::create_dir_all(output_dir).map_err(|source| CasemergeError::OutputDirUnavailable {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let mut sources: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(input_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        // Word drops ~$ lock files next to open documents; they match
        // the extension but are not documents.
        if name.starts_with("~$") {
            continue;
        }
        let is_docx = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("docx"))
            .unwrap_or(false);
        if is_docx {
            sources.push(path);
        }
    }
    sources.sort();

    let mut outcomes = Vec::with_capacity(sources.len());
    for docx in &sources {
        outcomes.push(convert_one(soffice, docx, output_dir));
    }
    Ok(outcomes)
}

fn convert_one(soffice: &str, docx: &Path, output_dir: &Path) -> ConvertOutcome {
    let failed = |identifier: Option<String>, message: String| ConvertOutcome {
        source: docx.to_path_buf(),
        identifier,
        status: ConvertStatus::Failed(message),
    };

    let identifier = match extract_identifier(docx) {
        Ok(identifier) => identifier,
        Err(err) => return failed(None, err.to_string()),
    };
    let name = identifier.clone().unwrap_or_else(|| {
        docx.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let pdf = match convert_docx(soffice, docx, output_dir) {
        Ok(pdf) => pdf,
        Err(err) => return failed(identifier, err.to_string()),
    };
    let dest = output_dir.join(format!("{CONVERT_PREFIX}-{name}.pdf"));
    if let Err(err) = fs::rename(&pdf, &dest) {
        return failed(identifier, format!("cannot rename output: {err}"));
    }

    ConvertOutcome {
        source: docx.to_path_buf(),
        identifier,
        status: ConvertStatus::Converted { output: dest },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DOC_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;
    const DOC_FOOTER: &str = "</w:body></w:document>";

    fn docx_with_body(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        writer.start_file("word/document.xml", options).unwrap();
        writer
            .write_all(format!("{DOC_HEADER}{body}{DOC_FOOTER}").as_bytes())
            .unwrap();
        writer.finish().unwrap();
        path
    }

    fn cell(text: &str) -> String {
        format!("<w:tc><w:p><w:r><w:t>{text}</w:t></w:r></w:p></w:tc>")
    }

    fn row(cells: &[&str]) -> String {
        let cells: String = cells.iter().map(|c| cell(c)).collect();
        format!("<w:tbl><w:tr>{cells}</w:tr></w:tbl>")
    }

    fn paragraph(text: &str) -> String {
        format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
    }

    #[test]
    fn identifier_from_adjacent_label_cell() {
        let dir = tempfile::tempdir().unwrap();
        let docx = docx_with_body(dir.path(), "a.docx", &row(&["CC", "1234567890"]));

        let id = extract_identifier(&docx).unwrap();

        assert_eq!(id.as_deref(), Some("1234567890"));
    }

    #[test]
    fn identifier_from_inline_cell_form() {
        let dir = tempfile::tempdir().unwrap();
        let docx = docx_with_body(dir.path(), "a.docx", &row(&["Name", "CC: 987654321"]));

        let id = extract_identifier(&docx).unwrap();

        assert_eq!(id.as_deref(), Some("987654321"));
    }

    #[test]
    fn identifier_from_row_fallback() {
        let dir = tempfile::tempdir().unwrap();
        // Label and value separated by an unrelated cell.
        let docx = docx_with_body(dir.path(), "a.docx", &row(&["CC", "n/a", "55555555"]));

        let id = extract_identifier(&docx).unwrap();

        assert_eq!(id.as_deref(), Some("55555555"));
    }

    #[test]
    fn identifier_from_paragraph_when_no_table_matches() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "{}{}",
            row(&["Name", "Smith"]),
            paragraph("Holder CC-123456789 as recorded")
        );
        let docx = docx_with_body(dir.path(), "a.docx", &body);

        let id = extract_identifier(&docx).unwrap();

        assert_eq!(id.as_deref(), Some("123456789"));
    }

    #[test]
    fn table_match_takes_priority_over_paragraph() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!(
            "{}{}",
            paragraph("CC: 111111111"),
            row(&["CC", "222222222"])
        );
        let docx = docx_with_body(dir.path(), "a.docx", &body);

        let id = extract_identifier(&docx).unwrap();

        assert_eq!(id.as_deref(), Some("222222222"));
    }

    #[test]
    fn split_text_runs_are_joined() {
        let dir = tempfile::tempdir().unwrap();
        // Word often splits one logical string across several runs.
        let body = concat!(
            "<w:tbl><w:tr><w:tc><w:p>",
            "<w:r><w:t>C</w:t></w:r><w:r><w:t>C: 123456</w:t></w:r>",
            "</w:p></w:tc></w:tr></w:tbl>"
        );
        let docx = docx_with_body(dir.path(), "a.docx", body);

        let id = extract_identifier(&docx).unwrap();

        assert_eq!(id.as_deref(), Some("123456"));
    }

    #[test]
    fn no_identifier_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let docx = docx_with_body(dir.path(), "a.docx", &paragraph("no number here"));

        let id = extract_identifier(&docx).unwrap();

        assert_eq!(id, None);
    }

    #[test]
    fn short_digit_runs_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        // Five digits is below the identifier floor.
        let docx = docx_with_body(dir.path(), "a.docx", &paragraph("CC: 12345"));

        let id = extract_identifier(&docx).unwrap();

        assert_eq!(id, None);
    }

    #[test]
    fn garbage_container_is_invalid_docx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.docx");
        std::fs::write(&path, b"not a zip").unwrap();

        let err = extract_identifier(&path).unwrap_err();

        assert!(matches!(err, CasemergeError::InvalidDocx { .. }));
    }

    #[test]
    fn missing_converter_is_a_conversion_failure() {
        let dir = tempfile::tempdir().unwrap();
        let docx = docx_with_body(dir.path(), "a.docx", &paragraph("x"));

        let err = convert_docx("/nonexistent/soffice", &docx, dir.path()).unwrap_err();

        assert!(matches!(err, CasemergeError::ConversionFailed { .. }));
    }

    #[test]
    fn directory_conversion_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        let output = dir.path().join("out");
        std::fs::create_dir(&input).unwrap();
        docx_with_body(&input, "a.docx", &paragraph("CC: 123456789"));
        std::fs::write(input.join("b.docx"), b"broken").unwrap();

        // No real soffice in the test environment: every conversion
        // attempt fails, but each file still gets its own outcome.
        let outcomes = convert_directory("/nonexistent/soffice", &input, &output).unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes
            .iter()
            .all(|o| matches!(o.status, ConvertStatus::Failed(_))));
        // a.docx got as far as identifier extraction before failing.
        assert_eq!(outcomes[0].identifier.as_deref(), Some("123456789"));
        assert_eq!(outcomes[1].identifier, None);
        assert!(output.is_dir());
    }

    #[test]
    fn lock_files_and_other_extensions_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        std::fs::create_dir(&input).unwrap();
        std::fs::write(input.join("~$a.docx"), b"lock").unwrap();
        std::fs::write(input.join("notes.txt"), b"text").unwrap();

        let outcomes =
            convert_directory("/nonexistent/soffice", &input, &dir.path().join("out")).unwrap();

        assert!(outcomes.is_empty());
    }
}
