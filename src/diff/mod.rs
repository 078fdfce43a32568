//! Content comparison between the two copies of a file.
//!
//! Identity is decided by fingerprint. Word documents additionally get a
//! paragraph-level unified listing; every other format only reports
//! identical or different.

mod docx;

pub use docx::{extract_paragraphs, paragraphs_from_xml, DocxError};

use crate::scan::FileRecord;
use similar::{ChangeTag, TextDiff};
use std::io;
use std::path::Path;
use tracing::warn;

/// Paragraphs of unchanged context around each hunk
pub const CONTEXT_PARAGRAPHS: usize = 3;

/// What can be shown about two differing files
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentDiff {
    /// No paragraph extraction for this format
    Binary,
    /// Paragraph text matches; only formatting or metadata differ
    SameText,
    /// Unified listing, one entry per output line
    Paragraphs(Vec<String>),
    /// The document could not be parsed
    Unavailable(String),
}

/// Whether paragraph diffs are supported for this path
pub fn is_structured_document(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"))
}

/// Compare two records by size and then by fingerprint
pub fn are_identical(left: &FileRecord, right: &FileRecord) -> io::Result<bool> {
    if left.size != right.size {
        return Ok(false);
    }
    Ok(left.fingerprint()? == right.fingerprint()?)
}

/// Describe how `new_path` differs from `old_path`.
///
/// Parsing failures degrade to [`ContentDiff::Unavailable`].
pub fn diff(old_path: &Path, new_path: &Path) -> ContentDiff {
    if !is_structured_document(old_path) || !is_structured_document(new_path) {
        return ContentDiff::Binary;
    }

    let old = match extract_paragraphs(old_path) {
        Ok(paragraphs) => paragraphs,
        Err(e) => return unavailable(old_path, e),
    };
    let new = match extract_paragraphs(new_path) {
        Ok(paragraphs) => paragraphs,
        Err(e) => return unavailable(new_path, e),
    };

    if old == new {
        return ContentDiff::SameText;
    }

    ContentDiff::Paragraphs(unified_paragraph_diff(
        &old,
        &new,
        &old_path.display().to_string(),
        &new_path.display().to_string(),
    ))
}

fn unavailable(path: &Path, error: DocxError) -> ContentDiff {
    warn!("Cannot extract text from {}: {}", path.display(), error);
    ContentDiff::Unavailable(format!("{}: {}", path.display(), error))
}

/// Unified-style listing of paragraph changes, empty when nothing changed
pub fn unified_paragraph_diff(
    old: &[String],
    new: &[String],
    old_label: &str,
    new_label: &str,
) -> Vec<String> {
    let old_refs: Vec<&str> = old.iter().map(String::as_str).collect();
    let new_refs: Vec<&str> = new.iter().map(String::as_str).collect();
    let diff = TextDiff::from_slices(old_refs.as_slice(), new_refs.as_slice());

    let groups = diff.grouped_ops(CONTEXT_PARAGRAPHS);
    if groups.is_empty() {
        return Vec::new();
    }

    let mut lines = vec![format!("--- {}", old_label), format!("+++ {}", new_label)];

    for group in &groups {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        lines.push(format!(
            "@@ -{} +{} @@",
            hunk_range(first.old_range().start, last.old_range().end),
            hunk_range(first.new_range().start, last.new_range().end),
        ));

        for op in group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => '-',
                    ChangeTag::Insert => '+',
                    ChangeTag::Equal => ' ',
                };
                lines.push(format!("{}{}", sign, change.value()));
            }
        }
    }

    lines
}

fn hunk_range(start: usize, end: usize) -> String {
    match end - start {
        0 => format!("{},0", start),
        1 => format!("{}", start + 1),
        len => format!("{},{}", start + 1, len),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraphs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_structured_document_detection() {
        assert!(is_structured_document(Path::new("a/report.docx")));
        assert!(is_structured_document(Path::new("REPORT.DOCX")));
        assert!(!is_structured_document(Path::new("report.doc")));
        assert!(!is_structured_document(Path::new("docx")));
    }

    #[test]
    fn test_non_documents_are_binary() {
        assert_eq!(
            diff(Path::new("a.txt"), Path::new("b.txt")),
            ContentDiff::Binary
        );
    }

    #[test]
    fn test_unified_listing_marks_changes() {
        let old = paragraphs(&["Intro", "Budget is 10k", "Outro"]);
        let new = paragraphs(&["Intro", "Budget is 12k", "Outro", "Appendix"]);

        let lines = unified_paragraph_diff(&old, &new, "right/report.docx", "left/report.docx");
        assert_eq!(
            lines,
            vec![
                "--- right/report.docx",
                "+++ left/report.docx",
                "@@ -1,3 +1,4 @@",
                " Intro",
                "-Budget is 10k",
                "+Budget is 12k",
                " Outro",
                "+Appendix",
            ]
        );
    }

    #[test]
    fn test_unified_listing_empty_when_equal() {
        let same = paragraphs(&["a", "b"]);
        assert!(unified_paragraph_diff(&same, &same, "x", "y").is_empty());
    }

    #[test]
    fn test_hunk_range_formatting() {
        assert_eq!(hunk_range(0, 0), "0,0");
        assert_eq!(hunk_range(4, 5), "5");
        assert_eq!(hunk_range(2, 6), "3,4");
    }
}
