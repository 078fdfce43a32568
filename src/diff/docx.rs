//! Paragraph extraction for Word (`.docx`) documents.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use zip::ZipArchive;

/// Archive member holding the main document body
const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Error, Debug)]
pub enum DocxError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Invalid docx archive: {0}")]
    ArchiveError(#[from] zip::result::ZipError),

    #[error("Malformed document XML: {0}")]
    XmlError(#[from] quick_xml::Error),
}

/// Read the ordered paragraph texts of a `.docx` file
pub fn extract_paragraphs(path: &Path) -> Result<Vec<String>, DocxError> {
    let file = File::open(path)?;
    let mut archive = ZipArchive::new(BufReader::new(file))?;
    let document = archive.by_name(DOCUMENT_PART)?;
    paragraphs_from_xml(BufReader::new(document))
}

/// Collect the text of every `w:p` element of a WordprocessingML body.
///
/// Runs are concatenated, `w:tab` becomes a tab and `w:br`/`w:cr` a newline.
pub fn paragraphs_from_xml<R: BufRead>(source: R) -> Result<Vec<String>, DocxError> {
    let mut reader = Reader::from_reader(source);
    let mut buf = Vec::new();
    let mut paragraphs: Vec<String> = Vec::new();
    // Text boxes nest paragraphs inside paragraphs. A paragraph takes its
    // slot when it opens, so nested ones follow their enclosing paragraph.
    let mut open: Vec<usize> = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => {
                    open.push(paragraphs.len());
                    paragraphs.push(String::new());
                }
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" => paragraphs.push(String::new()),
                b"w:tab" => push_to_current(&mut paragraphs, &open, "\t"),
                b"w:br" | b"w:cr" => push_to_current(&mut paragraphs, &open, "\n"),
                _ => {}
            },
            Event::Text(text) if in_text => {
                let text = text.unescape()?;
                push_to_current(&mut paragraphs, &open, &text);
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => {
                    open.pop();
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}

fn push_to_current(paragraphs: &mut [String], open: &[usize], text: &str) {
    if let Some(paragraph) = open.last().and_then(|&index| paragraphs.get_mut(index)) {
        paragraph.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(inner: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            inner
        )
    }

    #[test]
    fn test_runs_are_joined_per_paragraph() {
        let xml = body(
            "<w:p><w:r><w:t>Hello </w:t></w:r><w:r><w:t>world</w:t></w:r></w:p>\
             <w:p><w:r><w:t>Second</w:t></w:r></w:p>",
        );
        let paragraphs = paragraphs_from_xml(xml.as_bytes()).unwrap();
        assert_eq!(paragraphs, vec!["Hello world", "Second"]);
    }

    #[test]
    fn test_tabs_breaks_and_entities() {
        let xml = body(
            "<w:p><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>Fish &amp; chips</w:t></w:r></w:p>",
        );
        let paragraphs = paragraphs_from_xml(xml.as_bytes()).unwrap();
        assert_eq!(paragraphs, vec!["a\tb\nFish & chips"]);
    }

    #[test]
    fn test_empty_paragraphs_are_kept() {
        let xml = body("<w:p/><w:p><w:pPr/></w:p><w:p><w:r><w:t>x</w:t></w:r></w:p>");
        let paragraphs = paragraphs_from_xml(xml.as_bytes()).unwrap();
        assert_eq!(paragraphs, vec!["", "", "x"]);
    }

    #[test]
    fn test_text_box_paragraphs_follow_their_container() {
        let xml = body(
            "<w:p><w:r><w:t>Before box </w:t></w:r>\
             <w:r><w:txbxContent><w:p><w:r><w:t>Inside box</w:t></w:r></w:p></w:txbxContent></w:r>\
             <w:r><w:t>after box</w:t></w:r></w:p>\
             <w:p><w:r><w:t>Next</w:t></w:r></w:p>",
        );
        let paragraphs = paragraphs_from_xml(xml.as_bytes()).unwrap();
        assert_eq!(paragraphs, vec!["Before box after box", "Inside box", "Next"]);
    }

    #[test]
    fn test_text_outside_w_t_is_ignored() {
        let xml = body("<w:p><w:r><w:instrText>PAGE</w:instrText><w:t>1</w:t></w:r></w:p>");
        let paragraphs = paragraphs_from_xml(xml.as_bytes()).unwrap();
        assert_eq!(paragraphs, vec!["1"]);
    }

    #[test]
    fn test_not_a_zip_archive() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("broken.docx");
        std::fs::write(&path, b"definitely not a zip").unwrap();
        assert!(matches!(
            extract_paragraphs(&path),
            Err(DocxError::ArchiveError(_))
        ));
    }
}
