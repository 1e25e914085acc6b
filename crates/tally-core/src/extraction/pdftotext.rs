use crate::error::TallyError;
use crate::extraction::{PageContent, PdfExtractor, Word};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::io::Write;
use std::path::Path;
use std::process::Command;

/// PDF extraction backend using pdftotext (from poppler-utils).
///
/// Page text comes from `pdftotext -layout`, word boxes from `pdftotext -bbox`.
pub struct PdftotextExtractor;

impl PdftotextExtractor {
    pub fn new() -> Self {
        PdftotextExtractor
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for PdftotextExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, TallyError> {
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| TallyError::Extraction(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| TallyError::Extraction(e.to_string()))?;
        let tmp_path = tmpfile.path().to_path_buf();

        let text = run_pdftotext(&tmp_path, "-layout")?;
        let xml = run_pdftotext(&tmp_path, "-bbox")?;
        let word_pages = parse_bbox_words(&xml)?;

        // pdftotext uses form feed \x0c as page separator
        let text_pages: Vec<&str> = text.split('\x0c').collect();
        let page_count = word_pages
            .len()
            .max(text_pages.iter().filter(|p| !p.trim().is_empty()).count());

        let pages = (0..page_count)
            .map(|i| PageContent {
                page_number: i + 1,
                lines: text_pages
                    .get(i)
                    .map(|t| t.lines().map(|l| l.to_string()).collect())
                    .unwrap_or_default(),
                words: word_pages.get(i).cloned().unwrap_or_default(),
            })
            .collect();

        Ok(pages)
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

fn run_pdftotext(pdf_path: &Path, mode: &str) -> Result<String, TallyError> {
    let output = Command::new("pdftotext")
        .arg(mode)
        .arg(pdf_path)
        .arg("-") // output to stdout
        .output()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TallyError::PdftotextNotFound
            } else {
                TallyError::Extraction(format!("pdftotext {} failed: {}", mode, e))
            }
        })?;

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(TallyError::PdftotextFailed { code, stderr });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Parse `pdftotext -bbox` XHTML into one word list per `<page>`.
fn parse_bbox_words(xml: &str) -> Result<Vec<Vec<Word>>, TallyError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    reader.config_mut().check_end_names = false;

    let mut pages: Vec<Vec<Word>> = Vec::new();
    let mut current: Option<Word> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"page" => pages.push(Vec::new()),
                b"word" => current = parse_word_box(&e),
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if let Some(word) = current.as_mut() {
                    let text = t
                        .unescape()
                        .map(|c| c.into_owned())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&t).into_owned());
                    word.text.push_str(&text);
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"word" {
                    if let (Some(word), Some(page)) = (current.take(), pages.last_mut()) {
                        if !word.text.trim().is_empty() {
                            page.push(word);
                        }
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(TallyError::Extraction(format!(
                    "invalid bbox output at position {}: {}",
                    reader.error_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    Ok(pages)
}

fn parse_word_box(tag: &BytesStart<'_>) -> Option<Word> {
    let mut x_min = None;
    let mut x_max = None;
    let mut y_min = None;
    let mut y_max = None;

    for attr in tag.attributes().flatten() {
        let value: Option<f32> = attr
            .unescape_value()
            .ok()
            .and_then(|v| v.trim().parse().ok());
        match attr.key.as_ref() {
            b"xMin" => x_min = value,
            b"xMax" => x_max = value,
            b"yMin" => y_min = value,
            b"yMax" => y_max = value,
            _ => {}
        }
    }

    Some(Word {
        text: String::new(),
        x0: x_min?,
        x1: x_max.or(x_min)?,
        top: y_min?,
        bottom: y_max.or(y_min)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bbox_words_per_page() {
        let xml = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">
<html xmlns="http://www.w3.org/1999/xhtml">
<head>
<title></title>
<meta name="Producer" content="Skia/PDF"/>
</head>
<body>
<doc>
  <page width="595.000000" height="842.000000">
    <word xMin="36.000000" yMin="120.500000" xMax="48.200000" yMax="130.000000">26</word>
    <word xMin="50.000000" yMin="120.500000" xMax="70.000000" yMax="130.000000">Nov</word>
  </page>
  <page width="595.000000" height="842.000000">
    <word xMin="36.000000" yMin="80.000000" xMax="90.000000" yMax="90.000000">A&amp;W</word>
  </page>
</doc>
</body>
</html>"#;
        let pages = parse_bbox_words(xml).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].len(), 2);
        assert_eq!(pages[0][0].text, "26");
        assert_eq!(pages[0][0].x0, 36.0);
        assert_eq!(pages[0][1].top, 120.5);
        assert_eq!(pages[1][0].text, "A&W");
    }

    #[test]
    fn test_word_without_coordinates_is_dropped() {
        let xml = r#"<doc><page><word>orphan</word><word xMin="1" yMin="2" xMax="3" yMax="4">kept</word></page></doc>"#;
        let pages = parse_bbox_words(xml).unwrap();
        assert_eq!(pages[0].len(), 1);
        assert_eq!(pages[0][0].text, "kept");
    }
}
