pub mod lines;
pub mod pdftotext;

use crate::error::TallyError;

/// A single word with its bounding box, in PDF points from the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    /// Left edge.
    pub x0: f32,
    pub x1: f32,
    /// Top edge (distance from the top of the page).
    pub top: f32,
    pub bottom: f32,
}

impl Word {
    pub fn new(text: impl Into<String>, x0: f32, top: f32) -> Self {
        Word {
            text: text.into(),
            x0,
            x1: x0,
            top,
            bottom: top,
        }
    }
}

/// Content extracted from a single page of a PDF.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub page_number: usize,
    pub lines: Vec<String>,
    pub words: Vec<Word>,
}

impl PageContent {
    pub fn has_content(&self) -> bool {
        self.lines.iter().any(|l| !l.trim().is_empty()) || !self.words.is_empty()
    }
}

/// Trait for PDF text extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract text and word boxes from PDF bytes, returning one PageContent per page.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, TallyError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// All page lines in document order.
pub fn document_lines(pages: &[PageContent]) -> impl Iterator<Item = &str> {
    pages
        .iter()
        .flat_map(|p| p.lines.iter().map(|s| s.as_str()))
}

/// Page texts joined with newlines, for document-wide metadata searches.
pub fn document_text(pages: &[PageContent]) -> String {
    let mut text = String::new();
    for page in pages {
        for line in &page.lines {
            text.push_str(line);
            text.push('\n');
        }
        text.push('\n');
    }
    text
}
