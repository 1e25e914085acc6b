use crate::extraction::Word;

/// Vertical distance within which two words count as the same visual line.
///
/// Calibrated against bank statement renderings where words on one row differ
/// by fractions of a point. Rows that wrap tighter than this merge, rows whose
/// words drift further apart split.
pub const LINE_TOLERANCE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterSettings {
    pub tolerance: f32,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        ClusterSettings {
            tolerance: LINE_TOLERANCE,
        }
    }
}

/// One visual line: words sharing a vertical position, ordered left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct WordLine {
    /// Top of the first word that opened the line.
    pub top: f32,
    pub words: Vec<Word>,
}

impl WordLine {
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }
}

/// Group a page's words into visual lines.
///
/// Words are walked top to bottom; a word joins the current line while its
/// `top` is within `tolerance` of the line's anchor, otherwise it opens a new
/// line. Each line is then ordered by `x0`.
pub fn cluster_lines(words: &[Word], settings: &ClusterSettings) -> Vec<WordLine> {
    let mut sorted: Vec<&Word> = words.iter().collect();
    sorted.sort_by(|a, b| a.top.total_cmp(&b.top));

    let mut lines: Vec<WordLine> = Vec::new();
    for word in sorted {
        match lines.last_mut() {
            Some(line) if (word.top - line.top).abs() <= settings.tolerance => {
                line.words.push(word.clone());
            }
            _ => lines.push(WordLine {
                top: word.top,
                words: vec![word.clone()],
            }),
        }
    }

    for line in &mut lines {
        line.words.sort_by(|a, b| a.x0.total_cmp(&b.x0));
    }

    lines
}
