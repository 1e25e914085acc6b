use crate::extraction::lines::{cluster_lines, ClusterSettings, WordLine};
use crate::extraction::PageContent;

/// Slack, in PDF points, subtracted from every column's left edge.
///
/// Right-aligned amounts can start a few points left of their header label.
pub const COLUMN_EPSILON: f32 = 5.0;

pub const WITHDRAWAL_LABEL: &str = "withdrawal";
pub const DEPOSIT_LABEL: &str = "deposit";
pub const BALANCE_LABEL: &str = "balance";

/// Calibration for header detection and column bucketing.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSettings {
    pub epsilon: f32,
    /// Lowercase substrings identifying each header label.
    pub withdrawal_label: String,
    pub deposit_label: String,
    pub balance_label: String,
}

impl Default for ColumnSettings {
    fn default() -> Self {
        ColumnSettings {
            epsilon: COLUMN_EPSILON,
            withdrawal_label: WITHDRAWAL_LABEL.to_string(),
            deposit_label: DEPOSIT_LABEL.to_string(),
            balance_label: BALANCE_LABEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Withdrawal,
    Deposit,
    Balance,
}

/// Left edges of the amount columns, found once per document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnPositions {
    pub withdrawal_x: f32,
    pub deposit_x: f32,
    pub balance_x: f32,
    pub epsilon: f32,
}

impl ColumnPositions {
    /// Which amount column a token starting at `x` falls in.
    ///
    /// Returns None left of the withdrawal column (the description area).
    pub fn bucket(&self, x: f32) -> Option<Column> {
        let eps = self.epsilon;
        if x >= self.balance_x - eps {
            Some(Column::Balance)
        } else if x >= self.deposit_x - eps {
            Some(Column::Deposit)
        } else if x >= self.withdrawal_x - eps {
            Some(Column::Withdrawal)
        } else {
            None
        }
    }

    /// True when `x` lies in the description area.
    pub fn is_description(&self, x: f32) -> bool {
        x < self.withdrawal_x - self.epsilon
    }
}

#[derive(Debug, Default)]
struct LabelHits {
    withdrawal: Option<f32>,
    deposit: Option<f32>,
    balance: Option<f32>,
}

impl LabelHits {
    fn record(&mut self, line: &WordLine, settings: &ColumnSettings) {
        for word in &line.words {
            let lower = word.text.to_lowercase();
            if lower.contains(&settings.withdrawal_label) {
                self.withdrawal.get_or_insert(word.x0);
            } else if lower.contains(&settings.deposit_label) {
                self.deposit.get_or_insert(word.x0);
            } else if lower.contains(&settings.balance_label) {
                self.balance.get_or_insert(word.x0);
            }
        }
    }

    fn complete(&self, epsilon: f32) -> Option<ColumnPositions> {
        Some(ColumnPositions {
            withdrawal_x: self.withdrawal?,
            deposit_x: self.deposit?,
            balance_x: self.balance?,
            epsilon,
        })
    }
}

/// Where header labels may be taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSearch {
    /// Only a single line carrying all three labels counts.
    HeaderRow,
    /// Failing a header row, the first occurrence of each label on one page.
    SpreadOverPage,
}

/// Locate the withdrawal / deposit / balance header labels.
///
/// Every page is searched for a header row first, in page order. Only when
/// none exists and `search` allows it are labels spread over a page
/// accepted. Returns None when nothing yields all three.
pub fn locate(
    pages: &[PageContent],
    settings: &ColumnSettings,
    clustering: &ClusterSettings,
    search: LabelSearch,
) -> Option<ColumnPositions> {
    let clustered: Vec<Vec<WordLine>> = pages
        .iter()
        .map(|page| cluster_lines(&page.words, clustering))
        .collect();

    for (page, lines) in pages.iter().zip(&clustered) {
        for line in lines {
            let mut hits = LabelHits::default();
            hits.record(line, settings);
            if let Some(found) = hits.complete(settings.epsilon) {
                tracing::debug!(page = page.page_number, ?found, "column header row");
                return Some(found);
            }
        }
    }

    if search == LabelSearch::HeaderRow {
        return None;
    }

    for (page, lines) in pages.iter().zip(&clustered) {
        let mut page_hits = LabelHits::default();
        for line in lines {
            page_hits.record(line, settings);
        }
        if let Some(found) = page_hits.complete(settings.epsilon) {
            tracing::debug!(page = page.page_number, ?found, "column labels spread over page");
            return Some(found);
        }
    }

    None
}
