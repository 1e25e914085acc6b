pub mod builder;
pub mod columns;
pub mod dates;
pub mod direction;
pub mod linkage;
pub mod section;

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

use crate::extraction::lines::ClusterSettings;
use crate::formats::csv::CsvConfig;
use crate::model::Transaction;
use columns::ColumnSettings;

/// Result of parsing one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedStatement {
    pub transactions: Vec<Transaction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ParseWarning>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_lines: Vec<SkippedLine>,
}

/// Something the parser recovered from but a reader may want to check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseWarning {
    pub reason: String,
}

/// An in-section line that could not be used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedLine {
    pub line_text: String,
    pub reason: String,
}

/// Per-call parser options. Every field has a working default.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Only consulted by the generic CSV parser.
    pub csv: Option<CsvConfig>,
    pub columns: ColumnSettings,
    pub clustering: ClusterSettings,
    /// Year used for day-month dates when the statement carries none.
    /// `None` means the current calendar year.
    pub fallback_year: Option<i32>,
}

/// Collects diagnostics while a document is scanned.
#[derive(Debug, Default)]
pub(crate) struct Diagnostics {
    pub warnings: Vec<ParseWarning>,
    pub skipped_lines: Vec<SkippedLine>,
}

impl Diagnostics {
    pub fn warn(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(%reason, "parse warning");
        self.warnings.push(ParseWarning { reason });
    }

    pub fn skip(&mut self, line: &str, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::debug!(line, %reason, "skipped line");
        self.skipped_lines.push(SkippedLine {
            line_text: line.to_string(),
            reason,
        });
    }

    pub fn finish(self, transactions: Vec<Transaction>) -> ParsedStatement {
        ParsedStatement {
            transactions,
            warnings: self.warnings,
            skipped_lines: self.skipped_lines,
        }
    }
}

static AMOUNT_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\d,]+\.\d{2}$").unwrap());

/// True for statement money tokens such as `1,234.56`.
pub fn is_amount_token(s: &str) -> bool {
    AMOUNT_TOKEN.is_match(s.trim())
}

/// Parse a money string, dropping currency symbols, thousands separators and
/// whitespace. Returns None when nothing numeric is left.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}
