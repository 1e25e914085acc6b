//! OCBC FRANK account statement.
//!
//! Rows open with a transaction date and a value date (`01 NOV 02 NOV`),
//! amounts sit under Withdrawal, Deposit and Balance columns. Description
//! lines may be printed above the first row after `BALANCE B/F`.

use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;

use crate::extraction::lines::WordLine;
use crate::extraction::{document_text, PageContent};
use crate::formats::columnar::{self, ColumnLayout, DateHead};
use crate::model::ParserId;
use crate::parsing::builder::{AccountMetadata, TransactionBuilder};
use crate::parsing::columns::{self, LabelSearch};
use crate::parsing::dates::DateShape;
use crate::parsing::section::SectionMarkers;
use crate::parsing::{is_amount_token, parse_amount, Diagnostics, ParseOptions, ParsedStatement};

pub const BANK: &str = "OCBC";

pub const MARKERS: SectionMarkers = SectionMarkers {
    start: &["BALANCE B/F"],
    end: &["BALANCE C/F"],
    end_prefixes: &[],
    reentrant: true,
};

static ACCOUNT_NO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Account No[.\s]+(\d+)").unwrap());
static PERIOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2}\s+\w+\s+(\d{4}))\s+TO\s+(\d{1,2}\s+\w+\s+\d{4})").unwrap()
});
static DAY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{1,2}$").unwrap());
static MONTH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^[A-Z]{3}$").unwrap());

pub fn extract_metadata(text: &str) -> AccountMetadata {
    let mut account = AccountMetadata::default();
    if let Some(caps) = ACCOUNT_NO.captures(text) {
        account.account_identifier = Some(caps[1].to_string());
    }
    if let Some(caps) = PERIOD.captures(text) {
        account.insert("statementPeriodStart", &caps[1]);
        account.insert("statementPeriodEnd", &caps[3]);
        if let Ok(year) = caps[2].parse::<i32>() {
            account.statement_year = Some(year);
            account.insert("statementYear", year);
        }
        tracing::debug!(start = &caps[1], end = &caps[3], "statement period");
    }
    account
}

/// Adjacent `day month` word pairs, with the indices they occupy.
fn date_pairs(line: &WordLine) -> Vec<(String, [usize; 2])> {
    line.words
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| DAY.is_match(&pair[0].text) && MONTH.is_match(&pair[1].text))
        .map(|(i, pair)| (format!("{} {}", pair[0].text, pair[1].text), [i, i + 1]))
        .collect()
}

pub struct OcbcColumns;

impl ColumnLayout for OcbcColumns {
    fn markers(&self) -> SectionMarkers {
        MARKERS
    }

    fn date_head(&self, line: &WordLine) -> Option<DateHead> {
        let pairs = date_pairs(line);
        if pairs.len() < 2 {
            return None;
        }
        let consumed = pairs.iter().flat_map(|(_, idx)| *idx).collect();
        let mut dates = pairs.into_iter().map(|(date, _)| date);
        Some(DateHead {
            date: dates.next()?,
            value_date: dates.next(),
            consumed,
        })
    }

    fn brought_forward(&self, line_text: &str) -> Option<Decimal> {
        line_text
            .split_whitespace()
            .filter(|t| is_amount_token(t))
            .last()
            .and_then(parse_amount)
    }

    fn keeps_leading_description(&self) -> bool {
        true
    }

    fn looks_dated(&self, line: &WordLine) -> bool {
        line.words.iter().any(|w| DAY.is_match(&w.text))
            && line.words.iter().any(|w| MONTH.is_match(&w.text))
    }
}

pub fn parse(pages: &[PageContent], options: &ParseOptions) -> ParsedStatement {
    let account = extract_metadata(&document_text(pages));
    let builder = TransactionBuilder::new(
        ParserId::OcbcFrank,
        BANK,
        DateShape::DayMonthName,
        account,
        options.fallback_year,
    );
    let mut diagnostics = Diagnostics::default();

    let found = columns::locate(
        pages,
        &options.columns,
        &options.clustering,
        LabelSearch::SpreadOverPage,
    );
    if found.is_none() {
        diagnostics.warn("column headers not found, direction inferred from balance");
    }

    let transactions = columnar::scan(
        pages,
        &OcbcColumns,
        found,
        &builder,
        &options.clustering,
        &mut diagnostics,
    );

    tracing::debug!(count = transactions.len(), "ocbc transactions");
    diagnostics.finish(transactions)
}
