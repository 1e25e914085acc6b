//! DBS/POSB consolidated statement.
//!
//! When the table header carries Withdrawal, Deposit and Balance labels the
//! rows are read from word positions. Otherwise the page text is parsed line
//! by line and each amount's direction comes from the running balance.

use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;

use crate::extraction::lines::WordLine;
use crate::extraction::{document_lines, document_text, PageContent};
use crate::formats::columnar::{self, ColumnLayout, DateHead};
use crate::model::ParserId;
use crate::parsing::builder::{AccountMetadata, PendingTransaction, TransactionBuilder};
use crate::parsing::columns::{self, LabelSearch};
use crate::parsing::dates::DateShape;
use crate::parsing::direction::RunningBalance;
use crate::parsing::section::{SectionEvent, SectionMarkers, SectionScanner};
use crate::parsing::{parse_amount, Diagnostics, ParseOptions, ParsedStatement};

pub const BANK: &str = "DBS/POSB";

const START: &[&str] = &["Balance Brought Forward", "Balance B/F"];
const END: &[&str] = &[
    "Balance Carried Forward",
    "Total Balance Carried Forward",
    "Balance C/F",
    "Total Balance",
];
const END_PREFIXES: &[&str] = &["Messages For", "Transaction Details as of"];

pub const COLUMN_MARKERS: SectionMarkers = SectionMarkers {
    start: START,
    end: END,
    end_prefixes: END_PREFIXES,
    reentrant: true,
};

/// The text path also treats page footers as a hard break.
pub const TEXT_MARKERS: SectionMarkers = SectionMarkers {
    start: START,
    end: &[
        "Balance Carried Forward",
        "Total Balance Carried Forward",
        "Balance C/F",
        "Total Balance",
        "Page ",
    ],
    end_prefixes: END_PREFIXES,
    reentrant: true,
};

static ACCOUNT_NO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Account No[.\s]+(\d{3}-\d+-\d+)").unwrap());
static STATEMENT_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)as at (\d{1,2}\s+\w+\s+\d{4})").unwrap());
static BROUGHT_FORWARD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Balance Brought Forward(?:\s+SGD)?\s+([\d,]+\.\d{2})").unwrap()
});
static ROW_DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{2}/\d{2}/\d{4})\b").unwrap());

static FULL_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2}/\d{2}/\d{4})\s+(.+?)\s+([\d,]+\.\d{2})\s+([\d,]+\.\d{2})$").unwrap()
});
static DATE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2}/\d{2}/\d{4})\s*(.*)$").unwrap());
static AMOUNT_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([\d,]+\.\d{2})\s+([\d,]+\.\d{2})\s*$").unwrap());
static AMOUNT_SINGLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([\d,]+\.\d{2})\s*$").unwrap());

pub fn extract_metadata(text: &str) -> AccountMetadata {
    let mut account = AccountMetadata::default();
    if let Some(caps) = ACCOUNT_NO.captures(text) {
        let number = caps[1].replace('-', "");
        tracing::debug!(account = %number, "account number");
        account.insert("accountNumber", number);
    }
    if let Some(caps) = STATEMENT_DATE.captures(text) {
        account.insert("statementDate", &caps[1]);
    }
    account
}

pub fn brought_forward(line: &str) -> Option<Decimal> {
    BROUGHT_FORWARD
        .captures(line)
        .and_then(|caps| parse_amount(&caps[1]))
}

pub struct PosbColumns;

impl ColumnLayout for PosbColumns {
    fn markers(&self) -> SectionMarkers {
        COLUMN_MARKERS
    }

    fn date_head(&self, line: &WordLine) -> Option<DateHead> {
        let text = line.text();
        let date = ROW_DATE.captures(&text)?.get(1)?.as_str().to_string();
        let consumed = line
            .words
            .iter()
            .enumerate()
            .filter(|(_, w)| w.text == date)
            .map(|(i, _)| i)
            .collect();
        Some(DateHead {
            date,
            value_date: None,
            consumed,
        })
    }

    fn brought_forward(&self, line_text: &str) -> Option<Decimal> {
        brought_forward(line_text)
    }
}

/// Classification of one line on the text path.
#[derive(Debug, Clone, PartialEq)]
pub enum TextLine<'a> {
    /// Date, description, amount and balance on one line.
    Complete {
        date: &'a str,
        description: &'a str,
        amount: Decimal,
        balance: Decimal,
    },
    /// Date and the first part of a description.
    Start { date: &'a str, description: &'a str },
    /// Trailing `amount balance`, or a lone balance.
    Amounts {
        amount: Option<Decimal>,
        balance: Decimal,
    },
    Continuation(&'a str),
    Noise,
}

fn is_header_noise(line: &str) -> bool {
    line.is_empty()
        || line.contains("DateDescription")
        || line.starts_with("Withdrawal")
        || line.starts_with("Deposit")
}

/// Classify a trimmed in-section line. `pending` tells whether a transaction
/// is waiting for amounts or more description.
pub fn classify_text_line(line: &str, pending: bool) -> TextLine<'_> {
    if is_header_noise(line) {
        return TextLine::Noise;
    }

    if let Some(caps) = FULL_LINE.captures(line) {
        if let (Some(date), Some(desc), Some(amount), Some(balance)) = (
            caps.get(1),
            caps.get(2),
            caps.get(3).and_then(|m| parse_amount(m.as_str())),
            caps.get(4).and_then(|m| parse_amount(m.as_str())),
        ) {
            return TextLine::Complete {
                date: date.as_str(),
                description: desc.as_str().trim(),
                amount,
                balance,
            };
        }
    }

    if let Some(caps) = DATE_LINE.captures(line) {
        let remainder = caps.get(2).map_or("", |m| m.as_str().trim());
        if remainder.is_empty() || AMOUNT_SINGLE.is_match(remainder) {
            return TextLine::Noise;
        }
        if let Some(date) = caps.get(1) {
            return TextLine::Start {
                date: date.as_str(),
                description: remainder,
            };
        }
    }

    if pending {
        if let Some(caps) = AMOUNT_PAIR.captures(line) {
            if let (Some(amount), Some(balance)) = (parse_amount(&caps[1]), parse_amount(&caps[2])) {
                return TextLine::Amounts {
                    amount: Some(amount),
                    balance,
                };
            }
        }
        if let Some(balance) = AMOUNT_SINGLE
            .captures(line)
            .and_then(|caps| parse_amount(&caps[1]))
        {
            return TextLine::Amounts {
                amount: None,
                balance,
            };
        }
        if !line.starts_with(|c: char| c.is_ascii_digit()) {
            return TextLine::Continuation(line);
        }
    }

    TextLine::Noise
}

struct TextScan<'a> {
    builder: &'a TransactionBuilder,
    running: RunningBalance,
    pending: Option<PendingTransaction>,
    out: Vec<crate::model::Transaction>,
}

impl TextScan<'_> {
    /// Resolve direction from the running balance and emit.
    fn emit(&mut self, mut tx: PendingTransaction, amount: Option<Decimal>, balance: Option<Decimal>) {
        tx.balance = balance;
        let direction = self.running.resolve(balance);
        (tx.amount_in, tx.amount_out) = direction.split(amount);
        tracing::debug!(date = %tx.date, ?direction, ?amount, ?balance, "transaction");
        self.out.push(self.builder.build(tx));
    }

    fn flush(&mut self) {
        if let Some(tx) = self.pending.take() {
            self.emit(tx, None, None);
        }
    }
}

fn parse_text(
    pages: &[PageContent],
    builder: &TransactionBuilder,
    diagnostics: &mut Diagnostics,
) -> Vec<crate::model::Transaction> {
    let mut scanner = SectionScanner::new(TEXT_MARKERS);
    let mut scan = TextScan {
        builder,
        running: RunningBalance::new(),
        pending: None,
        out: Vec::new(),
    };

    for (i, raw) in document_lines(pages).enumerate() {
        let line = raw.trim();
        match scanner.feed(line) {
            SectionEvent::Started => {
                scan.flush();
                if let Some(balance) = brought_forward(line) {
                    scan.running.seed(balance);
                }
                tracing::debug!(line = i, balance = ?scan.running.get(), "section start");
                continue;
            }
            SectionEvent::Ended => {
                if let Some(tx) = scan.pending.take() {
                    diagnostics.skip(
                        &format!("{} {}", tx.date, tx.description),
                        "transaction without amounts at page or section break",
                    );
                }
                tracing::debug!(line = i, "section end");
                continue;
            }
            SectionEvent::Outside => continue,
            SectionEvent::Row => {}
        }

        match classify_text_line(line, scan.pending.is_some()) {
            TextLine::Complete {
                date,
                description,
                amount,
                balance,
            } => {
                scan.flush();
                let mut tx = PendingTransaction::new(date);
                tx.append_description(description);
                scan.emit(tx, Some(amount), Some(balance));
            }
            TextLine::Start { date, description } => {
                scan.flush();
                let mut tx = PendingTransaction::new(date);
                tx.append_description(description);
                scan.pending = Some(tx);
            }
            TextLine::Amounts { amount, balance } => {
                if let Some(tx) = scan.pending.take() {
                    scan.emit(tx, amount, Some(balance));
                }
            }
            TextLine::Continuation(text) => {
                if let Some(tx) = scan.pending.as_mut() {
                    tx.append_description(text);
                }
            }
            TextLine::Noise => {
                if !is_header_noise(line) {
                    diagnostics.skip(line, "unrecognized line");
                }
            }
        }
    }

    scan.flush();
    scan.out
}

pub fn parse(pages: &[PageContent], options: &ParseOptions) -> ParsedStatement {
    let account = extract_metadata(&document_text(pages));
    let builder = TransactionBuilder::new(
        ParserId::DbsPosb,
        BANK,
        DateShape::DayMonthYear,
        account,
        options.fallback_year,
    );
    let mut diagnostics = Diagnostics::default();

    let located = columns::locate(
        pages,
        &options.columns,
        &options.clustering,
        LabelSearch::HeaderRow,
    );
    let transactions = match located {
        Some(found) => {
            tracing::debug!(
                withdrawal = found.withdrawal_x,
                deposit = found.deposit_x,
                balance = found.balance_x,
                "column positions"
            );
            columnar::scan(
                pages,
                &PosbColumns,
                Some(found),
                &builder,
                &options.clustering,
                &mut diagnostics,
            )
        }
        None => {
            tracing::debug!("no column header, parsing page text");
            parse_text(pages, &builder, &mut diagnostics)
        }
    };

    tracing::debug!(count = transactions.len(), "posb transactions");
    diagnostics.finish(transactions)
}
