//! DBS PayLah! wallet statement.
//!
//! Every transaction fits on one line under the "NEW TRANSACTIONS" heading:
//!
//! ```text
//! NEW TRANSACTIONS
//! 26 Nov MIRANA SIGN 4.40 DB
//! REF NO: 123456
//! 28 Nov TOP UP WALLET FROM MY ACCOUNT 50.00 CR
//! Total : ...
//! ```

use regex::Regex;
use rust_decimal::Decimal;
use std::sync::LazyLock;

use crate::extraction::{document_lines, document_text, PageContent};
use crate::model::ParserId;
use crate::parsing::builder::{AccountMetadata, PendingTransaction, TransactionBuilder};
use crate::parsing::dates::DateShape;
use crate::parsing::direction::Direction;
use crate::parsing::section::{SectionEvent, SectionMarkers, SectionScanner};
use crate::parsing::{parse_amount, Diagnostics, ParseOptions, ParsedStatement};

pub const BANK: &str = "DBS";

pub const MARKERS: SectionMarkers = SectionMarkers {
    start: &["NEW TRANSACTIONS"],
    end: &["Total :"],
    end_prefixes: &[],
    reentrant: false,
};

// "22 Dec 2025 6596317826 8888880012044058": statement date, phone, wallet
static STATEMENT_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}\s+\w+\s+(\d{4}))\s+\d{10}\s+(\d{16})").unwrap());

static TRANSACTION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}\s+\w+)\s+(.+?)\s+([\d,]+\.\d{2})\s+(CR|DB)$").unwrap()
});

#[derive(Debug, Clone, PartialEq)]
pub enum LineKind<'a> {
    Transaction {
        date: &'a str,
        description: &'a str,
        amount: Decimal,
        direction: Direction,
    },
    Noise,
    Unrecognized,
}

pub fn classify_line(line: &str) -> LineKind<'_> {
    let line = line.trim();
    if line.is_empty() || line.contains("REF NO") {
        return LineKind::Noise;
    }

    let Some(caps) = TRANSACTION_LINE.captures(line) else {
        return LineKind::Unrecognized;
    };
    let (Some(date), Some(description), Some(amount), Some(kind)) =
        (caps.get(1), caps.get(2), caps.get(3), caps.get(4))
    else {
        return LineKind::Unrecognized;
    };
    let Some(amount) = parse_amount(amount.as_str()) else {
        return LineKind::Unrecognized;
    };

    LineKind::Transaction {
        date: date.as_str(),
        description: description.as_str().trim(),
        amount,
        direction: if kind.as_str() == "CR" {
            Direction::Inflow
        } else {
            Direction::Outflow
        },
    }
}

pub fn extract_metadata(text: &str) -> AccountMetadata {
    let mut account = AccountMetadata::default();
    if let Some(caps) = STATEMENT_HEADER.captures(text) {
        account.insert("statementDate", &caps[1]);
        if let Ok(year) = caps[2].parse::<i32>() {
            account.statement_year = Some(year);
            account.insert("statementYear", year);
        }
        account.insert("accountNumber", &caps[3]);
        account.account_identifier = Some(caps[3].to_string());
        tracing::debug!(statement_date = &caps[1], wallet = &caps[3], "statement header");
    }
    account
}

pub fn parse(pages: &[PageContent], options: &ParseOptions) -> ParsedStatement {
    let account = extract_metadata(&document_text(pages));
    let builder = TransactionBuilder::new(
        ParserId::DbsPaylah,
        BANK,
        DateShape::DayMonthName,
        account,
        options.fallback_year,
    )
    .with_linkage();

    let mut scanner = SectionScanner::new(MARKERS);
    let mut diagnostics = Diagnostics::default();
    let mut transactions = Vec::new();

    for (i, raw) in document_lines(pages).enumerate() {
        let line = raw.trim();
        match scanner.feed(line) {
            SectionEvent::Row => {}
            SectionEvent::Started => {
                tracing::debug!(line = i, "transaction section start");
                continue;
            }
            SectionEvent::Ended => {
                tracing::debug!(line = i, "transaction section end");
                continue;
            }
            SectionEvent::Outside => continue,
        }

        match classify_line(line) {
            LineKind::Transaction {
                date,
                description,
                amount,
                direction,
            } => {
                let mut pending = PendingTransaction::new(date);
                pending.append_description(description);
                (pending.amount_in, pending.amount_out) = direction.split(Some(amount));
                let kind = match direction {
                    Direction::Inflow => "credit",
                    Direction::Outflow => "debit",
                };
                pending
                    .extra
                    .insert("transactionType".into(), serde_json::Value::from(kind));
                transactions.push(builder.build(pending));
            }
            LineKind::Noise => {}
            LineKind::Unrecognized => diagnostics.skip(line, "not a transaction line"),
        }
    }

    tracing::debug!(count = transactions.len(), "paylah transactions");
    diagnostics.finish(transactions)
}
