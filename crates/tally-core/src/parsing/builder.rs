use rust_decimal::Decimal;
use serde_json::Value;

use crate::model::{Metadata, ParserId, Transaction};
use crate::parsing::dates::{self, DateShape};
use crate::parsing::linkage;

/// Document-level facts attached to every transaction of a statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountMetadata {
    /// Copied into each transaction's metadata.
    pub fields: Metadata,
    /// Year for statements that print day-month dates.
    pub statement_year: Option<i32>,
    /// Propagated to `Transaction::account_identifier`.
    pub account_identifier: Option<String>,
}

impl AccountMetadata {
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.fields.insert(key.to_string(), value.into());
    }
}

/// The fixed metadata keys every transaction carries.
pub fn base_metadata(source: &str, parser_id: ParserId, bank: &str) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("source".into(), Value::from(source));
    metadata.insert("parserId".into(), Value::from(parser_id.as_str()));
    metadata.insert("bank".into(), Value::from(bank));
    metadata
}

/// A transaction still being assembled from one or more lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingTransaction {
    /// Date exactly as printed.
    pub date: String,
    pub value_date: Option<String>,
    pub description: String,
    pub amount_in: Option<Decimal>,
    pub amount_out: Option<Decimal>,
    pub balance: Option<Decimal>,
    /// Per-transaction metadata, merged over the document fields.
    pub extra: Metadata,
}

impl PendingTransaction {
    pub fn new(date: impl Into<String>) -> Self {
        PendingTransaction {
            date: date.into(),
            ..Default::default()
        }
    }

    /// Append a continuation fragment, separated by a single space.
    pub fn append_description(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if !self.description.is_empty() {
            self.description.push(' ');
        }
        self.description.push_str(text);
    }
}

/// Turns pending transactions into final records for one document.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    parser_id: ParserId,
    bank: &'static str,
    date_shape: DateShape,
    year: i32,
    account: AccountMetadata,
    detect_linkage: bool,
}

impl TransactionBuilder {
    /// `fallback_year` applies when the statement carries no year of its own.
    pub fn new(
        parser_id: ParserId,
        bank: &'static str,
        date_shape: DateShape,
        account: AccountMetadata,
        fallback_year: Option<i32>,
    ) -> Self {
        let year = account
            .statement_year
            .or(fallback_year)
            .unwrap_or_else(dates::current_year);
        TransactionBuilder {
            parser_id,
            bank,
            date_shape,
            year,
            account,
            detect_linkage: false,
        }
    }

    /// Also tag internal transfers.
    pub fn with_linkage(mut self) -> Self {
        self.detect_linkage = true;
        self
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn build(&self, pending: PendingTransaction) -> Transaction {
        let description = pending
            .description
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        let mut metadata = base_metadata("pdf", self.parser_id, self.bank);
        metadata.extend(self.account.fields.clone());
        if let Some(value_date) = &pending.value_date {
            metadata.insert(
                "valueDate".into(),
                Value::from(dates::normalize(value_date, self.date_shape, self.year)),
            );
        }
        metadata.extend(pending.extra);

        let linkage = if self.detect_linkage {
            linkage::detect(&description)
        } else {
            None
        };

        Transaction {
            date: dates::normalize(&pending.date, self.date_shape, self.year),
            description,
            amount_in: pending.amount_in,
            amount_out: pending.amount_out,
            balance: pending.balance,
            metadata,
            account_identifier: self.account.account_identifier.clone(),
            linkage,
        }
    }
}
