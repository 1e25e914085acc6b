//! Configurable CSV export parser.
//!
//! A [`CsvConfig`] maps header names onto transaction fields. Every column
//! the mapping does not claim is carried into the transaction's metadata.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TallyError;
use crate::model::{ParserId, Transaction};
use crate::parsing::builder::base_metadata;
use crate::parsing::dates;
use crate::parsing::{parse_amount, Diagnostics, ParseOptions, ParsedStatement};

pub const DEFAULT_BANK: &str = "Generic";
pub const DEFAULT_DATE_FORMAT: &str = "%m/%d/%Y";

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_true() -> bool {
    true
}

fn default_date_column() -> String {
    "Date".to_string()
}

fn default_description_column() -> String {
    "Description".to_string()
}

fn default_amount_column() -> String {
    "Amount".to_string()
}

/// Header names for each transaction field.
///
/// In a supplied mapping only `date` and `description` have defaults; amount
/// and balance columns left out stay unmapped and land in metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    #[serde(default = "default_date_column")]
    pub date: String,
    #[serde(default = "default_description_column")]
    pub description: String,
    #[serde(default)]
    pub amount_in: Option<String>,
    #[serde(default)]
    pub amount_out: Option<String>,
    #[serde(default)]
    pub balance: Option<String>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        ColumnMapping {
            date: default_date_column(),
            description: default_description_column(),
            amount_in: Some("Credit".into()),
            amount_out: Some("Debit".into()),
            balance: Some("Balance".into()),
        }
    }
}

impl ColumnMapping {
    fn claims(&self, header: &str) -> bool {
        header == self.date
            || header == self.description
            || [&self.amount_in, &self.amount_out, &self.balance]
                .into_iter()
                .any(|col| col.as_deref() == Some(header))
    }
}

/// Alternative amount layouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AmountTransform {
    /// One signed column: positive is money in, negative money out.
    SingleColumnSigned {
        #[serde(default = "default_amount_column")]
        column: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvConfig {
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// The first row is always read as the header row.
    #[serde(default = "default_true")]
    pub has_header: bool,
    /// strftime pattern. `None` means best-effort parsing.
    #[serde(default)]
    pub date_format: Option<String>,
    #[serde(default)]
    pub column_mapping: ColumnMapping,
    #[serde(default)]
    pub amount_transform: Option<AmountTransform>,
    /// Value of the `bank` metadata key.
    #[serde(default)]
    pub bank: Option<String>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        CsvConfig {
            delimiter: default_delimiter(),
            has_header: true,
            date_format: Some(DEFAULT_DATE_FORMAT.to_string()),
            column_mapping: ColumnMapping::default(),
            amount_transform: None,
            bank: None,
        }
    }
}

impl CsvConfig {
    pub fn from_json(json: &str) -> Result<Self, TallyError> {
        serde_json::from_str(json).map_err(|e| TallyError::InvalidConfig(e.to_string()))
    }

    fn delimiter_byte(&self) -> Result<u8, TallyError> {
        match self.delimiter.as_bytes() {
            [b] => Ok(*b),
            _ => Err(TallyError::InvalidConfig(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            ))),
        }
    }
}

/// Split a signed amount into (in, out). Zero is neither.
pub fn split_signed(amount: Decimal) -> (Option<Decimal>, Option<Decimal>) {
    if amount > Decimal::ZERO {
        (Some(amount), None)
    } else if amount < Decimal::ZERO {
        (None, Some(amount.abs()))
    } else {
        (None, None)
    }
}

struct Row<'a> {
    headers: &'a csv::StringRecord,
    record: &'a csv::StringRecord,
}

impl<'a> Row<'a> {
    fn get(&self, column: &str) -> Option<&'a str> {
        let idx = self.headers.iter().position(|h| h == column)?;
        self.record.get(idx)
    }

    fn amount(&self, column: Option<&str>) -> Option<Decimal> {
        column
            .and_then(|c| self.get(c))
            .filter(|v| !v.trim().is_empty())
            .and_then(parse_amount)
    }
}

pub fn parse(bytes: &[u8], options: &ParseOptions) -> Result<ParsedStatement, TallyError> {
    let config = options.csv.clone().unwrap_or_default();
    let text = std::str::from_utf8(bytes).map_err(|e| TallyError::Decode(e.to_string()))?;
    if !config.has_header {
        tracing::warn!("hasHeader is false; the first row is still read as the header");
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(config.delimiter_byte()?)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();
    tracing::debug!(columns = headers.len(), "csv header");

    let mapping = &config.column_mapping;
    let bank = config.bank.as_deref().unwrap_or(DEFAULT_BANK);
    let year = options.fallback_year.unwrap_or_else(dates::current_year);
    let mut diagnostics = Diagnostics::default();
    let mut transactions = Vec::new();

    for record in reader.records() {
        let record = record?;
        let row = Row {
            headers: &headers,
            record: &record,
        };

        let raw_date = row.get(&mapping.date).unwrap_or("");
        let description = row.get(&mapping.description).unwrap_or("");
        if raw_date.trim().is_empty() && description.trim().is_empty() {
            diagnostics.skip(&record.iter().collect::<Vec<_>>().join(","), "no date and no description");
            continue;
        }

        let (amount_in, amount_out) = match &config.amount_transform {
            Some(AmountTransform::SingleColumnSigned { column }) => row
                .amount(Some(column.as_str()))
                .map(split_signed)
                .unwrap_or((None, None)),
            None => (
                row.amount(mapping.amount_in.as_deref()),
                row.amount(mapping.amount_out.as_deref()),
            ),
        };

        let mut metadata = base_metadata("csv", ParserId::GenericCsv, bank);
        for (header, value) in headers.iter().zip(record.iter()) {
            if !mapping.claims(header) {
                metadata.insert(header.to_string(), Value::from(value));
            }
        }

        transactions.push(Transaction {
            date: dates::normalize_with_format(raw_date, config.date_format.as_deref(), year),
            description: description.trim().to_string(),
            amount_in,
            amount_out,
            balance: row.amount(mapping.balance.as_deref()),
            metadata,
            account_identifier: None,
            linkage: None,
        });
    }

    tracing::debug!(count = transactions.len(), "csv transactions");
    Ok(diagnostics.finish(transactions))
}
