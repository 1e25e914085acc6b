use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::TallyError;

/// Open key/value bag attached to every transaction.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// A normalized transaction, identical in shape for every parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// `YYYY-MM-DD`, or the source text verbatim when it could not be parsed.
    pub date: String,
    pub description: String,
    /// Credit / deposit.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount_in: Option<Decimal>,
    /// Debit / withdrawal.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub amount_out: Option<Decimal>,
    /// Running balance after this transaction, when the layout shows one.
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub balance: Option<Decimal>,
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkage: Option<Linkage>,
}

impl Transaction {
    /// True when neither an inflow nor an outflow could be extracted.
    pub fn is_no_signal(&self) -> bool {
        self.amount_in.is_none() && self.amount_out.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkageKind {
    Internal,
}

impl fmt::Display for LinkageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkageKind::Internal => write!(f, "internal"),
        }
    }
}

/// Marks a transaction as a transfer between the holder's own accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Linkage {
    #[serde(rename = "type")]
    pub kind: LinkageKind,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParserId {
    #[serde(rename = "generic_csv")]
    GenericCsv,
    #[serde(rename = "dbs_paylah_statement")]
    DbsPaylah,
    #[serde(rename = "dbs_posb_consolidated")]
    DbsPosb,
    #[serde(rename = "ocbc_frank_statement")]
    OcbcFrank,
}

impl ParserId {
    pub const ALL: [ParserId; 4] = [
        ParserId::GenericCsv,
        ParserId::DbsPaylah,
        ParserId::DbsPosb,
        ParserId::OcbcFrank,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParserId::GenericCsv => "generic_csv",
            ParserId::DbsPaylah => "dbs_paylah_statement",
            ParserId::DbsPosb => "dbs_posb_consolidated",
            ParserId::OcbcFrank => "ocbc_frank_statement",
        }
    }

    pub fn file_type(&self) -> FileType {
        match self {
            ParserId::GenericCsv => FileType::Csv,
            _ => FileType::Pdf,
        }
    }

    pub fn info(&self) -> ParserInfo {
        let (name, description) = match self {
            ParserId::GenericCsv => (
                "Generic CSV",
                "Generic CSV parser with customizable column mapping",
            ),
            ParserId::DbsPaylah => (
                "DBS PayLah! Statement",
                "Parser for DBS PayLah! wallet statements",
            ),
            ParserId::DbsPosb => (
                "DBS/POSB Consolidated Statement",
                "Parser for DBS/POSB monthly statements",
            ),
            ParserId::OcbcFrank => (
                "OCBC FRANK Account Statement",
                "Parser for OCBC FRANK account statements",
            ),
        };
        ParserInfo {
            id: *self,
            name: name.to_string(),
            file_type: self.file_type(),
            description: description.to_string(),
        }
    }
}

impl fmt::Display for ParserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParserId {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParserId::ALL
            .into_iter()
            .find(|id| id.as_str() == s.trim())
            .ok_or_else(|| TallyError::UnknownParser(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Csv,
    Pdf,
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileType::Csv => write!(f, "csv"),
            FileType::Pdf => write!(f, "pdf"),
        }
    }
}

/// Display metadata for one supported parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParserInfo {
    pub id: ParserId,
    pub name: String,
    pub file_type: FileType,
    pub description: String,
}

/// All supported parsers, in listing order.
pub fn catalog() -> Vec<ParserInfo> {
    ParserId::ALL.iter().map(ParserId::info).collect()
}
