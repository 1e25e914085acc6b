//! Shared scan for statements laid out as a table with Withdrawal, Deposit
//! and Balance columns, read from word positions rather than text lines.

use rust_decimal::Decimal;

use crate::extraction::lines::{cluster_lines, ClusterSettings, WordLine};
use crate::extraction::PageContent;
use crate::model::Transaction;
use crate::parsing::builder::{PendingTransaction, TransactionBuilder};
use crate::parsing::columns::{Column, ColumnPositions};
use crate::parsing::direction::{self, Direction, RunningBalance};
use crate::parsing::section::{SectionEvent, SectionMarkers, SectionScanner};
use crate::parsing::{is_amount_token, parse_amount, Diagnostics};

/// Leading date(s) of a transaction row.
#[derive(Debug, Clone, PartialEq)]
pub struct DateHead {
    pub date: String,
    pub value_date: Option<String>,
    /// Indices of the words that make up the date tokens.
    pub consumed: Vec<usize>,
}

/// What distinguishes one column-layout statement from another.
pub trait ColumnLayout {
    fn markers(&self) -> SectionMarkers;

    /// Recognize the date(s) that open a transaction row.
    fn date_head(&self, line: &WordLine) -> Option<DateHead>;

    /// Balance figure carried on a section start line, if any.
    fn brought_forward(&self, line_text: &str) -> Option<Decimal>;

    /// Whether description lines printed above a section's first row belong
    /// to that row.
    fn keeps_leading_description(&self) -> bool {
        false
    }

    /// Whether an undated line still looks like it carries date fragments.
    fn looks_dated(&self, _line: &WordLine) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowKind {
    Start(DateHead),
    /// Undated line with amount tokens.
    Amounts,
    /// Undated line without amounts: description material.
    Text,
}

pub fn classify_row<L: ColumnLayout + ?Sized>(layout: &L, line: &WordLine) -> RowKind {
    if let Some(head) = layout.date_head(line) {
        return RowKind::Start(head);
    }
    if line.words.iter().any(|w| is_amount_token(&w.text)) {
        RowKind::Amounts
    } else {
        RowKind::Text
    }
}

/// Amount tokens of one row, sorted into columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BucketedAmounts {
    pub withdrawal: Option<Decimal>,
    pub deposit: Option<Decimal>,
    pub balance: Option<Decimal>,
}

pub fn bucket_amounts(line: &WordLine, columns: &ColumnPositions) -> BucketedAmounts {
    let mut amounts = BucketedAmounts::default();
    for word in &line.words {
        if !is_amount_token(&word.text) {
            continue;
        }
        let Some(value) = parse_amount(&word.text) else {
            continue;
        };
        match columns.bucket(word.x0) {
            Some(Column::Withdrawal) => amounts.withdrawal = Some(value),
            Some(Column::Deposit) => amounts.deposit = Some(value),
            Some(Column::Balance) => amounts.balance = Some(value),
            None => {}
        }
    }
    amounts
}

/// Without columns: the last amount on the row is the balance, the one
/// before it (if any) the transaction amount.
pub fn trailing_amounts(line: &WordLine) -> (Option<Decimal>, Option<Decimal>) {
    let values: Vec<Decimal> = line
        .words
        .iter()
        .filter(|w| is_amount_token(&w.text))
        .filter_map(|w| parse_amount(&w.text))
        .collect();
    match values.as_slice() {
        [] => (None, None),
        [balance] => (None, Some(*balance)),
        [.., amount, balance] => (Some(*amount), Some(*balance)),
    }
}

/// Description words of a row: not date tokens, not amounts, and left of
/// the withdrawal column when columns are known.
pub fn description_words<'a>(
    line: &'a WordLine,
    skip: &[usize],
    columns: Option<&ColumnPositions>,
) -> Vec<&'a str> {
    line.words
        .iter()
        .enumerate()
        .filter(|(i, _)| !skip.contains(i))
        .filter(|(_, w)| columns.map_or(true, |c| c.is_description(w.x0)))
        .filter(|(_, w)| !is_amount_token(&w.text))
        .map(|(_, w)| w.text.as_str())
        .collect()
}

struct OpenRow {
    tx: PendingTransaction,
    /// Amount whose direction is left to the running balance.
    unsigned_amount: Option<Decimal>,
}

struct ColumnScan<'a, L: ColumnLayout> {
    layout: &'a L,
    columns: Option<ColumnPositions>,
    builder: &'a TransactionBuilder,
    scanner: SectionScanner,
    running: RunningBalance,
    open: Option<OpenRow>,
    leading: Vec<String>,
    out: Vec<Transaction>,
}

impl<'a, L: ColumnLayout> ColumnScan<'a, L> {
    fn start_row(&mut self, line: &WordLine, head: DateHead) {
        let mut tx = PendingTransaction::new(head.date);
        tx.value_date = head.value_date;
        if !self.leading.is_empty() {
            tx.append_description(&self.leading.join(" "));
            self.leading.clear();
        }
        tx.append_description(&description_words(line, &head.consumed, self.columns.as_ref()).join(" "));

        let mut unsigned_amount = None;
        match &self.columns {
            Some(columns) => {
                let amounts = bucket_amounts(line, columns);
                tx.amount_out = amounts.withdrawal;
                tx.amount_in = amounts.deposit;
                tx.balance = amounts.balance;
            }
            None => {
                let (amount, balance) = trailing_amounts(line);
                unsigned_amount = amount;
                tx.balance = balance;
            }
        }

        tracing::debug!(date = %tx.date, description = %tx.description, "row start");
        self.open = Some(OpenRow {
            tx,
            unsigned_amount,
        });
    }

    fn continue_row(&mut self, line: &WordLine, diagnostics: &mut Diagnostics) {
        match self.open.as_mut() {
            Some(row) => {
                let words = description_words(line, &[], self.columns.as_ref());
                row.tx.append_description(&words.join(" "));
            }
            None if self.layout.keeps_leading_description() && !self.layout.looks_dated(line) => {
                self.leading
                    .extend(line.words.iter().map(|w| w.text.clone()));
            }
            None => diagnostics.skip(&line.text(), "text before first transaction row"),
        }
    }

    fn finalize(&mut self, diagnostics: &mut Diagnostics) {
        let Some(OpenRow {
            mut tx,
            unsigned_amount,
        }) = self.open.take()
        else {
            return;
        };

        if self.columns.is_some() {
            self.cross_check(&tx, diagnostics);
            self.running.observe(tx.balance);
        } else {
            let direction = self.running.resolve(tx.balance);
            (tx.amount_in, tx.amount_out) = direction.split(unsigned_amount);
        }

        self.out.push(self.builder.build(tx));
    }

    /// Compare the column verdict against the balance movement.
    fn cross_check(&self, tx: &PendingTransaction, diagnostics: &mut Diagnostics) {
        let column_direction = match (tx.amount_in, tx.amount_out) {
            (Some(_), None) => Direction::Inflow,
            (None, Some(_)) => Direction::Outflow,
            _ => return,
        };
        let (Some(previous), Some(current)) = (self.running.get(), tx.balance) else {
            return;
        };
        let implied = direction::infer(previous, current);
        if implied != column_direction {
            diagnostics.warn(format!(
                "{} '{}': column says {:?} but balance moved {} -> {}",
                tx.date, tx.description, column_direction, previous, current
            ));
        }
    }
}

/// Scan every page's word rows and build transactions.
///
/// Rows are only classified inside the section opened by the layout's start
/// marker. The open row is finalized on the next dated row, a section end,
/// or the end of each page.
pub(crate) fn scan<L: ColumnLayout>(
    pages: &[PageContent],
    layout: &L,
    columns: Option<ColumnPositions>,
    builder: &TransactionBuilder,
    clustering: &ClusterSettings,
    diagnostics: &mut Diagnostics,
) -> Vec<Transaction> {
    let mut scan = ColumnScan {
        layout,
        columns,
        builder,
        scanner: SectionScanner::new(layout.markers()),
        running: RunningBalance::new(),
        open: None,
        leading: Vec::new(),
        out: Vec::new(),
    };

    for page in pages {
        for line in cluster_lines(&page.words, clustering) {
            let text = line.text();
            if text.is_empty() {
                continue;
            }

            match scan.scanner.feed(&text) {
                SectionEvent::Started => {
                    scan.finalize(diagnostics);
                    scan.leading.clear();
                    if let Some(balance) = layout.brought_forward(&text) {
                        scan.running.seed(balance);
                    }
                    tracing::debug!(page = page.page_number, balance = ?scan.running.get(), "section start");
                    continue;
                }
                SectionEvent::Ended => {
                    scan.finalize(diagnostics);
                    scan.leading.clear();
                    tracing::debug!(page = page.page_number, "section end");
                    continue;
                }
                SectionEvent::Outside => continue,
                SectionEvent::Row => {}
            }

            match classify_row(layout, &line) {
                RowKind::Start(head) => {
                    scan.finalize(diagnostics);
                    scan.start_row(&line, head);
                }
                RowKind::Text => scan.continue_row(&line, diagnostics),
                RowKind::Amounts => {
                    if scan.open.is_none() {
                        diagnostics.skip(&text, "amounts without a dated row");
                    }
                }
            }
        }

        if scan.scanner.in_section() {
            scan.finalize(diagnostics);
        }
    }

    scan.finalize(diagnostics);
    scan.out
}
