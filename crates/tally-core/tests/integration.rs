//! Integration tests for the parse_statement() pipeline.
//!
//! Uses a MockExtractor that returns pre-built PageContent without
//! invoking pdftotext, so these tests run without poppler-utils.

use rust_decimal_macros::dec;
use tally_core::error::TallyError;
use tally_core::extraction::{PageContent, PdfExtractor, Word};
use tally_core::model::LinkageKind;
use tally_core::parse_statement;
use tally_core::parsing::{ParseOptions, ParsedStatement};

struct MockExtractor {
    pages: Vec<PageContent>,
}

impl PdfExtractor for MockExtractor {
    fn extract_pages(&self, _pdf_bytes: &[u8]) -> Result<Vec<PageContent>, TallyError> {
        Ok(self.pages.clone())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

struct FailingExtractor;

impl PdfExtractor for FailingExtractor {
    fn extract_pages(&self, _pdf_bytes: &[u8]) -> Result<Vec<PageContent>, TallyError> {
        Err(TallyError::Extraction("not a PDF".into()))
    }

    fn backend_name(&self) -> &str {
        "failing"
    }
}

fn page(number: usize, lines: &[&str]) -> PageContent {
    PageContent {
        page_number: number,
        lines: lines.iter().map(|s| s.to_string()).collect(),
        words: vec![],
    }
}

fn row(top: f32, words: &[(&str, f32)]) -> Vec<Word> {
    words.iter().map(|(t, x)| Word::new(*t, *x, top)).collect()
}

fn parse_pdf(parser_id: &str, pages: Vec<PageContent>) -> ParsedStatement {
    let extractor = MockExtractor { pages };
    parse_statement(parser_id, b"%PDF", &extractor, &ParseOptions::default()).unwrap()
}

fn no_pdf() -> MockExtractor {
    MockExtractor { pages: vec![] }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------
#[test]
fn csv_default_config() {
    let csv = "Date,Description,Credit,Debit,Balance\n01/15/2024,Coffee,,4.50,100.00\n";
    let parsed =
        parse_statement("generic_csv", csv.as_bytes(), &no_pdf(), &ParseOptions::default()).unwrap();

    assert_eq!(parsed.transactions.len(), 1);
    let tx = &parsed.transactions[0];
    assert_eq!(tx.date, "2024-01-15");
    assert_eq!(tx.description, "Coffee");
    assert_eq!(tx.amount_out, Some(dec!(4.50)));
    assert_eq!(tx.amount_in, None);
    assert_eq!(tx.balance, Some(dec!(100.00)));
}

#[test]
fn csv_row_count_excludes_only_blank_rows() {
    let csv = "Date,Description,Credit,Debit,Balance\n\
               01/15/2024,Coffee,,4.50,100.00\n\
               ,,,,\n\
               01/16/2024,,10.00,,110.00\n\
               ,Adjustment,,1.00,109.00\n";
    let parsed =
        parse_statement("generic_csv", csv.as_bytes(), &no_pdf(), &ParseOptions::default()).unwrap();
    assert_eq!(parsed.transactions.len(), 3);
}

#[test]
fn csv_serializes_amounts_as_numbers() {
    let csv = "Date,Description,Credit,Debit,Balance\n01/15/2024,Coffee,,4.50,100.00\n";
    let parsed =
        parse_statement("generic_csv", csv.as_bytes(), &no_pdf(), &ParseOptions::default()).unwrap();
    let value = serde_json::to_value(&parsed.transactions[0]).unwrap();
    assert_eq!(value["amountOut"], 4.5);
    assert!(value["amountIn"].is_null());
    assert_eq!(value["metadata"]["source"], "csv");
}

// ---------------------------------------------------------------------------
// PayLah
// ---------------------------------------------------------------------------
fn paylah_page() -> PageContent {
    page(
        1,
        &[
            "PayLah! Statement",
            "22 Dec 2025 6596317826 8888880012044058",
            "NEW TRANSACTIONS",
            "26 Nov MIRANA SIGN 4.40 DB",
            "REF NO: 99812",
            "28 Nov TOP UP WALLET FROM MY ACCOUNT 50.00 CR",
            "29 Nov NTUC FAIRPRICE 12.30 DB",
            "Total : 66.70",
        ],
    )
}

#[test]
fn paylah_single_line_transaction() {
    let parsed = parse_pdf("dbs_paylah_statement", vec![paylah_page()]);
    let tx = &parsed.transactions[0];
    assert_eq!(tx.date, "2025-11-26");
    assert_eq!(tx.description, "MIRANA SIGN");
    assert_eq!(tx.amount_out, Some(dec!(4.40)));
    assert_eq!(tx.amount_in, None);
    assert_eq!(tx.metadata["bank"], "DBS");
    assert_eq!(tx.metadata["statementYear"], 2025);
}

#[test]
fn paylah_internal_transfer_linkage() {
    let parsed = parse_pdf("dbs_paylah_statement", vec![paylah_page()]);
    let txs = &parsed.transactions;
    assert_eq!(txs.len(), 3);

    let top_up = txs[1].linkage.as_ref().unwrap();
    assert_eq!(top_up.kind, LinkageKind::Internal);
    assert!(top_up.reason.contains("top up wallet from my account"));
    assert!(txs[2].linkage.is_none());

    let value = serde_json::to_value(&txs[1]).unwrap();
    assert_eq!(value["linkage"]["type"], "internal");
}

#[test]
fn missing_start_marker_yields_nothing() {
    let parsed = parse_pdf(
        "dbs_paylah_statement",
        vec![page(1, &["26 Nov MIRANA SIGN 4.40 DB", "Total : 4.40"])],
    );
    assert!(parsed.transactions.is_empty());
}

#[test]
fn parsing_is_deterministic() {
    let first = parse_pdf("dbs_paylah_statement", vec![paylah_page()]);
    let second = parse_pdf("dbs_paylah_statement", vec![paylah_page()]);
    assert_eq!(first, second);
}

// ---------------------------------------------------------------------------
// POSB text layout (balance-delta)
// ---------------------------------------------------------------------------
#[test]
fn balance_drop_is_outflow() {
    let parsed = parse_pdf(
        "dbs_posb_consolidated",
        vec![page(
            1,
            &[
                "Balance B/F",
                "01/11/2025 OPENING 500.00 500.00",
                "02/11/2025 NETS QR 50.00 450.00",
                "Balance Carried Forward 450.00",
            ],
        )],
    );
    let tx = &parsed.transactions[1];
    assert_eq!(tx.date, "2025-11-02");
    assert_eq!(tx.amount_out, Some(dec!(50.00)));
    assert_eq!(tx.amount_in, None);
    assert_eq!(tx.balance, Some(dec!(450.00)));
}

#[test]
fn balance_rise_is_inflow() {
    let parsed = parse_pdf(
        "dbs_posb_consolidated",
        vec![page(
            1,
            &[
                "Balance B/F",
                "01/11/2025 OPENING 500.00 500.00",
                "02/11/2025 INTEREST 50.00 550.00",
                "Balance Carried Forward 550.00",
            ],
        )],
    );
    let tx = &parsed.transactions[1];
    assert_eq!(tx.amount_in, Some(dec!(50.00)));
    assert_eq!(tx.amount_out, None);
}

#[test]
fn first_transaction_without_prior_balance_defaults_to_outflow() {
    let parsed = parse_pdf(
        "dbs_posb_consolidated",
        vec![page(1, &["Balance B/F", "01/11/2025 OPENING 500.00 500.00"])],
    );
    assert_eq!(parsed.transactions[0].amount_out, Some(dec!(500.00)));
}

#[test]
fn posb_multi_line_transaction() {
    let parsed = parse_pdf(
        "dbs_posb_consolidated",
        vec![page(
            1,
            &[
                "POSB Savings Account No. 123-45678-9",
                "as at 30 Nov 2025",
                "Date Description Withdrawal (-) Deposit (+) Balance",
                "Balance Brought Forward SGD 500.00",
                "02/11/2025 FAST PAYMENT",
                "to JOHN TAN",
                "OTHR 12345",
                "50.00 450.00",
                "Balance Carried Forward 450.00",
            ],
        )],
    );
    assert_eq!(parsed.transactions.len(), 1);
    let tx = &parsed.transactions[0];
    assert_eq!(tx.description, "FAST PAYMENT to JOHN TAN OTHR 12345");
    assert_eq!(tx.amount_out, Some(dec!(50.00)));
    assert_eq!(tx.metadata["accountNumber"], "123456789");
    assert_eq!(tx.metadata["statementDate"], "30 Nov 2025");
    assert_eq!(tx.metadata["bank"], "DBS/POSB");
}

#[test]
fn posb_page_break_discards_incomplete_transaction() {
    let parsed = parse_pdf(
        "dbs_posb_consolidated",
        vec![
            page(
                1,
                &[
                    "Balance Brought Forward SGD 500.00",
                    "03/11/2025 GIRO PAYMENT",
                    "Page 1 of 2",
                ],
            ),
            page(
                2,
                &[
                    "Balance Brought Forward SGD 500.00",
                    "04/11/2025 NETS QR 20.00 480.00",
                    "Balance Carried Forward 480.00",
                ],
            ),
        ],
    );
    assert_eq!(parsed.transactions.len(), 1);
    assert_eq!(parsed.transactions[0].description, "NETS QR");
    assert!(parsed
        .skipped_lines
        .iter()
        .any(|s| s.line_text.contains("GIRO PAYMENT")));
}

#[test]
fn missing_end_marker_finalizes_last_pending() {
    let parsed = parse_pdf(
        "dbs_posb_consolidated",
        vec![page(
            1,
            &[
                "Balance Brought Forward SGD 500.00",
                "03/11/2025 NETS QR 20.00 480.00",
                "04/11/2025 GIRO PAYMENT",
            ],
        )],
    );
    assert_eq!(parsed.transactions.len(), 2);
    let last = &parsed.transactions[1];
    assert_eq!(last.description, "GIRO PAYMENT");
    assert!(last.is_no_signal());
}

// ---------------------------------------------------------------------------
// Column layouts
// ---------------------------------------------------------------------------
fn ocbc_page(with_header: bool) -> PageContent {
    let mut words = Vec::new();
    if with_header {
        words.extend(row(
            100.0,
            &[
                ("Transaction", 20.0),
                ("Value", 60.0),
                ("Description", 100.0),
                ("Withdrawal", 300.0),
                ("Deposit", 380.0),
                ("Balance", 460.0),
            ],
        ));
    }
    words.extend(row(120.0, &[("BALANCE", 100.0), ("B/F", 150.0), ("1,000.00", 470.0)]));
    words.extend(row(130.0, &[("POS", 100.0), ("PURCHASE", 130.0)]));
    words.extend(row(
        140.0,
        &[
            ("01", 20.0),
            ("NOV", 35.0),
            ("02", 60.0),
            ("NOV", 75.0),
            ("NETS", 100.0),
            ("QR", 130.0),
            ("12.50", 310.0),
            ("987.50", 470.0),
        ],
    ));
    words.extend(row(150.0, &[("COFFEE", 100.0), ("SHOP", 140.0)]));
    words.extend(row(
        170.0,
        &[
            ("03", 20.0),
            ("NOV", 35.0),
            ("03", 60.0),
            ("NOV", 75.0),
            ("SALARY", 100.0),
            ("500.00", 390.0),
            ("1,487.50", 470.0),
        ],
    ));
    words.extend(row(190.0, &[("BALANCE", 100.0), ("C/F", 150.0), ("1,487.50", 470.0)]));

    PageContent {
        page_number: 1,
        lines: vec![
            "FRANK ACCOUNT".into(),
            "Account No. 601234567001".into(),
            "1 NOV 2025 TO 30 NOV 2025".into(),
        ],
        words,
    }
}

#[test]
fn ocbc_column_layout() {
    let parsed = parse_pdf("ocbc_frank_statement", vec![ocbc_page(true)]);
    let txs = &parsed.transactions;
    assert_eq!(txs.len(), 2);
    assert!(parsed.warnings.is_empty());

    assert_eq!(txs[0].date, "2025-11-01");
    assert_eq!(txs[0].metadata["valueDate"], "2025-11-02");
    assert_eq!(txs[0].description, "POS PURCHASE NETS QR COFFEE SHOP");
    assert_eq!(txs[0].amount_out, Some(dec!(12.50)));
    assert_eq!(txs[0].amount_in, None);
    assert_eq!(txs[0].balance, Some(dec!(987.50)));
    assert_eq!(txs[0].account_identifier.as_deref(), Some("601234567001"));
    assert_eq!(txs[0].metadata["statementPeriodStart"], "1 NOV 2025");

    assert_eq!(txs[1].description, "SALARY");
    assert_eq!(txs[1].amount_in, Some(dec!(500.00)));
    assert_eq!(txs[1].amount_out, None);
}

#[test]
fn balance_delta_replay_agrees_with_columns() {
    let by_column = parse_pdf("ocbc_frank_statement", vec![ocbc_page(true)]);
    let by_balance = parse_pdf("ocbc_frank_statement", vec![ocbc_page(false)]);

    assert_eq!(by_column.transactions.len(), by_balance.transactions.len());
    for (a, b) in by_column.transactions.iter().zip(&by_balance.transactions) {
        assert_eq!(a.amount_in, b.amount_in);
        assert_eq!(a.amount_out, b.amount_out);
        assert_eq!(a.balance, b.balance);
    }
    assert_eq!(by_balance.warnings.len(), 1);
}

#[test]
fn column_direction_disagreeing_with_balance_is_warned() {
    let mut page = ocbc_page(true);
    // Deposit column, but the balance falls.
    for word in page.words.iter_mut().filter(|w| w.text == "1,487.50") {
        word.text = "487.50".into();
    }
    let parsed = parse_pdf("ocbc_frank_statement", vec![page]);
    assert_eq!(parsed.transactions[1].amount_in, Some(dec!(500.00)));
    assert_eq!(parsed.warnings.len(), 1);
}

#[test]
fn posb_column_layout() {
    let mut words = row(
        100.0,
        &[
            ("Date", 20.0),
            ("Description", 100.0),
            ("Withdrawal", 300.0),
            ("Deposit", 380.0),
            ("Balance", 460.0),
        ],
    );
    words.extend(row(
        120.0,
        &[("Balance", 100.0), ("Brought", 140.0), ("Forward", 180.0), ("500.00", 470.0)],
    ));
    words.extend(row(
        140.0,
        &[("01/11/2025", 20.0), ("NETS", 100.0), ("QR", 130.0), ("12.00", 310.0), ("488.00", 470.0)],
    ));
    words.extend(row(
        160.0,
        &[("Balance", 100.0), ("Carried", 140.0), ("Forward", 180.0), ("488.00", 470.0)],
    ));

    let parsed = parse_pdf(
        "dbs_posb_consolidated",
        vec![PageContent {
            page_number: 1,
            lines: vec!["Account No. 123-45678-9".into()],
            words,
        }],
    );
    assert_eq!(parsed.transactions.len(), 1);
    let tx = &parsed.transactions[0];
    assert_eq!(tx.date, "2025-11-01");
    assert_eq!(tx.description, "NETS QR");
    assert_eq!(tx.amount_out, Some(dec!(12.00)));
    assert_eq!(tx.balance, Some(dec!(488.00)));
}

#[test]
fn posb_summary_page_does_not_hide_table_header() {
    let mut summary = row(
        100.0,
        &[("Total", 20.0), ("Withdrawals", 60.0), ("1,200.00", 200.0)],
    );
    summary.extend(row(
        120.0,
        &[("Total", 20.0), ("Deposits", 60.0), ("800.00", 200.0)],
    ));
    summary.extend(row(
        140.0,
        &[("Closing", 20.0), ("Balance", 60.0), ("488.00", 200.0)],
    ));

    let mut table = row(
        100.0,
        &[
            ("Date", 20.0),
            ("Description", 100.0),
            ("Withdrawal", 300.0),
            ("Deposit", 380.0),
            ("Balance", 460.0),
        ],
    );
    table.extend(row(
        120.0,
        &[("Balance", 100.0), ("Brought", 140.0), ("Forward", 180.0), ("500.00", 470.0)],
    ));
    table.extend(row(
        140.0,
        &[("01/11/2025", 20.0), ("NETS", 100.0), ("QR", 130.0), ("12.00", 310.0), ("488.00", 470.0)],
    ));
    table.extend(row(
        160.0,
        &[("Balance", 100.0), ("Carried", 140.0), ("Forward", 180.0), ("488.00", 470.0)],
    ));

    let parsed = parse_pdf(
        "dbs_posb_consolidated",
        vec![
            PageContent {
                page_number: 1,
                lines: vec!["Account No. 123-45678-9".into()],
                words: summary,
            },
            PageContent {
                page_number: 2,
                lines: Vec::new(),
                words: table,
            },
        ],
    );
    assert_eq!(parsed.transactions.len(), 1);
    let tx = &parsed.transactions[0];
    assert_eq!(tx.description, "NETS QR");
    assert_eq!(tx.amount_in, None);
    assert_eq!(tx.amount_out, Some(dec!(12.00)));
    assert_eq!(tx.balance, Some(dec!(488.00)));
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------
#[test]
fn unknown_parser_rejected_before_extraction() {
    let err = parse_statement("acme_bank", b"", &FailingExtractor, &ParseOptions::default())
        .unwrap_err();
    assert!(matches!(err, TallyError::UnknownParser(ref id) if id == "acme_bank"));
}

#[test]
fn extraction_failure_fails_whole_call() {
    let err = parse_statement(
        "ocbc_frank_statement",
        b"garbage",
        &FailingExtractor,
        &ParseOptions::default(),
    )
    .unwrap_err();
    assert!(err.to_string().contains("not a PDF"));
}

#[test]
fn document_without_text_is_rejected() {
    let extractor = MockExtractor {
        pages: vec![page(1, &["", "   "])],
    };
    let err = parse_statement(
        "dbs_posb_consolidated",
        b"%PDF",
        &extractor,
        &ParseOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, TallyError::NoTextContent));
}
