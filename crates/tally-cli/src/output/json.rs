use serde::Serialize;
use tally_core::error::TallyError;
use tally_core::model::Transaction;
use tally_core::parsing::ParsedStatement;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ParseEnvelope<'a> {
    success: bool,
    filename: &'a str,
    parser_id: &'a str,
    transactions: &'a [Transaction],
    count: usize,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: String,
}

/// The JSON document a successful parse produces.
pub fn envelope(filename: &str, parser_id: &str, parsed: &ParsedStatement) -> Result<String, TallyError> {
    let envelope = ParseEnvelope {
        success: true,
        filename,
        parser_id,
        transactions: &parsed.transactions,
        count: parsed.transactions.len(),
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

pub fn print_error(error: &TallyError) {
    let envelope = ErrorEnvelope {
        error: error.to_string(),
    };
    match serde_json::to_string_pretty(&envelope) {
        Ok(json) => println!("{json}"),
        Err(_) => eprintln!("Error: {error}"),
    }
}
