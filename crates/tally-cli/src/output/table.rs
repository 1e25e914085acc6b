use rust_decimal::Decimal;
use tally_core::parsing::ParsedStatement;

const DESCRIPTION_WIDTH: usize = 40;

fn amount(value: Option<Decimal>) -> String {
    value.map(|d| d.to_string()).unwrap_or_default()
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('~');
    cut
}

pub fn format_statement(parsed: &ParsedStatement) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<10}  {:<w$}  {:>12}  {:>12}  {:>12}\n",
        "Date",
        "Description",
        "In",
        "Out",
        "Balance",
        w = DESCRIPTION_WIDTH
    ));
    out.push_str(&format!("{}\n", "-".repeat(10 + DESCRIPTION_WIDTH + 3 * 14 + 2)));

    for tx in &parsed.transactions {
        let link = if tx.linkage.is_some() { " *" } else { "" };
        out.push_str(&format!(
            "{:<10}  {:<w$}  {:>12}  {:>12}  {:>12}{}\n",
            tx.date,
            truncate(&tx.description, DESCRIPTION_WIDTH),
            amount(tx.amount_in),
            amount(tx.amount_out),
            amount(tx.balance),
            link,
            w = DESCRIPTION_WIDTH
        ));
    }

    out.push_str(&format!("\n{} transaction(s)", parsed.transactions.len()));
    if parsed.transactions.iter().any(|tx| tx.linkage.is_some()) {
        out.push_str("  (* internal transfer)");
    }
    out
}

pub fn print_diagnostics(parsed: &ParsedStatement) {
    for w in &parsed.warnings {
        eprintln!("  warning: {}", w.reason);
    }
    if !parsed.skipped_lines.is_empty() {
        eprintln!("  {} line(s) skipped during parsing", parsed.skipped_lines.len());
    }
}
