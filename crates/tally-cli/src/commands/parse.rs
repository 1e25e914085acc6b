use std::path::{Path, PathBuf};
use tally_core::error::TallyError;
use tally_core::extraction::pdftotext::PdftotextExtractor;
use tally_core::formats::csv::CsvConfig;
use tally_core::parsing::ParseOptions;

use crate::output;

fn load_config(path: &Path) -> Result<CsvConfig, TallyError> {
    let json = std::fs::read_to_string(path)?;
    CsvConfig::from_json(&json)
}

pub fn run(
    input_file: PathBuf,
    parser_id: &str,
    config: Option<PathBuf>,
    output_format: &str,
    output_file: Option<PathBuf>,
) -> Result<(), TallyError> {
    let options = ParseOptions {
        csv: config.as_deref().map(load_config).transpose()?,
        ..Default::default()
    };

    let bytes = std::fs::read(&input_file)?;
    tracing::debug!(file = %input_file.display(), parser = parser_id, bytes = bytes.len(), "parsing");
    let extractor = PdftotextExtractor::new();
    let parsed = tally_core::parse_statement(parser_id, &bytes, &extractor, &options)?;

    let filename = input_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = output::json::envelope(&filename, parser_id, &parsed)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Parsed {} transaction(s), written to {}",
                parsed.transactions.len(),
                path.display()
            );
            output::table::print_diagnostics(&parsed);
        }
        None => match output_format {
            "json" => println!("{}", output::json::envelope(&filename, parser_id, &parsed)?),
            _ => {
                println!("{}", output::table::format_statement(&parsed));
                output::table::print_diagnostics(&parsed);
            }
        },
    }

    Ok(())
}
