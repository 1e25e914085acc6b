use serde::Serialize;
use tally_core::error::TallyError;
use tally_core::extraction::pdftotext::PdftotextExtractor;

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
    pdftotext: bool,
}

pub fn run(output_format: &str) -> Result<(), TallyError> {
    let health = Health {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        pdftotext: PdftotextExtractor::is_available(),
    };

    if output_format == "json" {
        println!("{}", serde_json::to_string_pretty(&health)?);
    } else {
        println!("status: {}", health.status);
        println!("version: {}", health.version);
        println!(
            "pdftotext: {}",
            if health.pdftotext { "available" } else { "missing (PDF parsers unavailable)" }
        );
    }
    Ok(())
}
