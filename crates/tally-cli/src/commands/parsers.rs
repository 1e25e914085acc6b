use tally_core::error::TallyError;
use tally_core::model;

pub fn run(output_format: &str) -> Result<(), TallyError> {
    let catalog = model::catalog();
    if output_format == "json" {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    println!("Available parsers:\n");
    for info in &catalog {
        println!("  {:<24} {} [{}]", info.id.as_str(), info.name, info.file_type);
        println!("  {:<24} {}", "", info.description);
        println!();
    }
    Ok(())
}
