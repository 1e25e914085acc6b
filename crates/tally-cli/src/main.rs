mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tally",
    version,
    about = "Extract transactions from bank statement CSV and PDF files"
)]
struct Cli {
    /// Log parser decisions to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a statement into transactions
    Parse {
        /// Path to the CSV or PDF statement
        input_file: PathBuf,

        /// Parser id (see `tally parsers`)
        #[arg(short, long)]
        parser: String,

        /// JSON column mapping for the generic CSV parser
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the JSON result to a file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// List supported parsers
    Parsers {
        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Report whether the tool and its PDF backend are usable
    Health {
        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "tally_core=debug,tally=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (result, json) = match cli.command {
        Commands::Parse {
            input_file,
            parser,
            config,
            output,
            out,
        } => (
            commands::parse::run(input_file, &parser, config, &output, out),
            output == "json",
        ),
        Commands::Parsers { output } => (commands::parsers::run(&output), output == "json"),
        Commands::Health { output } => (commands::health::run(&output), output == "json"),
    };

    if let Err(e) = result {
        if json {
            output::json::print_error(&e);
        } else {
            eprintln!("Error: {e}");
        }
        std::process::exit(1);
    }
}
