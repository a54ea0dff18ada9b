//! squaremelt: Convert a Squarespace product export into a Shopify import CSV
//!
//! Usage:
//!   # Write the CSV to stdout
//!   squaremelt products.json
//!
//!   # Write to a file, replacing it only once every row is written
//!   squaremelt products.json --output shopify.csv --atomic
//!
//!   # Keep going past products with more than three variant attributes
//!   squaremelt products.json -o shopify.csv --skip-invalid --verbose

use anyhow::{Context, Result};
use clap::Parser;
use squaremelt::{convert_file, MeltConfig, Output};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "squaremelt")]
#[command(about = "Convert a Squarespace product export into a Shopify product CSV", long_about = None)]
struct Args {
    /// Squarespace product export (JSON)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output file ("-" writes to stdout)
    #[arg(long, short = 'o', default_value = "-")]
    output: String,

    /// Show debug logging on stderr
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Skip products with more than three variant attributes instead of failing
    #[arg(long)]
    skip_invalid: bool,

    /// Write to a temporary file and rename it over the output when done
    #[arg(long)]
    atomic: bool,
}

impl Args {
    fn output(&self) -> Output {
        match self.output.as_str() {
            "-" => Output::Stdout,
            path if self.atomic => Output::AtomicFile(PathBuf::from(path)),
            path => Output::File(PathBuf::from(path)),
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout may carry the CSV, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let output = args.output();
    info!(
        input = %args.input.display(),
        output = %args.output,
        skip_invalid = args.skip_invalid,
        atomic = args.atomic,
        "squaremelt"
    );

    let config = MeltConfig {
        skip_invalid: args.skip_invalid,
    };
    let summary = convert_file(&args.input, &output, config).with_context(|| {
        format!(
            "Error converting {} to {}",
            args.input.display(),
            args.output
        )
    })?;

    info!(summary = %summary, "Done.");
    Ok(())
}
