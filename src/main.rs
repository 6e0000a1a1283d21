use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use mdreplay::print::OutputFormat;
use mdreplay::processor::Processor;

/// Replay a market-data command feed and serve BBO/VWAP subscriptions.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Feed file, one command per line.
    file: PathBuf,
    /// Only emit output for this symbol.
    symbol: Option<String>,
    /// Emit JSON lines instead of fixed-width tables.
    #[arg(long)]
    json: bool,
}

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let stdout = io::stdout();
    let mut processor = Processor::new(stdout.lock());
    if let Some(symbol) = args.symbol {
        processor.set_filter(symbol);
    }
    if args.json {
        processor.set_format(OutputFormat::Json);
    }

    let reader = BufReader::new(File::open(&args.file)?);
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        processor.process_line(line)?;
    }

    Ok(())
}
