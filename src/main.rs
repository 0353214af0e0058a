use chrono::Utc;
use clap::Parser;
use loanbook::application::processor::LedgerProcessor;
use loanbook::application::registry::LoanRegistry;
use loanbook::interfaces::csv::ledger_reader::LedgerReader;
use loanbook::interfaces::csv::loan_writer::{LoanBookWriter, OutputFormat};
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input ledger CSV file (type, loan, amount, principal, rate, installments)
    input: PathBuf,

    /// Number of worker tasks loans are sharded across
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Output format for the final loan book
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let registry = Arc::new(LoanRegistry::new());
    let processor = LedgerProcessor::new(Arc::clone(&registry), cli.workers);

    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = LedgerReader::new(file);
    for entry in reader.entries() {
        match entry {
            Ok(entry) => processor.submit(entry).await.into_diagnostic()?,
            Err(e) => warn!(error = %e, "Error reading ledger entry"),
        }
    }

    let report = processor.finish().await.into_diagnostic()?;
    info!(
        applied = report.applied,
        rejected = report.rejected,
        loans = registry.len(),
        "Ledger processed"
    );

    let stdout = io::stdout();
    let mut writer = LoanBookWriter::new(stdout.lock(), cli.format);
    writer
        .write_loans(&registry.snapshot(), Utc::now())
        .into_diagnostic()?;

    Ok(())
}

fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("loanbook=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_target(true)
        .init();
}
