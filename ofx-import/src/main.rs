//! OFX Import CLI Application
//!
//! Command-line front end for the ofx-bridge library. It runs each input
//! file through a native engine and adds:
//! - Account and security validation against a securities table
//! - Transaction splits with exact decimal amounts
//! - Parallel import of several files
//! - Text or JSON reports

use anyhow::{bail, Context, Result};
use clap::Parser;
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

mod config;
mod import;
mod input;
mod report;
mod securities;

use config::AppConfig;
use import::{ImportCallbacks, ImportError, OfxImport};
use report::{FileReport, ReportFormat};
use securities::SecurityTable;

/// OFX Import - Import OFX statements into host transactions
#[derive(Parser, Debug)]
#[command(name = "ofx-import")]
#[command(about = "Import OFX/QFX statements (or JSON record fixtures)", long_about = None)]
#[command(version)]
struct Args {
    /// Input files (.ofx/.qfx need the libofx feature, .json fixtures always work)
    #[arg(value_name = "FILE", required = true)]
    inputs: Vec<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Host account receiving the import (overrides the config)
    #[arg(long, value_name = "ID")]
    account_id: Option<i64>,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    format: ReportFormat,

    /// Output file for the report (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Let libofx print its own diagnostics
    #[arg(long)]
    native_messages: bool,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

/// Settings shared by every import of one run
struct ImportSettings {
    account_id: i64,
    native_messages: bool,
    securities: SecurityTable,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("OFX Import CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using bridge library v{}", ofx_bridge::VERSION);

    let config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    let settings = ImportSettings {
        account_id: args.account_id.unwrap_or(config.import.account_id),
        native_messages: args.native_messages || config.import.native_messages,
        securities: config.security_table(),
    };
    log::debug!("{} securities available", settings.securities.len());

    // One engine and one registry per file, each on its own worker
    let reports: Vec<FileReport> = args
        .inputs
        .par_iter()
        .map(|path| FileReport {
            path: path.clone(),
            result: import_file(path, &settings),
        })
        .collect();

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {:?}", path))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    report::write_report(&mut *out, &reports, args.format)?;
    out.flush()?;

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    if failed > 0 {
        bail!("{} of {} imports failed", failed, reports.len());
    }
    Ok(())
}

fn import_file(path: &Path, settings: &ImportSettings) -> Result<OfxImport, ImportError> {
    log::info!("Importing {:?}", path);

    let mut engine = match input::open_engine(path, settings.native_messages) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("{:#}", e);
            return Err(ImportError::Input(format!("{:#}", e)));
        }
    };

    let mut host = ImportCallbacks::new(settings.account_id, &settings.securities);
    let report = ofx_bridge::parse(engine.as_mut(), &mut host)?;
    let result = host.finish(report);

    match &result {
        Ok(import) => log::info!(
            "{:?}: {} transactions imported",
            path,
            import.total_transactions
        ),
        Err(e) => log::warn!("{:?}: {}", path, e),
    }
    result
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
