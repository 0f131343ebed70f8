//! Import report generation
//!
//! Writes the outcome of every input file either as a plain text summary or
//! as a JSON document.

use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

use crate::import::{ImportError, OfxImport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Outcome of importing one file
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub result: std::result::Result<OfxImport, ImportError>,
}

impl FileReport {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    import: Option<&'a OfxImport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn write_report(out: &mut dyn Write, reports: &[FileReport], format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Text => write_text(out, reports),
        ReportFormat::Json => write_json(out, reports),
    }
}

fn write_json(out: &mut dyn Write, reports: &[FileReport]) -> Result<()> {
    let entries: Vec<JsonEntry> = reports
        .iter()
        .map(|r| JsonEntry {
            file: r.path.display().to_string(),
            import: r.result.as_ref().ok(),
            error: r.result.as_ref().err().map(|e| e.to_string()),
        })
        .collect();
    serde_json::to_writer_pretty(&mut *out, &entries)?;
    writeln!(out)?;
    Ok(())
}

fn write_text(out: &mut dyn Write, reports: &[FileReport]) -> Result<()> {
    for report in reports {
        writeln!(out, "{}", report.path.display())?;
        let import = match &report.result {
            Ok(import) => import,
            Err(e) => {
                writeln!(out, "  error: {}", e)?;
                continue;
            }
        };

        let account = &import.account;
        writeln!(
            out,
            "  account {} \"{}\" -> host account {}",
            account.external_account_id, account.name, account.account_id
        )?;
        if let Some(balance) = &import.ending_balance {
            writeln!(out, "  ending balance {}", balance)?;
        }
        writeln!(out, "  {} transactions", import.total_transactions)?;
        for tx in &import.transactions {
            let date = tx
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "----------".to_string());
            let amount = tx.splits.first().map(|s| s.amount.as_str()).unwrap_or("");
            writeln!(out, "  {} {:>14} {}", date, amount, tx.description)?;
        }
    }
    Ok(())
}
