// src/report/emit.rs
// =============================================================================
// Turns the aggregated broken links into the final report and puts it
// somewhere: a file when one is configured, the log otherwise.
//
// Text format, one section per broken target in discovery order:
//
//   Broken link: /missing
//     Found in:
//       - /a
//       - /b
//
// Failing to write the report file is the one error that is allowed to
// fail the whole run.
// =============================================================================

use super::aggregate::{BrokenLink, BrokenLinks};
use crate::config::CheckerOptions;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const NO_BROKEN_LINKS: &str = "No broken links detected.";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write report to {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize report")]
    Json(#[from] serde_json::Error),
}

/// Where the report ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emitted {
    /// Nothing was broken; only the "no broken links" line was logged
    Clean,
    /// Report written to this file
    File(PathBuf),
    /// No destination configured; report went to the log
    Log,
}

// Renders the plain-text report
pub fn render_text(links: &[BrokenLink]) -> String {
    if links.is_empty() {
        return NO_BROKEN_LINKS.to_string();
    }

    let mut out = String::new();
    for link in links {
        out.push_str(&format!("Broken link: {}\n", link.target));
        out.push_str("  Found in:\n");
        for document in &link.documents {
            out.push_str(&format!("    - {}\n", document));
        }
        out.push('\n');
    }

    out.trim_end().to_string()
}

// Renders the same data as a JSON array, discovery order preserved
pub fn render_json(links: &[BrokenLink]) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(links)?)
}

// Renders and delivers the report
//
// Parameters:
//   broken: everything collected during the run
//   options: decides file vs log and text vs JSON
//   echo: also log the report when it was written to a file
pub fn emit(broken: &BrokenLinks, options: &CheckerOptions, echo: bool) -> Result<Emitted, ReportError> {
    let links = broken.snapshot();

    if links.is_empty() {
        info!("{}", NO_BROKEN_LINKS);
        return Ok(Emitted::Clean);
    }

    let report = if options.json {
        render_json(&links)?
    } else {
        render_text(&links)
    };

    match options.log_file_path.as_deref() {
        Some(path) if !path.as_os_str().is_empty() => {
            write_report(path, &report)?;
            if echo {
                info!("\n{}", report);
            }
            info!("Broken links have been logged to {}", path.display());
            Ok(Emitted::File(path.to_path_buf()))
        }
        _ => {
            info!("\n{}", report);
            Ok(Emitted::Log)
        }
    }
}

fn write_report(path: &Path, report: &str) -> Result<(), ReportError> {
    std::fs::write(path, report).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })
}
