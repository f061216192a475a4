// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Options shared by both subcommands live in ReportArgs and are flattened
// into each one, so they go after the subcommand:
//   broken-links build dist --no-log-file
//   broken-links serve http://localhost:4321 --max-depth 5 --verify-routes
// =============================================================================

use crate::config::CheckerOptions;
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "broken-links",
    version,
    about = "Find broken links in a built site or on a running dev server",
    long_about = "broken-links scans rendered HTML for <a href> links, checks internal links against \
                  the build output (or the dev server) and external links over the network, and \
                  writes a report of every broken target and the pages that reference it."
)]
pub struct Cli {
    /// Emit logs as JSON lines instead of human-readable text
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check every HTML page in a build output directory
    ///
    /// Example: broken-links build ./dist
    Build {
        /// Directory containing the rendered site (e.g. ./dist)
        dist_dir: PathBuf,

        #[command(flatten)]
        report: ReportArgs,
    },

    /// Check pages served by a running dev server
    ///
    /// Example: broken-links serve http://localhost:4321 --max-depth 3
    Serve {
        /// Dev server URL to start crawling from
        url: String,

        /// Maximum crawl depth (1 = just the starting page)
        #[arg(long, default_value_t = 3)]
        max_depth: usize,

        /// Also verify internal links by requesting them from the dev server
        #[arg(long)]
        verify_routes: bool,

        #[command(flatten)]
        report: ReportArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Options file (JSON); flags given here override its values
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Where to write the report (default: broken-links.log)
    #[arg(long, value_name = "PATH", conflicts_with = "no_log_file")]
    pub log_file: Option<PathBuf>,

    /// Send the report to the log instead of a file
    #[arg(long)]
    pub no_log_file: bool,

    /// Maximum number of link checks in flight at once (default: 10)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub concurrency: Option<u64>,

    /// Timeout for each network request, in seconds (default: none)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Write the report as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl ReportArgs {
    // Builds the run options: defaults, then the options file, then flags
    pub fn to_options(&self) -> Result<CheckerOptions> {
        let mut options = match &self.config {
            Some(path) => CheckerOptions::from_file(path)?,
            None => CheckerOptions::default(),
        };

        if let Some(path) = &self.log_file {
            options.log_file_path = Some(path.clone());
        }
        if self.no_log_file {
            options.log_file_path = None;
        }
        if let Some(concurrency) = self.concurrency {
            options.concurrency = usize::try_from(concurrency)?;
        }
        if let Some(timeout) = self.timeout {
            options.timeout_secs = Some(timeout);
        }
        if self.json {
            options.json = true;
        }

        Ok(options)
    }
}
