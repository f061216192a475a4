// src/config.rs
// =============================================================================
// Options for one checker run.
//
// They come from command-line flags, optionally layered on top of a JSON
// options file:
//
//   {
//     "logFilePath": "reports/broken-links.log",
//     "concurrency": 20,
//     "timeoutSecs": 15
//   }
//
// Set "logFilePath" to null to send the report to the log instead of a file.
// =============================================================================

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_LOG_FILE: &str = "broken-links.log";
pub const DEFAULT_CONCURRENCY: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckerOptions {
    /// Where the report is written; None sends it to the log
    pub log_file_path: Option<PathBuf>,
    /// Maximum number of link checks in flight across the whole run
    pub concurrency: usize,
    /// Per-request timeout for network probes; None means no timeout
    pub timeout_secs: Option<u64>,
    /// Serve mode only: probe internal links against the dev server
    pub verify_live_routes: bool,
    /// Render the report as JSON instead of text
    pub json: bool,
}

impl Default for CheckerOptions {
    fn default() -> Self {
        Self {
            log_file_path: Some(PathBuf::from(DEFAULT_LOG_FILE)),
            concurrency: DEFAULT_CONCURRENCY,
            timeout_secs: None,
            verify_live_routes: false,
            json: false,
        }
    }
}

impl CheckerOptions {
    // Loads options from a JSON file; missing keys keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file {}", path.display()))?;
        let options: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid options file {}", path.display()))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            bail!("concurrency must be at least 1");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}
