// src/site.rs
// =============================================================================
// Build mode: check every HTML page in a build output directory.
//
// What happens here:
// 1. Find every **/*.html file under the dist directory
// 2. Read each one and scan it, all pages at the same time
// 3. Internal links are checked against the files on disk
//
// Each page is identified by its site path ("/blog/post/index.html"), which
// the aggregator normalizes to "/blog/post" for the report.
// =============================================================================

use crate::checker::LinkChecker;
use anyhow::{bail, Context, Result};
use futures::future::join_all;
use globset::{Glob, GlobMatcher};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use url::Url;
use walkdir::WalkDir;

fn html_matcher() -> Result<GlobMatcher> {
    Ok(Glob::new("**/*.html")?.compile_matcher())
}

// Finds all HTML files under `dist`, as paths relative to it, sorted
pub fn discover_html_files(dist: &Path) -> Result<Vec<PathBuf>> {
    if !dist.is_dir() {
        bail!("Build output directory not found: {}", dist.display());
    }

    let matcher = html_matcher()?;
    let mut files = Vec::new();

    for entry in WalkDir::new(dist) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", dist.display(), e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(dist).unwrap_or(entry.path());
        if matcher.is_match(relative) {
            files.push(relative.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

// "blog/post/index.html" -> "/blog/post/index.html", always with '/'
fn site_path(relative: &Path) -> String {
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    format!("/{}", parts.join("/"))
}

// Scans every HTML page under `dist`
//
// Returns: number of pages found
pub async fn check_build_output(checker: &LinkChecker, dist: &Path) -> Result<usize> {
    let files = discover_html_files(dist)?;
    info!("Checking links in {} HTML page(s) under {}", files.len(), dist.display());

    let scans = files.iter().map(|relative| scan_file(checker, dist, relative));
    join_all(scans).await;

    Ok(files.len())
}

async fn scan_file(checker: &LinkChecker, dist: &Path, relative: &Path) {
    let path = dist.join(relative);
    let html = match tokio::fs::read_to_string(&path).await {
        Ok(html) => html,
        Err(e) => {
            warn!("Skipping {}: {}", path.display(), e);
            return;
        }
    };

    let document_id = site_path(relative);
    let base = match document_base(&document_id) {
        Ok(base) => base,
        Err(e) => {
            warn!("Skipping {}: {:#}", path.display(), e);
            return;
        }
    };

    checker.scan(&html, &document_id, &base, Some(dist)).await;
}

// file:///<site path>, so relative hrefs resolve the way a browser would
fn document_base(document_id: &str) -> Result<Url> {
    let mut base = Url::parse("file:///").context("file base URL")?;
    base.set_path(document_id);
    Ok(base)
}
