// src/checker/verify.rs
// =============================================================================
// This module decides whether a resolved target is reachable.
//
// - External targets get one network probe (see http.rs)
// - Internal targets are looked up in the build output when we have one:
//     <root>/<target>, <root>/<target>/index.html, <root>/<target>.html
//   and any one of them existing is enough
// - Internal targets in dev-server mode are not checked at all unless live
//   route probing was switched on; there is no build output to look at yet
//
// verify() never fails. Whatever goes wrong ends up as a Verdict.
// =============================================================================

use super::http;
use super::resolve::LinkKind;
use percent_encoding::percent_decode_str;
use reqwest::Client;
use std::path::{Component, Path, PathBuf};
use url::Url;

/// How internal links are verified for the current document.
#[derive(Debug, Clone)]
pub enum InternalCheck {
    /// Build mode: look for files under the output directory
    OnDisk(PathBuf),
    /// Serve mode with route probing: ask the dev server at this origin
    LiveRoutes(Url),
    /// Serve mode default: internal links are not checked
    PassThrough,
}

/// Result of verifying one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Reachable,
    /// Not reachable; the detail is only used for logging
    Broken(String),
    /// Deliberately not checked (dev-server internal link)
    Unchecked,
}

impl Verdict {
    // Verdict as it is stored in the check cache, None = nothing to store
    pub fn as_reachable(&self) -> Option<bool> {
        match self {
            Verdict::Reachable => Some(true),
            Verdict::Broken(_) => Some(false),
            Verdict::Unchecked => None,
        }
    }
}

// Verifies a resolved target
//
// Parameters:
//   client: shared HTTP client
//   target: the resolved target (URL for External, site path for Internal)
//   kind: how the target was classified
//   internal: how internal targets are checked for this document
pub async fn verify(client: &Client, target: &str, kind: LinkKind, internal: &InternalCheck) -> Verdict {
    match (kind, internal) {
        (LinkKind::External, _) => probe_url(client, target).await,
        (LinkKind::Internal, InternalCheck::OnDisk(root)) => {
            if exists_on_disk(root, target).await {
                Verdict::Reachable
            } else {
                Verdict::Broken("File does not exist".to_string())
            }
        }
        (LinkKind::Internal, InternalCheck::LiveRoutes(origin)) => match origin.join(target) {
            Ok(url) => probe_url(client, url.as_str()).await,
            Err(e) => Verdict::Broken(format!("Cannot build route URL: {}", e)),
        },
        (LinkKind::Internal, InternalCheck::PassThrough) => Verdict::Unchecked,
    }
}

async fn probe_url(client: &Client, url: &str) -> Verdict {
    let outcome = http::probe(client, url).await;
    tracing::debug!(url, outcome = %outcome, "probed");

    if outcome.is_reachable() {
        Verdict::Reachable
    } else {
        Verdict::Broken(outcome.to_string())
    }
}

// The candidate files an internal target may be served from
//
// Returns None when the decoded target would leave the root ("%2E%2E",
// "..%2F" and friends only show up after decoding).
fn candidate_paths(root: &Path, target: &str) -> Option<[PathBuf; 3]> {
    let decoded = percent_decode_str(target).decode_utf8_lossy();
    let relative = decoded.trim_start_matches('/');

    let escapes = Path::new(relative)
        .components()
        .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
    if escapes {
        return None;
    }

    let exact = root.join(relative);
    let index = exact.join("index.html");
    let html = root.join(format!("{}.html", relative));

    Some([exact, index, html])
}

async fn exists_on_disk(root: &Path, target: &str) -> bool {
    let Some(candidates) = candidate_paths(root, target) else {
        return false;
    };
    for candidate in candidates {
        // An unreadable path counts as missing
        if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            return true;
        }
    }
    false
}
