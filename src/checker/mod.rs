// src/checker/mod.rs
// =============================================================================
// This module contains all link checking logic.
//
// Submodules:
// - html: Extracts raw hrefs from HTML pages
// - resolve: Skips, classifies and normalizes hrefs
// - http: Probes external URLs
// - verify: Decides reachable / broken for a resolved target
// - cache: Remembers verdicts for the whole run
// - session: LinkChecker, which ties all of the above together per document
//
// This file (mod.rs) is the module root - it ties everything together and
// exports the public API that other parts of our application can use.
// =============================================================================

mod cache;
mod html;
mod http;
mod resolve;
mod session;
mod verify;

// Re-export public items from submodules
// This lets users write `checker::LinkChecker` instead of
// `checker::session::LinkChecker`
pub use html::extract_hrefs;
pub use resolve::{normalize_path, resolve, LinkKind, Resolution};
pub use session::LinkChecker;
