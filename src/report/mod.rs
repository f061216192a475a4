// src/report/mod.rs
// =============================================================================
// This module collects broken links and turns them into the final report.
//
// Submodules:
// - aggregate: broken target -> documents that reference it
// - emit: renders the report and writes it to a file or the log
// =============================================================================

mod aggregate;
mod emit;

pub use aggregate::BrokenLinks;
pub use emit::{emit, render_text, NO_BROKEN_LINKS};
