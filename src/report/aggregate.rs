// src/report/aggregate.rs
// =============================================================================
// Collects broken targets and the documents that link to them.
//
// Two orders are preserved because the report prints in them:
// - targets in the order they were first found broken
// - documents, per target, in the order they were recorded
//
// A document shows up at most once per target no matter how many times it
// links there. Entries are only ever added.
// =============================================================================

use crate::checker::normalize_path;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;

/// One broken target and every document that references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLink {
    pub target: String,
    pub documents: Vec<String>,
}

#[derive(Debug, Default)]
struct Entries {
    links: Vec<BrokenLink>,
    // target -> position in `links`
    index: HashMap<String, usize>,
}

#[derive(Debug, Default)]
pub struct BrokenLinks {
    entries: Mutex<Entries>,
}

impl BrokenLinks {
    pub fn new() -> Self {
        Self::default()
    }

    // Records that `document_id` links to the broken `target`
    //
    // The document id is normalized first, so "/blog/", "/blog/index.html"
    // and "/blog?page=2" are all the same document.
    pub fn record(&self, target: &str, document_id: &str) {
        let document = normalize_path(document_id);
        let mut entries = self.entries.lock();

        let existing = entries.index.get(target).copied();
        let position = match existing {
            Some(position) => position,
            None => {
                let position = entries.links.len();
                entries.links.push(BrokenLink {
                    target: target.to_string(),
                    documents: Vec::new(),
                });
                entries.index.insert(target.to_string(), position);
                position
            }
        };

        let documents = &mut entries.links[position].documents;
        if !documents.contains(&document) {
            documents.push(document);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().links.is_empty()
    }

    // Number of distinct broken targets
    pub fn len(&self) -> usize {
        self.entries.lock().links.len()
    }

    // A copy of everything recorded so far, in discovery order
    pub fn snapshot(&self) -> Vec<BrokenLink> {
        self.entries.lock().links.clone()
    }
}
