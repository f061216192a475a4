// src/checker/session.rs
// =============================================================================
// One LinkChecker owns all the state of a run:
// - the verdict cache (each target is verified once per run)
// - the broken-link aggregator (what ends up in the report)
// - the concurrency limiter shared by every document being scanned
// - the HTTP client and a few counters for the summary line
//
// scan() is called once per HTML document. All hrefs of a document are
// checked concurrently; the semaphore caps how many verifications are in
// flight across *all* documents at once, so scanning 2,000 pages in
// parallel still opens at most `concurrency` sockets or file handles.
//
// Rust concepts:
// - &self methods on shared state: interior mutability via Mutex/atomics
// - join_all: run many futures on the current task and wait for all of them
// - Semaphore permits: RAII guards released when dropped
// =============================================================================

use super::cache::CheckCache;
use super::html::extract_hrefs;
use super::resolve::{resolve, LinkKind, Resolution};
use super::verify::{verify, InternalCheck, Verdict};
use super::http::build_client;
use crate::config::CheckerOptions;
use crate::report::BrokenLinks;
use anyhow::Result;
use futures::future::join_all;
use reqwest::Client;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use url::Url;

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub documents: usize,
    pub links: usize,
    pub skipped: usize,
    pub malformed: usize,
    pub cache_hits: usize,
    pub probes: usize,
    pub unchecked: usize,
}

#[derive(Debug, Default)]
struct Counters {
    documents: AtomicUsize,
    links: AtomicUsize,
    skipped: AtomicUsize,
    malformed: AtomicUsize,
    cache_hits: AtomicUsize,
    probes: AtomicUsize,
    unchecked: AtomicUsize,
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::Relaxed);
}

pub struct LinkChecker {
    client: Client,
    cache: CheckCache,
    broken: BrokenLinks,
    limiter: Semaphore,
    verify_live_routes: bool,
    counters: Counters,
}

impl LinkChecker {
    pub fn new(options: &CheckerOptions) -> Result<Self> {
        options.validate()?;

        Ok(Self {
            client: build_client(options.timeout())?,
            cache: CheckCache::new(),
            broken: BrokenLinks::new(),
            limiter: Semaphore::new(options.concurrency),
            verify_live_routes: options.verify_live_routes,
            counters: Counters::default(),
        })
    }

    // Shared HTTP client, also used by the serve-mode crawler
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn broken_links(&self) -> &BrokenLinks {
        &self.broken
    }

    pub fn cache(&self) -> &CheckCache {
        &self.cache
    }

    pub fn stats(&self) -> ScanStats {
        let c = &self.counters;
        ScanStats {
            documents: c.documents.load(Ordering::Relaxed),
            links: c.links.load(Ordering::Relaxed),
            skipped: c.skipped.load(Ordering::Relaxed),
            malformed: c.malformed.load(Ordering::Relaxed),
            cache_hits: c.cache_hits.load(Ordering::Relaxed),
            probes: c.probes.load(Ordering::Relaxed),
            unchecked: c.unchecked.load(Ordering::Relaxed),
        }
    }

    // Scans one HTML document and records every broken link it contains
    //
    // Parameters:
    //   html: the full document body
    //   document_id: how the document shows up in the report
    //   base: the document's own location, used to resolve relative hrefs
    //   on_disk_root: build output directory (build mode only)
    pub async fn scan(&self, html: &str, document_id: &str, base: &Url, on_disk_root: Option<&Path>) {
        bump(&self.counters.documents);

        let hrefs = extract_hrefs(html);
        debug!(document = document_id, links = hrefs.len(), "scanning");

        let internal = self.internal_check(base, on_disk_root);
        let checks = hrefs
            .iter()
            .map(|href| self.check_href(href, document_id, base, &internal));

        join_all(checks).await;
    }

    fn internal_check(&self, base: &Url, on_disk_root: Option<&Path>) -> InternalCheck {
        match on_disk_root {
            Some(root) => InternalCheck::OnDisk(root.to_path_buf()),
            None if self.verify_live_routes && matches!(base.scheme(), "http" | "https") => {
                let mut origin = base.clone();
                origin.set_path("/");
                origin.set_query(None);
                origin.set_fragment(None);
                InternalCheck::LiveRoutes(origin)
            }
            None => InternalCheck::PassThrough,
        }
    }

    async fn check_href(&self, href: &str, document_id: &str, base: &Url, internal: &InternalCheck) {
        bump(&self.counters.links);

        let (kind, target) = match resolve(href, base) {
            Ok(Resolution::Skip) => {
                bump(&self.counters.skipped);
                return;
            }
            Ok(Resolution::Target { kind, target }) => (kind, target),
            Err(e) => {
                bump(&self.counters.malformed);
                warn!("Skipping malformed link in {}: {} - {}", document_id, href, e);
                return;
            }
        };

        if self.use_cached(&target, href, document_id) {
            return;
        }

        // Concurrent checks of the same fresh target share one verification
        let slot = self.cache.pending(&target);
        let mut verdict_here = None;
        let reachable = {
            let verdict_here = &mut verdict_here;
            let target = target.as_str();
            let reachable = slot
                .get_or_init(move || async move {
                    // The limiter is never closed, so acquire() only fails if that changes
                    let _permit = self.limiter.acquire().await.ok();
                    let verdict = verify(&self.client, target, kind, internal).await;
                    let reachable = verdict.as_reachable();
                    *verdict_here = Some(verdict);
                    reachable
                })
                .await;
            *reachable
        };

        match verdict_here {
            Some(verdict) => {
                self.cache.settle(&target, reachable);
                match verdict {
                    Verdict::Reachable => bump(&self.counters.probes),
                    Verdict::Broken(detail) => {
                        bump(&self.counters.probes);
                        self.record_broken(&target, href, document_id, &detail);
                    }
                    Verdict::Unchecked => {
                        debug_assert_eq!(kind, LinkKind::Internal);
                        bump(&self.counters.unchecked);
                    }
                }
            }
            // Settled by another check while we waited on the slot
            None => match reachable {
                Some(reachable) => self.reuse_verdict(reachable, &target, href, document_id),
                None => bump(&self.counters.unchecked),
            },
        }
    }

    // Applies a cached verdict if there is one; returns false on a miss
    fn use_cached(&self, target: &str, href: &str, document_id: &str) -> bool {
        match self.cache.get(target) {
            Some(reachable) => {
                self.reuse_verdict(reachable, target, href, document_id);
                true
            }
            None => false,
        }
    }

    fn reuse_verdict(&self, reachable: bool, target: &str, href: &str, document_id: &str) {
        bump(&self.counters.cache_hits);
        if !reachable {
            self.record_broken(target, href, document_id, "previously detected as broken");
        }
    }

    fn record_broken(&self, target: &str, href: &str, document_id: &str, detail: &str) {
        warn!("Broken link detected in {}: {} - {}", document_id, href, detail);
        self.broken.record(target, document_id);
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why does scan() take &self and not &mut self?
//    - Many scans run at the same time (one per page in build mode)
//    - &mut self would allow only one of them at a time
//    - The shared parts (cache, aggregator, counters) use Mutex and atomics,
//      which can be changed through a shared reference
//
// 2. join_all vs tokio::spawn
//    - join_all polls all the futures on the current task
//    - Nothing has to be 'static or Send, so the futures can borrow self,
//      the base URL and the document id
//    - All the waiting is on I/O, so one task is plenty
//
// 3. What is `let _permit = ...`?
//    - The permit is returned to the semaphore when it is dropped
//    - Binding it to _permit keeps it alive until the end of the function
//    - Binding it to plain `_` would drop it immediately!
//
// 4. Why a OnceCell per pending target?
//    - Two pages linking the same URL can both miss the cache at once
//    - get_or_init runs the first caller's future; the others just wait
//      for its value, so the URL is requested once
// -----------------------------------------------------------------------------
