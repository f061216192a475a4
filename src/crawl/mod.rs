// src/crawl/mod.rs
// =============================================================================
// Serve mode: check links on a site while it is being served by a dev server.
//
// - queue: breadth-first crawl of the dev server, same host only
// - intercept: turns each completed HTML response into a checker scan
//
// There is no build output in this mode, so internal links are only checked
// when route probing is switched on (see checker::verify).
// =============================================================================

mod intercept;
mod queue;

pub use intercept::HtmlInterceptor;
pub use queue::crawl_dev_server;
