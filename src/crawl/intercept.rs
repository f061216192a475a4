// src/crawl/intercept.rs
// =============================================================================
// The hand-off point between a dev server and the link checker.
//
// Whatever sits in front of the dev server (our crawler, or a proxy) only has
// to produce a CompletedResponse once a response has been fully buffered and
// pass it to on_response(). The interceptor ignores anything that isn't
// HTML and scans the rest; it never changes or delays the response itself.
// =============================================================================

use crate::checker::LinkChecker;
use tracing::warn;
use url::Url;

/// A fully buffered response from the dev server.
#[derive(Debug, Clone)]
pub struct CompletedResponse {
    /// Value of the Host header, e.g. "localhost:4321"
    pub host: String,
    /// Request path including any query string, e.g. "/blog/?page=2"
    pub path: String,
    /// Content-Type header, if there was one
    pub content_type: Option<String>,
    pub body: String,
}

impl CompletedResponse {
    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.contains("text/html"))
    }
}

pub struct HtmlInterceptor<'a> {
    checker: &'a LinkChecker,
}

impl<'a> HtmlInterceptor<'a> {
    pub fn new(checker: &'a LinkChecker) -> Self {
        Self { checker }
    }

    // Called once per completed response
    pub async fn on_response(&self, response: &CompletedResponse) {
        if !response.is_html() {
            return;
        }

        let location = format!("http://{}{}", response.host, response.path);
        let base = match Url::parse(&location) {
            Ok(base) => base,
            Err(e) => {
                warn!("Cannot scan {}: invalid document location ({})", location, e);
                return;
            }
        };

        self.checker
            .scan(&response.body, &response.path, &base, None)
            .await;
    }
}
