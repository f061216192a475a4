// src/crawl/queue.rs
// =============================================================================
// This module walks a running dev server breadth-first and feeds every
// response it gets to the HtmlInterceptor.
//
// How it works:
// 1. Start with the initial URL in a queue
// 2. Fetch the page and hand the buffered response to the interceptor
// 3. Extract all links from the page
// 4. Add same-host links to the queue (if not visited and within depth limit)
// 5. Repeat until queue is empty or max depth reached
//
// Pages are fetched one at a time; the link checks inside each page are
// what runs concurrently.
//
// Rust concepts:
// - HashSet: To track visited paths (O(1) lookup)
// - VecDeque: Double-ended queue for breadth-first crawling
// - Url: For parsing and comparing hosts
// =============================================================================

use super::intercept::{CompletedResponse, HtmlInterceptor};
use crate::checker::{extract_hrefs, resolve, LinkKind, Resolution};
use anyhow::{anyhow, Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::collections::{HashSet, VecDeque};
use tracing::{info, warn};
use url::Url;

// Represents a page in the crawl queue
#[derive(Debug, Clone)]
struct CrawlItem {
    url: Url,
    depth: usize, // How many levels deep from the starting URL
}

/// What a crawl saw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Responses handed to the interceptor
    pub responses: usize,
    /// Of those, how many were HTML
    pub html_pages: usize,
}

// Crawls a dev server starting from a URL
//
// Parameters:
//   client: HTTP client used to fetch pages
//   start_url: The URL to start crawling from
//   max_depth: Maximum crawl depth (1 = just the starting page)
//   interceptor: receives every fetched response
pub async fn crawl_dev_server(
    client: &Client,
    start_url: &str,
    max_depth: usize,
    interceptor: &HtmlInterceptor<'_>,
) -> Result<CrawlSummary> {
    // Parse and validate the starting URL
    let start = Url::parse(start_url).with_context(|| format!("Invalid URL '{}'", start_url))?;
    let host = host_header(&start).ok_or_else(|| anyhow!("URL has no host: {}", start_url))?;

    let mut queue = VecDeque::new();
    queue.push_back(CrawlItem {
        url: start.clone(),
        depth: 1,
    });

    // Track visited pages (by normalized path) to avoid fetching twice
    let mut visited = HashSet::new();
    let mut summary = CrawlSummary::default();

    while let Some(item) = queue.pop_front() {
        let key = page_key(&item.url);
        if !visited.insert(key) {
            continue;
        }

        info!("Crawling [depth {}]: {}", item.depth, item.url);

        let response = match fetch_page(client, &item.url, &host).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Failed to fetch {}: {:#}", item.url, e);
                continue;
            }
        };

        summary.responses += 1;
        interceptor.on_response(&response).await;

        if !response.is_html() {
            continue;
        }
        summary.html_pages += 1;

        // If we haven't reached max depth, extract links and add to queue
        if item.depth < max_depth {
            for link in same_host_links(&response.body, &item.url, &start) {
                if !visited.contains(&page_key(&link)) {
                    queue.push_back(CrawlItem {
                        url: link,
                        depth: item.depth + 1,
                    });
                }
            }
        }
    }

    Ok(summary)
}

// "host" or "host:port", exactly as a browser would send it
fn host_header(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

fn page_key(url: &Url) -> String {
    crate::checker::normalize_path(url.path())
}

// Fetches a page and buffers the whole response
async fn fetch_page(client: &Client, url: &Url, host: &str) -> Result<CompletedResponse> {
    let response = client.get(url.clone()).send().await?;

    if !response.status().is_success() {
        return Err(anyhow!("HTTP {}", response.status()));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    // The request path as the server saw it (after any redirects)
    let final_url = response.url().clone();
    let path = match final_url.query() {
        Some(query) => format!("{}?{}", final_url.path(), query),
        None => final_url.path().to_string(),
    };

    let body = response.text().await?;

    Ok(CompletedResponse {
        host: host.to_string(),
        path,
        content_type,
        body,
    })
}

// Links from a page that stay on the dev server
//
// Internal targets are already normalized site paths; absolute URLs count
// only when they point back at the same host and port.
fn same_host_links(html: &str, page_url: &Url, start: &Url) -> Vec<Url> {
    let mut links = Vec::new();

    for href in extract_hrefs(html) {
        let (kind, target) = match resolve(&href, page_url) {
            Ok(Resolution::Target { kind, target }) => (kind, target),
            Ok(Resolution::Skip) | Err(_) => continue,
        };

        let url = match kind {
            LinkKind::Internal => start.join(&target).ok(),
            LinkKind::External => Url::parse(&target).ok().filter(|url| {
                url.host_str() == start.host_str()
                    && url.port_or_known_default() == start.port_or_known_default()
            }),
        };

        if let Some(url) = url {
            links.push(url);
        }
    }

    links
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is VecDeque?
//    - A double-ended queue
//    - push_back() adds to end, pop_front() removes from start
//    - Perfect for breadth-first search (BFS)
//
// 2. Why does visited.insert() replace contains() + insert()?
//    - HashSet::insert returns false when the value was already there
//    - One lookup instead of two
//
// 3. Why key visited pages by normalized path?
//    - "/about", "/about/" and "/about/index.html" are the same page
//    - Without normalizing we would fetch (and scan) it three times
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::LinkChecker;
    use crate::config::CheckerOptions;
    use crate::testing::{TestResponse, TestServer};

    #[test]
    fn test_same_host_links() {
        let page = Url::parse("http://localhost:4321/blog/").unwrap();
        let html = r#"
            <a href="post/">Post</a>
            <a href="http://localhost:4321/about.html">About</a>
            <a href="http://localhost:9999/other">Other port</a>
            <a href="https://rust-lang.org">Rust</a>
            <a href="mailto:x@y.z">Mail</a>
        "#;
        let links: Vec<String> = same_host_links(html, &page, &page)
            .into_iter()
            .map(|u| u.to_string())
            .collect();
        assert_eq!(
            links,
            vec!["http://localhost:4321/blog/post", "http://localhost:4321/about.html"]
        );
    }

    #[test]
    fn test_host_header_keeps_port() {
        let url = Url::parse("http://localhost:4321/").unwrap();
        assert_eq!(host_header(&url).as_deref(), Some("localhost:4321"));
        let url = Url::parse("http://example.com/").unwrap();
        assert_eq!(host_header(&url).as_deref(), Some("example.com"));
    }

    #[tokio::test]
    async fn test_crawl_feeds_interceptor() {
        let server = TestServer::start(|_, path| match path {
            "/" => TestResponse::html(r#"<a href="/about/">About</a><a href="/data.json">Data</a>"#),
            "/about" => TestResponse::html(r#"<a href="/">Home</a><a href="/deeper">Deeper</a>"#),
            "/data.json" => TestResponse {
                status: 200,
                content_type: "application/json",
                body: "{}".to_string(),
            },
            _ => TestResponse::status(404),
        })
        .await;

        let checker = LinkChecker::new(&CheckerOptions::default()).unwrap();
        let interceptor = HtmlInterceptor::new(&checker);
        let client = Client::new();

        let summary = crawl_dev_server(&client, &server.url("/"), 2, &interceptor)
            .await
            .unwrap();

        // "/", "/about" (html) and "/data.json"; "/deeper" is past max depth
        assert_eq!(summary, CrawlSummary { responses: 3, html_pages: 2 });
        assert_eq!(checker.stats().documents, 2);
    }

    #[tokio::test]
    async fn test_invalid_start_url() {
        let checker = LinkChecker::new(&CheckerOptions::default()).unwrap();
        let interceptor = HtmlInterceptor::new(&checker);
        let result = crawl_dev_server(&Client::new(), "not a url", 1, &interceptor).await;
        assert!(result.is_err());
    }
}
