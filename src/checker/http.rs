// src/checker/http.rs
// =============================================================================
// This module checks if URLs are alive by making HTTP requests.
//
// Key functionality:
// - Makes HTTP HEAD requests (lightweight, no body download)
// - Falls back to GET when the server doesn't support HEAD
// - Detects various failure modes (404, timeout, SSL errors, etc.)
//
// Every outcome, including transport errors, becomes a ProbeOutcome value.
// Nothing in here returns an error to the caller: a link is either reachable
// or it isn't, and the outcome is kept around only for the log line.
//
// Rust concepts:
// - async/await: For concurrent network I/O
// - Enums: To represent different link states
// =============================================================================

use anyhow::Result;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;

/// What happened when we probed a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 2xx
    Ok(u16),
    /// 3xx that was not followed
    Redirect(u16),
    /// 4xx
    Broken(u16),
    /// 5xx and anything else
    ServerError(u16),
    /// Request timed out
    Timeout,
    /// Could not resolve hostname
    DnsError,
    /// SSL/TLS certificate error
    SslError,
    /// Too many redirects (redirect loop)
    TooManyRedirects,
    /// Other transport error
    Error(String),
}

impl ProbeOutcome {
    // Only 2xx and 3xx count as reachable
    pub fn is_reachable(&self) -> bool {
        matches!(self, ProbeOutcome::Ok(_) | ProbeOutcome::Redirect(_))
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Ok(code)
            | ProbeOutcome::Redirect(code)
            | ProbeOutcome::Broken(code)
            | ProbeOutcome::ServerError(code) => {
                let reason = StatusCode::from_u16(*code)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("");
                write!(f, "HTTP {} {}", code, reason)
            }
            ProbeOutcome::Timeout => write!(f, "Request timed out"),
            ProbeOutcome::DnsError => write!(f, "Could not resolve hostname"),
            ProbeOutcome::SslError => write!(f, "SSL certificate error"),
            ProbeOutcome::TooManyRedirects => write!(f, "Too many redirects"),
            ProbeOutcome::Error(message) => write!(f, "{}", message),
        }
    }
}

// Builds the HTTP client shared by every probe in a run
//
// No timeout is applied unless one is asked for: a hung server only ties up
// the one concurrency slot it is holding.
pub fn build_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder()
        .user_agent(concat!("broken-links/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(5)); // Follow up to 5 redirects

    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    Ok(builder.build()?)
}

// Probes a single URL
//
// First, try a HEAD request (faster, no body download). Some servers answer
// HEAD with 405 Method Not Allowed or 501 Not Implemented even though the
// page is fine, so those get a second chance with GET.
pub async fn probe(client: &Client, url: &str) -> ProbeOutcome {
    let outcome = match client.head(url).send().await {
        Ok(response) => analyze_status(response.status()),
        Err(e) => return categorize_error(e),
    };

    match outcome {
        ProbeOutcome::Broken(405) | ProbeOutcome::ServerError(501) => {
            match client.get(url).send().await {
                Ok(response) => analyze_status(response.status()),
                Err(e) => categorize_error(e),
            }
        }
        other => other,
    }
}

// HTTP status codes:
// - 200-299: Success
// - 300-399: Redirect
// - 400-499: Client error (404 not found, etc.)
// - 500-599: Server error
fn analyze_status(status: StatusCode) -> ProbeOutcome {
    let code = status.as_u16();

    if status.is_success() {
        ProbeOutcome::Ok(code)
    } else if status.is_redirection() {
        ProbeOutcome::Redirect(code)
    } else if status.is_client_error() {
        ProbeOutcome::Broken(code)
    } else {
        ProbeOutcome::ServerError(code)
    }
}

// Categorizes different error types from reqwest
fn categorize_error(error: reqwest::Error) -> ProbeOutcome {
    // Walk the whole source chain; the interesting part is usually nested
    let mut error_string = error.to_string();
    let mut source = std::error::Error::source(&error);
    while let Some(inner) = source {
        error_string.push_str(": ");
        error_string.push_str(&inner.to_string());
        source = inner.source();
    }
    let lowered = error_string.to_lowercase();

    if error.is_timeout() {
        ProbeOutcome::Timeout
    } else if error.is_redirect() {
        ProbeOutcome::TooManyRedirects
    } else if lowered.contains("dns") || lowered.contains("failed to lookup address") {
        ProbeOutcome::DnsError
    } else if lowered.contains("certificate") || lowered.contains("ssl") || lowered.contains("tls") {
        ProbeOutcome::SslError
    } else if error.is_connect() {
        ProbeOutcome::Error(format!("Connection failed: {}", error_string))
    } else {
        ProbeOutcome::Error(error_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{refused_url, TestResponse, TestServer};

    #[test]
    fn test_outcome_is_reachable() {
        assert!(ProbeOutcome::Ok(200).is_reachable());
        assert!(ProbeOutcome::Redirect(304).is_reachable());
        assert!(!ProbeOutcome::Broken(404).is_reachable());
        assert!(!ProbeOutcome::ServerError(500).is_reachable());
        assert!(!ProbeOutcome::Timeout.is_reachable());
        assert!(!ProbeOutcome::Error("boom".to_string()).is_reachable());
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(ProbeOutcome::Broken(404).to_string(), "HTTP 404 Not Found");
        assert_eq!(ProbeOutcome::Timeout.to_string(), "Request timed out");
    }

    #[tokio::test]
    async fn test_probe_success_and_not_found() {
        let server = TestServer::start(|_, path| match path {
            "/ok" => TestResponse::status(200),
            _ => TestResponse::status(404),
        })
        .await;
        let client = build_client(None).unwrap();

        assert_eq!(probe(&client, &server.url("/ok")).await, ProbeOutcome::Ok(200));
        assert_eq!(probe(&client, &server.url("/gone")).await, ProbeOutcome::Broken(404));
        assert_eq!(server.hits(), 2);
    }

    #[tokio::test]
    async fn test_probe_falls_back_to_get() {
        let server = TestServer::start(|method, _| match method {
            "HEAD" => TestResponse::status(405),
            _ => TestResponse::status(200),
        })
        .await;
        let client = build_client(None).unwrap();

        assert_eq!(probe(&client, &server.url("/page")).await, ProbeOutcome::Ok(200));
        assert_eq!(server.requests(), vec![
            ("HEAD".to_string(), "/page".to_string()),
            ("GET".to_string(), "/page".to_string()),
        ]);
    }

    #[tokio::test]
    async fn test_probe_connection_refused() {
        let url = refused_url().await;
        let client = build_client(None).unwrap();

        let outcome = probe(&client, &url).await;
        assert!(!outcome.is_reachable());
    }
}
