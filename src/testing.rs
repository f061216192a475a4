// src/testing.rs
// =============================================================================
// Test helpers: a throwaway HTTP server that answers from a closure and
// remembers every request it saw, plus how many it was answering at once.
//
// Only compiled for `cargo test`.
// =============================================================================

use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

type Responder = Arc<dyn Fn(&str, &str) -> TestResponse + Send + Sync>;

pub struct TestResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl TestResponse {
    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: String::new(),
        }
    }

    pub fn html(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body: body.to_string(),
        }
    }
}

#[derive(Default)]
struct Load {
    current: AtomicUsize,
    peak: AtomicUsize,
}

pub struct TestServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<(String, String)>>>,
    load: Arc<Load>,
}

impl TestServer {
    pub async fn start<F>(respond: F) -> Self
    where
        F: Fn(&str, &str) -> TestResponse + Send + Sync + 'static,
    {
        Self::start_slow(Duration::ZERO, respond).await
    }

    // Holds every response for `delay` before writing it
    pub async fn start_slow<F>(delay: Duration, respond: F) -> Self
    where
        F: Fn(&str, &str) -> TestResponse + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let load = Arc::new(Load::default());
        let respond: Responder = Arc::new(respond);

        let log = Arc::clone(&requests);
        let server_load = Arc::clone(&load);
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let log = Arc::clone(&log);
                let load = Arc::clone(&server_load);
                let respond = Arc::clone(&respond);
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => buf.extend_from_slice(&chunk[..n]),
                        }
                    }

                    let head = String::from_utf8_lossy(&buf).to_string();
                    let mut parts = head.lines().next().unwrap_or_default().split_whitespace();
                    let method = parts.next().unwrap_or_default().to_string();
                    let path = parts.next().unwrap_or_default().to_string();
                    log.lock().push((method.clone(), path.clone()));

                    let now = load.current.fetch_add(1, Ordering::SeqCst) + 1;
                    load.peak.fetch_max(now, Ordering::SeqCst);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }

                    // Counted as finished before the client can see the answer
                    load.current.fetch_sub(1, Ordering::SeqCst);

                    let response = respond(&method, &path);
                    let body = if method == "HEAD" { "" } else { response.body.as_str() };
                    let raw = format!(
                        "HTTP/1.1 {} Test\r\ncontent-type: {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        response.status,
                        response.content_type,
                        response.body.len(),
                        body
                    );
                    let _ = socket.write_all(raw.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self { addr, requests, load }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn hits(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().clone()
    }

    // Most requests that were being answered at the same time
    pub fn peak(&self) -> usize {
        self.load.peak.load(Ordering::SeqCst)
    }
}

// A URL on a port nobody is listening on
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/", addr)
}
