use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::error::ApiError;

/// Store size at which expired entries are swept out. Keeps memory bounded
/// without a timer thread.
const CLEANUP_THRESHOLD: usize = 1000;

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    reset_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Limited { retry_after_secs: u64 },
}

/// Fixed-window request counter keyed by client address. Windows are
/// discrete: the first request in a window sets its reset time, and the
/// count never passes the maximum before requests are rejected.
#[derive(Debug)]
pub struct FixedWindowLimiter {
    entries: Mutex<HashMap<String, WindowEntry>>,
    window: Duration,
    max_requests: u32,
}

impl FixedWindowLimiter {
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            window,
            max_requests,
        }
    }

    pub fn check(&self, key: &str) -> Decision {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> Decision {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if entries.len() >= CLEANUP_THRESHOLD {
            entries.retain(|_, entry| entry.reset_at > now);
        }

        match entries.get_mut(key) {
            Some(entry) if entry.reset_at > now => {
                if entry.count >= self.max_requests {
                    let remaining = entry.reset_at - now;
                    // Seconds, rounded up, never less than 1.
                    let retry_after_secs = remaining.as_secs_f64().ceil().max(1.0) as u64;
                    Decision::Limited { retry_after_secs }
                } else {
                    entry.count += 1;
                    Decision::Allowed
                }
            }
            _ => {
                entries.insert(
                    key.to_string(),
                    WindowEntry {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                Decision::Allowed
            }
        }
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// The first forwarded entry is trusted as-is so the behavior behind a proxy
/// stays reproducible, even though it is spoofable. Clients without a
/// resolvable address all share the "unknown" bucket.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware gating the weather routes; health checks are routed around it.
pub async fn gate(
    State(limiter): State<Arc<FixedWindowLimiter>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let key = client_key(
        request.headers(),
        connect_info.map(|ConnectInfo(addr)| addr),
    );
    match limiter.check(&key) {
        Decision::Allowed => next.run(request).await,
        Decision::Limited { retry_after_secs } => {
            tracing::warn!("Rate limit hit for {}", key);
            ApiError::RateLimited(retry_after_secs).into_response()
        }
    }
}
