use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(1200);

/// Per-location fetch lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Loading,
    Ready,
    Error(String),
}

/// What the caller should do for a lookup, decided before any network call.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan<T> {
    /// Fresh cache hit, no call needed.
    Cached(T),
    /// A call for this key is already in flight; skip the duplicate. Carries
    /// a cached value, possibly stale, as a placeholder when one exists.
    InFlight(Option<T>),
    /// Suppressed by the throttle interval since the last attempt.
    Throttled(Option<T>),
    /// Caller should perform the fetch and settle it via `complete_ok` /
    /// `complete_err`.
    Fetch,
}

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    cached_at: Instant,
}

#[derive(Debug)]
struct Inner<T> {
    cache: HashMap<String, CacheEntry<T>>,
    in_flight: HashSet<String>,
    last_attempt: HashMap<String, Instant>,
    states: HashMap<String, FetchState>,
}

/// Coordinates per-location lookups: a time-to-live cache, duplicate
/// in-flight suppression, and a repeat-call throttle. One mutex covers all
/// three maps so the check-then-set in `plan_at` has no gap.
///
/// Results settle per key, so a late completion for an abandoned location
/// updates that location's cache and state without touching any other key.
#[derive(Debug)]
pub struct RequestCoordinator<T> {
    inner: Mutex<Inner<T>>,
    ttl: Duration,
    throttle: Duration,
}

impl<T: Clone> Default for RequestCoordinator<T> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_THROTTLE)
    }
}

impl<T: Clone> RequestCoordinator<T> {
    pub fn new(ttl: Duration, throttle: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                cache: HashMap::new(),
                in_flight: HashSet::new(),
                last_attempt: HashMap::new(),
                states: HashMap::new(),
            }),
            ttl,
            throttle,
        }
    }

    /// Keys differing only in case or surrounding whitespace share state.
    pub fn normalize_key(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    pub fn plan(&self, key: &str, forced: bool) -> Plan<T> {
        self.plan_at(key, Instant::now(), forced)
    }

    pub fn plan_at(&self, key: &str, now: Instant, forced: bool) -> Plan<T> {
        let key = Self::normalize_key(key);
        let mut inner = self.lock();

        // A stale entry is evicted here, never served as fresh again. Its
        // value survives only as a placeholder for the steps below.
        let mut placeholder = None;
        let mut stale = false;
        if let Some(entry) = inner.cache.get(&key) {
            let fresh = now.duration_since(entry.cached_at) < self.ttl;
            if fresh && !forced {
                return Plan::Cached(entry.value.clone());
            }
            placeholder = Some(entry.value.clone());
            stale = !fresh;
        }
        if stale {
            inner.cache.remove(&key);
        }

        // A forced refresh skips freshness and throttle, not this.
        if inner.in_flight.contains(&key) {
            return Plan::InFlight(placeholder);
        }

        if !forced {
            if let Some(last) = inner.last_attempt.get(&key) {
                if now.duration_since(*last) < self.throttle {
                    return Plan::Throttled(placeholder);
                }
            }
        }

        inner.in_flight.insert(key.clone());
        inner.last_attempt.insert(key.clone(), now);
        inner.states.insert(key, FetchState::Loading);
        Plan::Fetch
    }

    pub fn complete_ok(&self, key: &str, value: T) {
        self.complete_ok_at(key, value, Instant::now());
    }

    pub fn complete_ok_at(&self, key: &str, value: T, now: Instant) {
        let key = Self::normalize_key(key);
        let mut inner = self.lock();
        inner.cache.insert(
            key.clone(),
            CacheEntry {
                value,
                cached_at: now,
            },
        );
        inner.in_flight.remove(&key);
        inner.states.insert(key, FetchState::Ready);
    }

    pub fn complete_err(&self, key: &str, message: impl Into<String>) {
        let key = Self::normalize_key(key);
        let mut inner = self.lock();
        inner.in_flight.remove(&key);
        inner.states.insert(key, FetchState::Error(message.into()));
    }

    pub fn state(&self, key: &str) -> FetchState {
        let key = Self::normalize_key(key);
        self.lock()
            .states
            .get(&key)
            .cloned()
            .unwrap_or(FetchState::Idle)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
