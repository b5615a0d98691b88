// src/services/rate_limit.rs
//! Rolling-window request budgeting over a shared counter store

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// A named request budget: `max_requests` per rolling `window`.
#[derive(Debug, Clone, Copy)]
pub struct NamedLimit {
    pub name: &'static str,
    pub max_requests: u32,
    pub window: Duration,
}

pub const DEFAULT_LIMIT: NamedLimit = NamedLimit {
    name: "default",
    max_requests: 120,
    window: Duration::from_secs(60),
};
pub const HEALTH_LIMIT: NamedLimit = NamedLimit {
    name: "health",
    max_requests: 300,
    window: Duration::from_secs(60),
};
pub const AUTH_REGISTER_LIMIT: NamedLimit = NamedLimit {
    name: "auth_register",
    max_requests: 5,
    window: Duration::from_secs(60),
};
pub const AUTH_LOGIN_LIMIT: NamedLimit = NamedLimit {
    name: "auth_login",
    max_requests: 10,
    window: Duration::from_secs(60),
};
pub const AUTH_DELETE_LIMIT: NamedLimit = NamedLimit {
    name: "auth_delete",
    max_requests: 2,
    window: Duration::from_secs(60),
};
pub const INTEREST_EXTRACT_LIMIT: NamedLimit = NamedLimit {
    name: "interest_extract",
    max_requests: 5,
    window: Duration::from_secs(60),
};

#[derive(Debug)]
pub enum RateLimitDecision {
    Allowed,
    Limited { retry_after: u32 },
}

/// Count of hits in the current window plus the seconds until it rolls over.
#[derive(Debug, Clone, Copy)]
pub struct WindowCount {
    pub count: u64,
    pub retry_after: u32,
}

#[derive(Debug, thiserror::Error)]
#[error("counter store error: {0}")]
pub struct CounterStoreError(String);

/// Increment-and-read for a key within a rolling window.
#[async_trait]
pub trait CounterStore: Send + Sync {
    async fn incr(&self, key: &str, window: Duration) -> Result<WindowCount, CounterStoreError>;
}

// ============================================================================
// Shared store (redis)
// ============================================================================

/// Counter store shared across all service instances.
#[derive(Clone)]
pub struct RedisCounterStore {
    conn: ConnectionManager,
}

impl RedisCounterStore {
    pub async fn connect(redis_url: &str) -> Result<Self, CounterStoreError> {
        let config = ConnectionManagerConfig::new()
            .set_number_of_retries(1)
            .set_connection_timeout(Duration::from_millis(500));

        let client =
            redis::Client::open(redis_url).map_err(|e| CounterStoreError(e.to_string()))?;
        let conn = client
            .get_connection_manager_with_config(config)
            .await
            .map_err(|e| CounterStoreError(e.to_string()))?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn incr(&self, key: &str, window: Duration) -> Result<WindowCount, CounterStoreError> {
        let mut conn = self.conn.clone();
        let window_secs = window.as_secs().max(1);

        let count: u64 = conn
            .incr(key, 1)
            .await
            .map_err(|e| CounterStoreError(e.to_string()))?;
        if count == 1 {
            let _: () = conn
                .expire(key, window_secs as i64)
                .await
                .map_err(|e| CounterStoreError(e.to_string()))?;
        }

        let ttl: i64 = conn
            .ttl(key)
            .await
            .map_err(|e| CounterStoreError(e.to_string()))?;
        let retry_after = if ttl > 0 { ttl as u32 } else { window_secs as u32 };

        Ok(WindowCount { count, retry_after })
    }
}

// ============================================================================
// In-process fallback store
// ============================================================================

#[derive(Debug, Clone)]
struct WindowState {
    count: u64,
    window_start: Instant,
    window: Duration,
}

impl WindowState {
    fn new(window: Duration) -> Self {
        Self {
            count: 1,
            window_start: Instant::now(),
            window,
        }
    }

    fn is_expired(&self) -> bool {
        self.window_start.elapsed() > self.window
    }

    fn remaining_secs(&self) -> u32 {
        self.window
            .saturating_sub(self.window_start.elapsed())
            .as_secs() as u32
    }
}

/// Per-process counter store. Budgets enforced here are not visible to
/// other instances; this is the documented degradation when the shared
/// store is unreachable.
#[derive(Debug, Default)]
pub struct MemoryCounterStore {
    entries: RwLock<HashMap<String, WindowState>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Increment-and-read; cannot fail.
    async fn count_hit(&self, key: &str, window: Duration) -> WindowCount {
        let mut entries = self.entries.write().await;

        let state = entries
            .entry(key.to_string())
            .and_modify(|state| {
                if state.is_expired() {
                    *state = WindowState::new(window);
                } else {
                    state.count += 1;
                }
            })
            .or_insert_with(|| WindowState::new(window));

        WindowCount {
            count: state.count,
            retry_after: state.remaining_secs(),
        }
    }

    /// Drop entries whose window has fully elapsed.
    pub async fn cleanup_expired(&self) {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, state| !state.is_expired());
        if entries.len() < before {
            info!(
                removed = before - entries.len(),
                "cleaned up expired rate limit entries"
            );
        }
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn incr(&self, key: &str, window: Duration) -> Result<WindowCount, CounterStoreError> {
        Ok(self.count_hit(key, window).await)
    }
}

// ============================================================================
// Service
// ============================================================================

/// Admission-control service: maps `(key, named limit)` to allow/deny.
///
/// Counts live in the shared store so budgets hold across instances; when
/// that store errors the check falls back to the in-process counters and the
/// service keeps enforcing limits for this instance.
pub struct RateLimitService {
    shared: Option<std::sync::Arc<dyn CounterStore>>,
    fallback: MemoryCounterStore,
}

impl RateLimitService {
    pub fn new(shared: Option<std::sync::Arc<dyn CounterStore>>) -> Self {
        info!(
            shared_store = shared.is_some(),
            "initializing rate limit service"
        );
        Self {
            shared,
            fallback: MemoryCounterStore::new(),
        }
    }

    /// Check one request against a named limit.
    ///
    /// The bucket is `(limit name, key)`, so each named limit budgets
    /// independently for the same key, and the same named limit budgets
    /// independently for different keys.
    pub async fn check(&self, key: &str, limit: NamedLimit) -> RateLimitDecision {
        let bucket = format!("rl:{}:{}", limit.name, key);

        let hit = match &self.shared {
            Some(store) => match store.incr(&bucket, limit.window).await {
                Ok(hit) => hit,
                Err(e) => {
                    warn!(
                        error = %e,
                        bucket = %bucket,
                        "shared counter store unavailable, using in-process fallback"
                    );
                    self.fallback.count_hit(&bucket, limit.window).await
                }
            },
            None => self.fallback.count_hit(&bucket, limit.window).await,
        };

        if hit.count > limit.max_requests as u64 {
            RateLimitDecision::Limited {
                retry_after: hit.retry_after,
            }
        } else {
            RateLimitDecision::Allowed
        }
    }

    /// Spawn a periodic sweep of expired in-process entries.
    pub fn start_cleanup_task(service: std::sync::Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(120));
            loop {
                interval.tick().await;
                service.fallback.cleanup_expired().await;
            }
        });
    }
}
