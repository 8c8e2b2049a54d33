//! View and like counters per post

mod store;
mod upstash;

pub use store::{CounterStore, MemoryStore};
pub use upstash::UpstashStore;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::{CounterBackend, CounterConfig};

/// Value a degraded service reports for an increment it did not persist
pub const DEGRADED_INCREMENT: u64 = 1;

#[derive(Debug, Error)]
pub enum CounterError {
    #[error("counter store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("counter store replied unexpectedly: {0}")]
    Protocol(String),
    #[error("counter store did not answer within {0:?}")]
    Timeout(Duration),
}

/// Which counter an increment targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterKind {
    Views,
    Likes,
}

impl CounterKind {
    /// Map the wire value (`"view"` / `"like"`) to a kind
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "view" => Some(Self::Views),
            "like" => Some(Self::Likes),
            _ => None,
        }
    }

    /// Store key, `post:{slug}:views` or `post:{slug}:likes`
    pub fn key(&self, slug: &str) -> String {
        match self {
            Self::Views => format!("post:{}:views", slug),
            Self::Likes => format!("post:{}:likes", slug),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub views: u64,
    pub likes: u64,
}

/// Result of a read. A fault means the counts are zeros standing in for an
/// unreachable store.
#[derive(Debug)]
pub struct ReadOutcome {
    pub counts: Counts,
    pub fault: Option<CounterError>,
}

#[derive(Clone)]
enum Mode {
    Backed(Arc<dyn CounterStore>),
    Degraded,
}

/// Counter access with a fixed mode picked at construction
#[derive(Clone)]
pub struct CounterService {
    mode: Mode,
    timeout: Duration,
}

impl CounterService {
    pub fn backed(store: Arc<dyn CounterStore>, timeout: Duration) -> Self {
        Self {
            mode: Mode::Backed(store),
            timeout,
        }
    }

    pub fn degraded() -> Self {
        Self {
            mode: Mode::Degraded,
            timeout: Duration::ZERO,
        }
    }

    /// Build from config. A misconfigured remote store degrades instead of
    /// failing start-up.
    pub fn from_config(config: &CounterConfig) -> Self {
        match config.backend {
            CounterBackend::None => Self::degraded(),
            CounterBackend::Memory => {
                tracing::info!("Counters kept in memory");
                Self::backed(Arc::new(MemoryStore::new()), config.timeout())
            }
            CounterBackend::Upstash => {
                let Some(url) = config.url.as_deref().filter(|u| !u.trim().is_empty()) else {
                    tracing::warn!("Upstash counter backend has no url; counters disabled");
                    return Self::degraded();
                };
                match UpstashStore::new(url, config.token.clone(), config.timeout()) {
                    Ok(store) => {
                        tracing::info!("Counters backed by {}", url);
                        Self::backed(Arc::new(store), config.timeout())
                    }
                    Err(e) => {
                        tracing::warn!("Failed to set up counter store: {}", e);
                        Self::degraded()
                    }
                }
            }
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self.mode, Mode::Degraded)
    }

    /// Views and likes for a post. Never fails; store trouble is reported
    /// through `ReadOutcome::fault` alongside zero counts.
    pub async fn read(&self, slug: &str) -> ReadOutcome {
        let store = match &self.mode {
            Mode::Backed(store) => store,
            Mode::Degraded => {
                return ReadOutcome {
                    counts: Counts::default(),
                    fault: None,
                }
            }
        };

        let keys = [CounterKind::Views.key(slug), CounterKind::Likes.key(slug)];
        let result = match tokio::time::timeout(self.timeout, store.get_many(&keys)).await {
            Ok(result) => result,
            Err(_) => Err(CounterError::Timeout(self.timeout)),
        };

        match result {
            Ok(values) => {
                let value = |i: usize| values.get(i).copied().flatten().unwrap_or(0);
                ReadOutcome {
                    counts: Counts {
                        views: value(0),
                        likes: value(1),
                    },
                    fault: None,
                }
            }
            Err(e) => ReadOutcome {
                counts: Counts::default(),
                fault: Some(e),
            },
        }
    }

    /// Add one to a counter and return its new value
    pub async fn increment(&self, slug: &str, kind: CounterKind) -> Result<u64, CounterError> {
        let store = match &self.mode {
            Mode::Backed(store) => store,
            Mode::Degraded => return Ok(DEGRADED_INCREMENT),
        };

        let key = kind.key(slug);
        tracing::debug!("INCR {}", key);
        tokio::time::timeout(self.timeout, store.incr(&key))
            .await
            .map_err(|_| CounterError::Timeout(self.timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FailingStore;

    #[async_trait]
    impl CounterStore for FailingStore {
        async fn get_many(&self, _keys: &[String]) -> Result<Vec<Option<u64>>, CounterError> {
            Err(CounterError::Protocol("down".to_string()))
        }

        async fn incr(&self, _key: &str) -> Result<u64, CounterError> {
            Err(CounterError::Protocol("down".to_string()))
        }
    }

    struct SlowStore;

    #[async_trait]
    impl CounterStore for SlowStore {
        async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<u64>>, CounterError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(vec![None; keys.len()])
        }

        async fn incr(&self, _key: &str) -> Result<u64, CounterError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(1)
        }
    }

    fn memory_service() -> CounterService {
        CounterService::backed(Arc::new(MemoryStore::new()), Duration::from_secs(1))
    }

    #[test]
    fn test_kind_parse_and_keys() {
        assert_eq!(CounterKind::parse("view"), Some(CounterKind::Views));
        assert_eq!(CounterKind::parse("like"), Some(CounterKind::Likes));
        assert_eq!(CounterKind::parse("likes"), None);
        assert_eq!(CounterKind::Views.key("hello"), "post:hello:views");
        assert_eq!(CounterKind::Likes.key("hello"), "post:hello:likes");
    }

    #[tokio::test]
    async fn test_degraded_mode() {
        let service = CounterService::degraded();
        assert!(service.is_degraded());

        let outcome = service.read("any").await;
        assert_eq!(outcome.counts, Counts { views: 0, likes: 0 });
        assert!(outcome.fault.is_none());

        let value = service.increment("any", CounterKind::Likes).await.unwrap();
        assert_eq!(value, DEGRADED_INCREMENT);
        assert_eq!(service.read("any").await.counts, Counts::default());
    }

    #[tokio::test]
    async fn test_backed_views_accumulate() {
        let service = memory_service();
        assert_eq!(service.read("p").await.counts, Counts::default());

        assert_eq!(service.increment("p", CounterKind::Views).await.unwrap(), 1);
        assert_eq!(service.increment("p", CounterKind::Views).await.unwrap(), 2);

        let outcome = service.read("p").await;
        assert_eq!(outcome.counts, Counts { views: 2, likes: 0 });
        assert!(outcome.fault.is_none());
    }

    #[tokio::test]
    async fn test_counters_are_per_slug() {
        let service = memory_service();
        service.increment("a", CounterKind::Likes).await.unwrap();
        assert_eq!(service.read("a").await.counts.likes, 1);
        assert_eq!(service.read("b").await.counts.likes, 0);
    }

    #[tokio::test]
    async fn test_store_fault_reads_as_zero() {
        let service = CounterService::backed(Arc::new(FailingStore), Duration::from_secs(1));
        let outcome = service.read("p").await;
        assert_eq!(outcome.counts, Counts::default());
        assert!(matches!(outcome.fault, Some(CounterError::Protocol(_))));
        assert!(service.increment("p", CounterKind::Views).await.is_err());
    }

    #[tokio::test]
    async fn test_store_calls_time_out() {
        let service =
            CounterService::backed(Arc::new(SlowStore), Duration::from_millis(100));
        let outcome = service.read("p").await;
        assert!(matches!(outcome.fault, Some(CounterError::Timeout(_))));

        let err = service
            .increment("p", CounterKind::Likes)
            .await
            .unwrap_err();
        assert!(matches!(err, CounterError::Timeout(_)));
    }

    #[test]
    fn test_from_config_modes() {
        let mut config = CounterConfig::default();
        assert!(CounterService::from_config(&config).is_degraded());

        config.backend = CounterBackend::Memory;
        assert!(!CounterService::from_config(&config).is_degraded());

        config.backend = CounterBackend::Upstash;
        config.url = None;
        assert!(CounterService::from_config(&config).is_degraded());
    }
}
