use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::Expiry;
use tracing::{debug, trace};

use crate::cache::ObjectCache;
use crate::errors::Result;

#[derive(Clone)]
struct Entry {
    long_url: String,
    ttl: Option<Duration>,
}

/// 按条目自带的 TTL 过期，`None` 永不过期
struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// 进程内对象缓存（moka）
pub struct MokaObjectCache {
    inner: Cache<String, Entry>,
}

impl MokaObjectCache {
    pub fn new(max_capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryExpiry)
            .build();

        debug!(
            "MokaObjectCache initialized with max capacity: {}",
            max_capacity
        );
        Self { inner }
    }
}

#[async_trait]
impl ObjectCache for MokaObjectCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let hit = self.inner.get(key).await.map(|entry| entry.long_url);
        trace!("MokaObjectCache.get {}: hit = {}", key, hit.is_some());
        Ok(hit)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        self.inner
            .insert(
                key.to_string(),
                Entry {
                    long_url: value.to_string(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }
}
