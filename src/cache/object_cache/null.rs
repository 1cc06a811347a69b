use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use crate::cache::ObjectCache;
use crate::errors::Result;

/// 关闭对象缓存：永远未命中，写入直接丢弃
pub struct NullObjectCache;

#[async_trait]
impl ObjectCache for NullObjectCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        trace!("NullObjectCache.get called for key: {}", key);
        Ok(None)
    }

    async fn set(&self, key: &str, _value: &str, _ttl: Option<Duration>) -> Result<()> {
        trace!("NullObjectCache.set called for key: {}", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_cache_get_always_misses() {
        let cache = NullObjectCache;
        cache
            .set("test", "https://example.com", Some(Duration::from_secs(60)))
            .await
            .unwrap();
        assert_eq!(cache.get("test").await.unwrap(), None);
        assert_eq!(cache.get("").await.unwrap(), None);
    }
}
