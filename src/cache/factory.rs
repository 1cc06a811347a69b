//! 根据配置构造缓存与过滤器实例
//!
//! Redis 后端共用启动阶段建立的 `ConnectionManager`，
//! 配置里选了 Redis 但没有连接时直接报配置错误。

use std::sync::Arc;

use redis::aio::ConnectionManager;
use tracing::info;

use crate::cache::existence_filter::bit_array::{MemoryBitArray, RedisBitArray};
use crate::cache::existence_filter::{BloomExistenceFilter, BloomParams, NullExistenceFilter};
use crate::cache::object_cache::{MokaObjectCache, NullObjectCache, RedisObjectCache};
use crate::cache::{BitArray, ExistenceFilter, ObjectCache};
use crate::config::{CacheBackend, CacheConfig, FilterBackend, FilterConfig};
use crate::errors::{Result, TinylinkError};

fn require_redis<'a>(
    redis: Option<&'a ConnectionManager>,
    component: &str,
) -> Result<&'a ConnectionManager> {
    redis.ok_or_else(|| {
        TinylinkError::config(format!(
            "{} is configured with type = \"redis\" but no Redis connection is available",
            component
        ))
    })
}

pub fn build_object_cache(
    config: &CacheConfig,
    redis: Option<&ConnectionManager>,
) -> Result<Arc<dyn ObjectCache>> {
    let cache: Arc<dyn ObjectCache> = match config.backend {
        CacheBackend::Redis => {
            let conn = require_redis(redis, "cache")?;
            Arc::new(RedisObjectCache::new(conn.clone(), config.key_prefix.clone()))
        }
        CacheBackend::Memory => Arc::new(MokaObjectCache::new(config.max_capacity)),
        CacheBackend::Null => Arc::new(NullObjectCache),
    };
    info!("Object cache: {:?}", config.backend);
    Ok(cache)
}

pub fn build_existence_filter(
    config: &FilterConfig,
    redis: Option<&ConnectionManager>,
) -> Result<Arc<dyn ExistenceFilter>> {
    if config.backend == FilterBackend::Null {
        info!("Existence filter: disabled");
        return Ok(Arc::new(NullExistenceFilter));
    }

    let params = BloomParams::new(config.expected_items, config.false_positive_rate)?;
    let bits: Arc<dyn BitArray> = match config.backend {
        FilterBackend::Redis => {
            let conn = require_redis(redis, "filter")?;
            Arc::new(RedisBitArray::new(
                conn.clone(),
                config.key.clone(),
                params.bits,
            )?)
        }
        FilterBackend::Memory | FilterBackend::Null => Arc::new(MemoryBitArray::new(params.bits)),
    };

    info!(
        "Existence filter: {:?} bloom (m = {}, k = {})",
        config.backend, params.bits, params.hashes
    );
    Ok(Arc::new(BloomExistenceFilter::new(params, bits)))
}
