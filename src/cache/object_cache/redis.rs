use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::{debug, trace};

use crate::cache::ObjectCache;
use crate::errors::Result;

/// Redis 对象缓存，值直接存 long_url 字符串
///
/// 连接由 `ConnectionManager` 负责断线重连，这里不再缓存连接状态。
pub struct RedisObjectCache {
    conn: ConnectionManager,
    key_prefix: String,
}

impl RedisObjectCache {
    pub fn new(conn: ConnectionManager, key_prefix: impl Into<String>) -> Self {
        let key_prefix = key_prefix.into();
        debug!("RedisObjectCache created with prefix: '{}'", key_prefix);
        Self { conn, key_prefix }
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl ObjectCache for RedisObjectCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(self.make_key(key)).await?;
        trace!("RedisObjectCache.get {}: hit = {}", key, value.is_some());
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();
        let redis_key = self.make_key(key);
        match ttl {
            // SETEX 的最小粒度是秒
            Some(ttl) => {
                conn.set_ex::<_, _, ()>(redis_key, value, ttl.as_secs().max(1))
                    .await?
            }
            None => conn.set::<_, _, ()>(redis_key, value).await?,
        }
        trace!("RedisObjectCache.set {}", key);
        Ok(())
    }
}
