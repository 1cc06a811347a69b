//! 短链解析与创建
//!
//! 读路径严格按顺序经过：存在性过滤器 → 对象缓存 → 持久存储 → 回写缓存。
//! 过滤器和缓存只影响延迟，不影响正确性：它们出错时记录日志并继续往下走，
//! 只有持久存储的错误会返回给调用方。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tracing::{debug, info, trace, warn};

use crate::cache::{ExistenceFilter, ObjectCache};
use crate::codec;
use crate::errors::{Result, TinylinkError};
use crate::minter::IdMinter;
use crate::storage::{LinkRecord, LinkStore};

const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_millis(200);
const DEFAULT_FILTER_TIMEOUT: Duration = Duration::from_millis(200);

/// 旁路组件（缓存、过滤器）的单次调用结果
enum SideCall<T> {
    Done(T),
    Failed(TinylinkError),
    TimedOut,
}

async fn side_call<T, F>(deadline: Duration, fut: F) -> SideCall<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(Ok(value)) => SideCall::Done(value),
        Ok(Err(e)) => SideCall::Failed(e),
        Err(_) => SideCall::TimedOut,
    }
}

/// 发号与存储失败统一对外表现为“暂时不可用”
fn unavailable(stage: &str, e: TinylinkError) -> TinylinkError {
    match e {
        TinylinkError::StorageUnavailable(_) => e,
        other => TinylinkError::storage_unavailable(format!("{}: {}", stage, other.message())),
    }
}

pub struct LinkService {
    minter: Arc<dyn IdMinter>,
    store: Arc<dyn LinkStore>,
    cache: Arc<dyn ObjectCache>,
    filter: Arc<dyn ExistenceFilter>,
    /// 回写缓存时的 TTL，`None` 永不过期
    cache_ttl: Option<Duration>,
    cache_timeout: Duration,
    filter_timeout: Duration,
}

impl LinkService {
    pub fn new(
        minter: Arc<dyn IdMinter>,
        store: Arc<dyn LinkStore>,
        cache: Arc<dyn ObjectCache>,
        filter: Arc<dyn ExistenceFilter>,
    ) -> Self {
        Self {
            minter,
            store,
            cache,
            filter,
            cache_ttl: Some(Duration::from_secs(86400)),
            cache_timeout: DEFAULT_CACHE_TIMEOUT,
            filter_timeout: DEFAULT_FILTER_TIMEOUT,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// 缓存与过滤器的单次调用超时；发号与存储由各自实现限时
    pub fn with_timeouts(mut self, cache: Duration, filter: Duration) -> Self {
        self.cache_timeout = cache;
        self.filter_timeout = filter;
        self
    }

    /// 解析短码，返回目标地址
    pub async fn resolve(&self, code: &str) -> Result<String> {
        // 1. 过滤器：确定不存在则直接返回，不碰缓存和存储
        match side_call(self.filter_timeout, self.filter.exists(code)).await {
            SideCall::Done(false) => {
                debug!("Filter rejected code: {}", code);
                return Err(TinylinkError::not_found(format!("short code {}", code)));
            }
            SideCall::Done(true) => {}
            SideCall::Failed(e) => {
                warn!("Existence filter degraded, failing open for {}: {}", code, e);
            }
            SideCall::TimedOut => {
                let e = TinylinkError::filter_degraded(format!(
                    "exists timed out after {}ms",
                    self.filter_timeout.as_millis()
                ));
                warn!("Existence filter degraded, failing open for {}: {}", code, e);
            }
        }

        // 2. 缓存：出错按未命中处理
        match side_call(self.cache_timeout, self.cache.get(code)).await {
            SideCall::Done(Some(long_url)) => {
                trace!("Cache hit for {}", code);
                return Ok(long_url);
            }
            SideCall::Done(None) => trace!("Cache miss for {}", code),
            SideCall::Failed(e) => warn!("Cache read failed for {}, treating as miss: {}", code, e),
            SideCall::TimedOut => warn!(
                "Cache read for {} timed out after {}ms, treating as miss",
                code,
                self.cache_timeout.as_millis()
            ),
        }

        // 3. 持久存储
        let id = match codec::decode(code) {
            Ok(id) => id,
            Err(e) => {
                // 非法短码下不可能存过任何东西
                debug!("{}", TinylinkError::from(e));
                return Err(TinylinkError::not_found(format!("short code {}", code)));
            }
        };

        let record = self
            .store
            .get(id)
            .await
            .map_err(|e| unavailable("store.get", e))?
            .ok_or_else(|| TinylinkError::not_found(format!("short code {}", code)))?;

        // 4. 回写缓存，失败只记日志
        match side_call(
            self.cache_timeout,
            self.cache.set(code, &record.long_url, self.cache_ttl),
        )
        .await
        {
            SideCall::Done(()) => trace!("Cache populated for {}", code),
            SideCall::Failed(e) => warn!("Cache write-back failed for {}: {}", code, e),
            SideCall::TimedOut => warn!("Cache write-back timed out for {}", code),
        }

        Ok(record.long_url)
    }

    /// 创建短链：发号 → 落库 → 编码 → 加入过滤器
    pub async fn create(&self, long_url: &str) -> Result<String> {
        if long_url.trim().is_empty() {
            return Err(TinylinkError::validation("url must not be empty"));
        }

        let id = self
            .minter
            .generate_id()
            .await
            .map_err(|e| unavailable("minter", e))?;
        if id == 0 {
            // 0 会编码成空串
            return Err(TinylinkError::storage_unavailable(
                "minter returned reserved id 0",
            ));
        }

        self.store
            .insert(&LinkRecord::new(id, long_url))
            .await
            .map_err(|e| unavailable("store.insert", e))?;

        let code = codec::encode(id);

        // 过滤器最终一致：加入失败时，该短码在下一次预热前会被误判为不存在
        match side_call(self.filter_timeout, self.filter.add(&code)).await {
            SideCall::Done(()) => {}
            SideCall::Failed(e) => warn!(
                "Failed to add {} to existence filter, repaired on next warm-up: {}",
                code, e
            ),
            SideCall::TimedOut => warn!(
                "Adding {} to existence filter timed out, repaired on next warm-up",
                code
            ),
        }

        info!("Short link created: {} (id {})", code, id);
        Ok(code)
    }

    /// 把存储中的全部短码写入过滤器，返回写入数量
    pub async fn warm_up_filter(&self, batch_size: u64) -> Result<u64> {
        let mut batches = self.store.id_batches(batch_size);
        let mut total = 0u64;

        while let Some(batch) = batches.next().await {
            let codes: Vec<String> = batch?.into_iter().map(codec::encode).collect();
            self.filter.add_many(&codes).await?;
            total += codes.len() as u64;
            debug!("Filter warm-up progress: {} codes", total);
        }

        info!("Existence filter warmed up with {} codes", total);
        Ok(total)
    }
}
