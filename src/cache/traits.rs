use std::time::Duration;

use async_trait::async_trait;

use crate::errors::Result;

#[async_trait]
pub trait ExistenceFilter: Send + Sync {
    /// 在访问后端前先判断是否可能存在
    /// - `Ok(false)` 表示**一定不存在**
    /// - `Ok(true)` 表示**可能存在**
    /// - `Err(_)` 表示 filter 本身不可用，由调用方决定是否放行
    async fn exists(&self, key: &str) -> Result<bool>;

    /// 设置新值进入 Filter（一次批量往返写入全部 k 个位）
    async fn add(&self, key: &str) -> Result<()>;

    /// 批量设置（用于从数据库预热）
    async fn add_many(&self, keys: &[String]) -> Result<()>;
}

/// 共享位数组：只会置位，不会清零
#[async_trait]
pub trait BitArray: Send + Sync {
    async fn set_bits(&self, offsets: &[u64]) -> Result<()>;

    /// 返回值与 `offsets` 一一对应
    async fn get_bits(&self, offsets: &[u64]) -> Result<Vec<bool>>;
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    /// 命中返回 `Some(long_url)`，未命中返回 `None`
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// `ttl = None` 表示永不过期
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;
}
