use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::config::StaticConfig;
use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::SeaOrmStorage;
pub use models::LinkRecord;

/// 持久存储契约
///
/// 所有错误都以 `StorageUnavailable` 返回；`get` 找不到记录时返回 `Ok(None)`。
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// 由存储自己分配 id 并写入，返回新 id
    async fn insert_generated(&self, long_url: &str) -> Result<u64>;

    /// 以显式 id 写入（id 来自 minter）
    async fn insert(&self, record: &LinkRecord) -> Result<()>;

    async fn get(&self, id: u64) -> Result<Option<LinkRecord>>;

    /// 按 id 升序分批读出全部 id，用于预热过滤器
    fn id_batches(&self, batch_size: u64) -> BoxStream<'_, Result<Vec<u64>>>;
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &StaticConfig) -> Result<Arc<SeaOrmStorage>> {
        let storage = SeaOrmStorage::new(&config.database, config.timeouts.store()).await?;
        Ok(Arc::new(storage))
    }
}
