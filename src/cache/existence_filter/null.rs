use async_trait::async_trait;
use tracing::trace;

use crate::cache::ExistenceFilter;
use crate::errors::Result;

/// 关闭过滤器时使用：所有 key 都“可能存在”
pub struct NullExistenceFilter;

#[async_trait]
impl ExistenceFilter for NullExistenceFilter {
    async fn exists(&self, _key: &str) -> Result<bool> {
        trace!("NullExistenceFilter: always return true for exists");
        Ok(true)
    }

    async fn add(&self, _key: &str) -> Result<()> {
        trace!("NullExistenceFilter: skip add");
        Ok(())
    }

    async fn add_many(&self, _keys: &[String]) -> Result<()> {
        trace!("NullExistenceFilter: skip add_many");
        Ok(())
    }
}
