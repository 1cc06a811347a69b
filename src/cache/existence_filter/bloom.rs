use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, trace};

use super::BloomParams;
use crate::cache::{BitArray, ExistenceFilter};
use crate::errors::{Result, TinylinkError};

/// 基于共享位数组的 Bloom 过滤器
///
/// 位数组可以是 Redis 位图（多实例共享）或进程内数组，
/// 过滤器只负责把 key 映射到 k 个位。
pub struct BloomExistenceFilter {
    params: BloomParams,
    bits: Arc<dyn BitArray>,
}

impl BloomExistenceFilter {
    pub fn new(params: BloomParams, bits: Arc<dyn BitArray>) -> Self {
        debug!(
            "BloomExistenceFilter initialized: m = {} bits, k = {} hashes",
            params.bits, params.hashes
        );
        Self { params, bits }
    }

    pub fn params(&self) -> BloomParams {
        self.params
    }
}

fn degraded(e: TinylinkError) -> TinylinkError {
    match e {
        TinylinkError::FilterDegraded(_) => e,
        other => TinylinkError::filter_degraded(other.message().to_string()),
    }
}

#[async_trait]
impl ExistenceFilter for BloomExistenceFilter {
    async fn exists(&self, key: &str) -> Result<bool> {
        let positions = self.params.positions(key);
        let bits = self.bits.get_bits(&positions).await.map_err(degraded)?;
        let present = bits.iter().all(|&b| b);
        trace!("Bloom check {}: {}", key, present);
        Ok(present)
    }

    async fn add(&self, key: &str) -> Result<()> {
        let positions = self.params.positions(key);
        self.bits.set_bits(&positions).await.map_err(degraded)
    }

    async fn add_many(&self, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let positions: Vec<u64> = keys
            .iter()
            .flat_map(|key| self.params.positions(key))
            .collect();
        self.bits.set_bits(&positions).await.map_err(degraded)?;
        debug!("Bulk inserted {} keys into bloom filter", keys.len());
        Ok(())
    }
}
