use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::trace;

use crate::cache::BitArray;
use crate::errors::{Result, TinylinkError};

/// Redis 位图的最大长度（SETBIT 偏移上限为 2^32 - 1）
const REDIS_MAX_BITS: u64 = 1 << 32;

fn check_capacity(bits: u64) -> Result<()> {
    if bits > REDIS_MAX_BITS {
        return Err(TinylinkError::config(format!(
            "bloom filter needs {} bits, Redis bitmaps hold at most {}",
            bits, REDIS_MAX_BITS
        )));
    }
    Ok(())
}

/// 一次往返内设置全部偏移；回复被忽略
fn setbit_pipe(key: &str, offsets: &[u64]) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    for &offset in offsets {
        pipe.cmd("SETBIT").arg(key).arg(offset).arg(1).ignore();
    }
    pipe
}

/// 一次往返内读取全部偏移，回复顺序与 `offsets` 一致
fn getbit_pipe(key: &str, offsets: &[u64]) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    for &offset in offsets {
        pipe.cmd("GETBIT").arg(key).arg(offset);
    }
    pipe
}

/// 单个 Redis key 上的位数组，所有实例共享同一份位图
pub struct RedisBitArray {
    conn: ConnectionManager,
    key: String,
}

impl RedisBitArray {
    pub fn new(conn: ConnectionManager, key: impl Into<String>, bits: u64) -> Result<Self> {
        check_capacity(bits)?;
        Ok(Self {
            conn,
            key: key.into(),
        })
    }
}

#[async_trait]
impl BitArray for RedisBitArray {
    async fn set_bits(&self, offsets: &[u64]) -> Result<()> {
        if offsets.is_empty() {
            return Ok(());
        }
        let mut conn = self.conn.clone();
        setbit_pipe(&self.key, offsets)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| TinylinkError::filter_degraded(format!("SETBIT {}: {}", self.key, e)))?;
        trace!("SETBIT x{} on {}", offsets.len(), self.key);
        Ok(())
    }

    async fn get_bits(&self, offsets: &[u64]) -> Result<Vec<bool>> {
        if offsets.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn.clone();
        let bits: Vec<i64> = getbit_pipe(&self.key, offsets)
            .query_async(&mut conn)
            .await
            .map_err(|e| TinylinkError::filter_degraded(format!("GETBIT {}: {}", self.key, e)))?;
        Ok(bits.into_iter().map(|b| b == 1).collect())
    }
}
