//! 存在性过滤器
//!
//! Bloom 参数推导与位置计算放在这里，位数组的存储交给 [`BitArray`] 实现
//! （Redis 位图或进程内原子数组），过滤器本身不持有状态。
//!
//! [`BitArray`]: crate::cache::BitArray

pub mod bit_array;
pub mod bloom;
pub mod null;

pub use bloom::BloomExistenceFilter;
pub use null::NullExistenceFilter;

use std::f64::consts::LN_2;

use xxhash_rust::xxh64::xxh64;

use crate::errors::{Result, TinylinkError};

/// Bloom 过滤器参数：位数 `bits`（m）与哈希函数个数 `hashes`（k）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BloomParams {
    pub bits: u64,
    pub hashes: u32,
}

impl BloomParams {
    /// 根据预期元素数 `n` 和误判率 `p` 推导 m 与 k
    ///
    /// m = ceil(-n·ln(p) / (ln2)²)，k = ceil(m/n · ln2)，两者至少为 1。
    pub fn new(expected_items: u64, false_positive_rate: f64) -> Result<Self> {
        if expected_items == 0 {
            return Err(TinylinkError::config(
                "filter.expected_items must be greater than 0",
            ));
        }
        if !(false_positive_rate > 0.0 && false_positive_rate < 1.0) {
            return Err(TinylinkError::config(format!(
                "filter.false_positive_rate must be in (0, 1), got {}",
                false_positive_rate
            )));
        }

        let n = expected_items as f64;
        let m = (-n * false_positive_rate.ln() / (LN_2 * LN_2)).ceil();
        let bits = (m as u64).max(1);
        let k = ((bits as f64 / n) * LN_2).ceil();
        let hashes = (k as u32).max(1);

        Ok(Self { bits, hashes })
    }

    /// 计算 key 对应的 k 个位偏移（双重哈希）
    pub fn positions(&self, key: &str) -> Vec<u64> {
        let h1 = xxh64(key.as_bytes(), 0);
        let mut salted = Vec::with_capacity(key.len() + 1);
        salted.extend_from_slice(key.as_bytes());
        salted.push(0x01);
        let h2 = xxh64(&salted, 0);

        (0..self.hashes as u64)
            .map(|i| h1.wrapping_add(i.wrapping_mul(h2)) % self.bits)
            .collect()
    }
}
