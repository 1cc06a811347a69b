use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::cache::BitArray;
use crate::errors::{Result, TinylinkError};

/// 进程内位数组，按 64 位分字，`fetch_or` 置位，无锁
pub struct MemoryBitArray {
    words: Vec<AtomicU64>,
    bits: u64,
}

impl MemoryBitArray {
    pub fn new(bits: u64) -> Self {
        let word_count = bits.div_ceil(64) as usize;
        let words = (0..word_count).map(|_| AtomicU64::new(0)).collect();
        Self { words, bits }
    }

    pub fn len(&self) -> u64 {
        self.bits
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    #[inline]
    fn locate(&self, offset: u64) -> Result<(usize, u64)> {
        if offset >= self.bits {
            return Err(TinylinkError::filter_degraded(format!(
                "bit offset {} out of range (len {})",
                offset, self.bits
            )));
        }
        Ok(((offset / 64) as usize, 1u64 << (offset % 64)))
    }
}

#[async_trait]
impl BitArray for MemoryBitArray {
    async fn set_bits(&self, offsets: &[u64]) -> Result<()> {
        for &offset in offsets {
            let (word, mask) = self.locate(offset)?;
            self.words[word].fetch_or(mask, Ordering::Release);
        }
        Ok(())
    }

    async fn get_bits(&self, offsets: &[u64]) -> Result<Vec<bool>> {
        offsets
            .iter()
            .map(|&offset| {
                let (word, mask) = self.locate(offset)?;
                Ok(self.words[word].load(Ordering::Acquire) & mask != 0)
            })
            .collect()
    }
}
