mod memory;
mod redis;

pub use memory::MemoryBitArray;
pub use redis::RedisBitArray;
