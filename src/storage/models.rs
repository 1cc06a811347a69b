use serde::{Deserialize, Serialize};

/// links 表中的一行：创建后不可变，id 由 minter 分配且不复用
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub id: u64,
    pub long_url: String,
}

impl LinkRecord {
    pub fn new(id: u64, long_url: impl Into<String>) -> Self {
        Self {
            id,
            long_url: long_url.into(),
        }
    }
}
