use std::sync::Arc;

use async_trait::async_trait;

use super::IdMinter;
use crate::errors::Result;
use crate::storage::SeaOrmStorage;

/// 直接对 tickets 表发号，无状态，多实例可共享同一张表
pub struct TicketMinter {
    storage: Arc<SeaOrmStorage>,
}

impl TicketMinter {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl IdMinter for TicketMinter {
    async fn generate_id(&self) -> Result<u64> {
        self.storage.next_ticket().await
    }
}
