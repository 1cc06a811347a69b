//! 发号器
//!
//! id 来自 tickets 表的自增主键：每次发号插入一行并读回生成的 key。
//! 本进程可以直接连表发号，也可以通过 HTTP 调用独立部署的 minter 服务。

mod remote;
pub mod service;
mod ticket;

pub use remote::RemoteMinter;
pub use ticket::TicketMinter;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::{MinterConfig, MinterMode};
use crate::errors::Result;
use crate::storage::SeaOrmStorage;

#[async_trait]
pub trait IdMinter: Send + Sync {
    /// 返回一个全局唯一、单调递增的 id
    async fn generate_id(&self) -> Result<u64>;
}

pub fn build_minter(
    config: &MinterConfig,
    storage: Arc<SeaOrmStorage>,
    timeout: std::time::Duration,
) -> Result<Arc<dyn IdMinter>> {
    let minter: Arc<dyn IdMinter> = match config.mode {
        MinterMode::Local => Arc::new(TicketMinter::new(storage)),
        MinterMode::Remote => Arc::new(RemoteMinter::new(&config.endpoint, timeout)?),
    };
    info!("ID minter: {:?}", config.mode);
    Ok(minter)
}
