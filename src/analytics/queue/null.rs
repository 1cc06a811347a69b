use async_trait::async_trait;
use tracing::trace;

use super::EventQueue;
use crate::errors::Result;

/// 关闭分析时使用：记录一条 trace 后丢弃
pub struct NullEventQueue;

#[async_trait]
impl EventQueue for NullEventQueue {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        trace!(
            "NullEventQueue: discard {} bytes for topic {}",
            payload.len(),
            topic
        );
        Ok(())
    }
}
