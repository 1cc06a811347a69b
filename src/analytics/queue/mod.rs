mod null;
mod redis_stream;

pub use null::NullEventQueue;
pub use redis_stream::RedisStreamQueue;

use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::info;

use crate::config::{AnalyticsConfig, QueueBackend};
use crate::errors::{Result, TinylinkError};

/// 消息队列契约：把不透明的字节追加到指定 topic
#[async_trait]
pub trait EventQueue: Send + Sync {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()>;
}

pub fn build_event_queue(
    config: &AnalyticsConfig,
    redis: Option<&ConnectionManager>,
) -> Result<Arc<dyn EventQueue>> {
    if !config.enabled {
        info!("Analytics disabled, click events are discarded");
        return Ok(Arc::new(NullEventQueue));
    }

    let queue: Arc<dyn EventQueue> = match config.queue {
        QueueBackend::Redis => {
            let conn = redis.ok_or_else(|| {
                TinylinkError::config(
                    "analytics.queue = \"redis\" but no Redis connection is available",
                )
            })?;
            Arc::new(RedisStreamQueue::new(conn.clone(), config.stream_max_len))
        }
        QueueBackend::Null => Arc::new(NullEventQueue),
    };
    info!("Analytics queue: {:?} (topic {})", config.queue, config.topic);
    Ok(queue)
}
