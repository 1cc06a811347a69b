//! 点击事件发布
//!
//! 每次解析成功后由 HTTP 层投递一个 [`ClickEvent`]，
//! [`AnalyticsPublisher`] 异步写入消息队列，不阻塞跳转。

pub mod publisher;
pub mod queue;

pub use publisher::AnalyticsPublisher;
pub use queue::{EventQueue, NullEventQueue, RedisStreamQueue};

use serde::{Deserialize, Serialize};

/// 点击事件（JSON 字段名即下游消费者约定的格式）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickEvent {
    /// 短码
    pub short_url: String,
    pub long_url: String,
    pub ip: String,
    pub user_agent: String,
    /// Unix 秒
    pub timestamp: i64,
}

impl ClickEvent {
    pub fn new(
        code: impl Into<String>,
        long_url: impl Into<String>,
        ip: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            short_url: code.into(),
            long_url: long_url.into(),
            ip: ip.into(),
            user_agent: user_agent.into(),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}
