//! 数据库调用的重试与超时
//!
//! 每次尝试单独限时；瞬时错误（死锁、锁等待、SQLite BUSY、连接池耗尽）
//! 按指数退避加抖动重试，其余错误立即返回。

use std::future::Future;
use std::time::Duration;

use rand::RngExt;
use sea_orm::DbErr;
use sea_orm::error::RuntimeErr;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;

/// 可重试的数据库错误码：MySQL 死锁/锁等待、PostgreSQL 序列化失败/死锁、SQLite BUSY/LOCKED
const RETRYABLE_CODES: &[&str] = &["1213", "1205", "40001", "40P01", "5", "6"];

/// 拿不到错误码时按消息匹配（小写）
const RETRYABLE_MESSAGES: &[&str] = &[
    "deadlock",
    "lock wait timeout",
    "database is locked",
    "serialization failure",
];

fn message_is_transient(message: &str) -> bool {
    let message = message.to_lowercase();
    RETRYABLE_MESSAGES.iter().any(|m| message.contains(m))
}

fn runtime_is_transient(err: &RuntimeErr) -> bool {
    match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            let code = sqlx_err
                .as_database_error()
                .and_then(|db_err| db_err.code().map(|c| c.into_owned()));
            match code {
                Some(code) => RETRYABLE_CODES.contains(&code.as_str()),
                None => message_is_transient(&sqlx_err.to_string()),
            }
        }
        RuntimeErr::Internal(msg) => message_is_transient(msg),
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

/// 错误是否值得再试一次
pub fn is_retryable_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(e) | DbErr::Query(e) => runtime_is_transient(e),
        _ => false,
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RetryConfig {
    /// 首次失败后最多再试几次
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub attempt_timeout: Duration,
}

impl RetryConfig {
    pub fn from_database(config: &DatabaseConfig, attempt_timeout: Duration) -> Self {
        Self {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
            attempt_timeout,
        }
    }

    /// 第 `retry` 次重试（从 1 开始）前的等待：`base * 2^(retry-1)`，封顶后再加至多 25% 抖动
    fn backoff(&self, retry: u32) -> Duration {
        let exp = 2u64.saturating_pow(retry.saturating_sub(1));
        let capped = self.base_delay_ms.saturating_mul(exp).min(self.max_delay_ms);
        let jitter = rand::rng().random_range(0..=capped / 4);
        Duration::from_millis(capped.saturating_add(jitter))
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
            attempt_timeout: Duration::from_secs(2),
        }
    }
}

/// 执行 `operation`，瞬时错误与单次超时会重试
///
/// 重试耗尽后：最后一次的数据库错误原样返回，超时转成 `DbErr::Custom`。
pub async fn with_retry<T, F, Fut>(
    operation_name: &str,
    config: RetryConfig,
    mut operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let timeout_ms = config.attempt_timeout.as_millis();
    let mut retry = 0;
    loop {
        let reason = match tokio::time::timeout(config.attempt_timeout, operation()).await {
            Ok(Ok(value)) => {
                if retry > 0 {
                    debug!("'{}' succeeded on retry {}", operation_name, retry);
                }
                return Ok(value);
            }
            Ok(Err(e)) if retry < config.max_retries && is_retryable_error(&e) => e.to_string(),
            Ok(Err(e)) => return Err(e),
            Err(_) if retry < config.max_retries => format!("timed out after {}ms", timeout_ms),
            Err(_) => {
                warn!("'{}' timed out after {}ms, giving up", operation_name, timeout_ms);
                return Err(DbErr::Custom(format!(
                    "Operation '{}' timed out after {}ms",
                    operation_name, timeout_ms
                )));
            }
        };

        retry += 1;
        let delay = config.backoff(retry);
        warn!(
            "'{}' failed ({}), retry {}/{} in {:?}",
            operation_name, reason, retry, config.max_retries, delay
        );
        sleep(delay).await;
    }
}
