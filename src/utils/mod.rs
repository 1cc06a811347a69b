pub mod ip;

use std::future::Future;
use std::time::Duration;

use crate::errors::{Result, TinylinkError};

/// 给外部调用加上截止时间，超时统一视为依赖不可用
///
/// `what` 只用于错误消息，例如 "store.get"。
pub async fn with_deadline<T, F>(what: &str, deadline: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(TinylinkError::storage_unavailable(format!(
            "{} timed out after {}ms",
            what,
            deadline.as_millis()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_with_deadline_passes_result_through() {
        let v = with_deadline("op", Duration::from_millis(50), async { Ok(7u32) }).await;
        assert_eq!(v.ok(), Some(7));
    }

    #[tokio::test]
    async fn test_with_deadline_times_out() {
        let r: Result<()> = with_deadline("slow", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        })
        .await;
        match r {
            Err(TinylinkError::StorageUnavailable(msg)) => assert!(msg.contains("slow")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
