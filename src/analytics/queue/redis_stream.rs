use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::trace;

use super::EventQueue;
use crate::errors::{Result, TinylinkError};

/// Redis Stream 队列：`XADD <topic> MAXLEN ~ <n> * payload <bytes>`
pub struct RedisStreamQueue {
    conn: ConnectionManager,
    max_len: u64,
}

impl RedisStreamQueue {
    pub fn new(conn: ConnectionManager, max_len: u64) -> Self {
        Self { conn, max_len }
    }
}

/// 构造 XADD 命令；max_len 为 0 时不裁剪
fn xadd_cmd(topic: &str, max_len: u64, payload: &[u8]) -> redis::Cmd {
    let mut cmd = redis::cmd("XADD");
    cmd.arg(topic);
    if max_len > 0 {
        cmd.arg("MAXLEN").arg("~").arg(max_len);
    }
    cmd.arg("*").arg("payload").arg(payload);
    cmd
}

#[async_trait]
impl EventQueue for RedisStreamQueue {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<()> {
        let mut conn = self.conn.clone();
        let entry_id: String = xadd_cmd(topic, self.max_len, &payload)
            .query_async(&mut conn)
            .await
            .map_err(|e| TinylinkError::publish_failed(format!("XADD {}: {}", topic, e)))?;
        trace!("XADD {} -> {}", topic, entry_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packed(cmd: &redis::Cmd) -> String {
        String::from_utf8_lossy(&cmd.get_packed_command()).into_owned()
    }

    #[test]
    fn test_xadd_with_trim() {
        let wire = packed(&xadd_cmd("link_clicks", 1000, b"{}"));
        let expected = ["XADD", "link_clicks", "MAXLEN", "~", "1000", "*", "payload", "{}"];
        let mut rest = wire.as_str();
        for part in expected {
            let pos = rest.find(part).unwrap_or_else(|| panic!("{} missing in {:?}", part, wire));
            rest = &rest[pos + part.len()..];
        }
    }

    #[test]
    fn test_xadd_without_trim() {
        let wire = packed(&xadd_cmd("t", 0, b"x"));
        // 5 个参数：XADD t * payload x
        assert!(wire.starts_with("*5\r\n"));
        assert!(!wire.contains("MAXLEN"));
    }
}
