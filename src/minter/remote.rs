use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{trace, warn};
use ureq::Agent;

use super::IdMinter;
use crate::errors::{Result, TinylinkError};
use crate::utils::with_deadline;

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: u64,
}

/// 通过 HTTP 调用 minter 服务（`POST {endpoint}/v1/ids`）
pub struct RemoteMinter {
    agent: Agent,
    url: String,
    timeout: Duration,
}

impl RemoteMinter {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.trim_end_matches('/');
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(TinylinkError::config(format!(
                "minter.endpoint must be an http(s) URL, got '{}'",
                endpoint
            )));
        }

        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();

        Ok(Self {
            agent,
            url: format!("{}/v1/ids", endpoint),
            timeout,
        })
    }

    /// 同步请求，在 spawn_blocking 中调用
    fn fetch_id_sync(agent: Agent, url: String) -> Result<u64> {
        let resp = agent.post(&url).send_empty().map_err(|e| {
            warn!("Minter request to \"{}\" failed: {}", url, e);
            TinylinkError::storage_unavailable(format!("minter request failed: {}", e))
        })?;

        let body: IdResponse = resp.into_body().read_json().map_err(|e| {
            TinylinkError::storage_unavailable(format!("minter response parse failed: {}", e))
        })?;

        trace!("Minter issued id {}", body.id);
        Ok(body.id)
    }
}

#[async_trait]
impl IdMinter for RemoteMinter {
    async fn generate_id(&self) -> Result<u64> {
        let agent = self.agent.clone();
        let url = self.url.clone();

        with_deadline("minter.generate_id", self.timeout, async move {
            tokio::task::spawn_blocking(move || Self::fetch_id_sync(agent, url))
                .await
                .map_err(|e| {
                    TinylinkError::storage_unavailable(format!("minter task failed: {}", e))
                })?
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_must_be_http() {
        assert!(RemoteMinter::new("127.0.0.1:50051", Duration::from_secs(1)).is_err());
        let minter = RemoteMinter::new("http://127.0.0.1:50051/", Duration::from_secs(1)).unwrap();
        assert_eq!(minter.url, "http://127.0.0.1:50051/v1/ids");
    }

    #[tokio::test]
    async fn test_unreachable_minter_is_storage_unavailable() {
        // 端口 9 (discard) 通常没有监听
        let minter = RemoteMinter::new("http://127.0.0.1:9", Duration::from_millis(300)).unwrap();
        assert!(matches!(
            minter.generate_id().await,
            Err(TinylinkError::StorageUnavailable(_))
        ));
    }
}
