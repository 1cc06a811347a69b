//! RemoteMinter 与 minter 服务的端到端测试
//!
//! 在随机端口上启动真实的 minter HTTP 服务，客户端通过 ureq 调用。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use actix_web::{App, HttpServer, web};
use async_trait::async_trait;

use tinylink::errors::{Result, TinylinkError};
use tinylink::minter::service::minter_routes;
use tinylink::minter::{IdMinter, RemoteMinter};

struct SequenceMinter(AtomicU64);

#[async_trait]
impl IdMinter for SequenceMinter {
    async fn generate_id(&self) -> Result<u64> {
        Ok(self.0.fetch_add(1, Ordering::SeqCst) + 1000)
    }
}

struct BrokenMinter;

#[async_trait]
impl IdMinter for BrokenMinter {
    async fn generate_id(&self) -> Result<u64> {
        Err(TinylinkError::storage_unavailable("tickets table unreachable"))
    }
}

/// 启动 minter 服务，返回监听地址和服务句柄
fn spawn_minter_service(minter: Arc<dyn IdMinter>) -> (String, actix_web::dev::ServerHandle) {
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(minter.clone()))
            .configure(minter_routes)
    })
    .workers(1)
    .disable_signals()
    .bind(("127.0.0.1", 0))
    .expect("Failed to bind minter service");

    let addr = server.addrs()[0];
    let server = server.run();
    let handle = server.handle();
    actix_rt::spawn(server);
    (format!("http://{}", addr), handle)
}

#[actix_rt::test]
async fn test_remote_minter_fetches_ids() {
    let (endpoint, handle) = spawn_minter_service(Arc::new(SequenceMinter(AtomicU64::new(0))));
    let client = RemoteMinter::new(&endpoint, Duration::from_secs(5)).unwrap();

    assert_eq!(client.generate_id().await.unwrap(), 1000);
    assert_eq!(client.generate_id().await.unwrap(), 1001);

    handle.stop(true).await;
}

#[actix_rt::test]
async fn test_remote_minter_server_error_is_unavailable() {
    let (endpoint, handle) = spawn_minter_service(Arc::new(BrokenMinter));
    let client = RemoteMinter::new(&endpoint, Duration::from_secs(5)).unwrap();

    assert!(matches!(
        client.generate_id().await,
        Err(TinylinkError::StorageUnavailable(_))
    ));

    handle.stop(true).await;
}
