//! Minter service mode
//!
//! 独立部署的发号服务：`POST /v1/ids` 返回 `{"id": u64}`。

use std::time::Duration;

use actix_web::{App, HttpServer, web};
use anyhow::Result;
use tracing::{error, info};

use crate::config::StaticConfig;
use crate::minter::service::minter_routes;
use crate::runtime::lifetime;

pub async fn run_minter(config: &StaticConfig) -> Result<()> {
    let ctx = lifetime::startup::prepare_minter_startup(config)
        .await
        .inspect_err(|e| error!("Minter startup failed: {:#}", e))?;
    info!("Minter using {} storage", ctx.storage.backend_name());

    let minter = ctx.minter.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(minter.clone()))
            .configure(minter_routes)
    })
    .keep_alive(Duration::from_secs(30))
    .workers(config.server.cpu_count.clamp(1, 8))
    .disable_signals();

    let bind_address = format!("{}:{}", config.minter.host, config.minter.port);
    info!("Starting minter service at http://{}", bind_address);
    let server = server.bind(&bind_address)?.run();
    let handle = server.handle();

    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::wait_for_signal() => {
            handle.stop(true).await;
        }
    }

    info!("Minter service stopped");
    Ok(())
}
