use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use tracing::{debug, info, warn};

use crate::analytics::AnalyticsPublisher;
use crate::analytics::queue::build_event_queue;
use crate::api::ApiSettings;
use crate::cache::factory::{build_existence_filter, build_object_cache};
use crate::config::{FilterBackend, StaticConfig};
use crate::minter::{IdMinter, TicketMinter, build_minter};
use crate::services::LinkService;
use crate::storage::{SeaOrmStorage, StorageFactory};

/// serve 模式所需的全部句柄，启动阶段构造后注入各处
pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub link_service: Arc<LinkService>,
    pub publisher: Arc<AnalyticsPublisher>,
    pub api_settings: ApiSettings,
}

/// minter 服务模式只需要存储和发号器
pub struct MinterContext {
    pub storage: Arc<SeaOrmStorage>,
    pub minter: Arc<dyn IdMinter>,
}

fn install_crypto_provider() -> Result<()> {
    // 重复安装（例如测试中多次启动）不算错误
    if rustls::crypto::CryptoProvider::get_default().is_none() {
        rustls::crypto::ring::default_provider()
            .install_default()
            .map_err(|e| anyhow::anyhow!("Failed to install rustls crypto provider: {:?}", e))?;
    }
    Ok(())
}

async fn connect_redis(config: &StaticConfig) -> Result<Option<ConnectionManager>> {
    if !config.needs_redis() {
        debug!("No component uses Redis, skipping connection");
        return Ok(None);
    }

    let client = redis::Client::open(config.redis.url.as_str())
        .with_context(|| format!("Invalid redis.url '{}'", config.redis.url))?;
    let manager = ConnectionManager::new(client)
        .await
        .with_context(|| format!("Failed to connect to Redis at {}", config.redis.url))?;
    info!("Redis connection manager ready");
    Ok(Some(manager))
}

/// 准备 serve 模式的上下文
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = Instant::now();
    debug!("Starting pre-startup processing...");

    install_crypto_provider()?;

    let storage = StorageFactory::create(config)
        .await
        .context("Failed to create storage backend")?;
    info!("Using storage backend: {}", storage.backend_name());

    let redis = connect_redis(config).await?;

    let minter = build_minter(&config.minter, storage.clone(), config.timeouts.minter())
        .context("Failed to create ID minter")?;
    let cache = build_object_cache(&config.cache, redis.as_ref())
        .context("Failed to create object cache")?;
    let filter = build_existence_filter(&config.filter, redis.as_ref())
        .context("Failed to create existence filter")?;

    let link_service = Arc::new(
        LinkService::new(minter, storage.clone(), cache, filter)
            .with_cache_ttl(config.cache.ttl())
            .with_timeouts(config.timeouts.cache(), config.timeouts.filter()),
    );

    // 进程内位数组每次启动都是空的，必须从存储重建
    let memory_filter = config.filter.backend == FilterBackend::Memory;
    if config.filter.warm_up || memory_filter {
        if memory_filter && !config.filter.warm_up {
            warn!("In-memory existence filter starts empty, seeding it from storage");
        }
        let loaded = link_service
            .warm_up_filter(config.filter.warm_up_batch)
            .await
            .context("Failed to warm up existence filter")?;
        debug!("Existence filter seeded with {} codes", loaded);
    }

    let queue = build_event_queue(&config.analytics, redis.as_ref())
        .context("Failed to create analytics queue")?;
    let publisher = Arc::new(AnalyticsPublisher::start(
        queue,
        config.analytics.topic.clone(),
        config.analytics.channel_capacity,
        config.analytics.workers,
        config.timeouts.queue(),
    ));

    let api_settings = ApiSettings::new(
        &config.server.base_url,
        &config.server.trusted_proxies,
    );
    if api_settings.trusted_proxies.is_empty() {
        debug!("No trusted proxies configured, forwarded headers accepted from private peers");
    }

    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );

    Ok(StartupContext {
        storage,
        link_service,
        publisher,
        api_settings,
    })
}

/// 准备 minter 服务模式的上下文
pub async fn prepare_minter_startup(config: &StaticConfig) -> Result<MinterContext> {
    install_crypto_provider()?;

    let storage = StorageFactory::create(config)
        .await
        .context("Failed to create storage backend")?;
    let minter: Arc<dyn IdMinter> = Arc::new(TicketMinter::new(storage.clone()));

    Ok(MinterContext { storage, minter })
}
