//! SeaORM storage backend
//!
//! links / tickets 两张表，支持 SQLite、MySQL/MariaDB 和 PostgreSQL。

mod connection;
mod mutations;
mod query;
pub mod retry;

use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{Result, TinylinkError};
use crate::storage::{LinkRecord, LinkStore};

pub use connection::{connect_generic, connect_sqlite, run_migrations};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<&'static str> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
    {
        Ok("sqlite")
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql")
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres")
    } else {
        Err(TinylinkError::config(format!(
            "无法从 URL 推断数据库类型: {}. 支持的 URL 格式: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// links 表的 id 列是有符号 BIGINT，超出 i64 的 id 无法落库
pub(crate) fn id_to_column(id: u64) -> Result<i64> {
    i64::try_from(id)
        .map_err(|_| TinylinkError::validation(format!("id {} exceeds the BIGINT range", id)))
}

pub(crate) fn id_from_column(id: i64) -> Result<u64> {
    u64::try_from(id)
        .map_err(|_| TinylinkError::storage_unavailable(format!("negative id {} in store", id)))
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: &'static str,
    retry_config: retry::RetryConfig,
}

impl SeaOrmStorage {
    /// 连接数据库并运行迁移
    ///
    /// `attempt_timeout` 限制每一次数据库调用（重试时每次重新计时）。
    pub async fn new(config: &DatabaseConfig, attempt_timeout: Duration) -> Result<Self> {
        let database_url = config.database_url.as_str();
        if database_url.is_empty() {
            return Err(TinylinkError::config("database.database_url 未设置"));
        }

        let backend_name = infer_backend_from_url(database_url)?;
        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, backend_name, config.pool_size).await?
        };

        run_migrations(&db).await?;

        let storage = SeaOrmStorage {
            db,
            backend_name,
            retry_config: retry::RetryConfig::from_database(config, attempt_timeout),
        };

        info!("{} Storage initialized.", backend_name.to_uppercase());
        Ok(storage)
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend_name
    }

    /// 获取数据库连接（发号等需要直接访问数据库的场景）
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl LinkStore for SeaOrmStorage {
    async fn insert_generated(&self, long_url: &str) -> Result<u64> {
        self.insert_link_generated(long_url).await
    }

    async fn insert(&self, record: &LinkRecord) -> Result<()> {
        self.insert_link(record).await
    }

    async fn get(&self, id: u64) -> Result<Option<LinkRecord>> {
        self.get_link(id).await
    }

    fn id_batches(&self, batch_size: u64) -> BoxStream<'_, Result<Vec<u64>>> {
        self.stream_id_batches(batch_size)
    }
}
