//! Mutation operations for SeaOrmStorage

use sea_orm::{ActiveValue::Set, EntityTrait, TransactionTrait};
use tracing::{debug, error};

use super::{SeaOrmStorage, id_from_column, id_to_column, retry};
use crate::errors::{Result, TinylinkError};
use crate::storage::LinkRecord;

use migration::entities::{LinkEntity, TicketEntity, link, ticket};

fn ticket_model() -> ticket::ActiveModel {
    ticket::ActiveModel {
        stub: Set("a".to_string()),
        ..Default::default()
    }
}

impl SeaOrmStorage {
    /// 向 tickets 表插入一行并返回自增 id
    ///
    /// 失败时不认为任何 id 已被消耗；重试可能跳号，但不会重复。
    pub async fn next_ticket(&self) -> Result<u64> {
        let db = &self.db;
        let raw = retry::with_retry("next_ticket", self.retry_config, || async {
            TicketEntity::insert(ticket_model())
                .exec(db)
                .await
                .map(|res| res.last_insert_id)
        })
        .await
        .map_err(|e| {
            error!("发号失败: {}", e);
            TinylinkError::from(e)
        })?;

        let id = id_from_column(raw)?;
        debug!("Ticket issued: {}", id);
        Ok(id)
    }

    pub async fn insert_link(&self, record: &LinkRecord) -> Result<()> {
        let key = id_to_column(record.id)?;
        let db = &self.db;

        retry::with_retry(
            &format!("insert({})", record.id),
            self.retry_config,
            || async {
                let model = link::ActiveModel {
                    id: Set(key),
                    long_url: Set(record.long_url.clone()),
                };
                LinkEntity::insert(model).exec(db).await.map(|_| ())
            },
        )
        .await
        .map_err(|e| TinylinkError::storage_unavailable(format!("写入短链接失败: {}", e)))?;

        debug!("Link stored: {}", record.id);
        Ok(())
    }

    /// 在同一事务里取票号并写入 link，id 与 minter 共用同一序列
    pub async fn insert_link_generated(&self, long_url: &str) -> Result<u64> {
        let db = &self.db;

        let raw = retry::with_retry("insert_generated", self.retry_config, || async {
            let txn = db.begin().await?;
            let id = TicketEntity::insert(ticket_model())
                .exec(&txn)
                .await?
                .last_insert_id;
            LinkEntity::insert(link::ActiveModel {
                id: Set(id),
                long_url: Set(long_url.to_string()),
            })
            .exec(&txn)
            .await?;
            txn.commit().await?;
            Ok::<_, sea_orm::DbErr>(id)
        })
        .await
        .map_err(|e| TinylinkError::storage_unavailable(format!("写入短链接失败: {}", e)))?;

        id_from_column(raw)
    }
}
