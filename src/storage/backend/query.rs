//! Query operations for SeaOrmStorage

use futures_util::stream::{self, BoxStream, StreamExt};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::{debug, error};

use super::{SeaOrmStorage, id_from_column, retry};
use crate::errors::{Result, TinylinkError};
use crate::storage::LinkRecord;

use migration::entities::{LinkEntity, link};

impl SeaOrmStorage {
    pub async fn get_link(&self, id: u64) -> Result<Option<LinkRecord>> {
        // 超出 BIGINT 的 id 不可能被写入过
        let Ok(key) = i64::try_from(id) else {
            return Ok(None);
        };
        let db = &self.db;

        let model = retry::with_retry(&format!("get({})", id), self.retry_config, || async {
            LinkEntity::find_by_id(key).one(db).await
        })
        .await
        .map_err(|e| {
            error!("查询短链接失败（重试后仍失败）: {}", e);
            TinylinkError::from(e)
        })?;

        model
            .map(|m| Ok(LinkRecord::new(id_from_column(m.id)?, m.long_url)))
            .transpose()
    }

    /// 取 id 大于 `after` 的下一页 id（升序）
    async fn id_page(&self, after: i64, limit: u64) -> Result<Vec<u64>> {
        let db = &self.db;
        let ids = retry::with_retry("id_page", self.retry_config, || async {
            LinkEntity::find()
                .select_only()
                .column(link::Column::Id)
                .filter(link::Column::Id.gt(after))
                .order_by_asc(link::Column::Id)
                .limit(limit)
                .into_tuple::<i64>()
                .all(db)
                .await
        })
        .await?;

        ids.into_iter().map(id_from_column).collect()
    }

    /// 基于 id 游标的分批读取，每批最多 `batch_size` 个
    pub fn stream_id_batches(&self, batch_size: u64) -> BoxStream<'_, Result<Vec<u64>>> {
        let batch_size = batch_size.max(1);
        // 游标从 -1 开始：落库的 id 都是非负数
        stream::unfold(Some(-1i64), move |cursor| async move {
            let after = cursor?;
            match self.id_page(after, batch_size).await {
                Ok(ids) if ids.is_empty() => None,
                Ok(ids) => {
                    let next = if (ids.len() as u64) < batch_size {
                        None
                    } else {
                        ids.last().and_then(|&last| i64::try_from(last).ok())
                    };
                    debug!("Loaded id batch of {} (cursor {})", ids.len(), after);
                    Some((Ok(ids), next))
                }
                Err(e) => Some((Err(e), None)),
            }
        })
        .boxed()
    }
}
