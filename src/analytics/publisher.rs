//! 点击事件发布器
//!
//! `publish` 只做一次 `try_send`，永远不等待、不失败；
//! 固定数量的 worker 从有界通道取事件，序列化后写入队列。
//! 通道满或已关闭时直接丢弃事件（至多一次投递）。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::future::join_all;
use parking_lot::Mutex;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::{ClickEvent, EventQueue};
use crate::errors::TinylinkError;

pub struct AnalyticsPublisher {
    /// `None` 表示已关闭
    sender: Mutex<Option<mpsc::Sender<ClickEvent>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    dropped: AtomicU64,
    delivered: Arc<AtomicU64>,
}

impl AnalyticsPublisher {
    /// 创建通道并启动 worker（需在 tokio 运行时内调用）
    pub fn start(
        queue: Arc<dyn EventQueue>,
        topic: impl Into<String>,
        capacity: usize,
        workers: usize,
        publish_timeout: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let rx = Arc::new(tokio::sync::Mutex::new(rx));
        let topic: Arc<str> = Arc::from(topic.into());
        let delivered = Arc::new(AtomicU64::new(0));

        let handles = (0..workers.max(1))
            .map(|worker_id| {
                let worker = Worker {
                    id: worker_id,
                    rx: Arc::clone(&rx),
                    queue: Arc::clone(&queue),
                    topic: Arc::clone(&topic),
                    timeout: publish_timeout,
                    delivered: Arc::clone(&delivered),
                };
                tokio::spawn(worker.run())
            })
            .collect::<Vec<_>>();

        info!(
            "AnalyticsPublisher started: {} workers, channel capacity {}, topic {}",
            handles.len(),
            capacity,
            topic
        );

        Self {
            sender: Mutex::new(Some(tx)),
            workers: Mutex::new(handles),
            dropped: AtomicU64::new(0),
            delivered,
        }
    }

    /// 投递事件，立即返回
    pub fn publish(&self, event: ClickEvent) {
        let guard = self.sender.lock();
        let Some(sender) = guard.as_ref() else {
            self.record_drop(&event, "publisher closed");
            return;
        };

        match sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => self.record_drop(&event, "channel full"),
            Err(TrySendError::Closed(event)) => self.record_drop(&event, "channel closed"),
        }
    }

    fn record_drop(&self, event: &ClickEvent, reason: &str) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        let err = TinylinkError::publish_failed(format!(
            "click event for {} dropped: {}",
            event.short_url, reason
        ));
        warn!("{}", err);
    }

    /// 被丢弃的事件数
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// 成功写入队列的事件数
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// 关闭通道，等待 worker 处理完已入队的事件，最多等待 `grace`
    pub async fn shutdown(&self, grace: Duration) {
        // 丢掉 sender 后，worker 取完剩余事件就会退出
        let sender = self.sender.lock().take();
        if sender.is_none() {
            debug!("AnalyticsPublisher already shut down");
            return;
        }
        drop(sender);

        let handles: Vec<JoinHandle<()>> = std::mem::take(&mut *self.workers.lock());
        let aborts: Vec<_> = handles.iter().map(|h| h.abort_handle()).collect();

        match tokio::time::timeout(grace, join_all(handles)).await {
            Ok(_) => info!(
                "AnalyticsPublisher drained ({} delivered, {} dropped)",
                self.delivered(),
                self.dropped()
            ),
            Err(_) => {
                warn!(
                    "AnalyticsPublisher drain exceeded {}s grace period, aborting workers",
                    grace.as_secs()
                );
                for abort in aborts {
                    abort.abort();
                }
            }
        }
    }
}

struct Worker {
    id: usize,
    rx: Arc<tokio::sync::Mutex<mpsc::Receiver<ClickEvent>>>,
    queue: Arc<dyn EventQueue>,
    topic: Arc<str>,
    timeout: Duration,
    delivered: Arc<AtomicU64>,
}

impl Worker {
    async fn run(self) {
        loop {
            let next = { self.rx.lock().await.recv().await };
            let Some(event) = next else {
                trace!("Analytics worker {} exiting", self.id);
                break;
            };
            self.deliver(event).await;
        }
    }

    async fn deliver(&self, event: ClickEvent) {
        let payload = match serde_json::to_vec(&event) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("{}", TinylinkError::from(e));
                return;
            }
        };

        match tokio::time::timeout(self.timeout, self.queue.publish(&self.topic, payload)).await {
            Ok(Ok(())) => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
                trace!("Click event for {} published", event.short_url);
            }
            Ok(Err(e)) => warn!("Click event for {} not published: {}", event.short_url, e),
            Err(_) => warn!(
                "Click event for {} not published: queue timed out after {}ms",
                event.short_url,
                self.timeout.as_millis()
            ),
        }
    }
}
