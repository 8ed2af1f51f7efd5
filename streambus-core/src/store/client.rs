//! 日志客户端（LogClient）
//!
//! 对 `LogStore` 的轻量共享句柄：由进程引导阶段显式构造并注入各组件，
//! 克隆即共享同一连接/会话，组件不再持有任何惰性全局状态。
//!
use super::log_store::{GroupBatch, LogStore, StreamEntry};
use crate::entry_id::{Direction, EntryId, StreamPosition};
use crate::error::{StreamError, StreamResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// 依赖注入的存储句柄；`Clone` 共享同一会话
#[derive(Clone)]
pub struct LogClient {
    store: Arc<dyn LogStore>,
}

impl LogClient {
    pub fn new(store: Arc<dyn LogStore>) -> Self {
        Self { store }
    }

    pub async fn append(
        &self,
        stream: &str,
        key: &str,
        value: Vec<u8>,
        max_len: usize,
    ) -> StreamResult<EntryId> {
        self.store.append(stream, key, value, max_len).await
    }

    pub async fn read_range(
        &self,
        stream: &str,
        start: StreamPosition,
        end: StreamPosition,
        count: usize,
        direction: Direction,
    ) -> StreamResult<Vec<StreamEntry>> {
        self.store
            .read_range(stream, start, end, count, direction)
            .await
    }

    /// 幂等的消费组创建：对每个流创建 `group`，组已存在视为良性竞争并吞掉；
    /// 其余错误（连接性失败等）原样上抛
    pub async fn ensure_group(&self, streams: &[String], group: &str) -> StreamResult<()> {
        for stream in streams {
            match self.store.create_group(stream, group).await {
                Ok(()) => {}
                Err(StreamError::GroupExists { .. }) => {
                    debug!(stream = %stream, group = %group, "Consumer group already exists");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    pub async fn read_group(
        &self,
        group: &str,
        consumer: &str,
        streams: &[String],
        count: usize,
        block: Duration,
    ) -> StreamResult<Vec<GroupBatch>> {
        self.store
            .read_group(group, consumer, streams, count, block)
            .await
    }

    pub async fn ack(&self, stream: &str, group: &str, id: EntryId) -> StreamResult<()> {
        self.store.ack(stream, group, id).await
    }
}
