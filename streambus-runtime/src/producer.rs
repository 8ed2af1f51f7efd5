//! 事件生产者（Producer）
//!
//! 将信封编码后追加到命名流，并以流长度上限约束保留量（最旧先修剪）。
//! 到达存储失败以 `PublishError` 语义上抛给调用方，内部不做重试——
//! 重试策略属于调用方。
//!
use streambus_core::envelope::codec;
use streambus_core::{EntryId, EventEnvelope, LogClient, StreamError, StreamResult};
use tracing::debug;

/// 未显式指定时的流保留长度上限
pub const DEFAULT_MAX_LEN: usize = 1000;

/// 事件生产者：持有注入的存储句柄
#[derive(Clone)]
pub struct Producer {
    client: LogClient,
}

impl Producer {
    pub fn new(client: LogClient) -> Self {
        Self { client }
    }

    /// 以默认保留上限发布一个信封，返回存储分配的条目 ID
    pub async fn publish(&self, stream: &str, envelope: &EventEnvelope) -> StreamResult<EntryId> {
        self.publish_with_limit(stream, envelope, DEFAULT_MAX_LEN)
            .await
    }

    /// 发布一个信封并仅保留该流最新 `max_len` 条；
    /// 条目字段键使用信封的 `uuid`
    pub async fn publish_with_limit(
        &self,
        stream: &str,
        envelope: &EventEnvelope,
        max_len: usize,
    ) -> StreamResult<EntryId> {
        let bytes = codec::encode(envelope).map_err(|e| StreamError::Publish {
            stream: stream.to_string(),
            reason: e.to_string(),
        })?;

        let id = self
            .client
            .append(stream, envelope.uuid(), bytes, max_len)
            .await
            .map_err(|e| StreamError::Publish {
                stream: stream.to_string(),
                reason: e.to_string(),
            })?;

        debug!(stream = %stream, id = %id, uuid = %envelope.uuid(), "Published event");
        Ok(id)
    }
}
