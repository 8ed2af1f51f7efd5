//! 事件流子系统统一错误定义
//!
//! 聚焦编解码、发布、存储访问与处理器失败等最小必要集合，
//! 便于在各实现层统一转换为 `StreamError`。
//!
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StreamError {
    // --- 编解码 ---
    /// 条目内容损坏或格式不可识别；调用方应按“毒条目”处理：记录并跳过
    #[error("decode error: {reason}")]
    Decode { reason: String },
    #[error("parse error: {source}")]
    Parse {
        #[from]
        source: std::num::ParseIntError,
    },
    #[error("invalid entry id: {0}")]
    InvalidEntryId(String),

    // --- 发布/存储 ---
    /// 追加被存储拒绝或不可达；不在内部重试，由调用方决定重试策略
    #[error("publish error: stream={stream}, reason={reason}")]
    Publish { stream: String, reason: String },
    #[error("log store error: {reason}")]
    Store { reason: String },
    /// 消费组已存在；并发创建竞争中的良性失败，仅允许在 `ensure_group` 中吞掉
    #[error("consumer group exists: stream={stream}, group={group}")]
    GroupExists { stream: String, group: String },

    // --- 消费/查询 ---
    #[error("event handler error: handler={handler}, reason={reason}")]
    Handler { handler: String, reason: String },
    #[error("not found: {reason}")]
    NotFound { reason: String },
}

/// 统一 Result 类型别名
pub type StreamResult<T> = Result<T, StreamError>;

impl From<serde_json::Error> for StreamError {
    fn from(err: serde_json::Error) -> Self {
        StreamError::Decode {
            reason: err.to_string(),
        }
    }
}
