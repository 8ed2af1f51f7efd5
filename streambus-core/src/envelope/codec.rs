//! 信封编解码（Codec）
//!
//! `encode`/`decode` 互为精确逆运算：产出的字节块自包含，
//! 不依赖外部上下文即可重建信封。解码失败视为“毒条目”，
//! 由调用方（消费循环、扫描器）记录并跳过，而非中断。
//!
use super::event_envelope::EventEnvelope;
use crate::error::{StreamError, StreamResult};

/// 将信封序列化为自包含字节块
pub fn encode(envelope: &EventEnvelope) -> StreamResult<Vec<u8>> {
    serde_json::to_vec(envelope).map_err(|e| StreamError::Decode {
        reason: e.to_string(),
    })
}

/// 从字节块重建信封；输入损坏时返回 `StreamError::Decode`
pub fn decode(bytes: &[u8]) -> StreamResult<EventEnvelope> {
    serde_json::from_slice(bytes).map_err(|e| StreamError::Decode {
        reason: e.to_string(),
    })
}
