//! 日志存储协议（LogStore）
//!
//! 定义对外部分区日志存储的最小操作面：追加（带长度上限修剪）、
//! 范围读取、消费组创建/读取与确认。本模块仅定义协议，
//! 不绑定具体传输实现，可对接任意 Redis-Streams 风格的存储或内存实现。
//!
use crate::entry_id::{Direction, EntryId, StreamPosition};
use crate::error::StreamResult;
use async_trait::async_trait;
use std::time::Duration;

/// 流中的一个条目：存储分配的 ID 加字段→字节值映射
#[derive(Debug, Clone, PartialEq)]
pub struct StreamEntry {
    pub id: EntryId,
    pub fields: Vec<(String, Vec<u8>)>,
}

impl StreamEntry {
    /// 第一个字段的值；生产者每条目只写入单个 `uuid → 信封字节` 字段
    pub fn first_value(&self) -> Option<&[u8]> {
        self.fields.first().map(|(_, v)| v.as_slice())
    }
}

/// 消费组读取返回的按流分组批次
#[derive(Debug, Clone)]
pub struct GroupBatch {
    pub stream: String,
    pub entries: Vec<StreamEntry>,
}

/// 日志存储协议
#[async_trait]
pub trait LogStore: Send + Sync {
    /// 追加一个条目，仅保留该流最新的 `max_len` 条（允许近似修剪）
    async fn append(
        &self,
        stream: &str,
        key: &str,
        value: Vec<u8>,
        max_len: usize,
    ) -> StreamResult<EntryId>;

    /// 闭区间范围读取，按 ID 升序或降序返回，至多 `count` 条
    async fn read_range(
        &self,
        stream: &str,
        start: StreamPosition,
        end: StreamPosition,
        count: usize,
        direction: Direction,
    ) -> StreamResult<Vec<StreamEntry>>;

    /// 创建消费组（流不存在时一并创建）；组已存在时返回
    /// `StreamError::GroupExists`，与连接性失败可区分
    async fn create_group(&self, stream: &str, group: &str) -> StreamResult<()>;

    /// 读取该组尚未投递的新条目，至多阻塞 `block`；
    /// 超时不是错误，返回空批次
    async fn read_group(
        &self,
        group: &str,
        consumer: &str,
        streams: &[String],
        count: usize,
        block: Duration,
    ) -> StreamResult<Vec<GroupBatch>>;

    /// 将条目标记为该组已成功处理
    async fn ack(&self, stream: &str, group: &str, id: EntryId) -> StreamResult<()>;
}
