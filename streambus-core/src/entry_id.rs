//! 日志条目标识（EntryId）与范围定位
//!
//! 存储层为每个条目分配 `"<毫秒时间戳>-<序号>"` 形式的复合 ID，
//! 同一流内严格递增。本模块提供：
//! - `EntryId`：解析/格式化与全序比较；
//! - `next`/`prev`：用于分页扫描的排他边界推进；
//! - `StreamPosition`：`-`（最旧）/ `+`（最新）哨兵与具体位置；
//! - `Direction`：范围读取方向。
//!
use crate::error::{StreamError, StreamResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 复合条目 ID：毫秒时间戳 + 同毫秒内序号
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryId {
    ms: u64,
    seq: u64,
}

impl EntryId {
    pub const ZERO: EntryId = EntryId { ms: 0, seq: 0 };

    pub fn new(ms: u64, seq: u64) -> Self {
        Self { ms, seq }
    }

    pub fn ms(&self) -> u64 {
        self.ms
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// 升序方向的下一个 ID：同一时间戳，序号 +1
    pub fn next(&self) -> EntryId {
        EntryId {
            ms: self.ms,
            seq: self.seq + 1,
        }
    }

    /// 降序方向的上一个 ID：序号 −1；序号已为 0 时回退到 `(ms−1, 0)`。
    ///
    /// 不尝试恢复上一毫秒内真实的最大序号——存储按“严格小于”处理该边界，
    /// 扫描最多跳过存储本就会排除的条目（接受的不精确性）。
    pub fn prev(&self) -> EntryId {
        if self.seq != 0 {
            EntryId {
                ms: self.ms,
                seq: self.seq - 1,
            }
        } else {
            EntryId {
                ms: self.ms.saturating_sub(1),
                seq: 0,
            }
        }
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.ms, self.seq)
    }
}

impl FromStr for EntryId {
    type Err = StreamError;

    fn from_str(s: &str) -> StreamResult<Self> {
        let (ms, seq) = s
            .split_once('-')
            .ok_or_else(|| StreamError::InvalidEntryId(s.to_string()))?;
        Ok(EntryId {
            ms: ms.parse()?,
            seq: seq.parse()?,
        })
    }
}

/// 范围读取中的位置：具体 ID 或“最旧/最新”哨兵（线上协议中的 `-` / `+`）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPosition {
    Oldest,
    Newest,
    At(EntryId),
}

impl fmt::Display for StreamPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamPosition::Oldest => write!(f, "-"),
            StreamPosition::Newest => write!(f, "+"),
            StreamPosition::At(id) => write!(f, "{id}"),
        }
    }
}

/// 范围读取方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Forward,
    #[default]
    Backward,
}
