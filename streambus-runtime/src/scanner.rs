//! 过滤扫描器（Scanner）
//!
//! 在流历史上做内容过滤查询而不消费条目：以有界窗口自最新（或最旧）
//! 端推进，窗口内解码与谓词匹配经阻塞线程池并行展开、并发度以可用
//! 核数封顶；窗口汇合后取存储序最靠前（ID 最小）的命中以保证确定性，
//! 未命中则用条目 ID 的排他边界推进到下一窗口。读空或达到窗口数上限
//! 返回未找到，不视为错误。
//!
use bon::Builder;
use futures_util::{StreamExt, stream};
use serde_json::Value;
use std::collections::BTreeMap;
use std::thread;
use streambus_core::envelope::codec;
use streambus_core::filter::{self, FilterMap};
use streambus_core::{
    Direction, EntryId, EventEnvelope, LogClient, StreamEntry, StreamPosition, StreamResult,
};
use tracing::warn;

/// 扫描参数
#[derive(Builder, Clone, Copy, Debug)]
pub struct ScanOptions {
    /// 单窗口条目数
    #[builder(default = 128)]
    pub batch_size: usize,
    /// 推进方向；默认自最新端向旧端回溯
    #[builder(default)]
    pub direction: Direction,
    /// 最多推进的窗口数
    #[builder(default = 1000)]
    pub max_batches: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// 嵌套列表查询的命中结果
#[derive(Debug, Clone, PartialEq)]
pub struct ListMatch {
    /// 命中的列表元素
    pub item: Value,
    /// 所在条目的 ID
    pub entry_id: EntryId,
    /// 所在信封的关联映射
    pub correlations: BTreeMap<String, Value>,
}

/// 历史查询入口：持有注入的存储句柄
#[derive(Clone)]
pub struct Scanner {
    client: LogClient,
}

impl Scanner {
    pub fn new(client: LogClient) -> Self {
        Self { client }
    }

    /// 返回满足全部过滤条件的第一个条目（窗口内按存储序取最小 ID）；
    /// 扫尽 `max_batches` 个窗口或读空流时返回 `None`
    pub async fn find_first(
        &self,
        stream: &str,
        filters: &FilterMap,
        opts: ScanOptions,
    ) -> StreamResult<Option<(EntryId, EventEnvelope)>> {
        let mut cursor = None;
        for _ in 0..opts.max_batches {
            let Some(window) = self.next_window(stream, &mut cursor, opts).await? else {
                return Ok(None);
            };

            let decoded = decode_window(window).await;
            let hit = decoded
                .into_iter()
                .filter(|(_, env)| filter::matches(env, filters))
                .min_by_key(|(id, _)| *id);
            if hit.is_some() {
                return Ok(hit);
            }
        }
        Ok(None)
    }

    /// 在各信封载荷内名为 `list_path` 的列表中查找首个 `key == value`
    /// 的元素，返回该元素、所在条目 ID 与信封的关联映射
    pub async fn find_first_in_list(
        &self,
        stream: &str,
        list_path: &str,
        key: &str,
        value: &Value,
        opts: ScanOptions,
    ) -> StreamResult<Option<ListMatch>> {
        let mut cursor = None;
        for _ in 0..opts.max_batches {
            let Some(window) = self.next_window(stream, &mut cursor, opts).await? else {
                return Ok(None);
            };

            let decoded = decode_window(window).await;
            let hit = decoded
                .into_iter()
                .filter_map(|(id, env)| {
                    let items = filter::lookup(&env, list_path)?;
                    let item = filter::find_first_by(items.as_array()?, key, value)?.clone();
                    Some(ListMatch {
                        item,
                        entry_id: id,
                        correlations: env.correlations().clone(),
                    })
                })
                .min_by_key(|m| m.entry_id);
            if hit.is_some() {
                return Ok(hit);
            }
        }
        Ok(None)
    }

    /// 按 ID 取单个条目（不消费）；条目不存在返回 `None`
    pub async fn fetch(&self, stream: &str, id: EntryId) -> StreamResult<Option<EventEnvelope>> {
        let entries = self
            .client
            .read_range(
                stream,
                StreamPosition::At(id),
                StreamPosition::At(id),
                1,
                Direction::Forward,
            )
            .await?;
        match entries.first().and_then(StreamEntry::first_value) {
            Some(bytes) => Ok(Some(codec::decode(bytes)?)),
            None => Ok(None),
        }
    }

    /// 流中最旧的条目（不消费）
    pub async fn first(&self, stream: &str) -> StreamResult<Option<EventEnvelope>> {
        let entries = self
            .client
            .read_range(
                stream,
                StreamPosition::Oldest,
                StreamPosition::Newest,
                1,
                Direction::Forward,
            )
            .await?;
        match entries.first().and_then(StreamEntry::first_value) {
            Some(bytes) => Ok(Some(codec::decode(bytes)?)),
            None => Ok(None),
        }
    }

    /// 读取下一窗口并推进游标；读空返回 `None` 结束扫描
    async fn next_window(
        &self,
        stream: &str,
        cursor: &mut Option<EntryId>,
        opts: ScanOptions,
    ) -> StreamResult<Option<Vec<StreamEntry>>> {
        let (start, end) = match (opts.direction, *cursor) {
            (Direction::Backward, None) => (StreamPosition::Oldest, StreamPosition::Newest),
            (Direction::Backward, Some(last)) => {
                (StreamPosition::Oldest, StreamPosition::At(last.prev()))
            }
            (Direction::Forward, None) => (StreamPosition::Oldest, StreamPosition::Newest),
            (Direction::Forward, Some(last)) => {
                (StreamPosition::At(last.next()), StreamPosition::Newest)
            }
        };

        let entries = self
            .client
            .read_range(stream, start, end, opts.batch_size, opts.direction)
            .await?;
        match entries.last() {
            Some(last) => {
                *cursor = Some(last.id);
                Ok(Some(entries))
            }
            None => Ok(None),
        }
    }
}

/// 并行解码一个窗口；毒条目记录后剔除，不中断扫描
async fn decode_window(entries: Vec<StreamEntry>) -> Vec<(EntryId, EventEnvelope)> {
    let limit = parallel_jobs(entries.len());
    stream::iter(entries)
        .map(|entry| async move {
            let id = entry.id;
            let bytes = entry.first_value().map(<[u8]>::to_vec);
            let decoded = tokio::task::spawn_blocking(move || {
                bytes.as_deref().map(codec::decode).transpose()
            })
            .await;
            match decoded {
                Ok(Ok(Some(envelope))) => Some((id, envelope)),
                Ok(Ok(None)) => {
                    warn!(id = %id, "Skipping entry without fields");
                    None
                }
                Ok(Err(e)) => {
                    warn!(id = %id, error = %e, "Skipping poison entry");
                    None
                }
                Err(e) => {
                    warn!(id = %id, error = %e, "Decode task failed");
                    None
                }
            }
        })
        .buffer_unordered(limit)
        .filter_map(|hit| async move { hit })
        .collect()
        .await
}

/// 窗口内并发度：不超过窗口大小，也不超过可用核数
fn parallel_jobs(n: usize) -> usize {
    let cores = thread::available_parallelism().map(usize::from).unwrap_or(4);
    n.min(cores).max(1)
}
