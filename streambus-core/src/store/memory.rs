//! 内存版日志存储（InMemoryLogStore）
//!
//! 满足 `LogStore` 协议的轻量实现，具备真实的消费组语义：
//! - 单调递增的条目 ID 分配与最旧优先修剪；
//! - 组游标自创建时的流尾开始（仅投递创建后的新条目）；
//! - 同组多消费者互斥投递（同一条目只投递给一个成员）；
//! - 每成员待确认列表与 `ack` 移除；
//! - 基于 `tokio::sync::Notify` 的阻塞读取，超时返回空批次。
//!
//! 典型用途：测试环境、示例与本地开发。
//!
use super::log_store::{GroupBatch, LogStore, StreamEntry};
use crate::entry_id::{Direction, EntryId, StreamPosition};
use crate::error::{StreamError, StreamResult};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, trace};

#[derive(Default)]
struct GroupState {
    /// 最后投递的 ID；只投递严格大于该游标的条目
    cursor: EntryId,
    /// 已投递未确认：条目 ID → 消费者名
    pending: HashMap<EntryId, String>,
}

#[derive(Default)]
struct StreamState {
    entries: VecDeque<StreamEntry>,
    last_id: EntryId,
    groups: HashMap<String, GroupState>,
}

/// 进程内日志存储
#[derive(Default)]
pub struct InMemoryLogStore {
    inner: Mutex<HashMap<String, StreamState>>,
    notify: Notify,
}

impl InMemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, StreamState>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn resolve(position: StreamPosition, last_id: EntryId) -> EntryId {
        match position {
            StreamPosition::Oldest => EntryId::ZERO,
            StreamPosition::Newest => last_id,
            StreamPosition::At(id) => id,
        }
    }

    /// 尝试收集各流中游标之后的新条目；没有可投递内容时返回 `None`
    fn try_read_group(
        &self,
        group: &str,
        consumer: &str,
        streams: &[String],
        count: usize,
    ) -> StreamResult<Option<Vec<GroupBatch>>> {
        let mut guard = self.lock();
        let mut batches = Vec::new();
        let mut remaining = count;

        for stream in streams {
            if remaining == 0 {
                break;
            }
            let state = guard
                .get_mut(stream)
                .ok_or_else(|| StreamError::Store {
                    reason: format!("no such stream: {stream}"),
                })?;
            let group_state =
                state
                    .groups
                    .get_mut(group)
                    .ok_or_else(|| StreamError::Store {
                        reason: format!("no such group: {group} on stream {stream}"),
                    })?;

            let fresh: Vec<StreamEntry> = state
                .entries
                .iter()
                .filter(|e| e.id > group_state.cursor)
                .take(remaining)
                .cloned()
                .collect();
            if fresh.is_empty() {
                continue;
            }

            for entry in &fresh {
                group_state.pending.insert(entry.id, consumer.to_string());
            }
            group_state.cursor = fresh.last().map(|e| e.id).unwrap_or(group_state.cursor);
            remaining -= fresh.len();
            batches.push(GroupBatch {
                stream: stream.clone(),
                entries: fresh,
            });
        }

        if batches.is_empty() {
            Ok(None)
        } else {
            Ok(Some(batches))
        }
    }
}

#[async_trait]
impl LogStore for InMemoryLogStore {
    async fn append(
        &self,
        stream: &str,
        key: &str,
        value: Vec<u8>,
        max_len: usize,
    ) -> StreamResult<EntryId> {
        let id = {
            let mut guard = self.lock();
            let state = guard.entry(stream.to_string()).or_default();

            let now_ms = Utc::now().timestamp_millis().max(0) as u64;
            // 墙钟回拨或同毫秒追加时退化为序号递增，保证严格单调
            let id = if now_ms > state.last_id.ms() {
                EntryId::new(now_ms, 0)
            } else {
                state.last_id.next()
            };
            state.last_id = id;
            state.entries.push_back(StreamEntry {
                id,
                fields: vec![(key.to_string(), value)],
            });

            while state.entries.len() > max_len {
                state.entries.pop_front();
            }
            id
        };
        trace!(stream = %stream, id = %id, "Appended entry");
        self.notify.notify_waiters();
        Ok(id)
    }

    async fn read_range(
        &self,
        stream: &str,
        start: StreamPosition,
        end: StreamPosition,
        count: usize,
        direction: Direction,
    ) -> StreamResult<Vec<StreamEntry>> {
        let guard = self.lock();
        let Some(state) = guard.get(stream) else {
            return Ok(Vec::new());
        };
        let start = Self::resolve(start, state.last_id);
        let end = Self::resolve(end, state.last_id);

        let in_range = |e: &&StreamEntry| e.id >= start && e.id <= end;
        let entries = match direction {
            Direction::Forward => state
                .entries
                .iter()
                .filter(in_range)
                .take(count)
                .cloned()
                .collect(),
            Direction::Backward => state
                .entries
                .iter()
                .rev()
                .filter(in_range)
                .take(count)
                .cloned()
                .collect(),
        };
        Ok(entries)
    }

    async fn create_group(&self, stream: &str, group: &str) -> StreamResult<()> {
        let mut guard = self.lock();
        // mkstream 语义：流不存在时一并创建空流
        let state = guard.entry(stream.to_string()).or_default();
        if state.groups.contains_key(group) {
            return Err(StreamError::GroupExists {
                stream: stream.to_string(),
                group: group.to_string(),
            });
        }
        // 游标从当前流尾开始：只投递创建之后追加的条目
        state.groups.insert(
            group.to_string(),
            GroupState {
                cursor: state.last_id,
                pending: HashMap::new(),
            },
        );
        debug!(stream = %stream, group = %group, "Created consumer group");
        Ok(())
    }

    async fn read_group(
        &self,
        group: &str,
        consumer: &str,
        streams: &[String],
        count: usize,
        block: Duration,
    ) -> StreamResult<Vec<GroupBatch>> {
        let deadline = tokio::time::Instant::now() + block;
        loop {
            // 在检查前注册唤醒兴趣，避免检查与等待之间的追加丢失唤醒
            let notified = self.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if let Some(batches) = self.try_read_group(group, consumer, streams, count)? {
                return Ok(batches);
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Ok(Vec::new());
            }
        }
    }

    async fn ack(&self, stream: &str, group: &str, id: EntryId) -> StreamResult<()> {
        let mut guard = self.lock();
        if let Some(state) = guard.get_mut(stream) {
            if let Some(group_state) = state.groups.get_mut(group) {
                group_state.pending.remove(&id);
            }
        }
        Ok(())
    }
}

impl InMemoryLogStore {
    /// 该组在所有流上尚未确认的条目数（测试与诊断用）
    pub fn pending_count(&self, stream: &str, group: &str) -> usize {
        let guard = self.lock();
        guard
            .get(stream)
            .and_then(|s| s.groups.get(group))
            .map(|g| g.pending.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_values(entries: &[StreamEntry]) -> Vec<Vec<u8>> {
        entries
            .iter()
            .map(|e| e.first_value().unwrap().to_vec())
            .collect()
    }

    async fn append_n(store: &InMemoryLogStore, stream: &str, n: usize, max_len: usize) {
        for i in 0..n {
            store
                .append(stream, &format!("k{i}"), vec![i as u8], max_len)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn append_assigns_strictly_increasing_ids() {
        let store = InMemoryLogStore::new();
        let mut last = EntryId::ZERO;
        for i in 0..100u8 {
            let id = store.append("s", "k", vec![i], 1000).await.unwrap();
            assert!(id > last);
            last = id;
        }
    }

    #[tokio::test]
    async fn trimming_bounds_stream_length() {
        let store = InMemoryLogStore::new();
        append_n(&store, "s", 10, 4).await;

        let entries = store
            .read_range(
                "s",
                StreamPosition::Oldest,
                StreamPosition::Newest,
                100,
                Direction::Forward,
            )
            .await
            .unwrap();
        // 仅保留最新 4 条，最旧的先被丢弃
        assert_eq!(entry_values(&entries), vec![vec![6], vec![7], vec![8], vec![9]]);
    }

    #[tokio::test]
    async fn range_reads_honor_direction_and_count() {
        let store = InMemoryLogStore::new();
        append_n(&store, "s", 5, 1000).await;

        let forward = store
            .read_range(
                "s",
                StreamPosition::Oldest,
                StreamPosition::Newest,
                3,
                Direction::Forward,
            )
            .await
            .unwrap();
        assert_eq!(entry_values(&forward), vec![vec![0], vec![1], vec![2]]);

        let backward = store
            .read_range(
                "s",
                StreamPosition::Oldest,
                StreamPosition::Newest,
                3,
                Direction::Backward,
            )
            .await
            .unwrap();
        assert_eq!(entry_values(&backward), vec![vec![4], vec![3], vec![2]]);

        let missing = store
            .read_range(
                "none",
                StreamPosition::Oldest,
                StreamPosition::Newest,
                3,
                Direction::Forward,
            )
            .await
            .unwrap();
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn duplicate_group_creation_is_distinguishable() {
        let store = InMemoryLogStore::new();
        store.create_group("s", "g").await.unwrap();
        let err = store.create_group("s", "g").await.unwrap_err();
        assert!(matches!(err, StreamError::GroupExists { .. }));
    }

    #[tokio::test]
    async fn group_only_sees_entries_after_creation() {
        let store = InMemoryLogStore::new();
        append_n(&store, "s", 3, 1000).await;
        store.create_group("s", "g").await.unwrap();
        append_n(&store, "s", 2, 1000).await;

        let batches = store
            .read_group("g", "c1", &["s".to_string()], 10, Duration::from_millis(10))
            .await
            .unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].entries.len(), 2);
    }

    #[tokio::test]
    async fn consumers_of_one_group_receive_disjoint_entries() {
        let store = InMemoryLogStore::new();
        store.create_group("s", "g").await.unwrap();
        append_n(&store, "s", 6, 1000).await;

        let a = store
            .read_group("g", "c-a", &["s".to_string()], 3, Duration::from_millis(10))
            .await
            .unwrap();
        let b = store
            .read_group("g", "c-b", &["s".to_string()], 10, Duration::from_millis(10))
            .await
            .unwrap();

        let ids_a: Vec<EntryId> = a[0].entries.iter().map(|e| e.id).collect();
        let ids_b: Vec<EntryId> = b[0].entries.iter().map(|e| e.id).collect();
        assert_eq!(ids_a.len(), 3);
        assert_eq!(ids_b.len(), 3);
        assert!(ids_a.iter().all(|id| !ids_b.contains(id)));

        // 全部确认后 pending 清零
        for id in ids_a.iter().chain(ids_b.iter()) {
            store.ack("s", "g", *id).await.unwrap();
        }
        assert_eq!(store.pending_count("s", "g"), 0);
    }

    #[tokio::test]
    async fn blocking_read_times_out_with_empty_batch() {
        let store = InMemoryLogStore::new();
        store.create_group("s", "g").await.unwrap();

        let started = std::time::Instant::now();
        let batches = store
            .read_group("g", "c", &["s".to_string()], 10, Duration::from_millis(50))
            .await
            .unwrap();
        assert!(batches.is_empty());
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn blocking_read_wakes_on_append() {
        let store = std::sync::Arc::new(InMemoryLogStore::new());
        store.create_group("s", "g").await.unwrap();

        let reader = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .read_group("g", "c", &["s".to_string()], 10, Duration::from_secs(5))
                    .await
                    .unwrap()
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        store.append("s", "k", vec![1], 1000).await.unwrap();

        let batches = tokio::time::timeout(Duration::from_secs(2), reader)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(batches[0].entries.len(), 1);
    }

    #[tokio::test]
    async fn read_group_without_group_is_a_store_error() {
        let store = InMemoryLogStore::new();
        let err = store
            .read_group("g", "c", &["s".to_string()], 10, Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, StreamError::Store { .. }));
    }
}
