//! 事件信封（EventEnvelope）
//!
//! 跨服务交换的最小单元：事件元数据（uuid、创建时间、类型、关联映射）
//! 加上对核心不透明的类型化载荷。`uuid` 与 `timestamp` 仅在构造时赋值一次，
//! 此后只读；关联映射的合并采用写时复制，不在原地修改。
//!
use super::event_kind::EventKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// 事件信封：元数据 + 不透明载荷
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// 全局唯一标识，形如 `DOCUMENT-<uuid4>`，构造时生成
    uuid: String,
    /// 创建时间，构造时赋值
    timestamp: DateTime<Utc>,
    /// 事件类型（封闭目录中的一个值）
    event_type: EventKind,
    /// 关联映射：跨流追踪因果相关事件
    correlations: BTreeMap<String, Value>,
    /// 类型相关数据，对核心结构不透明
    payload: Value,
}

impl EventEnvelope {
    pub fn new(event_type: EventKind, payload: Value) -> Self {
        Self {
            uuid: format!("{}-{}", event_type.uuid_prefix(), Uuid::new_v4()),
            timestamp: Utc::now(),
            event_type,
            correlations: BTreeMap::new(),
            payload,
        }
    }

    /// 构造时附带初始关联映射
    pub fn with_correlations(mut self, correlations: BTreeMap<String, Value>) -> Self {
        self.correlations = correlations;
        self
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn event_type(&self) -> EventKind {
        self.event_type
    }

    pub fn correlations(&self) -> &BTreeMap<String, Value> {
        &self.correlations
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// 返回并入 `extra` 后的新关联映射；原信封保持不变（写时复制）。
    /// 同名键以 `extra` 为准。
    pub fn merged_correlations(&self, extra: &BTreeMap<String, Value>) -> BTreeMap<String, Value> {
        let mut merged = self.correlations.clone();
        merged.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn uuid_carries_kind_prefix() {
        let env = EventEnvelope::new(EventKind::DocumentCreated, json!({"id": 1}));
        assert!(env.uuid().starts_with("DOCUMENT-"));
    }

    #[test]
    fn uuids_are_unique_per_construction() {
        let a = EventEnvelope::new(EventKind::GenericEvent, Value::Null);
        let b = EventEnvelope::new(EventKind::GenericEvent, Value::Null);
        assert_ne!(a.uuid(), b.uuid());
    }

    #[test]
    fn merged_correlations_is_copy_on_write() {
        let env = EventEnvelope::new(EventKind::MatchFound, Value::Null).with_correlations(
            BTreeMap::from([("trace".to_string(), json!("t-1")), ("a".to_string(), json!(1))]),
        );

        let extra = BTreeMap::from([("a".to_string(), json!(2)), ("b".to_string(), json!(3))]);
        let merged = env.merged_correlations(&extra);

        assert_eq!(merged["a"], json!(2));
        assert_eq!(merged["b"], json!(3));
        assert_eq!(merged["trace"], json!("t-1"));
        // 原映射未被触碰
        assert_eq!(env.correlations()["a"], json!(1));
        assert!(!env.correlations().contains_key("b"));
    }
}
