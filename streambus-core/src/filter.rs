//! 字段等值过滤谓词
//!
//! 以“点分属性路径 → 期望值”的映射描述过滤条件：首段解析为信封属性
//! （`uuid` / `event_type` / `timestamp` / `correlations` / `payload`），
//! 其余各段逐层走入嵌套对象。任一步取不到值即判定“不匹配”，不报错。
//!
use crate::envelope::EventEnvelope;
use serde_json::Value;
use std::collections::BTreeMap;

/// 过滤条件：点分路径 → 期望标量
pub type FilterMap = BTreeMap<String, Value>;

/// 按点分路径在信封上取值；路径中断时返回 `None`
pub fn lookup(envelope: &EventEnvelope, path: &str) -> Option<Value> {
    let mut segments = path.split('.');
    let head = segments.next()?;

    let mut current: Value = match head {
        "uuid" => Value::String(envelope.uuid().to_string()),
        "event_type" => Value::String(envelope.event_type().as_str().to_string()),
        "timestamp" => serde_json::to_value(envelope.timestamp()).ok()?,
        "correlations" => Value::Object(
            envelope
                .correlations()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        "payload" => envelope.payload().clone(),
        _ => return None,
    };

    for segment in segments {
        current = current.get(segment)?.clone();
    }
    Some(current)
}

/// 信封是否满足全部键值对
pub fn matches(envelope: &EventEnvelope, filters: &FilterMap) -> bool {
    filters
        .iter()
        .all(|(path, expected)| lookup(envelope, path).as_ref() == Some(expected))
}

/// 返回列表中第一个 `key` 等于 `value` 的对象元素
pub fn find_first_by<'a>(items: &'a [Value], key: &str, value: &Value) -> Option<&'a Value> {
    items.iter().find(|item| item.get(key) == Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::EventKind;
    use serde_json::json;

    fn sample() -> EventEnvelope {
        EventEnvelope::new(
            EventKind::DocumentIndexed,
            json!({
                "document": {"id": "doc-7", "pages": 3},
                "index": {"shard": "a"},
            }),
        )
        .with_correlations(BTreeMap::from([("batch".to_string(), json!("b-1"))]))
    }

    #[test]
    fn looks_up_envelope_attributes_and_nested_payload() {
        let env = sample();
        assert_eq!(
            lookup(&env, "event_type"),
            Some(json!("DOCUMENT_INDEXED"))
        );
        assert_eq!(lookup(&env, "payload.document.id"), Some(json!("doc-7")));
        assert_eq!(lookup(&env, "correlations.batch"), Some(json!("b-1")));
    }

    #[test]
    fn missing_intermediate_step_short_circuits_to_none() {
        let env = sample();
        assert_eq!(lookup(&env, "payload.missing.id"), None);
        assert_eq!(lookup(&env, "payload.document.id.deeper"), None);
        assert_eq!(lookup(&env, "no_such_attribute"), None);
    }

    #[test]
    fn matches_requires_every_pair() {
        let env = sample();
        let hit = FilterMap::from([
            ("event_type".to_string(), json!("DOCUMENT_INDEXED")),
            ("payload.document.id".to_string(), json!("doc-7")),
        ]);
        assert!(matches(&env, &hit));

        let miss = FilterMap::from([
            ("event_type".to_string(), json!("DOCUMENT_INDEXED")),
            ("payload.document.id".to_string(), json!("doc-8")),
        ]);
        assert!(!matches(&env, &miss));
        assert!(matches(&env, &FilterMap::new()));
    }

    #[test]
    fn find_first_by_returns_first_hit_in_list_order() {
        let items = vec![
            json!({"id": "d-1", "label": "cat"}),
            json!({"id": "d-2", "label": "dog"}),
            json!({"id": "d-3", "label": "dog"}),
        ];
        let hit = find_first_by(&items, "label", &json!("dog")).unwrap();
        assert_eq!(hit["id"], json!("d-2"));
        assert!(find_first_by(&items, "label", &json!("bird")).is_none());
    }
}
