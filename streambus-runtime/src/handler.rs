//! 事件处理器（EventHandler）与注册表
//!
//! 定义消费某类/多类事件的处理逻辑与元信息（名称、订阅类型），
//! 以及启动时一次性构建的不可变“事件类型 → 处理器”查找表。
//! 未注册的类型由运行时记录并跳过，属于刻意行为而非缺失方法。
//!
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use streambus_core::{EntryId, EventEnvelope, EventKind, StreamError, StreamResult};

/// 处理器订阅的事件类型集合
#[derive(Clone, Debug)]
pub enum HandledKinds {
    One(EventKind),
    Many(Vec<EventKind>),
}

impl HandledKinds {
    fn kinds(&self) -> Vec<EventKind> {
        match self {
            HandledKinds::One(kind) => vec![*kind],
            HandledKinds::Many(kinds) => kinds.clone(),
        }
    }
}

/// 事件处理器：处理某一（些）类型的事件
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// 处理器名称（用于失败日志与审计）
    fn name(&self) -> &str;

    /// 返回该处理器订阅的事件类型
    fn handled_kinds(&self) -> HandledKinds;

    /// 处理一个已解码的信封；`entry_id` 为其在流中的位置
    async fn handle(
        &self,
        stream: &str,
        envelope: &EventEnvelope,
        entry_id: EntryId,
    ) -> anyhow::Result<()>;
}

/// 启动时构建一次的不可变注册表
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    by_kind: HashMap<EventKind, Arc<dyn EventHandler>>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("kinds", &self.by_kind.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HandlerRegistry {
    /// 由处理器列表构建查找表；同一事件类型注册两个处理器是构造错误，
    /// 不做静默覆盖
    pub fn new(handlers: Vec<Arc<dyn EventHandler>>) -> StreamResult<Self> {
        let mut by_kind: HashMap<EventKind, Arc<dyn EventHandler>> = HashMap::new();
        for handler in handlers {
            for kind in handler.handled_kinds().kinds() {
                if let Some(existing) = by_kind.get(&kind) {
                    return Err(StreamError::Handler {
                        handler: handler.name().to_string(),
                        reason: format!(
                            "kind {} already registered by {}",
                            kind.as_str(),
                            existing.name()
                        ),
                    });
                }
                by_kind.insert(kind, handler.clone());
            }
        }
        Ok(Self { by_kind })
    }

    pub fn get(&self, kind: EventKind) -> Option<&Arc<dyn EventHandler>> {
        self.by_kind.get(&kind)
    }

    pub fn len(&self) -> usize {
        self.by_kind.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nop(&'static str, HandledKinds);

    #[async_trait]
    impl EventHandler for Nop {
        fn name(&self) -> &str {
            self.0
        }
        fn handled_kinds(&self) -> HandledKinds {
            self.1.clone()
        }
        async fn handle(
            &self,
            _stream: &str,
            _envelope: &EventEnvelope,
            _entry_id: EntryId,
        ) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn registry_maps_each_declared_kind() {
        let registry = HandlerRegistry::new(vec![
            Arc::new(Nop("docs", HandledKinds::Many(vec![
                EventKind::DocumentCreated,
                EventKind::DocumentDeleted,
            ]))),
            Arc::new(Nop("ocr", HandledKinds::One(EventKind::TextDetected))),
        ])
        .unwrap();

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.get(EventKind::DocumentCreated).unwrap().name(), "docs");
        assert_eq!(registry.get(EventKind::TextDetected).unwrap().name(), "ocr");
        assert!(registry.get(EventKind::MatchFound).is_none());
    }

    #[test]
    fn duplicate_kind_registration_is_an_error() {
        let err = HandlerRegistry::new(vec![
            Arc::new(Nop("a", HandledKinds::One(EventKind::MatchFound))),
            Arc::new(Nop("b", HandledKinds::One(EventKind::MatchFound))),
        ])
        .unwrap_err();
        assert!(matches!(err, StreamError::Handler { .. }));
    }
}
