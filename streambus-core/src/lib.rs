//! 事件流域层基础库（streambus-core）
//!
//! 在分区追加日志之上构建类型化事件总线所需的领域构件：
//! - 事件信封与封闭类型目录（`envelope`）及其字节编解码
//! - 复合条目 ID 的解析与区间推进（`entry_id`）
//! - 点分路径字段等值谓词（`filter`）
//! - 日志存储协议、注入式客户端与内存实现（`store`）
//!
//! 本 crate 不绑定具体存储传输：`LogStore` 仅约定追加、范围读取、
//! 消费组与确认等原语，由基础设施层（或内置内存实现）提供适配。
//! 生产者、消费组运行时与过滤扫描器见应用层 crate `streambus-runtime`。
//!
pub mod entry_id;
pub mod envelope;
pub mod error;
pub mod filter;
pub mod store;

pub use entry_id::{Direction, EntryId, StreamPosition};
pub use envelope::{EventEnvelope, EventKind};
pub use error::{StreamError, StreamResult};
pub use store::{GroupBatch, InMemoryLogStore, LogClient, LogStore, StreamEntry};
