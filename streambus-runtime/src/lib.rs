//! 事件流应用层运行时（streambus-runtime）
//!
//! 基于 `streambus-core` 的领域构件提供三类执行面：
//! - 生产者（`producer`）：编码信封并以长度上限追加到命名流；
//! - 消费组运行时（`consumer`）：长驻的 Poll → Dispatch → Ack 循环，
//!   支持协作式取消与同组多实例水平扩展；
//! - 过滤扫描器（`scanner`）：有界窗口、批内并行、短路推进的
//!   历史内容查询，含嵌套列表元素定位。
//!
//! 处理器通过 `handler::HandlerRegistry` 在启动时一次性注册，
//! 运行期查找表不可变。
//!
pub mod consumer;
pub mod handler;
pub mod producer;
pub mod scanner;

pub use consumer::{ConsumerConfig, ConsumerHandle, StreamConsumer};
pub use handler::{EventHandler, HandledKinds, HandlerRegistry};
pub use producer::{DEFAULT_MAX_LEN, Producer};
pub use scanner::{ListMatch, ScanOptions, Scanner};
