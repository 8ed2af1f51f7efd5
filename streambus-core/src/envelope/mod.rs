//! 事件信封与类型目录
//!
//! 定义跨服务交换的 `EventEnvelope`、封闭的 `EventKind` 目录，
//! 以及信封与存储字节形态之间的编解码。

pub mod codec;
mod event_envelope;
mod event_kind;

pub use event_envelope::EventEnvelope;
pub use event_kind::EventKind;
