//! 日志存储访问层
//!
//! - `LogStore`：外部分区日志存储的最小操作协议；
//! - `LogClient`：显式构造、依赖注入的共享句柄；
//! - `InMemoryLogStore`：带消费组语义的内存实现（测试/本地开发）。

mod client;
mod log_store;
mod memory;

pub use client::LogClient;
pub use log_store::{GroupBatch, LogStore, StreamEntry};
pub use memory::InMemoryLogStore;
