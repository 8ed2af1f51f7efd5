//! 消费组运行时（StreamConsumer）
//!
//! 以命名组对一个或多个流做共享、至少一次的负载均衡消费：
//! - Init：幂等创建消费组，生成一次性的消费者身份；
//! - Poll：带毫秒级等待上限的阻塞批量读取，保持对取消信号的响应；
//! - Dispatch：逐条解码并按事件类型查表分发，毒条目与未注册类型记录后跳过；
//! - Ack：对本批全部条目确认（含无处理器与处理失败的条目），
//!   避免待确认列表无界增长；
//! - 回到 Poll，直至外部取消。仅 Poll 阶段的存储失败会终止实例，
//!   监管与重启属于外部运维关注点。
//!
use crate::handler::HandlerRegistry;
use bon::Builder;
use std::sync::Arc;
use std::time::Duration;
use streambus_core::envelope::codec;
use streambus_core::{GroupBatch, LogClient};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// 消费组配置
#[derive(Builder, Clone, Debug)]
pub struct ConsumerConfig {
    /// 组名：同组多个消费者互斥分摊条目
    #[builder(into)]
    pub group: String,
    /// 订阅的流集合；跨流之间不保证顺序
    pub streams: Vec<String>,
    /// 单次 Poll 的最大条目数
    #[builder(default = 16)]
    pub batch_size: usize,
    /// 阻塞读取的等待上限；到期返回空批次并回到 Poll
    #[builder(default = Duration::from_millis(1000))]
    pub block_timeout: Duration,
}

/// 消费组运行时：长驻循环，一个逻辑 worker 一个实例
#[derive(Builder)]
pub struct StreamConsumer {
    client: LogClient,
    registry: HandlerRegistry,
    config: ConsumerConfig,
}

impl StreamConsumer {
    /// 启动消费循环，返回可用于关闭/等待的句柄；
    /// 取消在下一次 Poll 边界生效，不会打断批内分发
    pub fn start(self: Arc<Self>) -> ConsumerHandle {
        let token = CancellationToken::new();
        let task = tokio::spawn(self.run(token.clone()));
        ConsumerHandle {
            token,
            task: Some(task),
        }
    }

    async fn run(self: Arc<Self>, token: CancellationToken) {
        let config = &self.config;
        if let Err(e) = self.client.ensure_group(&config.streams, &config.group).await {
            error!(group = %config.group, error = %e, "Consumer group setup failed");
            return;
        }
        // 消费者身份每进程新生成一份，组内互不重复
        let consumer_name = format!("{}-consumer-{}", config.group, Uuid::new_v4());

        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                polled = self.client.read_group(
                    &config.group,
                    &consumer_name,
                    &config.streams,
                    config.batch_size,
                    config.block_timeout,
                ) => {
                    match polled {
                        Ok(batches) => {
                            for batch in batches {
                                self.dispatch_batch(batch).await;
                            }
                        }
                        // 仅存储连接性失败允许终止实例
                        Err(e) => {
                            error!(group = %config.group, error = %e, "Group read failed, stopping consumer");
                            break;
                        }
                    }
                }
            }
        }
    }

    /// 按投递顺序分发一个批次；每条分发后立即确认
    async fn dispatch_batch(&self, batch: GroupBatch) {
        let group = &self.config.group;
        for entry in batch.entries {
            match entry.first_value().map(codec::decode) {
                Some(Ok(envelope)) => match self.registry.get(envelope.event_type()) {
                    Some(handler) => {
                        if let Err(err) =
                            handler.handle(&batch.stream, &envelope, entry.id).await
                        {
                            warn!(
                                handler = handler.name(),
                                stream = %batch.stream,
                                id = %entry.id,
                                error = %err,
                                "Handler failed, entry acknowledged anyway"
                            );
                        }
                    }
                    None => {
                        debug!(
                            kind = envelope.event_type().as_str(),
                            id = %entry.id,
                            "Ignoring event with no registered handler"
                        );
                    }
                },
                Some(Err(e)) => {
                    warn!(stream = %batch.stream, id = %entry.id, error = %e, "Skipping poison entry");
                }
                None => {
                    warn!(stream = %batch.stream, id = %entry.id, "Skipping entry without fields");
                }
            }

            if let Err(e) = self.client.ack(&batch.stream, group, entry.id).await {
                warn!(stream = %batch.stream, id = %entry.id, error = %e, "Ack failed");
            }
        }
    }
}

/// 运行句柄：用于优雅关闭与等待循环退出
pub struct ConsumerHandle {
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ConsumerHandle {
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    pub async fn join(mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for ConsumerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
