//! 领域事件类型目录（EventKind）
//!
//! 封闭的带标签枚举：新增事件类型必须显式添加变体，
//! `as_str`/`uuid_prefix` 为穷尽匹配，避免新类型静默漏配。
//!
use serde::{Deserialize, Serialize};

/// 领域事件类型（按来源子系统分组）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    // 通用模型生命周期
    GenericEvent,
    ModelCreated,
    ModelUpdated,
    ModelDeleted,

    // 视频流生命周期
    StreamCreated,
    StreamUpdated,
    StreamDeleted,
    FrameProducerStarted,
    FrameProducerStopped,
    FrameProducerFailed,
    FrameGrabbed,

    // 检测与特征编码
    ObjectDetected,
    ObjectsDetected,
    ObjectEncoded,
    ObjectsEncoded,

    // 跟踪与匹配
    TrackingActive,
    TrackingMerged,
    TrackingEnded,
    MatchFound,

    // 文件上传
    ImageUploaded,
    ArchiveUploaded,

    // 文档与索引
    DocumentCreated,
    DocumentIndexed,
    DocumentUpdated,
    DocumentDeleted,

    // OCR
    TextDetected,
    TextUpdated,

    // 交易
    TransactionLoaded,
    TransactionIndexed,
    ReceiptCreated,
}

impl EventKind {
    /// 线格式/过滤谓词使用的规范名称（与 serde 表示一致）
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::GenericEvent => "GENERIC_EVENT",
            EventKind::ModelCreated => "MODEL_CREATED",
            EventKind::ModelUpdated => "MODEL_UPDATED",
            EventKind::ModelDeleted => "MODEL_DELETED",
            EventKind::StreamCreated => "STREAM_CREATED",
            EventKind::StreamUpdated => "STREAM_UPDATED",
            EventKind::StreamDeleted => "STREAM_DELETED",
            EventKind::FrameProducerStarted => "FRAME_PRODUCER_STARTED",
            EventKind::FrameProducerStopped => "FRAME_PRODUCER_STOPPED",
            EventKind::FrameProducerFailed => "FRAME_PRODUCER_FAILED",
            EventKind::FrameGrabbed => "FRAME_GRABBED",
            EventKind::ObjectDetected => "OBJECT_DETECTED",
            EventKind::ObjectsDetected => "OBJECTS_DETECTED",
            EventKind::ObjectEncoded => "OBJECT_ENCODED",
            EventKind::ObjectsEncoded => "OBJECTS_ENCODED",
            EventKind::TrackingActive => "TRACKING_ACTIVE",
            EventKind::TrackingMerged => "TRACKING_MERGED",
            EventKind::TrackingEnded => "TRACKING_ENDED",
            EventKind::MatchFound => "MATCH_FOUND",
            EventKind::ImageUploaded => "IMAGE_UPLOADED",
            EventKind::ArchiveUploaded => "ARCHIVE_UPLOADED",
            EventKind::DocumentCreated => "DOCUMENT_CREATED",
            EventKind::DocumentIndexed => "DOCUMENT_INDEXED",
            EventKind::DocumentUpdated => "DOCUMENT_UPDATED",
            EventKind::DocumentDeleted => "DOCUMENT_DELETED",
            EventKind::TextDetected => "TEXT_DETECTED",
            EventKind::TextUpdated => "TEXT_UPDATED",
            EventKind::TransactionLoaded => "TRANSACTION_LOADED",
            EventKind::TransactionIndexed => "TRANSACTION_INDEXED",
            EventKind::ReceiptCreated => "RECEIPT_CREATED",
        }
    }

    /// 事件 uuid 的可读前缀标签
    pub fn uuid_prefix(&self) -> &'static str {
        match self {
            EventKind::GenericEvent => "EVENT",
            EventKind::ModelCreated | EventKind::ModelUpdated | EventKind::ModelDeleted => "MODEL",
            EventKind::StreamCreated | EventKind::StreamUpdated | EventKind::StreamDeleted => {
                "STREAM"
            }
            EventKind::FrameProducerStarted
            | EventKind::FrameProducerStopped
            | EventKind::FrameProducerFailed => "PRODUCER",
            EventKind::FrameGrabbed => "FRAME",
            EventKind::ObjectDetected | EventKind::ObjectsDetected => "DETECTION",
            EventKind::ObjectEncoded | EventKind::ObjectsEncoded => "ENCODING",
            EventKind::TrackingActive | EventKind::TrackingMerged | EventKind::TrackingEnded => {
                "TRACK"
            }
            EventKind::MatchFound => "MATCH",
            EventKind::ImageUploaded | EventKind::ArchiveUploaded => "FILE",
            EventKind::DocumentCreated
            | EventKind::DocumentIndexed
            | EventKind::DocumentUpdated
            | EventKind::DocumentDeleted => "DOCUMENT",
            EventKind::TextDetected | EventKind::TextUpdated => "OCR",
            EventKind::TransactionLoaded | EventKind::TransactionIndexed => "TRANSACTION",
            EventKind::ReceiptCreated => "RECEIPT",
        }
    }
}
