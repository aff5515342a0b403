//! Prediction Engine Port - 远程识别服务抽象
//!
//! 定义图片识别的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::prediction::{FailureReason, ImageAsset, PredictionResult};

/// 识别错误
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Server rejected request: HTTP {status}: {body}")]
    ServerRejection { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Empty prediction")]
    EmptyPrediction,
}

impl PredictionError {
    /// 映射到对外暴露的失败原因
    ///
    /// 只有空标签算作识别失败，其余都归为上传失败
    pub fn failure_reason(&self) -> FailureReason {
        match self {
            PredictionError::EmptyPrediction => FailureReason::PredictionFailed,
            PredictionError::InvalidEndpoint(_)
            | PredictionError::Transport(_)
            | PredictionError::Timeout
            | PredictionError::ServerRejection { .. }
            | PredictionError::MalformedResponse(_) => FailureReason::UploadError,
        }
    }
}

/// Prediction Engine Port
///
/// 外部识别服务的抽象接口，每次调用恰好发出一个请求，不做重试
#[async_trait]
pub trait PredictionEnginePort: Send + Sync {
    /// 上传图片并返回识别结果
    async fn predict(&self, image: &ImageAsset) -> Result<PredictionResult, PredictionError>;
}
