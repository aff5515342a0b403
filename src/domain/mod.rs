//! Domain Layer - 领域层
//!
//! 只有一个限界上下文:
//! - Prediction Context: 图片、识别结果与请求状态

pub mod prediction;

pub use prediction::{FailureReason, ImageAsset, ImageSource, PredictionResult, RequestState};
