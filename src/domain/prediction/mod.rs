//! Prediction Context - 图片识别限界上下文
//!
//! 职责:
//! - 待识别图片 (ImageAsset)
//! - 识别结果与失败原因
//! - 请求状态机 (RequestState)

mod image_asset;
mod state;
mod value_objects;

pub use image_asset::{ImageAsset, ImageSource, UnknownImageSource, JPEG_CONTENT_TYPE};
pub use state::RequestState;
pub use value_objects::{FailureReason, PredictionResult};
