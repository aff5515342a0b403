//! Prediction Commands - 识别相关命令

use crate::domain::prediction::ImageAsset;

/// 提交识别命令
///
/// `image` 为 None 时使用会话中当前选中的图片
#[derive(Debug, Clone, Default)]
pub struct SubmitPrediction {
    pub image: Option<ImageAsset>,
}

impl SubmitPrediction {
    /// 提交当前选中的图片
    pub fn selected() -> Self {
        Self { image: None }
    }

    /// 提交指定图片（不改变会话中的选中图片）
    pub fn with_image(image: ImageAsset) -> Self {
        Self { image: Some(image) }
    }
}
