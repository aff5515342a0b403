//! Prediction Context - Value Objects
//!
//! PredictionResult 只能通过 new() 构造，不提供反序列化入口

/// 识别结果
///
/// 不变量: label 非空；要么完整存在，要么不存在
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionResult {
    label: String,
    description: String,
}

impl PredictionResult {
    /// 标签为空时返回 None
    pub fn new(label: impl Into<String>, description: impl Into<String>) -> Option<Self> {
        let label = label.into();
        if label.is_empty() {
            return None;
        }
        Some(Self {
            label,
            description: description.into(),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl std::fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Prediction: {}", self.label)?;
        if !self.description.is_empty() {
            write!(f, "\n{}", self.description)?;
        }
        Ok(())
    }
}

/// 失败原因
///
/// 只区分两类：上传失败（网络、非 2xx、响应无法解析）和识别失败（空标签）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    UploadError,
    PredictionFailed,
}

impl FailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureReason::UploadError => "upload error",
            FailureReason::PredictionFailed => "prediction failed",
        }
    }

    /// 面向用户的提示文本
    pub fn notice(&self) -> &'static str {
        match self {
            FailureReason::UploadError => "Error uploading the image.",
            FailureReason::PredictionFailed => "Prediction failed. Please try again.",
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
