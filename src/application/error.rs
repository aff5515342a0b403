//! 应用层错误定义

use thiserror::Error;

/// 应用层错误
///
/// 只覆盖提交前就能判断的拒绝；请求本身的失败体现在 RequestState::Failed 中
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    /// 未选择图片
    #[error("No image selected")]
    NoImageSelected,

    /// 已有请求在进行中（仅在开启 reject_while_in_flight 时出现）
    #[error("A prediction request is already in flight")]
    SubmissionInFlight,
}

impl ApplicationError {
    /// 面向用户的提示文本
    pub fn notice(&self) -> &'static str {
        match self {
            ApplicationError::NoImageSelected => "Please select an image first.",
            ApplicationError::SubmissionInFlight => "Please wait for the current prediction.",
        }
    }
}
