//! Prediction Context - RequestState
//!
//! 一次识别请求的状态机：
//! Idle -> InFlight -> Succeeded | Failed
//! 任意状态再次提交都会回到 InFlight 并清掉上一次的结果

use super::{FailureReason, PredictionResult};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    /// 尚未提交
    #[default]
    Idle,
    /// 请求进行中
    InFlight,
    /// 识别成功
    Succeeded(PredictionResult),
    /// 识别失败
    Failed(FailureReason),
}

impl RequestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestState::Idle => "idle",
            RequestState::InFlight => "in_flight",
            RequestState::Succeeded(_) => "succeeded",
            RequestState::Failed(_) => "failed",
        }
    }

    /// 提交：从任意状态进入 InFlight
    pub fn submit(&mut self) {
        *self = RequestState::InFlight;
    }

    /// InFlight 的终止迁移
    pub fn resolve(outcome: Result<PredictionResult, FailureReason>) -> Self {
        match outcome {
            Ok(result) => RequestState::Succeeded(result),
            Err(reason) => RequestState::Failed(reason),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, RequestState::InFlight)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestState::Succeeded(_) | RequestState::Failed(_))
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            RequestState::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<FailureReason> {
        match self {
            RequestState::Failed(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl std::fmt::Display for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestState::Failed(reason) => write!(f, "failed ({})", reason),
            other => f.write_str(other.as_str()),
        }
    }
}
