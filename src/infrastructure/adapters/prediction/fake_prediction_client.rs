//! Fake Prediction Client - 用于测试的识别客户端
//!
//! 按预设脚本返回结果，不实际发出网络请求，并记录调用次数

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::application::ports::{PredictionEnginePort, PredictionError};
use crate::domain::prediction::{ImageAsset, PredictionResult};

enum FakeOutcome {
    Ok(PredictionResult),
    Err(fn() -> PredictionError),
}

impl FakeOutcome {
    fn ok(label: impl Into<String>, description: impl Into<String>) -> Self {
        // 标签为空时等同于服务端返回空 prediction
        match PredictionResult::new(label, description) {
            Some(result) => FakeOutcome::Ok(result),
            None => FakeOutcome::Err(|| PredictionError::EmptyPrediction),
        }
    }
}

/// 一次调用的预设结果
struct FakeStep {
    outcome: FakeOutcome,
    delay: Duration,
}

/// Fake Prediction Client
///
/// 第 N 次调用使用第 N 个步骤，超出后重复最后一个
pub struct FakePredictionClient {
    steps: Vec<FakeStep>,
    calls: AtomicUsize,
}

impl FakePredictionClient {
    fn single(outcome: FakeOutcome) -> Self {
        Self {
            steps: vec![FakeStep {
                outcome,
                delay: Duration::ZERO,
            }],
            calls: AtomicUsize::new(0),
        }
    }

    /// 始终返回给定标签
    pub fn always_ok(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self::single(FakeOutcome::ok(label, description))
    }

    /// 始终返回错误
    pub fn always_err(error: fn() -> PredictionError) -> Self {
        Self::single(FakeOutcome::Err(error))
    }

    /// 为已有步骤设置模拟网络延迟
    pub fn with_delay(mut self, delay: Duration) -> Self {
        for step in &mut self.steps {
            step.delay = delay;
        }
        self
    }

    /// 追加下一次调用的结果
    pub fn then_ok(
        mut self,
        label: impl Into<String>,
        description: impl Into<String>,
        delay: Duration,
    ) -> Self {
        self.steps.push(FakeStep {
            outcome: FakeOutcome::ok(label, description),
            delay,
        });
        self
    }

    /// 已收到的请求数
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PredictionEnginePort for FakePredictionClient {
    async fn predict(&self, image: &ImageAsset) -> Result<PredictionResult, PredictionError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let step = &self.steps[call.min(self.steps.len() - 1)];

        tracing::debug!(
            call,
            filename = %image.filename(),
            size = image.len(),
            "FakePredictionClient: returning scripted outcome"
        );

        if !step.delay.is_zero() {
            tokio::time::sleep(step.delay).await;
        }

        match &step.outcome {
            FakeOutcome::Ok(result) => Ok(result.clone()),
            FakeOutcome::Err(make_error) => Err(make_error()),
        }
    }
}
