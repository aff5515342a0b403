//! Prediction Command Handlers
//!
//! PredictionSession 是 RequestState 的唯一持有者，所有状态变化都经由 handle()

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tracing::Instrument;
use uuid::Uuid;

use crate::application::commands::prediction_commands::SubmitPrediction;
use crate::application::error::ApplicationError;
use crate::application::ports::PredictionEnginePort;
use crate::domain::prediction::{FailureReason, ImageAsset, RequestState};

/// handle() 的 future 在得到结果前被丢弃时，把仍处于 InFlight 的状态置为上传失败
struct InFlightReset<'a> {
    state_tx: &'a watch::Sender<RequestState>,
    armed: bool,
}

impl<'a> InFlightReset<'a> {
    fn arm(state_tx: &'a watch::Sender<RequestState>) -> Self {
        Self {
            state_tx,
            armed: true,
        }
    }

    fn finish(mut self, next: RequestState) {
        self.armed = false;
        self.state_tx.send_replace(next);
    }
}

impl Drop for InFlightReset<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        tracing::warn!("Prediction submission dropped before completion");
        self.state_tx.send_if_modified(|state| {
            if !state.is_in_flight() {
                return false;
            }
            *state = RequestState::Failed(FailureReason::UploadError);
            true
        });
    }
}

/// 识别会话
///
/// 持有选中的图片和当前请求状态，展示层通过 subscribe() 观察状态变化。
/// 可以通过 Arc 共享；并发提交时以最后返回的响应为准，
/// 除非开启 reject_while_in_flight。
pub struct PredictionSession {
    engine: Arc<dyn PredictionEnginePort>,
    state_tx: watch::Sender<RequestState>,
    selected: Mutex<Option<ImageAsset>>,
    reject_while_in_flight: bool,
}

impl PredictionSession {
    pub fn new(engine: Arc<dyn PredictionEnginePort>) -> Self {
        let (state_tx, _) = watch::channel(RequestState::Idle);
        Self {
            engine,
            state_tx,
            selected: Mutex::new(None),
            reject_while_in_flight: false,
        }
    }

    /// 请求进行中时拒绝新的提交
    pub fn with_in_flight_guard(mut self, enabled: bool) -> Self {
        self.reject_while_in_flight = enabled;
        self
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅状态变化
    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.state_tx.subscribe()
    }

    /// 当前状态快照
    pub fn state(&self) -> RequestState {
        self.state_tx.borrow().clone()
    }

    pub fn selected_image(&self) -> Option<ImageAsset> {
        self.selected.lock().clone()
    }

    /// 选中新图片，同时清掉上一次的结果
    pub fn select_image(&self, image: ImageAsset) {
        tracing::debug!(
            filename = %image.filename(),
            size = image.len(),
            "Image selected"
        );
        *self.selected.lock() = Some(image);
        self.state_tx.send_replace(RequestState::Idle);
    }

    /// 丢弃选中的图片并回到 Idle
    pub fn clear(&self) {
        *self.selected.lock() = None;
        self.state_tx.send_replace(RequestState::Idle);
    }

    /// 提交一次识别
    ///
    /// 返回本次提交产生的终止状态。没有图片时直接拒绝，不发请求也不改变状态。
    pub async fn handle(&self, cmd: SubmitPrediction) -> Result<RequestState, ApplicationError> {
        let image = match cmd.image {
            Some(image) => image,
            None => self
                .selected_image()
                .ok_or(ApplicationError::NoImageSelected)?,
        };

        let guard = self.reject_while_in_flight;
        let mut rejected = false;
        self.state_tx.send_if_modified(|state| {
            if guard && state.is_in_flight() {
                rejected = true;
                return false;
            }
            state.submit();
            true
        });
        if rejected {
            tracing::warn!("Submission rejected: request already in flight");
            return Err(ApplicationError::SubmissionInFlight);
        }
        let reset = InFlightReset::arm(&self.state_tx);

        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("prediction", %request_id);

        let next = async {
            tracing::info!(
                filename = %image.filename(),
                size = image.len(),
                "Submitting image for prediction"
            );

            let started = Instant::now();
            let outcome = self.engine.predict(&image).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            let next = RequestState::resolve(outcome.map_err(|e| {
                tracing::warn!(error = %e, elapsed_ms, "Prediction request failed");
                e.failure_reason()
            }));

            if let Some(result) = next.result() {
                tracing::info!(label = %result.label(), elapsed_ms, "Prediction succeeded");
            }

            next
        }
        .instrument(span)
        .await;

        reset.finish(next.clone());
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::PredictionError;
    use crate::domain::prediction::{ImageSource, PredictionResult};
    use std::time::Duration;
    use crate::infrastructure::adapters::FakePredictionClient;

    fn asset() -> ImageAsset {
        ImageAsset::from_source(vec![0xFF, 0xD8, 0xFF], ImageSource::Library)
    }

    #[tokio::test]
    async fn test_no_image_short_circuits() {
        let engine = Arc::new(FakePredictionClient::always_ok("Sigiriya", "Rock fortress"));
        let session = PredictionSession::new(engine.clone());

        let err = session.handle(SubmitPrediction::selected()).await.unwrap_err();
        assert_eq!(err, ApplicationError::NoImageSelected);
        assert_eq!(engine.call_count(), 0);
        assert_eq!(session.state(), RequestState::Idle);
    }

    #[tokio::test]
    async fn test_submit_selected_image() {
        let engine = Arc::new(FakePredictionClient::always_ok("Sigiriya", "Rock fortress"));
        let session = PredictionSession::new(engine.clone());
        session.select_image(asset());

        let state = session.handle(SubmitPrediction::selected()).await.unwrap();
        let expected = PredictionResult::new("Sigiriya", "Rock fortress").unwrap();
        assert_eq!(state, RequestState::Succeeded(expected));
        assert_eq!(session.state(), state);
        assert_eq!(engine.call_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_prediction_fails() {
        let engine = Arc::new(FakePredictionClient::always_err(|| {
            PredictionError::EmptyPrediction
        }));
        let session = PredictionSession::new(engine);

        let state = session
            .handle(SubmitPrediction::with_image(asset()))
            .await
            .unwrap();
        assert_eq!(state, RequestState::Failed(FailureReason::PredictionFailed));
    }

    #[tokio::test]
    async fn test_select_image_resets_result() {
        let engine = Arc::new(FakePredictionClient::always_ok("Yahangala", ""));
        let session = PredictionSession::new(engine);
        session.select_image(asset());
        session.handle(SubmitPrediction::selected()).await.unwrap();
        assert!(session.state().is_terminal());

        session.select_image(asset());
        assert_eq!(session.state(), RequestState::Idle);

        session.clear();
        assert!(session.selected_image().is_none());
        let err = session.handle(SubmitPrediction::selected()).await.unwrap_err();
        assert_eq!(err, ApplicationError::NoImageSelected);
    }

    #[tokio::test]
    async fn test_observer_sees_terminal_state() {
        let engine = Arc::new(FakePredictionClient::always_ok("Mihinthale", "Historic site"));
        let session = PredictionSession::new(engine);
        let mut rx = session.subscribe();
        assert_eq!(*rx.borrow_and_update(), RequestState::Idle);

        session
            .handle(SubmitPrediction::with_image(asset()))
            .await
            .unwrap();

        assert!(rx.has_changed().unwrap());
        let observed = rx.borrow_and_update().clone();
        assert_eq!(observed.result().map(|r| r.label()), Some("Mihinthale"));
    }

    #[tokio::test]
    async fn test_in_flight_guard_rejects_second_submit() {
        let engine = Arc::new(
            FakePredictionClient::always_ok("Lakegala mountain", "")
                .with_delay(Duration::from_millis(200)),
        );
        let session = PredictionSession::new(engine.clone())
            .with_in_flight_guard(true)
            .arc();

        let first = {
            let session = session.clone();
            tokio::spawn(async move { session.handle(SubmitPrediction::with_image(asset())).await })
        };
        let mut rx = session.subscribe();
        rx.wait_for(|s| s.is_in_flight()).await.unwrap();

        let second = session.handle(SubmitPrediction::with_image(asset())).await;
        assert_eq!(second.unwrap_err(), ApplicationError::SubmissionInFlight);

        let first = first.await.unwrap().unwrap();
        assert!(first.result().is_some());
        assert_eq!(engine.call_count(), 1);
    }

    #[tokio::test]
    async fn test_overlapping_submits_last_response_wins() {
        // 第一次提交较慢，第二次较快：最终状态取决于最后返回的响应
        let engine = Arc::new(
            FakePredictionClient::always_ok("Sigiriya", "Rock fortress")
                .with_delay(Duration::from_millis(200))
                .then_ok("Ella Rock", "Hiking destination", Duration::from_millis(20)),
        );
        let session = PredictionSession::new(engine.clone()).arc();

        let slow = {
            let session = session.clone();
            tokio::spawn(async move { session.handle(SubmitPrediction::with_image(asset())).await })
        };
        let mut rx = session.subscribe();
        rx.wait_for(|s| s.is_in_flight()).await.unwrap();

        let fast = session
            .handle(SubmitPrediction::with_image(asset()))
            .await
            .unwrap();
        let ella = PredictionResult::new("Ella Rock", "Hiking destination").unwrap();
        assert_eq!(fast, RequestState::Succeeded(ella));
        assert_eq!(session.state(), fast);

        let slow = slow.await.unwrap().unwrap();
        let sigiriya = PredictionResult::new("Sigiriya", "Rock fortress").unwrap();
        assert_eq!(slow, RequestState::Succeeded(sigiriya));
        assert_eq!(session.state(), slow);
        assert_eq!(engine.call_count(), 2);
    }

    #[tokio::test]
    async fn test_dropped_submit_leaves_session_ready() {
        let engine = Arc::new(
            FakePredictionClient::always_ok("Saptha kanya", "")
                .with_delay(Duration::from_millis(300))
                .then_ok("Saptha kanya", "", Duration::ZERO),
        );
        let session = PredictionSession::new(engine.clone()).with_in_flight_guard(true);

        let timed_out = tokio::time::timeout(
            Duration::from_millis(20),
            session.handle(SubmitPrediction::with_image(asset())),
        )
        .await;
        assert!(timed_out.is_err());
        assert_eq!(session.state(), RequestState::Failed(FailureReason::UploadError));

        let retry = session
            .handle(SubmitPrediction::with_image(asset()))
            .await
            .unwrap();
        assert_eq!(retry.result().map(|r| r.label()), Some("Saptha kanya"));
        assert_eq!(engine.call_count(), 2);
    }
}
