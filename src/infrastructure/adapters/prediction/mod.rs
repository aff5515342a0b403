//! Prediction Adapter - HTTP 识别客户端实现

mod fake_prediction_client;
mod http_prediction_client;

pub use fake_prediction_client::FakePredictionClient;
pub use http_prediction_client::*;
