//! HTTP Prediction Client - 调用外部识别 HTTP 服务
//!
//! 实现 PredictionEnginePort trait，通过 HTTP 上传图片
//!
//! 外部识别 API:
//! POST http://localhost:5000/predict
//! Request: multipart/form-data, 字段 `image` (filename + image/jpeg)
//! Response: {"prediction": "...", "description": "..."}  (JSON)

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Url};
use serde::Deserialize;
use std::time::Duration;

use crate::application::ports::{PredictionEnginePort, PredictionError};
use crate::domain::prediction::{ImageAsset, PredictionResult, JPEG_CONTENT_TYPE};

/// multipart 中图片字段的名称
pub const IMAGE_FIELD: &str = "image";

/// 日志中错误响应体的最大长度
const MAX_LOGGED_BODY: usize = 200;

/// 识别响应体 (JSON)
///
/// 未知字段（如服务端出错时的 `error`）忽略
#[derive(Debug, Deserialize)]
struct PredictHttpResponse {
    #[serde(default)]
    prediction: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// HTTP 识别客户端配置
#[derive(Debug, Clone)]
pub struct HttpPredictionClientConfig {
    /// 识别服务完整 URL
    pub endpoint: String,
    /// 请求超时时间（秒），None 表示不设客户端超时
    pub timeout_secs: Option<u64>,
}

impl Default for HttpPredictionClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000/predict".to_string(),
            timeout_secs: None,
        }
    }
}

impl HttpPredictionClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }
}

/// HTTP 识别客户端
///
/// 每次 predict 发出一个 POST，不重试
pub struct HttpPredictionClient {
    client: Client,
    endpoint: Url,
}

impl HttpPredictionClient {
    /// 创建新的 HTTP 识别客户端
    pub fn new(config: HttpPredictionClientConfig) -> Result<Self, PredictionError> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            PredictionError::InvalidEndpoint(format!("'{}': {}", config.endpoint, e))
        })?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| PredictionError::Transport(e.to_string()))?;

        Ok(Self { client, endpoint })
    }

    /// 构造只含 `image` 一个字段的表单
    ///
    /// 服务端只接受 JPEG，无论资源自身的 MIME 类型是什么都按 `image/jpeg` 发送
    fn build_form(image: &ImageAsset) -> Result<Form, PredictionError> {
        let part = Part::stream_with_length(Body::from(image.bytes().clone()), image.len() as u64)
            .file_name(image.filename().to_string())
            .mime_str(JPEG_CONTENT_TYPE)
            .map_err(|e| PredictionError::Transport(format!("Invalid content type: {}", e)))?;

        Ok(Form::new().part(IMAGE_FIELD, part))
    }
}

/// 解析 2xx 响应体
fn parse_prediction(body: &[u8]) -> Result<PredictionResult, PredictionError> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| PredictionError::MalformedResponse(format!("Invalid JSON: {}", e)))?;

    if !value.is_object() {
        return Err(PredictionError::MalformedResponse(
            "Expected a JSON object".to_string(),
        ));
    }

    let parsed: PredictHttpResponse = serde_json::from_value(value)
        .map_err(|e| PredictionError::MalformedResponse(e.to_string()))?;

    PredictionResult::new(
        parsed.prediction.unwrap_or_default(),
        parsed.description.unwrap_or_default(),
    )
    .ok_or(PredictionError::EmptyPrediction)
}

fn truncate(text: &str) -> &str {
    match text.char_indices().nth(MAX_LOGGED_BODY) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[async_trait]
impl PredictionEnginePort for HttpPredictionClient {
    async fn predict(&self, image: &ImageAsset) -> Result<PredictionResult, PredictionError> {
        let form = Self::build_form(image)?;

        if image.is_empty() {
            tracing::warn!(filename = %image.filename(), "Submitting an empty image");
        }

        tracing::debug!(
            url = %self.endpoint,
            filename = %image.filename(),
            size = image.len(),
            "Sending prediction request"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PredictionError::Timeout
                } else if e.is_connect() {
                    PredictionError::Transport(format!(
                        "Cannot connect to prediction service: {}",
                        e
                    ))
                } else {
                    PredictionError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                PredictionError::Timeout
            } else {
                PredictionError::Transport(format!("Failed to read response: {}", e))
            }
        })?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            tracing::warn!(
                status = status.as_u16(),
                body = %truncate(&text),
                "Prediction service rejected request"
            );
            return Err(PredictionError::ServerRejection {
                status: status.as_u16(),
                body: text.into_owned(),
            });
        }

        let result = parse_prediction(&body)?;

        tracing::info!(
            label = %result.label(),
            description_len = result.description().len(),
            "Prediction received"
        );

        Ok(result)
    }
}
