//! peaklens - 山峰图片识别客户端
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Prediction Context: ImageAsset, PredictionResult, RequestState
//!
//! 应用层 (application/):
//! - Ports: PredictionEnginePort
//! - Commands: SubmitPrediction + PredictionSession
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: HTTP Prediction Client (multipart 上传), Fake Prediction Client

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
