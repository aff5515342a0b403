//! peaklens - 山峰图片识别客户端
//!
//! 用法: peaklens <image-path> [library|camera]
//!
//! 上传一张图片到配置的识别服务，打印识别结果

use anyhow::Context;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use peaklens::application::{ApplicationError, PredictionSession, SubmitPrediction};
use peaklens::config::{load_config, load_config_from_path, print_config, AppConfig};
use peaklens::domain::prediction::{ImageAsset, ImageSource, RequestState};
use peaklens::infrastructure::adapters::{HttpPredictionClient, HttpPredictionClientConfig};

const USAGE: &str = "Usage: peaklens <image-path> [library|camera]";

/// 识别失败（上传失败或识别失败）
const EXIT_PREDICTION_FAILED: u8 = 1;
/// 用法或配置错误
const EXIT_USAGE: u8 = 2;

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.log.filter_directive()));

    // 结果输出到 stdout，日志走 stderr
    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// 解析参数、创建客户端并选中图片
///
/// 这里的任何错误都属于用法或配置错误
async fn prepare_session(args: &[String], config: &AppConfig) -> anyhow::Result<PredictionSession> {
    let source = match args.get(2) {
        Some(s) => s.parse::<ImageSource>()?,
        None => ImageSource::Library,
    };

    let client_config = HttpPredictionClientConfig {
        endpoint: config.prediction.endpoint.clone(),
        timeout_secs: config.prediction.timeout_secs,
    };
    let engine = HttpPredictionClient::new(client_config)
        .context("Failed to create prediction client")?;
    let session = PredictionSession::new(Arc::new(engine))
        .with_in_flight_guard(config.prediction.reject_while_in_flight);

    if let Some(path) = args.get(1) {
        let image = ImageAsset::load(path, source)
            .await
            .with_context(|| format!("Failed to read image {}", path))?;
        session.select_image(image);
    }

    Ok(session)
}

/// 终止状态对应的退出码
fn exit_code_for(state: &RequestState) -> u8 {
    match state {
        RequestState::Succeeded(_) => 0,
        _ => EXIT_PREDICTION_FAILED,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let loaded = match std::env::var_os("PEAKLENS_CONFIG") {
        Some(path) => load_config_from_path(Some(&PathBuf::from(path))),
        None => load_config(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    init_tracing(&config);
    print_config(&config);

    let session = match prepare_session(&args, &config).await {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{:#}\n{}", e, USAGE);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let state = match session.handle(SubmitPrediction::selected()).await {
        Ok(state) => state,
        Err(e @ ApplicationError::NoImageSelected) => {
            eprintln!("{}\n{}", e.notice(), USAGE);
            return ExitCode::from(EXIT_USAGE);
        }
        Err(e) => {
            eprintln!("{}", e.notice());
            return ExitCode::from(EXIT_USAGE);
        }
    };

    match &state {
        RequestState::Succeeded(result) => println!("{}", result),
        RequestState::Failed(reason) => eprintln!("{}", reason.notice()),
        other => tracing::error!(state = %other, "Submission ended in a non-terminal state"),
    }
    ExitCode::from(exit_code_for(&state))
}
