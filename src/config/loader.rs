//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（peaklens.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use reqwest::Url;
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["peaklens", "peaklens.local"];

/// 环境变量前缀
const ENV_PREFIX: &str = "PEAKLENS";

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `PEAKLENS_`，层级分隔符 `__`）
/// 2. 配置文件（peaklens.toml 或 peaklens.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `PEAKLENS_PREDICTION__ENDPOINT=http://192.168.8.102:5000/predict`
/// - `PEAKLENS_PREDICTION__TIMEOUT_SECS=30`
/// - `PEAKLENS_LOG__LEVEL=debug`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    load_with_environment(config_path, environment())
}

fn environment() -> Environment {
    // 注意: 环境变量名会被转换为小写
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn load_with_environment(
    config_path: Option<&Path>,
    env: Environment,
) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    // prediction.timeout_secs 没有默认值：不设置即不限制
    builder = builder
        .set_default("prediction.endpoint", "http://localhost:5000/predict")?
        .set_default("prediction.reject_while_in_flight", false)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    builder = builder.add_source(env);

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let endpoint = &config.prediction.endpoint;
    if endpoint.is_empty() {
        return Err(ConfigError::ValidationError(
            "Prediction endpoint cannot be empty".to_string(),
        ));
    }

    let url = Url::parse(endpoint).map_err(|e| {
        ConfigError::ValidationError(format!("Invalid prediction endpoint '{}': {}", endpoint, e))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::ValidationError(format!(
            "Prediction endpoint must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.prediction.timeout_secs == Some(0) {
        return Err(ConfigError::ValidationError(
            "Prediction timeout cannot be 0 (omit it to disable)".to_string(),
        ));
    }

    if config.log.level.parse::<tracing::Level>().is_err() {
        return Err(ConfigError::ValidationError(format!(
            "Unknown log level '{}'",
            config.log.level
        )));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Prediction Endpoint: {}", config.prediction.endpoint);
    match config.prediction.timeout_secs {
        Some(secs) => tracing::info!("Prediction Timeout: {}s", secs),
        None => tracing::info!("Prediction Timeout: none"),
    }
    tracing::info!(
        "Reject While In Flight: {}",
        config.prediction.reject_while_in_flight
    );
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
