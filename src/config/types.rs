//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 识别服务配置
    #[serde(default)]
    pub prediction: PredictionConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 识别服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionConfig {
    /// 识别服务完整 URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// 请求超时时间（秒），不设置则不限制
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// 请求进行中时是否拒绝新的提交
    #[serde(default)]
    pub reject_while_in_flight: bool,
}

fn default_endpoint() -> String {
    "http://localhost:5000/predict".to_string()
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: None,
            reject_while_in_flight: false,
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl LogConfig {
    /// 默认过滤规则（RUST_LOG 未设置时使用）
    pub fn filter_directive(&self) -> String {
        format!("{},peaklens={}", self.level, self.level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.prediction.endpoint, "http://localhost:5000/predict");
        assert_eq!(config.prediction.timeout_secs, None);
        assert!(!config.prediction.reject_while_in_flight);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_filter_directive() {
        let config = LogConfig {
            level: "debug".to_string(),
            json: false,
        };
        assert_eq!(config.filter_directive(), "debug,peaklens=debug");
    }
}
