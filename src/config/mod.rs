// ==========================================
// 恩施山区交通平台 - 配置层
// ==========================================
// 职责: 指标核心运行参数加载与校验
// 来源: 默认值 / JSON 文件 / 环境变量
// ==========================================

pub mod metrics_config;

use thiserror::Error;

// 重导出核心配置
pub use metrics_config::{env_keys, MetricsConfig};

/// 配置加载错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    Io { path: String, message: String },

    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("配置值无效 (key={key}): {message}")]
    InvalidValue { key: String, message: String },
}
