// ==========================================
// 恩施山区交通平台 - 指标核心配置
// ==========================================
// 职责: 时间窗长度 / 异常阈值 / 默认限速等运行参数
// 加载顺序: 默认值 → JSON 文件 → 环境变量覆写 → 校验
// 红线: 评分细则 (分档阈值与权重) 不可配置
// ==========================================

use crate::config::ConfigError;
use crate::engine::anomaly::{
    AnomalyDetector, DEFAULT_ANOMALY_WINDOW_DAYS, DEFAULT_FLOW_CHANGE_THRESHOLD,
    DEFAULT_MIN_SAMPLES, DEFAULT_SPEED_CHANGE_THRESHOLD,
};
use crate::engine::capacity::DEFAULT_CURRENT_FLOW_WINDOW_MINUTES;
use crate::engine::flow_metrics::{DEFAULT_DAILY_FLOW_WINDOW_DAYS, DEFAULT_PEAK_VALLEY_WINDOW_DAYS};
use crate::engine::peak_period::{PeakPeriodMatcher, DEFAULT_NEXT_PEAK_HORIZON_DAYS};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// 回溯天数上限 (10 年)
pub const MAX_WINDOW_DAYS: i64 = 3650;
/// 当前流量回溯分钟上限 (1 天)
pub const MAX_CURRENT_FLOW_WINDOW_MINUTES: i64 = 1440;
/// 下次高峰期搜索天数上限
pub const MAX_NEXT_PEAK_HORIZON_DAYS: u32 = 366;

// ==========================================
// 环境变量键
// ==========================================
pub mod env_keys {
    /// 配置文件路径
    pub const CONFIG_PATH: &str = "ENSHI_METRICS_CONFIG";
    /// 默认基础限速覆写
    pub const BASE_SPEED_LIMIT: &str = "ENSHI_METRICS_BASE_SPEED_LIMIT";
}

// ==========================================
// MetricsConfig - 指标核心配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    // ===== 时间窗 =====
    pub daily_flow_window_days: i64,  // 日均流量回溯天数
    pub peak_valley_window_days: i64, // 峰谷比回溯天数
    pub anomaly_window_days: i64,     // 异常检测回溯天数
    pub current_flow_window_minutes: i64, // 当前流量回溯分钟数

    // ===== 异常检测 =====
    pub flow_change_threshold: f64,
    pub speed_change_threshold: f64,
    pub anomaly_min_samples: usize,

    // ===== 限速与拥堵 =====
    pub default_base_speed_limit: u32, // 路段未配置限速时使用 (km/h)
    pub congested_index_threshold: f64, // 拥堵路段判定阈值 (指数 > 阈值)

    // ===== 高峰期 =====
    pub next_peak_horizon_days: u32,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            daily_flow_window_days: DEFAULT_DAILY_FLOW_WINDOW_DAYS,
            peak_valley_window_days: DEFAULT_PEAK_VALLEY_WINDOW_DAYS,
            anomaly_window_days: DEFAULT_ANOMALY_WINDOW_DAYS,
            current_flow_window_minutes: DEFAULT_CURRENT_FLOW_WINDOW_MINUTES,
            flow_change_threshold: DEFAULT_FLOW_CHANGE_THRESHOLD,
            speed_change_threshold: DEFAULT_SPEED_CHANGE_THRESHOLD,
            anomaly_min_samples: DEFAULT_MIN_SAMPLES,
            default_base_speed_limit: 60,
            congested_index_threshold: 6.0,
            next_peak_horizon_days: DEFAULT_NEXT_PEAK_HORIZON_DAYS,
        }
    }
}

impl MetricsConfig {
    /// 从 JSON 文件加载 (缺失字段取默认值)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config: MetricsConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 按 默认值 → 配置文件 → 环境变量 顺序加载
    ///
    /// # 返回
    /// 校验通过的配置
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(env_keys::CONFIG_PATH) {
            Ok(path) if !path.trim().is_empty() => {
                info!(path = %path, "加载指标配置文件");
                Self::from_file(path.trim())?
            }
            _ => Self::default(),
        };

        if let Ok(raw) = std::env::var(env_keys::BASE_SPEED_LIMIT) {
            config.default_base_speed_limit =
                raw.trim().parse::<u32>().map_err(|_| ConfigError::InvalidValue {
                    key: env_keys::BASE_SPEED_LIMIT.to_string(),
                    message: format!("无法解析为正整数: {}", raw),
                })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// 校验: 时间窗与阈值必须为正, 时间窗不得超过上限
    pub fn validate(&self) -> Result<(), ConfigError> {
        let windows = [
            ("daily_flow_window_days", self.daily_flow_window_days, MAX_WINDOW_DAYS),
            ("peak_valley_window_days", self.peak_valley_window_days, MAX_WINDOW_DAYS),
            ("anomaly_window_days", self.anomaly_window_days, MAX_WINDOW_DAYS),
            (
                "current_flow_window_minutes",
                self.current_flow_window_minutes,
                MAX_CURRENT_FLOW_WINDOW_MINUTES,
            ),
        ];
        for (key, value, max) in windows {
            if value <= 0 || value > max {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("必须位于 [1, {}], 实际 {}", max, value),
                });
            }
        }

        let positive_thresholds = [
            ("flow_change_threshold", self.flow_change_threshold),
            ("speed_change_threshold", self.speed_change_threshold),
        ];
        for (key, value) in positive_thresholds {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("必须大于 0, 实际 {}", value),
                });
            }
        }

        if !(0.0..=10.0).contains(&self.congested_index_threshold) {
            return Err(ConfigError::InvalidValue {
                key: "congested_index_threshold".to_string(),
                message: format!("必须位于 [0, 10], 实际 {}", self.congested_index_threshold),
            });
        }

        if self.default_base_speed_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "default_base_speed_limit".to_string(),
                message: "必须大于 0".to_string(),
            });
        }

        if self.next_peak_horizon_days == 0 || self.next_peak_horizon_days > MAX_NEXT_PEAK_HORIZON_DAYS {
            return Err(ConfigError::InvalidValue {
                key: "next_peak_horizon_days".to_string(),
                message: format!(
                    "必须位于 [1, {}], 实际 {}",
                    MAX_NEXT_PEAK_HORIZON_DAYS, self.next_peak_horizon_days
                ),
            });
        }

        Ok(())
    }

    // ==========================================
    // 引擎构造
    // ==========================================

    pub fn anomaly_detector(&self) -> AnomalyDetector {
        AnomalyDetector::with_thresholds(
            self.flow_change_threshold,
            self.speed_change_threshold,
            self.anomaly_min_samples,
            self.anomaly_window_days,
        )
    }

    pub fn peak_matcher(&self) -> PeakPeriodMatcher {
        PeakPeriodMatcher::with_horizon(self.next_peak_horizon_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = MetricsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.daily_flow_window_days, 30);
        assert_eq!(config.peak_valley_window_days, 7);
        assert_eq!(config.anomaly_min_samples, 10);
        assert_eq!(config.default_base_speed_limit, 60);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: MetricsConfig =
            serde_json::from_str(r#"{ "default_base_speed_limit": 80 }"#).unwrap();
        assert_eq!(config.default_base_speed_limit, 80);
        assert_eq!(config.flow_change_threshold, 0.5);
    }

    #[test]
    fn test_validate_rejects_non_positive() {
        let mut config = MetricsConfig::default();
        config.anomaly_window_days = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "anomaly_window_days"
        ));

        let mut config = MetricsConfig::default();
        config.speed_change_threshold = -0.1;
        assert!(config.validate().is_err());

        let mut config = MetricsConfig::default();
        config.congested_index_threshold = 11.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_windows() {
        let mut config = MetricsConfig::default();
        config.daily_flow_window_days = 10_000_000_000_000;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "daily_flow_window_days"
        ));

        let mut config = MetricsConfig::default();
        config.current_flow_window_minutes = 1441;
        assert!(config.validate().is_err());
        config.current_flow_window_minutes = 1440;
        assert!(config.validate().is_ok());

        let mut config = MetricsConfig::default();
        config.anomaly_window_days = 3650;
        assert!(config.validate().is_ok());
        config.next_peak_horizon_days = 367;
        assert!(config.validate().is_err());
    }
}
