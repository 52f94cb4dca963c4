// ==========================================
// MetricsConfig 集成测试
// ==========================================
// 测试目标: JSON 文件加载 / 环境变量覆写 / 校验
// ==========================================

use std::io::Write;

use enshi_traffic_metrics::config::{env_keys, ConfigError};
use enshi_traffic_metrics::MetricsConfig;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_from_file_overrides_selected_fields() {
    let file = write_config(
        r#"{
            "daily_flow_window_days": 14,
            "flow_change_threshold": 0.8,
            "congested_index_threshold": 5.0
        }"#,
    );

    let config = MetricsConfig::from_file(file.path()).unwrap();
    assert_eq!(config.daily_flow_window_days, 14);
    assert_eq!(config.flow_change_threshold, 0.8);
    assert_eq!(config.congested_index_threshold, 5.0);
    // 未指定字段保持默认
    assert_eq!(config.peak_valley_window_days, 7);
    assert_eq!(config.current_flow_window_minutes, 60);
    assert_eq!(config.default_base_speed_limit, 60);
}

#[test]
fn test_from_file_rejects_invalid_values() {
    let file = write_config(r#"{ "current_flow_window_minutes": 0 }"#);
    assert!(matches!(
        MetricsConfig::from_file(file.path()),
        Err(ConfigError::InvalidValue { ref key, .. }) if key == "current_flow_window_minutes"
    ));

    let file = write_config(r#"{ "daily_flow_window_days": 10000000000000 }"#);
    assert!(matches!(
        MetricsConfig::from_file(file.path()),
        Err(ConfigError::InvalidValue { ref key, .. }) if key == "daily_flow_window_days"
    ));

    let file = write_config("{ broken");
    assert!(matches!(
        MetricsConfig::from_file(file.path()),
        Err(ConfigError::Parse(_))
    ));

    assert!(matches!(
        MetricsConfig::from_file("/nonexistent/enshi-metrics.json"),
        Err(ConfigError::Io { .. })
    ));
}

#[test]
fn test_load_applies_env_overrides() {
    let file = write_config(r#"{ "anomaly_min_samples": 20 }"#);
    std::env::set_var(env_keys::CONFIG_PATH, file.path());
    std::env::set_var(env_keys::BASE_SPEED_LIMIT, "40");

    let loaded = MetricsConfig::load();

    std::env::set_var(env_keys::BASE_SPEED_LIMIT, "fast");
    let bad = MetricsConfig::load();

    std::env::remove_var(env_keys::CONFIG_PATH);
    std::env::remove_var(env_keys::BASE_SPEED_LIMIT);

    let config = loaded.unwrap();
    assert_eq!(config.anomaly_min_samples, 20);
    assert_eq!(config.default_base_speed_limit, 40);
    assert!(matches!(bad, Err(ConfigError::InvalidValue { .. })));
}
