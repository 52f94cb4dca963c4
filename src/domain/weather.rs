// ==========================================
// 恩施山区交通平台 - 气象观测领域模型
// ==========================================
// 职责: 区域气象观测快照 (引擎只读)
// ==========================================

use crate::domain::types::WeatherCondition;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// WeatherObservation - 气象观测
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub region_id: String,          // 区域ID
    pub record_time: NaiveDateTime, // 观测时间

    #[serde(default)]
    pub condition: Option<WeatherCondition>, // 天气现象

    // ===== 气象要素 =====
    #[serde(default)]
    pub precipitation: Option<f64>, // 降水量 (mm)
    #[serde(default)]
    pub visibility: Option<f64>, // 能见度 (m)
    #[serde(default)]
    pub wind_speed: Option<f64>, // 风速 (m/s)
    #[serde(default)]
    pub wind_direction: Option<f64>, // 风向 (度)
    #[serde(default)]
    pub temperature: Option<f64>, // 温度 (°C)
    #[serde(default)]
    pub humidity: Option<f64>, // 相对湿度 (%)
    #[serde(default)]
    pub cloud_cover: Option<f64>, // 云量 (%)
    #[serde(default)]
    pub pressure: Option<f64>, // 气压 (hPa)

    // ===== 特殊天气标志 =====
    #[serde(default)]
    pub snow_ice: bool, // 冰雪
    #[serde(default)]
    pub foggy: bool, // 雾
    #[serde(default)]
    pub thunderstorm: bool, // 雷暴

    // ===== 预警信息 =====
    #[serde(default)]
    pub warning_info: Option<String>,
}

impl WeatherObservation {
    /// 创建空观测 (所有要素缺失, 标志为 false)
    pub fn new(region_id: impl Into<String>, record_time: NaiveDateTime) -> Self {
        Self {
            region_id: region_id.into(),
            record_time,
            condition: None,
            precipitation: None,
            visibility: None,
            wind_speed: None,
            wind_direction: None,
            temperature: None,
            humidity: None,
            cloud_cover: None,
            pressure: None,
            snow_ice: false,
            foggy: false,
            thunderstorm: false,
            warning_info: None,
        }
    }

    /// 蒲福风级 (0-12), 风速缺失按 0 级
    pub fn wind_force(&self) -> u8 {
        let speed = match self.wind_speed {
            Some(s) => s,
            None => return 0,
        };

        // 各级风速上限 (m/s)
        const UPPER_BOUNDS: [f64; 12] = [
            0.3, 1.6, 3.4, 5.5, 8.0, 10.8, 13.9, 17.2, 20.8, 24.5, 28.5, 32.7,
        ];

        UPPER_BOUNDS
            .iter()
            .position(|upper| speed < *upper)
            .map(|force| force as u8)
            .unwrap_or(12)
    }

    /// 是否有非空预警信息
    pub fn has_warning(&self) -> bool {
        self.warning_info
            .as_deref()
            .map_or(false, |w| !w.is_empty())
    }

    /// 是否有降水 (> 0)
    pub fn has_precipitation(&self) -> bool {
        self.precipitation.map_or(false, |p| p > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn observation() -> WeatherObservation {
        WeatherObservation::new(
            "R001",
            NaiveDate::from_ymd_opt(2025, 1, 5)
                .unwrap()
                .and_hms_opt(6, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_wind_force_scale() {
        let mut obs = observation();
        assert_eq!(obs.wind_force(), 0);

        let cases = [
            (0.2, 0),
            (1.0, 1),
            (5.5, 4),
            (10.8, 6),
            (13.8, 6),
            (17.2, 8),
            (20.0, 8),
            (32.6, 11),
            (40.0, 12),
        ];
        for (speed, expected) in cases {
            obs.wind_speed = Some(speed);
            assert_eq!(obs.wind_force(), expected, "wind_speed={}", speed);
        }
    }

    #[test]
    fn test_warning_flag() {
        let mut obs = observation();
        assert!(!obs.has_warning());
        obs.warning_info = Some(String::new());
        assert!(!obs.has_warning());
        obs.warning_info = Some("暴雨黄色预警".to_string());
        assert!(obs.has_warning());
    }
}
