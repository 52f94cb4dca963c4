// ==========================================
// 恩施山区交通平台 - 通行能力与拥堵估算引擎
// ==========================================
// 职责: 有效通行能力 + 当前流量/车速 + 饱和度拥堵指数
// 输入: RoadSegmentGeometry + 各监测点最新样本
// 输出: 有效通行能力 / 拥堵指数 / 拥堵状态
// 红线: 通行能力为 0 或缺失时不计算饱和度
// ==========================================

use crate::domain::flow::FlowSample;
use crate::domain::geometry::RoadSegmentGeometry;
use crate::domain::types::{CongestionStatus, SurfaceCondition};
use crate::engine::flow_metrics::mean;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// 当前流量默认回溯窗口 (分钟)
pub const DEFAULT_CURRENT_FLOW_WINDOW_MINUTES: i64 = 60;

/// 拥堵指数上限
pub const MAX_CONGESTION_INDEX: f64 = 10.0;

// ==========================================
// CurrentTraffic - 路段当前交通状态
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentTraffic {
    pub reporting_points: usize,    // 有有效样本的监测点数
    pub flow: Option<f64>,          // 平均流量 (缺失流量按 0)
    pub average_speed: Option<f64>, // 平均车速 (忽略缺失车速)
}

// ==========================================
// CapacityEstimator - 通行能力估算引擎
// ==========================================
pub struct CapacityEstimator {
    // 无状态引擎
}

impl CapacityEstimator {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 通行能力
    // ==========================================

    /// 坡度折减: >10 → 0.6, >5 → 0.8, 其余 1.0 (使用平均坡度)
    pub fn slope_factor(&self, geometry: &RoadSegmentGeometry) -> f64 {
        match geometry.average_slope {
            Some(s) if s > 10.0 => 0.6,
            Some(s) if s > 5.0 => 0.8,
            _ => 1.0,
        }
    }

    /// 曲率折减: >0.15 → 0.7, >0.05 → 0.9, 其余 1.0
    pub fn curvature_factor(&self, geometry: &RoadSegmentGeometry) -> f64 {
        match geometry.average_curvature {
            Some(c) if c > 0.15 => 0.7,
            Some(c) if c > 0.05 => 0.9,
            _ => 1.0,
        }
    }

    /// 路面折减: 较差 → 0.8, 其余 1.0
    pub fn surface_factor(&self, geometry: &RoadSegmentGeometry) -> f64 {
        if geometry.surface_condition == Some(SurfaceCondition::Poor) {
            0.8
        } else {
            1.0
        }
    }

    /// 综合折减系数 (各系数连乘)
    pub fn capacity_factor(&self, geometry: &RoadSegmentGeometry) -> f64 {
        self.slope_factor(geometry)
            * self.curvature_factor(geometry)
            * self.surface_factor(geometry)
    }

    /// 有效通行能力 = 设计通行能力 × 综合折减系数
    ///
    /// # 返回
    /// 设计通行能力缺失时返回 None
    pub fn effective_capacity(&self, geometry: &RoadSegmentGeometry) -> Option<f64> {
        let design_capacity = geometry.design_capacity?;
        Some(design_capacity as f64 * self.capacity_factor(geometry))
    }

    // ==========================================
    // 当前交通状态
    // ==========================================

    /// 路段当前流量与车速
    ///
    /// # 参数
    /// - `latest_samples`: 每个监测点至多一条最新样本
    #[instrument(skip(self, latest_samples), fields(count = latest_samples.len()))]
    pub fn current_traffic(&self, latest_samples: &[FlowSample]) -> CurrentTraffic {
        if latest_samples.is_empty() {
            return CurrentTraffic {
                reporting_points: 0,
                flow: None,
                average_speed: None,
            };
        }

        let flow = mean(
            latest_samples
                .iter()
                .map(|s| s.flow_rate.unwrap_or(0) as f64),
        );
        let average_speed = mean(latest_samples.iter().filter_map(|s| s.average_speed));

        CurrentTraffic {
            reporting_points: latest_samples.len(),
            flow,
            average_speed,
        }
    }

    // ==========================================
    // 拥堵指数
    // ==========================================

    /// 饱和度 = 当前流量 / 有效通行能力
    pub fn saturation(&self, current_flow: Option<f64>, capacity: Option<f64>) -> Option<f64> {
        match (current_flow, capacity) {
            (Some(flow), Some(cap)) if cap > 0.0 => Some(flow / cap),
            _ => None,
        }
    }

    /// 饱和度 → 拥堵指数 (0-10, 分段线性, 各段首尾相接)
    ///
    /// - <0.5: s × 2
    /// - <0.8: 1 + (s - 0.5) × 4/0.3
    /// - <1.0: 5 + (s - 0.8) × 2/0.2
    /// - ≥1.0: min(7 + (s - 1) × 3, 10)
    pub fn congestion_index_from_saturation(&self, saturation: f64) -> f64 {
        if saturation < 0.5 {
            saturation * 2.0
        } else if saturation < 0.8 {
            1.0 + (saturation - 0.5) * (4.0 / 0.3)
        } else if saturation < 1.0 {
            5.0 + (saturation - 0.8) * (2.0 / 0.2)
        } else {
            (7.0 + (saturation - 1.0) * 3.0).min(MAX_CONGESTION_INDEX)
        }
    }

    /// 拥堵指数 (流量或通行能力缺失时为 None)
    pub fn congestion_index(&self, current_flow: Option<f64>, capacity: Option<f64>) -> Option<f64> {
        self.saturation(current_flow, capacity)
            .map(|s| self.congestion_index_from_saturation(s))
    }

    /// 拥堵状态
    pub fn congestion_status(&self, index: Option<f64>) -> CongestionStatus {
        CongestionStatus::from_index(index)
    }
}

impl Default for CapacityEstimator {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn sample(point: &str, time: NaiveDateTime, flow: Option<u32>, speed: Option<f64>) -> FlowSample {
        let mut s = FlowSample::new(point, time);
        s.flow_rate = flow;
        s.average_speed = speed;
        s
    }

    #[test]
    fn test_effective_capacity_worst_case() {
        let estimator = CapacityEstimator::new();
        let geometry = RoadSegmentGeometry {
            section_id: "S001".to_string(),
            average_slope: Some(12.0),
            average_curvature: Some(0.2),
            surface_condition: Some(SurfaceCondition::Poor),
            design_capacity: Some(1000),
            ..Default::default()
        };
        assert_eq!(estimator.effective_capacity(&geometry), Some(336.0));
    }

    #[test]
    fn test_effective_capacity_bands() {
        let estimator = CapacityEstimator::new();
        let mut geometry = RoadSegmentGeometry::new("S001");
        assert_eq!(estimator.effective_capacity(&geometry), None);

        geometry.design_capacity = Some(1000);
        assert_eq!(estimator.effective_capacity(&geometry), Some(1000.0));

        geometry.average_slope = Some(6.0);
        assert_eq!(estimator.slope_factor(&geometry), 0.8);
        geometry.average_slope = Some(10.0);
        assert_eq!(estimator.slope_factor(&geometry), 0.8);
        geometry.average_slope = Some(10.5);
        assert_eq!(estimator.slope_factor(&geometry), 0.6);

        geometry.average_curvature = Some(0.1);
        assert_eq!(estimator.curvature_factor(&geometry), 0.9);
        geometry.average_curvature = Some(0.05);
        assert_eq!(estimator.curvature_factor(&geometry), 1.0);
    }

    #[test]
    fn test_current_traffic_averages_points() {
        let estimator = CapacityEstimator::new();
        let latest = vec![
            sample("P1", at(9, 40), Some(200), Some(40.0)),
            sample("P2", at(9, 30), Some(400), None),
        ];

        let traffic = estimator.current_traffic(&latest);
        assert_eq!(traffic.reporting_points, 2);
        assert_eq!(traffic.flow, Some(300.0));
        assert_eq!(traffic.average_speed, Some(40.0));
    }

    #[test]
    fn test_current_traffic_missing_values() {
        let estimator = CapacityEstimator::new();
        assert_eq!(estimator.current_traffic(&[]).flow, None);

        let latest = vec![
            sample("P1", at(9, 30), None, None),
            sample("P2", at(9, 30), Some(300), None),
        ];
        let traffic = estimator.current_traffic(&latest);
        assert_eq!(traffic.flow, Some(150.0));
        assert_eq!(traffic.average_speed, None);
    }

    #[test]
    fn test_congestion_index_continuity_and_cap() {
        let estimator = CapacityEstimator::new();
        let below = estimator.congestion_index_from_saturation(0.5 - 1e-9);
        let at_half = estimator.congestion_index_from_saturation(0.5);
        assert!((below - 1.0).abs() < 1e-6);
        assert_eq!(at_half, 1.0);

        let at_08 = estimator.congestion_index_from_saturation(0.8);
        assert!((at_08 - 5.0).abs() < 1e-9);
        assert!((estimator.congestion_index_from_saturation(1.0) - 7.0).abs() < 1e-9);
        assert_eq!(estimator.congestion_index_from_saturation(2.0), MAX_CONGESTION_INDEX);
        assert_eq!(estimator.congestion_index_from_saturation(5.0), MAX_CONGESTION_INDEX);
    }

    #[test]
    fn test_congestion_index_guards() {
        let estimator = CapacityEstimator::new();
        assert_eq!(estimator.congestion_index(Some(100.0), Some(0.0)), None);
        assert_eq!(estimator.congestion_index(None, Some(100.0)), None);
        assert_eq!(estimator.congestion_index(Some(250.0), Some(1000.0)), Some(0.5));
        assert_eq!(
            estimator.congestion_status(None),
            CongestionStatus::InsufficientData
        );
    }
}
