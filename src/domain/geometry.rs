// ==========================================
// 恩施山区交通平台 - 路段几何领域模型
// ==========================================
// 职责: 路段几何/地质属性快照 (引擎只读)
// 红线: 任一字段缺失只会使相关指标降级为"未知", 不得 panic
// ==========================================

use crate::domain::types::{GeologicalRiskTag, RiskLevel, SafetyHazard, SurfaceCondition};
use serde::{Deserialize, Serialize};

// ==========================================
// RoadSegmentGeometry - 路段几何快照
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoadSegmentGeometry {
    // ===== 主键 =====
    pub section_id: String, // 路段ID

    // ===== 几何参数 =====
    #[serde(default)]
    pub length_km: Option<f64>, // 路段长度 (公里)
    #[serde(default)]
    pub average_slope: Option<f64>, // 平均坡度 (%)
    #[serde(default)]
    pub max_slope: Option<f64>, // 最大坡度 (%)
    #[serde(default)]
    pub average_curvature: Option<f64>, // 平均曲率
    #[serde(default)]
    pub start_elevation: Option<f64>, // 起点海拔 (米)
    #[serde(default)]
    pub end_elevation: Option<f64>, // 终点海拔 (米)

    // ===== 路面与地质 =====
    #[serde(default)]
    pub surface_condition: Option<SurfaceCondition>, // 路面状况
    #[serde(default)]
    pub geological_risk_tags: Vec<GeologicalRiskTag>, // 地质风险标签

    // ===== 通行能力 =====
    #[serde(default)]
    pub design_capacity: Option<u32>, // 设计通行能力 (辆/小时)

    // ===== 派生字段 (由 refresh_risk_level 回写) =====
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
}

impl RoadSegmentGeometry {
    /// 创建仅含路段ID的空快照
    pub fn new(section_id: impl Into<String>) -> Self {
        Self {
            section_id: section_id.into(),
            ..Default::default()
        }
    }

    /// 起终点海拔差 (绝对值), 任一海拔缺失返回 None
    pub fn elevation_difference(&self) -> Option<f64> {
        match (self.start_elevation, self.end_elevation) {
            (Some(start), Some(end)) => Some((end - start).abs()),
            _ => None,
        }
    }

    /// 陡坡路段: 平均坡度 > 8
    pub fn is_steep_slope(&self) -> bool {
        self.average_slope.map_or(false, |s| s > 8.0)
    }

    /// 急弯路段: 平均曲率 > 0.1
    pub fn is_sharp_curve(&self) -> bool {
        self.average_curvature.map_or(false, |c| c > 0.1)
    }

    /// 山区道路: 平均坡度 > 5 或平均曲率 > 0.05
    pub fn is_mountain_road(&self) -> bool {
        self.average_slope.map_or(false, |s| s > 5.0)
            || self.average_curvature.map_or(false, |c| c > 0.05)
    }

    /// 路面是否较差
    pub fn has_poor_surface(&self) -> bool {
        self.surface_condition == Some(SurfaceCondition::Poor)
    }

    /// 最高权重的地质风险标签
    pub fn dominant_geological_tag(&self) -> Option<GeologicalRiskTag> {
        self.geological_risk_tags.iter().copied().max()
    }

    /// 安全隐患清单
    ///
    /// 规则:
    /// - 最大坡度 > 10 → 陡坡
    /// - 平均曲率 > 0.1 → 急弯
    /// - 存在地质风险标签 → 地质风险
    /// - 路面较差 → 路面隐患
    pub fn safety_hazards(&self) -> Vec<SafetyHazard> {
        let mut hazards = Vec::new();

        if let Some(max_slope) = self.max_slope.filter(|s| *s > 10.0) {
            hazards.push(SafetyHazard::SteepSlope { max_slope });
        }

        if let Some(average_curvature) = self.average_curvature.filter(|c| *c > 0.1) {
            hazards.push(SafetyHazard::SharpCurve { average_curvature });
        }

        if !self.geological_risk_tags.is_empty() {
            hazards.push(SafetyHazard::GeologicalRisk {
                tags: self.geological_risk_tags.clone(),
            });
        }

        if self.has_poor_surface() {
            hazards.push(SafetyHazard::PoorSurface);
        }

        hazards
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elevation_difference() {
        let mut geometry = RoadSegmentGeometry::new("S001");
        assert_eq!(geometry.elevation_difference(), None);

        geometry.start_elevation = Some(1200.0);
        geometry.end_elevation = Some(850.0);
        assert_eq!(geometry.elevation_difference(), Some(350.0));
    }

    #[test]
    fn test_shape_flags() {
        let mut geometry = RoadSegmentGeometry::new("S001");
        assert!(!geometry.is_steep_slope());
        assert!(!geometry.is_sharp_curve());
        assert!(!geometry.is_mountain_road());

        geometry.average_slope = Some(8.5);
        geometry.average_curvature = Some(0.12);
        assert!(geometry.is_steep_slope());
        assert!(geometry.is_sharp_curve());
        assert!(geometry.is_mountain_road());

        // 边界: 恰好 8 / 0.1 不算
        geometry.average_slope = Some(8.0);
        geometry.average_curvature = Some(0.1);
        assert!(!geometry.is_steep_slope());
        assert!(!geometry.is_sharp_curve());
    }

    #[test]
    fn test_safety_hazards() {
        let geometry = RoadSegmentGeometry {
            section_id: "S002".to_string(),
            max_slope: Some(12.0),
            average_curvature: Some(0.05),
            surface_condition: Some(SurfaceCondition::Poor),
            geological_risk_tags: vec![GeologicalRiskTag::Landslide],
            ..Default::default()
        };

        let hazards = geometry.safety_hazards();
        assert_eq!(hazards.len(), 3);
        assert_eq!(hazards[0], SafetyHazard::SteepSlope { max_slope: 12.0 });
        assert_eq!(hazards[2], SafetyHazard::PoorSurface);
    }

    #[test]
    fn test_dominant_geological_tag() {
        let mut geometry = RoadSegmentGeometry::new("S003");
        assert_eq!(geometry.dominant_geological_tag(), None);

        geometry.geological_risk_tags =
            vec![GeologicalRiskTag::LowRisk, GeologicalRiskTag::DebrisFlow, GeologicalRiskTag::MediumRisk];
        assert_eq!(geometry.dominant_geological_tag(), Some(GeologicalRiskTag::DebrisFlow));
    }
}
