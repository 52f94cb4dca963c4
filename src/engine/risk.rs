// ==========================================
// 恩施山区交通平台 - 路段几何风险引擎
// ==========================================
// 职责: 坡度/曲率/地质标签 → 风险指数 + 风险等级
// 输入: RoadSegmentGeometry
// 输出: RoadRiskAssessment (含可解释原因)
// 红线: 风险指数不做最终截断 (各分项上限之和为 10)
// ==========================================

use crate::domain::geometry::RoadSegmentGeometry;
use crate::domain::metrics::RoadRiskAssessment;
use crate::domain::types::RiskLevel;
use serde_json::json;
use tracing::instrument;

// ==========================================
// RoadRiskEngine - 路段几何风险引擎
// ==========================================
pub struct RoadRiskEngine {
    // 无状态引擎
}

impl RoadRiskEngine {
    /// 构造函数
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 评估路段几何风险
    ///
    /// # 参数
    /// - `geometry`: 路段几何快照
    ///
    /// # 返回
    /// RoadRiskAssessment (分项得分 + 指数 + 等级 + 原因)
    pub fn assess(&self, geometry: &RoadSegmentGeometry) -> RoadRiskAssessment {
        let slope_score = self.slope_score(geometry);
        let curvature_score = self.curvature_score(geometry);
        let geological_score = self.geological_score(geometry);

        let risk_index = if self.has_risk_inputs(geometry) {
            Some(slope_score + curvature_score + geological_score)
        } else {
            None
        };
        let risk_level = RiskLevel::from_index(risk_index);

        let slope_basis = match (geometry.max_slope, geometry.average_slope) {
            (Some(_), _) => "max_slope",
            (None, Some(_)) => "average_slope",
            (None, None) => "none",
        };

        let risk_reason = json!({
            "level": risk_level.as_code(),
            "risk_index": risk_index,
            "slope": {
                "basis": slope_basis,
                "score": slope_score,
            },
            "curvature": {
                "average_curvature": geometry.average_curvature,
                "score": curvature_score,
            },
            "geological": {
                "dominant_tag": geometry.dominant_geological_tag().map(|t| t.to_string()),
                "score": geological_score,
            },
        })
        .to_string();

        RoadRiskAssessment {
            section_id: geometry.section_id.clone(),
            slope_score,
            curvature_score,
            geological_score,
            risk_index,
            risk_level,
            risk_reason,
        }
    }

    /// 风险指数 (仅数值)
    pub fn risk_index(&self, geometry: &RoadSegmentGeometry) -> Option<f64> {
        self.assess(geometry).risk_index
    }

    /// 重新计算风险等级并回写到路段
    ///
    /// # 返回
    /// 回写后的风险等级
    #[instrument(skip(self, geometry), fields(section_id = %geometry.section_id))]
    pub fn refresh_risk_level(&self, geometry: &mut RoadSegmentGeometry) -> RiskLevel {
        let level = RiskLevel::from_index(self.risk_index(geometry));
        geometry.risk_level = Some(level);
        level
    }

    // ==========================================
    // 分项评分
    // ==========================================

    /// 坡度得分: 优先最大坡度, 缺失时退回平均坡度
    ///
    /// - 最大坡度: >15 → 4, >10 → 3, >8 → 2, >5 → 1
    /// - 平均坡度: >10 → 3, >8 → 2, >5 → 1
    fn slope_score(&self, geometry: &RoadSegmentGeometry) -> f64 {
        if let Some(max_slope) = geometry.max_slope {
            if max_slope > 15.0 {
                4.0
            } else if max_slope > 10.0 {
                3.0
            } else if max_slope > 8.0 {
                2.0
            } else if max_slope > 5.0 {
                1.0
            } else {
                0.0
            }
        } else if let Some(average_slope) = geometry.average_slope {
            if average_slope > 10.0 {
                3.0
            } else if average_slope > 8.0 {
                2.0
            } else if average_slope > 5.0 {
                1.0
            } else {
                0.0
            }
        } else {
            0.0
        }
    }

    /// 曲率得分: >0.15 → 3, >0.1 → 2, >0.05 → 1
    fn curvature_score(&self, geometry: &RoadSegmentGeometry) -> f64 {
        match geometry.average_curvature {
            Some(c) if c > 0.15 => 3.0,
            Some(c) if c > 0.1 => 2.0,
            Some(c) if c > 0.05 => 1.0,
            _ => 0.0,
        }
    }

    /// 地质得分: 取最高权重标签, 不累加
    fn geological_score(&self, geometry: &RoadSegmentGeometry) -> f64 {
        geometry
            .dominant_geological_tag()
            .map_or(0.0, |tag| tag.weight())
    }

    fn has_risk_inputs(&self, geometry: &RoadSegmentGeometry) -> bool {
        geometry.max_slope.is_some()
            || geometry.average_slope.is_some()
            || geometry.average_curvature.is_some()
            || !geometry.geological_risk_tags.is_empty()
    }
}

impl Default for RoadRiskEngine {
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
    use crate::domain::types::GeologicalRiskTag;

    fn geometry() -> RoadSegmentGeometry {
        RoadSegmentGeometry::new("S001")
    }

    #[test]
    fn test_missing_inputs_are_unknown() {
        let engine = RoadRiskEngine::new();
        let assessment = engine.assess(&geometry());
        assert_eq!(assessment.risk_index, None);
        assert_eq!(assessment.risk_level, RiskLevel::Unknown);
    }

    #[test]
    fn test_max_slope_takes_precedence() {
        let engine = RoadRiskEngine::new();
        let mut g = geometry();
        g.max_slope = Some(9.0);
        g.average_slope = Some(12.0);
        // 最大坡度 9 → 2, 平均坡度不再参与
        assert_eq!(engine.assess(&g).slope_score, 2.0);

        g.max_slope = None;
        assert_eq!(engine.assess(&g).slope_score, 3.0);

        g.average_slope = Some(5.0);
        assert_eq!(engine.assess(&g).slope_score, 0.0);
    }

    #[test]
    fn test_geological_tags_do_not_accumulate() {
        let engine = RoadRiskEngine::new();
        let mut g = geometry();
        g.geological_risk_tags = vec![
            GeologicalRiskTag::LowRisk,
            GeologicalRiskTag::MediumRisk,
            GeologicalRiskTag::Landslide,
        ];
        assert_eq!(engine.assess(&g).geological_score, 3.0);

        g.geological_risk_tags = vec![GeologicalRiskTag::LowRisk, GeologicalRiskTag::MediumRisk];
        assert_eq!(engine.assess(&g).geological_score, 2.0);
    }

    #[test]
    fn test_worst_case_reaches_ten_without_clamp() {
        let engine = RoadRiskEngine::new();
        let mut g = geometry();
        g.max_slope = Some(18.0);
        g.average_curvature = Some(0.2);
        g.geological_risk_tags = vec![GeologicalRiskTag::DebrisFlow];

        let assessment = engine.assess(&g);
        assert_eq!(assessment.risk_index, Some(10.0));
        assert_eq!(assessment.risk_level, RiskLevel::VeryHigh);

        let reason: serde_json::Value = serde_json::from_str(&assessment.risk_reason).unwrap();
        assert_eq!(reason["level"], "very-high");
        assert_eq!(reason["slope"]["basis"], "max_slope");
        assert_eq!(reason["geological"]["dominant_tag"], "debris-flow");
    }

    #[test]
    fn test_refresh_risk_level_writes_back() {
        let engine = RoadRiskEngine::new();
        let mut g = geometry();
        g.average_slope = Some(9.0); // 2
        g.average_curvature = Some(0.12); // 2

        let level = engine.refresh_risk_level(&mut g);
        assert_eq!(level, RiskLevel::Medium);
        assert_eq!(g.risk_level, Some(RiskLevel::Medium));
    }
}
