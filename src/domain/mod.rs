// ==========================================
// 恩施山区交通平台 - 领域模型层
// ==========================================
// 职责: 定义路段几何、流量样本、气象观测、高峰期规则与派生指标
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod flow;
pub mod geometry;
pub mod metrics;
pub mod peak_rule;
pub mod types;
pub mod weather;

// 重导出核心类型
pub use flow::{FlowSample, VehicleClass};
pub use geometry::RoadSegmentGeometry;
pub use metrics::{DerivedMetrics, FlowAnomaly, FlowWindowSummary, RoadRiskAssessment};
pub use peak_rule::{PeakPeriodRule, ALL_DAYS_MASK, WEEKENDS_MASK, WORKDAYS_MASK};
pub use types::{
    AnomalyKind, AnomalyMetric, CongestionLevel, CongestionStatus, DrivingAdvisory,
    GeologicalRiskTag, LandslideRisk, PrecipitationLevel, RiskLevel, RuleStatus, SafetyHazard,
    ServiceLevel, SurfaceCondition, VisibilityLevel, WeatherCondition,
};
pub use weather::WeatherObservation;
