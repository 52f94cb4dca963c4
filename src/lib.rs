// ==========================================
// 恩施山区交通平台 - 交通指标核心库
// ==========================================
// 职责: 由路段几何/流量样本/气象观测/高峰期规则派生交通指标
// 系统定位: 纯计算核心 (无持久化, 数据源由调用方提供)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据源层 - 数据访问
pub mod repository;

// 引擎层 - 指标计算
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 运行参数
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 指标查询接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    AnomalyKind, AnomalyMetric, CongestionLevel, CongestionStatus, GeologicalRiskTag, RiskLevel,
    RuleStatus, ServiceLevel, SurfaceCondition, WeatherCondition,
};

// 领域实体
pub use domain::{
    DerivedMetrics, FlowAnomaly, FlowSample, PeakPeriodRule, RoadRiskAssessment,
    RoadSegmentGeometry, WeatherObservation,
};

// 引擎
pub use engine::{
    AnomalyDetector, CapacityEstimator, FlowMetricsCalculator, PeakPeriodMatcher, RoadRiskEngine,
    WeatherImpactScorer,
};

// API
pub use api::{ApiError, ApiResult, TrafficMetricsApi};

// 数据源
pub use repository::{InMemoryTrafficRepository, TrafficDataSource, TrafficScenario};

// 配置
pub use config::MetricsConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "恩施山区交通指标核心";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
