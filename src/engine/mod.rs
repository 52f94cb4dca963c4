// ==========================================
// 恩施山区交通平台 - 引擎层
// ==========================================
// 职责: 指标派生与评分规则 (纯函数, 无 I/O)
// 红线: 引擎不访问数据源, 输入均为调用方提供的不可变快照
// ==========================================

pub mod anomaly;
pub mod capacity;
pub mod flow_metrics;
pub mod peak_period;
pub mod risk;
pub mod weather;

// 重导出核心引擎
pub use anomaly::AnomalyDetector;
pub use capacity::{CapacityEstimator, CurrentTraffic};
pub use flow_metrics::FlowMetricsCalculator;
pub use peak_period::{PeakPeriodMatcher, PeakRuleState};
pub use risk::RoadRiskEngine;
pub use weather::{WeatherImpactReport, WeatherImpactScorer};
