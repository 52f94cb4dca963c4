// ==========================================
// 恩施山区交通平台 - API 层
// ==========================================
// 职责: 对外暴露路段/监测点指标查询接口
// ==========================================

pub mod error;
pub mod metrics_api;
pub mod validator;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use metrics_api::{PeakRuleStatus, TrafficMetricsApi};
