// ==========================================
// 恩施山区交通平台 - 派生指标领域模型
// ==========================================
// 职责: 引擎输出结构 (只读结果, 不回写数据源)
// ==========================================

use crate::domain::types::{
    AnomalyKind, AnomalyMetric, CongestionStatus, RiskLevel, ServiceLevel,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// FlowAnomaly - 流量/速度异常记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowAnomaly {
    pub time: NaiveDateTime,    // 异常发生时间 (后一样本时间)
    pub metric: AnomalyMetric,  // 指标
    pub kind: AnomalyKind,      // 异常类型
    pub change_pct: f64,        // 变化百分比 (带符号)
    pub before: f64,            // 变化前
    pub after: f64,             // 变化后
}

// ==========================================
// RoadRiskAssessment - 路段几何风险评估
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadRiskAssessment {
    pub section_id: String,

    // ===== 分项得分 =====
    pub slope_score: f64,      // 坡度 (0-4)
    pub curvature_score: f64,  // 曲率 (0-3)
    pub geological_score: f64, // 地质 (0-3)

    // ===== 汇总 =====
    pub risk_index: Option<f64>, // 风险指数, 几何输入全部缺失时为 None
    pub risk_level: RiskLevel,
    pub risk_reason: String, // 可解释原因 (JSON)
}

// ==========================================
// FlowWindowSummary - 时间窗流量汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowWindowSummary {
    pub sample_count: usize,
    pub average_flow: Option<f64>,
    pub average_speed: Option<f64>,
    pub max_flow: Option<u32>,
    pub min_flow: Option<u32>,
    pub peak_factor: Option<f64>, // 最大流量 / 平均流量
}

// ==========================================
// DerivedMetrics - 路段派生指标
// ==========================================
// 用途: 单路段单时刻的完整指标快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub metrics_id: String,          // 指标快照ID (uuid v4)
    pub section_id: String,          // 路段ID
    pub computed_at: NaiveDateTime,  // 计算时刻

    // ===== 流量与通行能力 =====
    pub current_flow: Option<f64>,
    pub current_speed: Option<f64>,
    pub effective_capacity: Option<f64>,
    pub saturation: Option<f64>,

    // ===== 拥堵 =====
    pub congestion_index: Option<f64>,
    pub congestion_status: CongestionStatus,
    pub service_level: ServiceLevel,

    // ===== 风险 =====
    pub risk_index: Option<f64>,
    pub risk_level: RiskLevel,

    // ===== 天气 =====
    pub weather_impact_index: Option<f64>,
    pub suggested_speed_limit: Option<i32>,

    // ===== 高峰期与异常 =====
    pub in_peak_period: bool,
    pub anomalies: Vec<FlowAnomaly>,
}
