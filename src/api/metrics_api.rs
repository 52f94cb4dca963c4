// ==========================================
// 恩施山区交通平台 - 交通指标 API
// ==========================================
// 职责: 从数据源取数 → 校验 → 调用各引擎 → 组装派生指标
// 约定: 数据缺失返回 None / Unknown; 非法输入与未知 ID 返回 ApiError
// ==========================================

use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::api::error::ApiResult;
use crate::api::validator::{
    validate_day_time, validate_flow_sample, validate_peak_rule, validate_time_window,
    validate_weather,
};
use crate::config::MetricsConfig;
use crate::domain::flow::FlowSample;
use crate::domain::metrics::{DerivedMetrics, FlowAnomaly, FlowWindowSummary, RoadRiskAssessment};
use crate::domain::peak_rule::PeakPeriodRule;
use crate::domain::types::{CongestionStatus, RiskLevel};
use crate::engine::{
    AnomalyDetector, CapacityEstimator, CurrentTraffic, FlowMetricsCalculator, PeakPeriodMatcher,
    PeakRuleState, RoadRiskEngine, WeatherImpactReport, WeatherImpactScorer,
};
use crate::repository::traffic_source::TrafficDataSource;

// ==========================================
// PeakRuleStatus - 规则状态视图
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakRuleStatus {
    pub rule_id: String,
    pub name: String,
    pub time_range: String, // "HH:MM - HH:MM"
    pub state: PeakRuleState,
}

// ==========================================
// TrafficMetricsApi - 交通指标 API
// ==========================================

/// 交通指标API
///
/// 职责：
/// 1. 路段级指标 (拥堵/通行能力/风险/天气/高峰期)
/// 2. 监测点级指标 (日均流量/峰谷比/异常)
/// 3. 路段指标快照与道路拥堵路段筛选
pub struct TrafficMetricsApi {
    source: Arc<dyn TrafficDataSource>,
    config: MetricsConfig,
    risk_engine: RoadRiskEngine,
    capacity_estimator: CapacityEstimator,
    flow_calculator: FlowMetricsCalculator,
    weather_scorer: WeatherImpactScorer,
    peak_matcher: PeakPeriodMatcher,
    anomaly_detector: AnomalyDetector,
}

impl TrafficMetricsApi {
    /// 创建新的TrafficMetricsApi实例
    ///
    /// # 参数
    /// - source: 交通数据源
    /// - config: 已校验的指标配置
    pub fn new(source: Arc<dyn TrafficDataSource>, config: MetricsConfig) -> Self {
        Self {
            source,
            risk_engine: RoadRiskEngine::new(),
            capacity_estimator: CapacityEstimator::new(),
            flow_calculator: FlowMetricsCalculator::new(),
            weather_scorer: WeatherImpactScorer::new(),
            peak_matcher: config.peak_matcher(),
            anomaly_detector: config.anomaly_detector(),
            config,
        }
    }

    /// 使用默认配置创建
    pub fn with_default_config(source: Arc<dyn TrafficDataSource>) -> Self {
        Self::new(source, MetricsConfig::default())
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    // ==========================================
    // 通行能力与拥堵
    // ==========================================

    /// 有效通行能力 (设计通行能力缺失时为 None)
    pub fn effective_capacity(&self, section_id: &str) -> ApiResult<Option<f64>> {
        let geometry = self.source.section_geometry(section_id)?;
        Ok(self.capacity_estimator.effective_capacity(&geometry))
    }

    /// 路段当前交通状态 (各监测点在 (now - 窗口, now) 内的最新样本)
    pub fn current_traffic(&self, section_id: &str, now: NaiveDateTime) -> ApiResult<CurrentTraffic> {
        let window_start = now - Duration::minutes(self.config.current_flow_window_minutes);
        let latest = self
            .source
            .latest_sample_per_point(section_id, window_start, now)?;
        for sample in &latest {
            self.check_sample(sample)?;
        }

        let traffic = self.capacity_estimator.current_traffic(&latest);
        debug!(
            section_id = %section_id,
            reporting_points = traffic.reporting_points,
            flow = ?traffic.flow,
            "路段当前交通状态"
        );
        Ok(traffic)
    }

    /// 拥堵指数 (0-10)
    pub fn congestion_index(&self, section_id: &str, now: NaiveDateTime) -> ApiResult<Option<f64>> {
        let capacity = self.effective_capacity(section_id)?;
        let traffic = self.current_traffic(section_id, now)?;
        let index = self.capacity_estimator.congestion_index(traffic.flow, capacity);
        debug!(section_id = %section_id, index = ?index, "拥堵指数");
        Ok(index)
    }

    /// 拥堵状态
    pub fn congestion_status(
        &self,
        section_id: &str,
        now: NaiveDateTime,
    ) -> ApiResult<CongestionStatus> {
        let index = self.congestion_index(section_id, now)?;
        Ok(self.capacity_estimator.congestion_status(index))
    }

    /// 道路下拥堵指数超过阈值的路段
    ///
    /// # 返回
    /// 按道路登记顺序排列的路段ID
    #[instrument(skip(self))]
    pub fn congested_sections(&self, road_id: &str, now: NaiveDateTime) -> ApiResult<Vec<String>> {
        let threshold = self.config.congested_index_threshold;
        let mut congested = Vec::new();
        for section_id in self.source.sections_of_road(road_id)? {
            if let Some(index) = self.congestion_index(&section_id, now)? {
                if index > threshold {
                    congested.push(section_id);
                }
            }
        }
        debug!(road_id = %road_id, count = congested.len(), "拥堵路段筛选完成");
        Ok(congested)
    }

    // ==========================================
    // 风险
    // ==========================================

    /// 路段风险评估
    pub fn risk_assessment(&self, section_id: &str) -> ApiResult<RoadRiskAssessment> {
        let geometry = self.source.section_geometry(section_id)?;
        Ok(self.risk_engine.assess(&geometry))
    }

    // ==========================================
    // 天气
    // ==========================================

    /// 天气影响完整报告 (无观测时为 None)
    pub fn weather_report(
        &self,
        section_id: &str,
        at: NaiveDateTime,
    ) -> ApiResult<Option<WeatherImpactReport>> {
        let observation = match self.source.weather_for(section_id, at)? {
            Some(obs) => obs,
            None => {
                debug!(section_id = %section_id, at = %at, "无可用气象观测");
                return Ok(None);
            }
        };
        if let Err(e) = validate_weather(&observation) {
            warn!(section_id = %section_id, region_id = %observation.region_id, error = %e, "气象观测取值非法");
            return Err(e);
        }

        let base_speed_limit = self.base_speed_limit(section_id)?;
        Ok(Some(self.weather_scorer.evaluate(&observation, base_speed_limit)))
    }

    /// 天气影响指数 (0-10)
    pub fn weather_impact_index(&self, section_id: &str, at: NaiveDateTime) -> ApiResult<Option<f64>> {
        Ok(self
            .weather_report(section_id, at)?
            .map(|report| report.impact_index))
    }

    /// 建议限速 (km/h)
    pub fn suggested_speed_limit(&self, section_id: &str, at: NaiveDateTime) -> ApiResult<Option<i32>> {
        Ok(self
            .weather_report(section_id, at)?
            .map(|report| report.suggested_speed_limit))
    }

    fn base_speed_limit(&self, section_id: &str) -> ApiResult<u32> {
        Ok(self
            .source
            .base_speed_limit(section_id)?
            .unwrap_or(self.config.default_base_speed_limit))
    }

    // ==========================================
    // 高峰期
    // ==========================================

    /// now 是否处于路段任一启用规则的高峰期
    pub fn peak_period_active(&self, section_id: &str, now: NaiveDateTime) -> ApiResult<bool> {
        let rules = self.peak_rules(section_id)?;
        Ok(self.peak_matcher.any_rule_active(&rules, now))
    }

    /// 星期/时/分 是否命中路段任一启用规则
    ///
    /// # 参数
    /// - day_of_week: 1=周一 ... 7=周日
    pub fn peak_rule_applies(
        &self,
        section_id: &str,
        day_of_week: u32,
        hour: u32,
        minute: u32,
    ) -> ApiResult<bool> {
        validate_day_time(day_of_week, hour, minute)?;
        let rules = self.peak_rules(section_id)?;
        Ok(rules
            .iter()
            .filter(|rule| rule.is_active())
            .any(|rule| self.peak_matcher.applies_to(rule, day_of_week, hour, minute)))
    }

    /// 路段所有启用规则中最早的下次高峰期开始时间
    pub fn next_peak_period_start(
        &self,
        section_id: &str,
        now: NaiveDateTime,
    ) -> ApiResult<Option<NaiveDateTime>> {
        let rules = self.peak_rules(section_id)?;
        Ok(rules
            .iter()
            .filter_map(|rule| self.peak_matcher.next_peak_period_start(rule, now))
            .min())
    }

    /// 路段各规则在 now 时刻的状态
    pub fn peak_rule_states(
        &self,
        section_id: &str,
        now: NaiveDateTime,
    ) -> ApiResult<Vec<PeakRuleStatus>> {
        let rules = self.peak_rules(section_id)?;
        Ok(rules
            .iter()
            .map(|rule| PeakRuleStatus {
                rule_id: rule.rule_id.clone(),
                name: rule.name.clone(),
                time_range: rule.time_range_formatted(),
                state: self.peak_matcher.rule_state(rule, now),
            })
            .collect())
    }

    /// [from, to] 内命中任一启用规则的高峰分钟数
    pub fn peak_minutes_between(
        &self,
        section_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> ApiResult<u64> {
        validate_time_window(from, to)?;
        let rules = self.peak_rules(section_id)?;
        Ok(self.peak_matcher.union_overlapping_minutes(&rules, from, to))
    }

    fn peak_rules(&self, section_id: &str) -> ApiResult<Vec<PeakPeriodRule>> {
        let rules = self.source.peak_rules_for_section(section_id)?;
        for rule in &rules {
            if let Err(e) = validate_peak_rule(rule) {
                warn!(section_id = %section_id, rule_id = %rule.rule_id, error = %e, "高峰期规则非法");
                return Err(e);
            }
        }
        Ok(rules)
    }

    // ==========================================
    // 监测点级指标
    // ==========================================

    /// 监测点日均流量 (默认回溯 30 天)
    pub fn average_daily_flow(&self, point_id: &str, now: NaiveDateTime) -> ApiResult<Option<f64>> {
        let days = self.config.daily_flow_window_days;
        let samples = self.trailing_samples(point_id, now, days)?;
        Ok(self.flow_calculator.average_daily_flow(&samples, now, days))
    }

    /// 监测点峰谷比 (默认回溯 7 天)
    pub fn peak_valley_ratio(&self, point_id: &str, now: NaiveDateTime) -> ApiResult<Option<f64>> {
        let days = self.config.peak_valley_window_days;
        let samples = self.trailing_samples(point_id, now, days)?;
        Ok(self.flow_calculator.peak_valley_ratio(&samples, now, days))
    }

    /// 监测点流量/车速异常 (默认回溯 7 天)
    pub fn anomalies(&self, point_id: &str, now: NaiveDateTime) -> ApiResult<Vec<FlowAnomaly>> {
        let samples = self.trailing_samples(point_id, now, self.config.anomaly_window_days)?;
        Ok(self.anomaly_detector.detect(&samples, now))
    }

    /// 监测点 [from, to] 内的样本汇总
    pub fn flow_summary(
        &self,
        point_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> ApiResult<FlowWindowSummary> {
        validate_time_window(from, to)?;
        let samples = self.checked_samples(point_id, from, to)?;
        Ok(self.flow_calculator.window_summary(&samples))
    }

    fn trailing_samples(
        &self,
        point_id: &str,
        now: NaiveDateTime,
        days: i64,
    ) -> ApiResult<Vec<FlowSample>> {
        self.checked_samples(point_id, now - Duration::days(days), now)
    }

    fn checked_samples(
        &self,
        point_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> ApiResult<Vec<FlowSample>> {
        let samples = self.source.samples_in_window(point_id, from, to)?;
        for sample in &samples {
            self.check_sample(sample)?;
        }
        Ok(samples)
    }

    fn check_sample(&self, sample: &FlowSample) -> ApiResult<()> {
        validate_flow_sample(sample).map_err(|e| {
            warn!(point_id = %sample.point_id, record_time = %sample.record_time, error = %e, "流量样本取值非法");
            e
        })
    }

    // ==========================================
    // 路段指标快照
    // ==========================================

    /// 路段在 now 时刻的完整派生指标
    ///
    /// # 返回
    /// DerivedMetrics (缺失项为 None / Unknown)
    #[instrument(skip(self))]
    pub fn section_metrics(&self, section_id: &str, now: NaiveDateTime) -> ApiResult<DerivedMetrics> {
        let geometry = self.source.section_geometry(section_id)?;
        let assessment = self.risk_engine.assess(&geometry);

        let capacity = self.capacity_estimator.effective_capacity(&geometry);
        let traffic = self.current_traffic(section_id, now)?;
        let saturation = self.capacity_estimator.saturation(traffic.flow, capacity);
        let congestion_index = self.capacity_estimator.congestion_index(traffic.flow, capacity);

        let weather = self.weather_report(section_id, now)?;
        let in_peak_period = self.peak_period_active(section_id, now)?;

        let mut anomalies = Vec::new();
        for point_id in self.source.points_of_section(section_id)? {
            anomalies.extend(self.anomalies(&point_id, now)?);
        }
        anomalies.sort_by_key(|a| a.time);

        let metrics = DerivedMetrics {
            metrics_id: Uuid::new_v4().to_string(),
            section_id: section_id.to_string(),
            computed_at: now,
            current_flow: traffic.flow,
            current_speed: traffic.average_speed,
            effective_capacity: capacity,
            saturation,
            congestion_index,
            congestion_status: self.capacity_estimator.congestion_status(congestion_index),
            service_level: self
                .flow_calculator
                .service_level(congestion_index, traffic.average_speed),
            risk_index: assessment.risk_index,
            risk_level: RiskLevel::from_index(assessment.risk_index),
            weather_impact_index: weather.as_ref().map(|w| w.impact_index),
            suggested_speed_limit: weather.as_ref().map(|w| w.suggested_speed_limit),
            in_peak_period,
            anomalies,
        };

        debug!(
            section_id = %section_id,
            congestion_status = ?metrics.congestion_status,
            risk_level = ?metrics.risk_level,
            anomaly_count = metrics.anomalies.len(),
            "路段指标快照生成"
        );
        Ok(metrics)
    }
}
