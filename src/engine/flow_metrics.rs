// ==========================================
// 恩施山区交通平台 - 交通流量指标引擎
// ==========================================
// 职责: 单样本分类 + 时间窗聚合
// 输入: FlowSample 序列 (调用方已按监测点取数)
// 输出: 拥堵等级 / 高峰小时标记 / 日均流量 / 峰谷比 / 窗口汇总 / 服务水平
// 红线: 所有比值先检查分母
// ==========================================

use crate::domain::flow::FlowSample;
use crate::domain::metrics::FlowWindowSummary;
use crate::domain::types::{CongestionLevel, ServiceLevel};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use std::collections::BTreeMap;
use tracing::instrument;

/// 日均流量默认窗口 (天)
pub const DEFAULT_DAILY_FLOW_WINDOW_DAYS: i64 = 30;
/// 峰谷比默认窗口 (天)
pub const DEFAULT_PEAK_VALLEY_WINDOW_DAYS: i64 = 7;

// ==========================================
// FlowMetricsCalculator - 流量指标计算器
// ==========================================
pub struct FlowMetricsCalculator {
    // 无状态引擎
}

impl FlowMetricsCalculator {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 单样本指标
    // ==========================================

    /// 单样本拥堵等级 (占有率 + 平均车速)
    ///
    /// 规则:
    /// - 占有率≥40 或 (占有率≥25 且 车速≤20) → 严重
    /// - 占有率≥25 或 (占有率≥15 且 车速≤30) → 中度
    /// - 占有率≥15 或 车速≤40 → 轻度
    /// - 其余 → 畅通
    /// - 任一缺失 → 未知
    pub fn congestion_level(&self, sample: &FlowSample) -> CongestionLevel {
        let (occupancy, speed) = match (sample.occupancy_rate, sample.average_speed) {
            (Some(o), Some(s)) => (o, s),
            _ => return CongestionLevel::Unknown,
        };

        if occupancy >= 40.0 || (occupancy >= 25.0 && speed <= 20.0) {
            CongestionLevel::Severe
        } else if occupancy >= 25.0 || (occupancy >= 15.0 && speed <= 30.0) {
            CongestionLevel::Moderate
        } else if occupancy >= 15.0 || speed <= 40.0 {
            CongestionLevel::Light
        } else {
            CongestionLevel::Clear
        }
    }

    /// 高峰小时: 工作日 且 时段 ∈ [7,9) ∪ [17,19)
    pub fn is_peak_hour(&self, at: NaiveDateTime) -> bool {
        let is_weekday = at.weekday().number_from_monday() <= 5;
        let hour = at.hour();
        let is_morning = (7..9).contains(&hour);
        let is_evening = (17..19).contains(&hour);
        is_weekday && (is_morning || is_evening)
    }

    // ==========================================
    // 时间窗聚合
    // ==========================================

    /// 日均流量
    ///
    /// 取 (now - window_days, ...) 内有流量的样本, 按自然日分组求日均, 再对各日求平均
    ///
    /// # 返回
    /// 无有效样本时返回 None
    #[instrument(skip(self, samples), fields(count = samples.len()))]
    pub fn average_daily_flow(
        &self,
        samples: &[FlowSample],
        now: NaiveDateTime,
        window_days: i64,
    ) -> Option<f64> {
        let window_start = now - Duration::days(window_days);

        let mut daily: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
        for sample in samples.iter().filter(|s| s.record_time > window_start) {
            if let Some(flow) = sample.flow_rate {
                let entry = daily.entry(sample.record_time.date()).or_insert((0.0, 0));
                entry.0 += flow as f64;
                entry.1 += 1;
            }
        }

        mean(daily.values().map(|(sum, n)| sum / *n as f64))
    }

    /// 峰谷比
    ///
    /// 取 (now - window_days, ...) 内有流量的样本, 按小时分组求均值, 返回 max/min
    ///
    /// # 返回
    /// 无样本或最低小时均值为 0 时返回 None
    #[instrument(skip(self, samples), fields(count = samples.len()))]
    pub fn peak_valley_ratio(
        &self,
        samples: &[FlowSample],
        now: NaiveDateTime,
        window_days: i64,
    ) -> Option<f64> {
        let window_start = now - Duration::days(window_days);

        let mut hourly: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
        for sample in samples.iter().filter(|s| s.record_time > window_start) {
            if let Some(flow) = sample.flow_rate {
                let entry = hourly.entry(sample.record_time.hour()).or_insert((0.0, 0));
                entry.0 += flow as f64;
                entry.1 += 1;
            }
        }

        if hourly.is_empty() {
            return None;
        }

        let hourly_means: Vec<f64> = hourly.values().map(|(sum, n)| sum / *n as f64).collect();
        let max = hourly_means.iter().copied().fold(f64::MIN, f64::max);
        let min = hourly_means.iter().copied().fold(f64::MAX, f64::min);

        if min == 0.0 {
            return None;
        }
        Some(max / min)
    }

    /// 样本集合汇总 (样本数/平均流量/平均车速/最大最小流量/峰值系数)
    pub fn window_summary(&self, samples: &[FlowSample]) -> FlowWindowSummary {
        let flows: Vec<u32> = samples.iter().filter_map(|s| s.flow_rate).collect();
        let average_flow = mean(flows.iter().map(|f| *f as f64));
        let average_speed = mean(samples.iter().filter_map(|s| s.average_speed));
        let max_flow = flows.iter().copied().max();
        let min_flow = flows.iter().copied().min();

        let peak_factor = match (max_flow, average_flow) {
            (Some(max), Some(avg)) if avg != 0.0 => Some(max as f64 / avg),
            _ => None,
        };

        FlowWindowSummary {
            sample_count: samples.len(),
            average_flow,
            average_speed,
            max_flow,
            min_flow,
            peak_factor,
        }
    }

    /// 服务水平 (A 最畅通 ... F 极度拥堵)
    ///
    /// - 拥堵指数<2 且 车速>60 → A
    /// - <3 且 >50 → B
    /// - <4 且 >40 → C
    /// - <6 且 >30 → D
    /// - <8 且 >20 → E
    /// - 其余 → F
    pub fn service_level(
        &self,
        average_congestion_index: Option<f64>,
        average_speed: Option<f64>,
    ) -> ServiceLevel {
        let (index, speed) = match (average_congestion_index, average_speed) {
            (Some(i), Some(s)) => (i, s),
            _ => return ServiceLevel::Unknown,
        };

        if index < 2.0 && speed > 60.0 {
            ServiceLevel::A
        } else if index < 3.0 && speed > 50.0 {
            ServiceLevel::B
        } else if index < 4.0 && speed > 40.0 {
            ServiceLevel::C
        } else if index < 6.0 && speed > 30.0 {
            ServiceLevel::D
        } else if index < 8.0 && speed > 20.0 {
            ServiceLevel::E
        } else {
            ServiceLevel::F
        }
    }
}

impl Default for FlowMetricsCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// 算术平均, 空序列返回 None
pub(crate) fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn sample(time: NaiveDateTime, flow: Option<u32>) -> FlowSample {
        let mut s = FlowSample::new("P001", time);
        s.flow_rate = flow;
        s
    }

    #[test]
    fn test_congestion_level_ladder() {
        let calc = FlowMetricsCalculator::new();
        let mut s = FlowSample::new("P001", at(10, 8));
        assert_eq!(calc.congestion_level(&s), CongestionLevel::Unknown);

        let cases = [
            (45.0, 60.0, CongestionLevel::Severe),
            (30.0, 15.0, CongestionLevel::Severe),
            (30.0, 50.0, CongestionLevel::Moderate),
            (20.0, 25.0, CongestionLevel::Moderate),
            (20.0, 50.0, CongestionLevel::Light),
            (5.0, 35.0, CongestionLevel::Light),
            (5.0, 70.0, CongestionLevel::Clear),
        ];
        for (occupancy, speed, expected) in cases {
            s.occupancy_rate = Some(occupancy);
            s.average_speed = Some(speed);
            assert_eq!(calc.congestion_level(&s), expected, "occ={} speed={}", occupancy, speed);
        }
    }

    #[test]
    fn test_is_peak_hour() {
        let calc = FlowMetricsCalculator::new();
        // 2025-03-10 周一
        assert!(calc.is_peak_hour(at(10, 7)));
        assert!(calc.is_peak_hour(at(10, 18)));
        assert!(!calc.is_peak_hour(at(10, 9)));
        assert!(!calc.is_peak_hour(at(10, 19)));
        // 2025-03-15 周六
        assert!(!calc.is_peak_hour(at(15, 8)));
    }

    #[test]
    fn test_average_daily_flow() {
        let calc = FlowMetricsCalculator::new();
        let now = at(20, 12);
        let samples = vec![
            sample(at(18, 8), Some(100)),
            sample(at(18, 9), Some(300)), // 日均 200
            sample(at(19, 8), Some(400)), // 日均 400
            sample(at(19, 9), None),
        ];
        assert_eq!(calc.average_daily_flow(&samples, now, 30), Some(300.0));
        assert_eq!(calc.average_daily_flow(&[], now, 30), None);
    }

    #[test]
    fn test_daily_window_is_strict() {
        let calc = FlowMetricsCalculator::new();
        let now = at(20, 12);
        // 恰好 now - 2 天的样本不计入
        let samples = vec![sample(at(18, 12), Some(999)), sample(at(19, 12), Some(100))];
        assert_eq!(calc.average_daily_flow(&samples, now, 2), Some(100.0));
    }

    #[test]
    fn test_peak_valley_ratio() {
        let calc = FlowMetricsCalculator::new();
        let now = at(20, 23);
        let samples = vec![
            sample(at(19, 3), Some(100)),
            sample(at(20, 3), Some(100)),
            sample(at(19, 8), Some(700)),
            sample(at(20, 8), Some(900)),
        ];
        assert_eq!(calc.peak_valley_ratio(&samples, now, 7), Some(8.0));

        let zero_hour = vec![sample(at(19, 3), Some(0)), sample(at(19, 8), Some(500))];
        assert_eq!(calc.peak_valley_ratio(&zero_hour, now, 7), None);
        assert_eq!(calc.peak_valley_ratio(&[], now, 7), None);
    }

    #[test]
    fn test_window_summary() {
        let calc = FlowMetricsCalculator::new();
        let mut samples = vec![
            sample(at(10, 7), Some(200)),
            sample(at(10, 8), Some(400)),
            sample(at(10, 9), None),
        ];
        samples[0].average_speed = Some(50.0);
        samples[1].average_speed = Some(30.0);

        let summary = calc.window_summary(&samples);
        assert_eq!(summary.sample_count, 3);
        assert_eq!(summary.average_flow, Some(300.0));
        assert_eq!(summary.average_speed, Some(40.0));
        assert_eq!(summary.max_flow, Some(400));
        assert_eq!(summary.min_flow, Some(200));
        assert!((summary.peak_factor.unwrap() - 4.0 / 3.0).abs() < 1e-9);

        let empty = calc.window_summary(&[]);
        assert_eq!(empty.peak_factor, None);
    }

    #[test]
    fn test_service_level() {
        let calc = FlowMetricsCalculator::new();
        assert_eq!(calc.service_level(None, Some(80.0)), ServiceLevel::Unknown);
        assert_eq!(calc.service_level(Some(1.0), Some(70.0)), ServiceLevel::A);
        assert_eq!(calc.service_level(Some(1.0), Some(55.0)), ServiceLevel::B);
        assert_eq!(calc.service_level(Some(3.5), Some(45.0)), ServiceLevel::C);
        assert_eq!(calc.service_level(Some(5.0), Some(35.0)), ServiceLevel::D);
        assert_eq!(calc.service_level(Some(7.0), Some(25.0)), ServiceLevel::E);
        assert_eq!(calc.service_level(Some(9.0), Some(80.0)), ServiceLevel::F);
    }
}
