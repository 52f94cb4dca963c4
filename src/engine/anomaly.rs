// ==========================================
// 恩施山区交通平台 - 流量异常检测引擎
// ==========================================
// 职责: 相邻样本变化率扫描 (流量突增/突降, 速度骤增/骤降)
// 输入: 单监测点样本序列
// 输出: FlowAnomaly 列表 (按时间顺序, 同一对样本先流量后速度)
// ==========================================

use crate::domain::flow::FlowSample;
use crate::domain::metrics::FlowAnomaly;
use crate::domain::types::{AnomalyKind, AnomalyMetric};
use chrono::{Duration, NaiveDateTime};
use tracing::{debug, instrument};

/// 流量变化率阈值
pub const DEFAULT_FLOW_CHANGE_THRESHOLD: f64 = 0.5;
/// 速度变化率阈值
pub const DEFAULT_SPEED_CHANGE_THRESHOLD: f64 = 0.3;
/// 最少样本数
pub const DEFAULT_MIN_SAMPLES: usize = 10;
/// 检测窗口 (天)
pub const DEFAULT_ANOMALY_WINDOW_DAYS: i64 = 7;

// ==========================================
// AnomalyDetector - 异常检测引擎
// ==========================================
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    flow_threshold: f64,
    speed_threshold: f64,
    min_samples: usize,
    window_days: i64,
}

impl AnomalyDetector {
    /// 使用默认阈值
    pub fn new() -> Self {
        Self {
            flow_threshold: DEFAULT_FLOW_CHANGE_THRESHOLD,
            speed_threshold: DEFAULT_SPEED_CHANGE_THRESHOLD,
            min_samples: DEFAULT_MIN_SAMPLES,
            window_days: DEFAULT_ANOMALY_WINDOW_DAYS,
        }
    }

    /// 自定义阈值
    ///
    /// # 参数
    /// - `flow_threshold`: 流量变化率阈值 (|ratio| 超过即异常)
    /// - `speed_threshold`: 速度变化率阈值
    /// - `min_samples`: 窗口内最少样本数, 不足时不检测
    /// - `window_days`: 回溯窗口天数
    pub fn with_thresholds(
        flow_threshold: f64,
        speed_threshold: f64,
        min_samples: usize,
        window_days: i64,
    ) -> Self {
        Self {
            flow_threshold,
            speed_threshold,
            min_samples,
            window_days,
        }
    }

    /// 检测 (now - window_days, ...) 内的异常
    ///
    /// 样本会先按 record_time 排序; 窗口内样本数不足 min_samples 时返回空列表
    #[instrument(skip(self, samples), fields(count = samples.len()))]
    pub fn detect(&self, samples: &[FlowSample], now: NaiveDateTime) -> Vec<FlowAnomaly> {
        let window_start = now - Duration::days(self.window_days);

        let mut recent: Vec<&FlowSample> = samples
            .iter()
            .filter(|s| s.record_time > window_start)
            .collect();

        if recent.len() < self.min_samples {
            debug!(
                recent = recent.len(),
                min_samples = self.min_samples,
                "样本不足, 跳过异常检测"
            );
            return Vec::new();
        }

        recent.sort_by_key(|s| s.record_time);

        let mut anomalies = Vec::new();
        for pair in recent.windows(2) {
            let (prev, curr) = (pair[0], pair[1]);

            if let (Some(before), Some(after)) = (prev.flow_rate, curr.flow_rate) {
                let (before, after) = (before as f64, after as f64);
                let ratio = change_ratio(before, after);
                if ratio.abs() > self.flow_threshold {
                    anomalies.push(FlowAnomaly {
                        time: curr.record_time,
                        metric: AnomalyMetric::Flow,
                        kind: if ratio > 0.0 {
                            AnomalyKind::Spike
                        } else {
                            AnomalyKind::Drop
                        },
                        change_pct: ratio * 100.0,
                        before,
                        after,
                    });
                }
            }

            if let (Some(before), Some(after)) = (prev.average_speed, curr.average_speed) {
                let ratio = change_ratio(before, after);
                if ratio.abs() > self.speed_threshold {
                    anomalies.push(FlowAnomaly {
                        time: curr.record_time,
                        metric: AnomalyMetric::Speed,
                        kind: if ratio < 0.0 {
                            AnomalyKind::Plunge
                        } else {
                            AnomalyKind::Surge
                        },
                        change_pct: ratio * 100.0,
                        before,
                        after,
                    });
                }
            }
        }

        anomalies
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// 变化率 (after - before) / before, before ≤ 0 时为 0
fn change_ratio(before: f64, after: f64) -> f64 {
    if before > 0.0 {
        (after - before) / before
    } else {
        0.0
    }
}

// ==========================================
// 单元测试
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn series(flows: &[u32]) -> Vec<FlowSample> {
        flows
            .iter()
            .enumerate()
            .map(|(i, flow)| {
                let mut s = FlowSample::new("P001", at(i as u32));
                s.flow_rate = Some(*flow);
                s
            })
            .collect()
    }

    #[test]
    fn test_single_spike() {
        let detector = AnomalyDetector::new();
        let mut flows = vec![100; 10];
        for f in flows.iter_mut().skip(5) {
            *f = 160;
        }
        let anomalies = detector.detect(&series(&flows), at(23));

        assert_eq!(anomalies.len(), 1);
        let a = &anomalies[0];
        assert_eq!(a.kind, AnomalyKind::Spike);
        assert_eq!(a.metric, AnomalyMetric::Flow);
        assert_eq!(a.time, at(5));
        assert_eq!(a.before, 100.0);
        assert_eq!(a.after, 160.0);
        assert!((a.change_pct - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_too_few_samples() {
        let detector = AnomalyDetector::new();
        let mut flows = vec![100; 9];
        flows[5] = 160;
        assert!(detector.detect(&series(&flows), at(23)).is_empty());
    }

    #[test]
    fn test_zero_previous_flow_is_not_anomalous() {
        let detector = AnomalyDetector::new();
        let mut flows = vec![100; 10];
        flows[3] = 0;
        flows[4] = 0;
        let anomalies = detector.detect(&series(&flows), at(23));
        // 100 → 0 为突降; 0 → 0 与 0 → 100 变化率按 0 处理
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind, AnomalyKind::Drop);
        assert_eq!(anomalies[0].time, at(3));
    }

    #[test]
    fn test_flow_before_speed_and_unsorted_input() {
        let detector = AnomalyDetector::new();
        let mut samples = series(&[100; 10]);
        samples[6].flow_rate = Some(20);
        for (i, s) in samples.iter_mut().enumerate() {
            s.average_speed = Some(if i == 6 { 30.0 } else { 60.0 });
        }
        samples.reverse();

        let anomalies = detector.detect(&samples, at(23));
        let kinds: Vec<AnomalyKind> = anomalies.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                AnomalyKind::Drop,
                AnomalyKind::Plunge,
                AnomalyKind::Spike,
                AnomalyKind::Surge
            ]
        );
        assert_eq!(anomalies[0].time, at(6));
        assert_eq!(anomalies[2].time, at(7));
    }

    #[test]
    fn test_window_excludes_old_samples() {
        let detector = AnomalyDetector::new();
        let mut samples = series(&[100; 10]);
        samples[0].record_time = at(0) - Duration::days(10);
        // 窗口内仅剩 9 条
        assert!(detector.detect(&samples, at(23)).is_empty());
    }
}
