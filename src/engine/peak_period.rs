// ==========================================
// 恩施山区交通平台 - 高峰期规则匹配引擎
// ==========================================
// 职责: 星期/时段匹配 (支持跨零点) + 生效日期约束 + 下次高峰推算
// 输入: PeakPeriodRule + 时间点
// 输出: 是否处于高峰期 / 下次高峰开始时间 / 规则状态
// 红线: priority 不参与匹配; 同一路段多条规则按 OR 组合
// ==========================================

use crate::domain::peak_rule::PeakPeriodRule;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// 默认下次高峰搜索范围 (天)
pub const DEFAULT_NEXT_PEAK_HORIZON_DAYS: u32 = 7;

// ==========================================
// 规则状态 (某时刻)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "state")]
pub enum PeakRuleState {
    Inactive,                   // 规则未启用
    Pending { from: NaiveDate }, // 尚未生效
    Expired { to: NaiveDate },   // 已过期
    InPeak,                     // 当前处于高峰期
    OutOfPeak,                  // 当前不在高峰期
}

// ==========================================
// PeakPeriodMatcher - 高峰期匹配引擎
// ==========================================
pub struct PeakPeriodMatcher {
    next_peak_horizon_days: u32,
}

impl PeakPeriodMatcher {
    pub fn new() -> Self {
        Self {
            next_peak_horizon_days: DEFAULT_NEXT_PEAK_HORIZON_DAYS,
        }
    }

    /// 指定下次高峰搜索范围
    pub fn with_horizon(next_peak_horizon_days: u32) -> Self {
        Self {
            next_peak_horizon_days,
        }
    }

    // ==========================================
    // 匹配
    // ==========================================

    /// 判断 (星期, 时, 分) 是否命中规则
    ///
    /// # 参数
    /// - `day_of_week`: 1=周一 ... 7=周日
    /// - `hour`: 0-23
    /// - `minute`: 0-59
    ///
    /// # 返回
    /// 起止时间缺失、星期不适用或时刻越界时返回 false
    pub fn applies_to(
        &self,
        rule: &PeakPeriodRule,
        day_of_week: u32,
        hour: u32,
        minute: u32,
    ) -> bool {
        if rule.start_time.is_none() || rule.end_time.is_none() {
            return false;
        }
        if !rule.is_day_applicable(day_of_week) {
            return false;
        }
        match NaiveTime::from_hms_opt(hour, minute, 0) {
            Some(t) => self.time_matches(rule, t),
            None => false,
        }
    }

    /// 判断时间点是否处于规则高峰期内 (含生效日期约束, 边界日期包含在内)
    pub fn is_in_peak_period(&self, rule: &PeakPeriodRule, at: NaiveDateTime) -> bool {
        if rule.start_time.is_none() || rule.end_time.is_none() {
            return false;
        }
        if !self.is_date_effective(rule, at.date()) {
            return false;
        }
        if !rule.is_weekday_applicable(at.weekday()) {
            return false;
        }
        self.time_matches(rule, at.time())
    }

    /// 多条规则 OR 组合 (跳过未启用规则)
    #[instrument(skip(self, rules), fields(count = rules.len()))]
    pub fn any_rule_active(&self, rules: &[PeakPeriodRule], at: NaiveDateTime) -> bool {
        self.matches_any(rules, at)
    }

    // ==========================================
    // 推算
    // ==========================================

    /// 下次高峰期开始时间
    ///
    /// 规则:
    /// 1. 开始时间缺失或规则未启用 → None
    /// 2. 今天早于生效起始日 → 从起始日开始找第一个适用日
    /// 3. 今天晚于生效截止日 → None
    /// 4. 今天适用且 now 早于今天开始时间 → 今天
    /// 5. 向后搜索 horizon 天, 超出截止日即停止
    pub fn next_peak_period_start(
        &self,
        rule: &PeakPeriodRule,
        now: NaiveDateTime,
    ) -> Option<NaiveDateTime> {
        let start_time = rule.start_time?;
        if !rule.is_active() {
            return None;
        }

        let today = now.date();

        if let Some(from) = rule.effective_from.filter(|from| today < *from) {
            return (0..self.next_peak_horizon_days as i64)
                .map(|offset| from + Duration::days(offset))
                .find(|date| rule.is_weekday_applicable(date.weekday()))
                .map(|date| date.and_time(start_time));
        }

        if rule.effective_to.map_or(false, |to| today > to) {
            return None;
        }

        let today_start = today.and_time(start_time);
        if now < today_start && rule.is_weekday_applicable(today.weekday()) {
            return Some(today_start);
        }

        for offset in 1..=self.next_peak_horizon_days as i64 {
            let date = today + Duration::days(offset);
            if rule.effective_to.map_or(false, |to| date > to) {
                return None;
            }
            if rule.is_weekday_applicable(date.weekday()) {
                return Some(date.and_time(start_time));
            }
        }

        None
    }

    /// 规则在 now 时刻的状态
    pub fn rule_state(&self, rule: &PeakPeriodRule, now: NaiveDateTime) -> PeakRuleState {
        if !rule.is_active() {
            return PeakRuleState::Inactive;
        }

        let today = now.date();
        if let Some(from) = rule.effective_from.filter(|from| today < *from) {
            return PeakRuleState::Pending { from };
        }
        if let Some(to) = rule.effective_to.filter(|to| today > *to) {
            return PeakRuleState::Expired { to };
        }

        if self.is_in_peak_period(rule, now) {
            PeakRuleState::InPeak
        } else {
            PeakRuleState::OutOfPeak
        }
    }

    /// [from, to] 内落在高峰期的分钟数 (按分钟步进, 两端包含)
    ///
    /// from > to 时返回 0
    pub fn overlapping_minutes(
        &self,
        rule: &PeakPeriodRule,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> u64 {
        self.count_minutes(from, to, |t| self.is_in_peak_period(rule, t))
    }

    /// 多条规则按"或"合并后的高峰分钟数, 重叠时段只计一次
    pub fn union_overlapping_minutes(
        &self,
        rules: &[PeakPeriodRule],
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> u64 {
        self.count_minutes(from, to, |t| self.matches_any(rules, t))
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    fn matches_any(&self, rules: &[PeakPeriodRule], at: NaiveDateTime) -> bool {
        rules
            .iter()
            .filter(|rule| rule.is_active())
            .any(|rule| self.is_in_peak_period(rule, at))
    }

    /// 按分钟步进 [from, to] (含两端), from > to 时为 0
    fn count_minutes<F>(&self, from: NaiveDateTime, to: NaiveDateTime, in_peak: F) -> u64
    where
        F: Fn(NaiveDateTime) -> bool,
    {
        let mut minutes = 0;
        let mut current = from;
        while current <= to {
            if in_peak(current) {
                minutes += 1;
            }
            current += Duration::minutes(1);
        }
        minutes
    }

    /// 时刻匹配: 跨零点时 t ≥ start 或 t ≤ end, 否则 start ≤ t ≤ end
    fn time_matches(&self, rule: &PeakPeriodRule, t: NaiveTime) -> bool {
        match (rule.start_time, rule.end_time) {
            (Some(start), Some(end)) if end < start => t >= start || t <= end,
            (Some(start), Some(end)) => start <= t && t <= end,
            _ => false,
        }
    }

    fn is_date_effective(&self, rule: &PeakPeriodRule, date: NaiveDate) -> bool {
        if rule.effective_from.map_or(false, |from| date < from) {
            return false;
        }
        if rule.effective_to.map_or(false, |to| date > to) {
            return false;
        }
        true
    }
}

impl Default for PeakPeriodMatcher {
    fn default() -> Self {
        Self::new()
    }
}
