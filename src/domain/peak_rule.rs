// ==========================================
// 恩施山区交通平台 - 高峰期规则领域模型
// ==========================================
// 职责: 高峰期规则定义 (时间段 + 星期掩码 + 生效日期)
// 红线: 匹配逻辑由 engine::peak_period 负责, 此处只维护规则数据
// 星期掩码: 7 位, bit0 = 周一 ... bit6 = 周日
// ==========================================

use crate::domain::types::RuleStatus;
use chrono::{NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// 工作日掩码 (周一至周五)
pub const WORKDAYS_MASK: u8 = 0b001_1111;
/// 周末掩码 (周六、周日)
pub const WEEKENDS_MASK: u8 = 0b110_0000;
/// 全部星期
pub const ALL_DAYS_MASK: u8 = 0b111_1111;

// ==========================================
// PeakPeriodRule - 高峰期规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeakPeriodRule {
    pub rule_id: String, // 规则ID
    pub name: String,    // 规则名称

    // ===== 时间段 (结束早于开始表示跨零点) =====
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,

    // ===== 适用范围 =====
    #[serde(default)]
    pub applicable_days: Option<u8>, // 星期掩码, None 表示每天
    #[serde(default)]
    pub effective_from: Option<NaiveDate>, // 生效起始日 (含)
    #[serde(default)]
    pub effective_to: Option<NaiveDate>, // 生效截止日 (含)

    // ===== 元数据 =====
    #[serde(default)]
    pub priority: Option<i32>, // 仅存储, 不参与匹配
    #[serde(default)]
    pub status: RuleStatus,
}

impl PeakPeriodRule {
    /// 创建每天生效的活跃规则
    pub fn new(
        rule_id: impl Into<String>,
        name: impl Into<String>,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            name: name.into(),
            start_time: Some(start_time),
            end_time: Some(end_time),
            applicable_days: None,
            effective_from: None,
            effective_to: None,
            priority: None,
            status: RuleStatus::Active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == RuleStatus::Active
    }

    pub fn activate(&mut self) {
        self.status = RuleStatus::Active;
    }

    pub fn deactivate(&mut self) {
        self.status = RuleStatus::Inactive;
    }

    /// 是否跨零点 (结束时间早于开始时间)
    pub fn wraps_midnight(&self) -> bool {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end < start,
            _ => false,
        }
    }

    // ==========================================
    // 星期掩码
    // ==========================================

    /// 指定星期 (1=周一 ... 7=周日) 是否适用
    ///
    /// 掩码缺失视为每天适用; 超出 1..=7 的星期不适用
    pub fn is_day_applicable(&self, day_of_week: u32) -> bool {
        if !(1..=7).contains(&day_of_week) {
            return false;
        }
        match self.applicable_days {
            None => true,
            Some(mask) => mask & (1u8 << (day_of_week - 1)) != 0,
        }
    }

    /// 按 chrono 星期判断
    pub fn is_weekday_applicable(&self, weekday: Weekday) -> bool {
        self.is_day_applicable(weekday.number_from_monday())
    }

    /// 适用星期列表 (1..=7 升序), 掩码缺失返回全部
    pub fn applicable_weekdays(&self) -> Vec<u32> {
        (1..=7).filter(|d| self.is_day_applicable(*d)).collect()
    }

    /// 设置适用星期; 越界值忽略, 空集合得到掩码 0
    pub fn set_applicable_days(&mut self, days: &[u32]) {
        let mask = days
            .iter()
            .filter(|d| (1..=7).contains(*d))
            .fold(0u8, |acc, d| acc | (1u8 << (d - 1)));
        self.applicable_days = Some(mask);
    }

    /// 仅工作日
    pub fn set_workdays_only(&mut self) {
        self.applicable_days = Some(WORKDAYS_MASK);
    }

    /// 仅周末
    pub fn set_weekends_only(&mut self) {
        self.applicable_days = Some(WEEKENDS_MASK);
    }

    /// 时间段格式化 `HH:MM - HH:MM`, 任一端缺失返回空串
    pub fn time_range_formatted(&self) -> String {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => {
                format!("{} - {}", start.format("%H:%M"), end.format("%H:%M"))
            }
            _ => String::new(),
        }
    }
}
