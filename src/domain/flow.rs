// ==========================================
// 恩施山区交通平台 - 交通流量样本领域模型
// ==========================================
// 职责: 监测点单次采集样本 (按 record_time 升序, 对核心只追加)
// 用途: 导入层/数据源写入, 引擎层只读
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// 车型 (Vehicle Class)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VehicleClass {
    Large,  // 大型车
    Medium, // 中型车
    Small,  // 小型车
}

// ==========================================
// FlowSample - 交通流量样本
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowSample {
    // ===== 关联 =====
    pub point_id: String,           // 监测点ID
    pub record_time: NaiveDateTime, // 采集时间

    // ===== 流量与速度 =====
    #[serde(default)]
    pub flow_rate: Option<u32>, // 流量 (辆/小时)
    #[serde(default)]
    pub average_speed: Option<f64>, // 平均车速 (km/h)
    #[serde(default)]
    pub occupancy_rate: Option<f64>, // 占有率 (%)
    #[serde(default)]
    pub max_speed: Option<f64>, // 最高车速
    #[serde(default)]
    pub min_speed: Option<f64>, // 最低车速

    // ===== 车型构成 =====
    #[serde(default)]
    pub large_vehicle_count: Option<u32>,
    #[serde(default)]
    pub medium_vehicle_count: Option<u32>,
    #[serde(default)]
    pub small_vehicle_count: Option<u32>,

    // ===== 数据质量 =====
    #[serde(default)]
    pub data_quality: Option<u8>, // 0-100
}

impl FlowSample {
    /// 创建只含时间戳的空样本
    pub fn new(point_id: impl Into<String>, record_time: NaiveDateTime) -> Self {
        Self {
            point_id: point_id.into(),
            record_time,
            flow_rate: None,
            average_speed: None,
            occupancy_rate: None,
            max_speed: None,
            min_speed: None,
            large_vehicle_count: None,
            medium_vehicle_count: None,
            small_vehicle_count: None,
            data_quality: None,
        }
    }

    /// 某车型计数
    pub fn class_count(&self, class: VehicleClass) -> Option<u32> {
        match class {
            VehicleClass::Large => self.large_vehicle_count,
            VehicleClass::Medium => self.medium_vehicle_count,
            VehicleClass::Small => self.small_vehicle_count,
        }
    }

    /// 车辆总数 (缺失计数按 0)
    pub fn total_vehicle_count(&self) -> u64 {
        [
            self.large_vehicle_count,
            self.medium_vehicle_count,
            self.small_vehicle_count,
        ]
        .iter()
        .map(|count| u64::from(count.unwrap_or(0)))
        .sum()
    }

    /// 车型占比 (%), 总数为 0 或计数缺失时为 0
    pub fn class_percentage(&self, class: VehicleClass) -> f64 {
        let total = self.total_vehicle_count();
        match self.class_count(class) {
            Some(count) if total > 0 => count as f64 / total as f64 * 100.0,
            _ => 0.0,
        }
    }

    /// 速度离散度: 用极差估算 (max - min) / 4
    pub fn speed_variation(&self) -> Option<f64> {
        match (self.max_speed, self.min_speed, self.average_speed) {
            (Some(max), Some(min), Some(_)) => Some((max - min) / 4.0),
            _ => None,
        }
    }

    /// 样本距 now 的分钟数
    pub fn age_in_minutes(&self, now: NaiveDateTime) -> i64 {
        (now - self.record_time).num_minutes()
    }
}
