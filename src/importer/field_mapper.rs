// ==========================================
// 恩施山区交通平台 - 流量样本字段映射器
// ==========================================
// 职责: CSV 行 → FlowSample (列名映射 + 类型转换)
// 约定: 空单元格 → None; 无法解析 → TypeConversionError
// ==========================================

use crate::domain::flow::FlowSample;
use crate::importer::error::{ImportError, ImportResult};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::str::FromStr;

// ==========================================
// 列名
// ==========================================
pub mod columns {
    pub const RECORD_TIME: &str = "record_time";
    pub const FLOW_RATE: &str = "flow_rate";
    pub const AVERAGE_SPEED: &str = "average_speed";
    pub const OCCUPANCY_RATE: &str = "occupancy_rate";
    pub const LARGE_VEHICLE_COUNT: &str = "large_vehicle_count";
    pub const MEDIUM_VEHICLE_COUNT: &str = "medium_vehicle_count";
    pub const SMALL_VEHICLE_COUNT: &str = "small_vehicle_count";
    pub const MAX_SPEED: &str = "max_speed";
    pub const MIN_SPEED: &str = "min_speed";
    pub const DATA_QUALITY: &str = "data_quality";
}

/// 支持的时间格式 (按顺序尝试)
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y%m%d%H%M%S",
];

pub struct FlowSampleFieldMapper;

impl FlowSampleFieldMapper {
    /// 映射单行
    ///
    /// # 参数
    /// - `point_id`: 样本归属的监测点 (CSV 中不携带)
    /// - `row`: 表头 → 单元格
    /// - `row_number`: 数据行号 (用于错误定位)
    pub fn map_row(
        &self,
        point_id: &str,
        row: &HashMap<String, String>,
        row_number: usize,
    ) -> ImportResult<FlowSample> {
        let record_time = self
            .parse_datetime(row, columns::RECORD_TIME, row_number)?
            .ok_or_else(|| ImportError::ValidationError {
                row: row_number,
                message: format!("{} 为空", columns::RECORD_TIME),
            })?;

        let mut sample = FlowSample::new(point_id, record_time);
        sample.flow_rate = self.parse(row, columns::FLOW_RATE, row_number)?;
        sample.average_speed = self.parse(row, columns::AVERAGE_SPEED, row_number)?;
        sample.occupancy_rate = self.parse(row, columns::OCCUPANCY_RATE, row_number)?;
        sample.large_vehicle_count = self.parse(row, columns::LARGE_VEHICLE_COUNT, row_number)?;
        sample.medium_vehicle_count = self.parse(row, columns::MEDIUM_VEHICLE_COUNT, row_number)?;
        sample.small_vehicle_count = self.parse(row, columns::SMALL_VEHICLE_COUNT, row_number)?;
        sample.max_speed = self.parse(row, columns::MAX_SPEED, row_number)?;
        sample.min_speed = self.parse(row, columns::MIN_SPEED, row_number)?;
        sample.data_quality = self.parse(row, columns::DATA_QUALITY, row_number)?;
        Ok(sample)
    }

    fn get_string<'a>(&self, row: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
        row.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    /// 解析数值 (整数列拒绝负数与小数)
    fn parse<T: FromStr>(
        &self,
        row: &HashMap<String, String>,
        key: &str,
        row_number: usize,
    ) -> ImportResult<Option<T>> {
        match self.get_string(row, key) {
            None => Ok(None),
            Some(value) => value
                .parse::<T>()
                .map(Some)
                .map_err(|_| ImportError::TypeConversionError {
                    row: row_number,
                    field: key.to_string(),
                    message: format!("无法解析为{}: {}", std::any::type_name::<T>(), value),
                }),
        }
    }

    fn parse_datetime(
        &self,
        row: &HashMap<String, String>,
        key: &str,
        row_number: usize,
    ) -> ImportResult<Option<NaiveDateTime>> {
        match self.get_string(row, key) {
            None => Ok(None),
            Some(value) => DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(Some)
                .ok_or_else(|| ImportError::TypeConversionError {
                    row: row_number,
                    field: key.to_string(),
                    message: format!("日期时间格式错误: {}", value),
                }),
        }
    }
}
