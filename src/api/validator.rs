// ==========================================
// 恩施山区交通平台 - 输入校验器
// ==========================================
// 职责: 在进入引擎前拒绝非法输入 (快速失败)
// 覆盖: 时间窗 / 星期时分 / 星期掩码 / 样本与气象取值范围
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::flow::FlowSample;
use crate::domain::peak_rule::{PeakPeriodRule, ALL_DAYS_MASK};
use crate::domain::weather::WeatherObservation;
use chrono::NaiveDateTime;

/// 时间窗: from 不得晚于 to
pub fn validate_time_window(from: NaiveDateTime, to: NaiveDateTime) -> ApiResult<()> {
    if from > to {
        return Err(ApiError::InvalidTimeWindow { from, to });
    }
    Ok(())
}

/// 星期 (1..=7) / 小时 (0..=23) / 分钟 (0..=59)
pub fn validate_day_time(day_of_week: u32, hour: u32, minute: u32) -> ApiResult<()> {
    if !(1..=7).contains(&day_of_week) {
        return Err(ApiError::out_of_range("day_of_week", day_of_week, "1..=7"));
    }
    if hour > 23 {
        return Err(ApiError::out_of_range("hour", hour, "0..=23"));
    }
    if minute > 59 {
        return Err(ApiError::out_of_range("minute", minute, "0..=59"));
    }
    Ok(())
}

/// 星期掩码不得超过 7 位
pub fn validate_day_mask(mask: u8) -> ApiResult<()> {
    if mask & !ALL_DAYS_MASK != 0 {
        return Err(ApiError::out_of_range(
            "applicable_days",
            format!("{:#b}", mask),
            "0..=0b1111111",
        ));
    }
    Ok(())
}

/// 高峰期规则: 掩码宽度 + 生效日期顺序
pub fn validate_peak_rule(rule: &PeakPeriodRule) -> ApiResult<()> {
    if let Some(mask) = rule.applicable_days {
        validate_day_mask(mask)?;
    }
    if let (Some(from), Some(to)) = (rule.effective_from, rule.effective_to) {
        if from > to {
            return Err(ApiError::InvalidInput(format!(
                "规则 {} 生效起始日 {} 晚于截止日 {}",
                rule.rule_id, from, to
            )));
        }
    }
    Ok(())
}

/// 流量样本取值范围
///
/// - 车速/极值车速 ≥ 0
/// - 占有率 ∈ [0, 100]
/// - 数据质量 ∈ [0, 100]
/// - 最低车速不得高于最高车速
pub fn validate_flow_sample(sample: &FlowSample) -> ApiResult<()> {
    let non_negative = [
        ("average_speed", sample.average_speed),
        ("max_speed", sample.max_speed),
        ("min_speed", sample.min_speed),
    ];
    for (field, value) in non_negative {
        if let Some(v) = value {
            if v.is_nan() || v < 0.0 {
                return Err(ApiError::out_of_range(field, v, ">= 0"));
            }
        }
    }

    if let Some(occupancy) = sample.occupancy_rate {
        if !(0.0..=100.0).contains(&occupancy) {
            return Err(ApiError::out_of_range("occupancy_rate", occupancy, "0..=100"));
        }
    }

    if let Some(quality) = sample.data_quality {
        if quality > 100 {
            return Err(ApiError::out_of_range("data_quality", quality, "0..=100"));
        }
    }

    if let (Some(max), Some(min)) = (sample.max_speed, sample.min_speed) {
        if min > max {
            return Err(ApiError::InvalidInput(format!(
                "监测点 {} 在 {} 的最低车速 {} 高于最高车速 {}",
                sample.point_id, sample.record_time, min, max
            )));
        }
    }

    Ok(())
}

/// 气象观测取值范围
///
/// - 降水/能见度/风速 ≥ 0
/// - 湿度/云量 ∈ [0, 100]
/// - 风向 ∈ [0, 360]
pub fn validate_weather(obs: &WeatherObservation) -> ApiResult<()> {
    let non_negative = [
        ("precipitation", obs.precipitation),
        ("visibility", obs.visibility),
        ("wind_speed", obs.wind_speed),
        ("pressure", obs.pressure),
    ];
    for (field, value) in non_negative {
        if let Some(v) = value {
            if v.is_nan() || v < 0.0 {
                return Err(ApiError::out_of_range(field, v, ">= 0"));
            }
        }
    }

    let percentages = [("humidity", obs.humidity), ("cloud_cover", obs.cloud_cover)];
    for (field, value) in percentages {
        if let Some(v) = value {
            if !(0.0..=100.0).contains(&v) {
                return Err(ApiError::out_of_range(field, v, "0..=100"));
            }
        }
    }

    if let Some(direction) = obs.wind_direction {
        if !(0.0..=360.0).contains(&direction) {
            return Err(ApiError::out_of_range("wind_direction", direction, "0..=360"));
        }
    }

    Ok(())
}
