// ==========================================
// 恩施山区交通平台 - 天气影响评分引擎
// ==========================================
// 职责: 天气影响指数 + 山区地形放大系数 + 建议限速 + 气象分级
// 输入: WeatherObservation
// 输出: 影响指数 (0-10) / 建议限速 / 各类等级
// ==========================================

use crate::domain::types::{
    DrivingAdvisory, LandslideRisk, PrecipitationLevel, VisibilityLevel, WeatherCondition,
};
use crate::domain::weather::WeatherObservation;
use serde::{Deserialize, Serialize};

/// 影响指数上限
pub const MAX_IMPACT_INDEX: f64 = 10.0;
/// 地形放大系数上限
pub const MAX_TERRAIN_FACTOR: f64 = 2.0;

// ==========================================
// WeatherImpactReport - 天气影响综合评估
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherImpactReport {
    pub impact_index: f64,
    pub terrain_factor: f64,
    pub suggested_speed_limit: i32,
    pub wind_force: u8,
    pub precipitation_level: PrecipitationLevel,
    pub visibility_level: VisibilityLevel,
    pub affects_traffic: bool,
    pub slippery_index: u8,
    pub landslide_risk: LandslideRisk,
    pub advisory: DrivingAdvisory,
}

// ==========================================
// WeatherImpactScorer - 天气影响评分引擎
// ==========================================
pub struct WeatherImpactScorer {
    // 无状态引擎
}

impl WeatherImpactScorer {
    pub fn new() -> Self {
        Self {}
    }

    /// 完整评估
    pub fn evaluate(&self, obs: &WeatherObservation, base_speed_limit: u32) -> WeatherImpactReport {
        let impact_index = self.impact_index(obs);
        WeatherImpactReport {
            impact_index,
            terrain_factor: self.terrain_factor(obs),
            suggested_speed_limit: self.suggested_speed_limit(obs, base_speed_limit),
            wind_force: obs.wind_force(),
            precipitation_level: self.precipitation_level(obs),
            visibility_level: self.visibility_level(obs),
            affects_traffic: self.affects_traffic(obs),
            slippery_index: self.slippery_index(obs),
            landslide_risk: self.landslide_risk(obs),
            advisory: DrivingAdvisory::from_impact_index(impact_index),
        }
    }

    // ==========================================
    // 影响指数
    // ==========================================

    /// 天气影响指数 (累加后截断到 [0, 10])
    ///
    /// 分项:
    /// - 降水: 0 → 0, <10 → 2, <25 → 4, <50 → 6, <100 → 8, 其余 10
    /// - 能见度 (<1000 才计): <50 → 5, <100 → 4, <200 → 2.5, <500 → 1
    /// - 雾 +3, 冰雪 +5
    /// - 风力: ≥8 级 +3, ≥6 级 +1.5
    /// - 气温: <0 → +2 (有降水再 +3); <3 → +1
    /// - 预警信息 +2, 雷暴 +2
    pub fn impact_index(&self, obs: &WeatherObservation) -> f64 {
        let mut impact = self.precipitation_score(obs.precipitation);
        impact += self.visibility_score(obs.visibility);

        if obs.foggy {
            impact += 3.0;
        }
        if obs.snow_ice {
            impact += 5.0;
        }

        let wind_force = obs.wind_force();
        if wind_force >= 8 {
            impact += 3.0;
        } else if wind_force >= 6 {
            impact += 1.5;
        }

        if let Some(temperature) = obs.temperature {
            if temperature < 0.0 {
                impact += 2.0;
                if obs.has_precipitation() {
                    impact += 3.0;
                }
            } else if temperature < 3.0 {
                impact += 1.0;
            }
        }

        if obs.has_warning() {
            impact += 2.0;
        }
        if obs.thunderstorm {
            impact += 2.0;
        }

        impact.clamp(0.0, MAX_IMPACT_INDEX)
    }

    fn precipitation_score(&self, precipitation: Option<f64>) -> f64 {
        match precipitation {
            Some(p) if p <= 0.0 => 0.0,
            Some(p) if p < 10.0 => 2.0,
            Some(p) if p < 25.0 => 4.0,
            Some(p) if p < 50.0 => 6.0,
            Some(p) if p < 100.0 => 8.0,
            Some(_) => 10.0,
            None => 0.0,
        }
    }

    fn visibility_score(&self, visibility: Option<f64>) -> f64 {
        match visibility {
            Some(v) if v < 50.0 => 5.0,
            Some(v) if v < 100.0 => 4.0,
            Some(v) if v < 200.0 => 2.5,
            Some(v) if v < 500.0 => 1.0,
            _ => 0.0,
        }
    }

    // ==========================================
    // 限速建议
    // ==========================================

    /// 山区地形放大系数 (1.0 - 2.0)
    ///
    /// - 降水 >10 +0.3, 能见度 <1000 +0.3, 风速 >8 +0.2, 气温 <5 +0.2
    pub fn terrain_factor(&self, obs: &WeatherObservation) -> f64 {
        let mut factor = 1.0;
        if obs.precipitation.map_or(false, |p| p > 10.0) {
            factor += 0.3;
        }
        if obs.visibility.map_or(false, |v| v < 1000.0) {
            factor += 0.3;
        }
        if obs.wind_speed.map_or(false, |w| w > 8.0) {
            factor += 0.2;
        }
        if obs.temperature.map_or(false, |t| t < 5.0) {
            factor += 0.2;
        }
        f64::min(factor, MAX_TERRAIN_FACTOR)
    }

    /// 影响指数 → 减速系数
    pub fn reduction_factor(&self, impact_index: f64) -> f64 {
        if impact_index >= 8.0 {
            0.5
        } else if impact_index >= 6.0 {
            0.6
        } else if impact_index >= 4.0 {
            0.7
        } else if impact_index >= 2.0 {
            0.8
        } else {
            1.0
        }
    }

    /// 建议限速 = 基础限速 × 减速系数 ÷ 地形系数 (向零截断)
    pub fn suggested_speed_limit(&self, obs: &WeatherObservation, base_speed_limit: u32) -> i32 {
        let factor = self.reduction_factor(self.impact_index(obs)) / self.terrain_factor(obs);
        (base_speed_limit as f64 * factor) as i32
    }

    // ==========================================
    // 气象分级
    // ==========================================

    /// 降水等级 (0.1 / 10 / 25 / 50 / 100 / 250 mm)
    pub fn precipitation_level(&self, obs: &WeatherObservation) -> PrecipitationLevel {
        match obs.precipitation {
            None => PrecipitationLevel::None,
            Some(p) if p < 0.1 => PrecipitationLevel::None,
            Some(p) if p < 10.0 => PrecipitationLevel::Light,
            Some(p) if p < 25.0 => PrecipitationLevel::Moderate,
            Some(p) if p < 50.0 => PrecipitationLevel::Heavy,
            Some(p) if p < 100.0 => PrecipitationLevel::Rainstorm,
            Some(p) if p < 250.0 => PrecipitationLevel::HeavyRainstorm,
            Some(_) => PrecipitationLevel::Extreme,
        }
    }

    /// 能见度等级
    pub fn visibility_level(&self, obs: &WeatherObservation) -> VisibilityLevel {
        match obs.visibility {
            None => VisibilityLevel::Unknown,
            Some(v) if v < 50.0 => VisibilityLevel::ExtremelyDenseFog,
            Some(v) if v < 200.0 => VisibilityLevel::DenseFog,
            Some(v) if v < 500.0 => VisibilityLevel::HeavyFog,
            Some(v) if v < 1000.0 => VisibilityLevel::Fog,
            Some(v) if v < 2000.0 => VisibilityLevel::Mist,
            Some(v) if v < 5000.0 => VisibilityLevel::Haze,
            Some(v) if v < 10000.0 => VisibilityLevel::LightHaze,
            Some(_) => VisibilityLevel::Good,
        }
    }

    /// 是否影响交通
    ///
    /// 降水 ≥25 / 能见度 <1000 / 风速 ≥10.8 / 冰雪类天气 / 气温 ≤0, 任一成立
    pub fn affects_traffic(&self, obs: &WeatherObservation) -> bool {
        let heavy_rain = obs.precipitation.map_or(false, |p| p >= 25.0);
        let low_visibility = obs.visibility.map_or(false, |v| v < 1000.0);
        let strong_wind = obs.wind_speed.map_or(false, |w| w >= 10.8);
        let snow_or_ice = obs.snow_ice || obs.condition.map_or(false, |c| c.is_snow_or_ice());
        let freezing = obs.temperature.map_or(false, |t| t <= 0.0);

        heavy_rain || low_visibility || strong_wind || snow_or_ice || freezing
    }

    /// 路面湿滑指数 (0 干燥 - 5 极度湿滑)
    pub fn slippery_index(&self, obs: &WeatherObservation) -> u8 {
        let mut index = 0u8;

        index += match obs.precipitation {
            Some(p) if p > 30.0 => 3,
            Some(p) if p > 15.0 => 2,
            Some(p) if p > 5.0 => 1,
            _ => 0,
        };

        index += match obs.humidity {
            Some(h) if h > 95.0 => 2,
            Some(h) if h > 85.0 => 1,
            _ => 0,
        };

        // 低温结冰
        index += match obs.temperature {
            Some(t) if t < 0.0 => 3,
            Some(t) if t < 4.0 => 2,
            _ => 0,
        };

        if obs.foggy {
            index += 1;
        }

        index.min(5)
    }

    /// 滑坡风险: 按降水量分级, 持续降雨上升一级
    pub fn landslide_risk(&self, obs: &WeatherObservation) -> LandslideRisk {
        let precipitation = match obs.precipitation {
            Some(p) if p > 0.0 => p,
            _ => return LandslideRisk::None,
        };

        let risk = if precipitation > 100.0 {
            LandslideRisk::VeryHigh
        } else if precipitation > 50.0 {
            LandslideRisk::High
        } else if precipitation > 30.0 {
            LandslideRisk::Medium
        } else if precipitation > 15.0 {
            LandslideRisk::Low
        } else {
            LandslideRisk::None
        };

        if obs.condition == Some(WeatherCondition::ContinuousRain) {
            risk.escalate()
        } else {
            risk
        }
    }
}

impl Default for WeatherImpactScorer {
    fn default() -> Self {
        Self::new()
    }
}
