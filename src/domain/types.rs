// ==========================================
// 恩施山区交通平台 - 领域类型定义
// ==========================================
// 职责: 标签/等级枚举 (取代源系统中的自由文本关键词)
// 红线: 所有阈值语义由引擎决定, 此处只定义词表
// 序列化格式: kebab-case (中文源词表通过 alias 兼容)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 风险等级 (Risk Level)
// ==========================================
// 依据: 路段几何风险指数分档
// 顺序: VeryLow < Low < Medium < High < VeryHigh, Unknown 单独处理
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskLevel {
    #[serde(alias = "极低风险")]
    VeryLow, // 极低风险
    #[serde(alias = "低风险")]
    Low, // 低风险
    #[serde(alias = "中风险")]
    Medium, // 中风险
    #[serde(alias = "高风险")]
    High, // 高风险
    #[serde(alias = "极高风险")]
    VeryHigh, // 极高风险
    #[serde(alias = "未知")]
    Unknown, // 未知
}

impl RiskLevel {
    /// 根据风险指数分档
    ///
    /// - ≥8 极高, ≥6 高, ≥4 中, ≥2 低, 其余极低
    /// - 指数缺失 → Unknown
    pub fn from_index(index: Option<f64>) -> Self {
        match index {
            None => RiskLevel::Unknown,
            Some(i) if i >= 8.0 => RiskLevel::VeryHigh,
            Some(i) if i >= 6.0 => RiskLevel::High,
            Some(i) if i >= 4.0 => RiskLevel::Medium,
            Some(i) if i >= 2.0 => RiskLevel::Low,
            Some(_) => RiskLevel::VeryLow,
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            RiskLevel::VeryLow => "very-low",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::VeryHigh => "very-high",
            RiskLevel::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

// ==========================================
// 路段拥堵状态 (Congestion Status)
// ==========================================
// 依据: 饱和度拥堵指数分档
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CongestionStatus {
    Clear,            // 畅通
    Light,            // 轻微拥堵
    Moderate,         // 中度拥堵
    Severe,           // 严重拥堵
    InsufficientData, // 数据不足
}

impl CongestionStatus {
    /// 根据拥堵指数分档
    ///
    /// - <2 畅通, <5 轻微, <7 中度, 其余严重
    /// - 指数缺失 → InsufficientData
    pub fn from_index(index: Option<f64>) -> Self {
        match index {
            None => CongestionStatus::InsufficientData,
            Some(i) if i < 2.0 => CongestionStatus::Clear,
            Some(i) if i < 5.0 => CongestionStatus::Light,
            Some(i) if i < 7.0 => CongestionStatus::Moderate,
            Some(_) => CongestionStatus::Severe,
        }
    }

    pub fn as_code(&self) -> &'static str {
        match self {
            CongestionStatus::Clear => "clear",
            CongestionStatus::Light => "light",
            CongestionStatus::Moderate => "moderate",
            CongestionStatus::Severe => "severe",
            CongestionStatus::InsufficientData => "insufficient-data",
        }
    }
}

impl fmt::Display for CongestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_code())
    }
}

// ==========================================
// 单样本拥堵等级 (Congestion Level)
// ==========================================
// 依据: 占有率 + 平均车速综合判断
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CongestionLevel {
    Clear,    // 畅通
    Light,    // 轻度拥堵
    Moderate, // 中度拥堵
    Severe,   // 严重拥堵
    Unknown,  // 未知
}

impl fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CongestionLevel::Clear => write!(f, "clear"),
            CongestionLevel::Light => write!(f, "light"),
            CongestionLevel::Moderate => write!(f, "moderate"),
            CongestionLevel::Severe => write!(f, "severe"),
            CongestionLevel::Unknown => write!(f, "unknown"),
        }
    }
}

// ==========================================
// 路面状况 (Surface Condition)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SurfaceCondition {
    #[serde(alias = "良好")]
    Good, // 良好
    #[serde(alias = "一般")]
    Fair, // 一般
    #[serde(alias = "较差")]
    Poor, // 较差
    Unknown,
}

impl SurfaceCondition {
    /// 从字符串解析 (兼容中文源词表)
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "good" | "良好" => SurfaceCondition::Good,
            "fair" | "一般" => SurfaceCondition::Fair,
            "poor" | "较差" => SurfaceCondition::Poor,
            _ => SurfaceCondition::Unknown,
        }
    }
}

// ==========================================
// 地质风险标签 (Geological Risk Tag)
// ==========================================
// 顺序: 按风险权重递增
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeologicalRiskTag {
    #[serde(alias = "低风险")]
    LowRisk, // 低风险
    #[serde(alias = "中风险")]
    MediumRisk, // 中风险
    #[serde(alias = "高风险")]
    HighRisk, // 高风险
    #[serde(alias = "滑坡")]
    Landslide, // 滑坡
    #[serde(alias = "泥石流")]
    DebrisFlow, // 泥石流
}

impl GeologicalRiskTag {
    /// 从字符串解析标签, 不在词表内返回 None
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "landslide" | "滑坡" => Some(GeologicalRiskTag::Landslide),
            "debris-flow" | "泥石流" => Some(GeologicalRiskTag::DebrisFlow),
            "high-risk" | "高风险" => Some(GeologicalRiskTag::HighRisk),
            "medium-risk" | "中风险" => Some(GeologicalRiskTag::MediumRisk),
            "low-risk" | "低风险" => Some(GeologicalRiskTag::LowRisk),
            _ => None,
        }
    }

    /// 风险分值
    pub fn weight(&self) -> f64 {
        match self {
            GeologicalRiskTag::Landslide
            | GeologicalRiskTag::DebrisFlow
            | GeologicalRiskTag::HighRisk => 3.0,
            GeologicalRiskTag::MediumRisk => 2.0,
            GeologicalRiskTag::LowRisk => 1.0,
        }
    }
}

impl fmt::Display for GeologicalRiskTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeologicalRiskTag::Landslide => write!(f, "landslide"),
            GeologicalRiskTag::DebrisFlow => write!(f, "debris-flow"),
            GeologicalRiskTag::HighRisk => write!(f, "high-risk"),
            GeologicalRiskTag::MediumRisk => write!(f, "medium-risk"),
            GeologicalRiskTag::LowRisk => write!(f, "low-risk"),
        }
    }
}

// ==========================================
// 天气现象 (Weather Condition)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeatherCondition {
    #[serde(alias = "晴")]
    Clear, // 晴
    #[serde(alias = "多云")]
    Cloudy, // 多云
    #[serde(alias = "阴")]
    Overcast, // 阴
    #[serde(alias = "小雨")]
    LightRain, // 小雨
    #[serde(alias = "中雨")]
    ModerateRain, // 中雨
    #[serde(alias = "大雨")]
    HeavyRain, // 大雨
    #[serde(alias = "暴雨")]
    Rainstorm, // 暴雨
    #[serde(alias = "持续降雨")]
    ContinuousRain, // 持续降雨
    #[serde(alias = "雾")]
    Fog, // 雾
    #[serde(alias = "大雾")]
    HeavyFog, // 大雾
    #[serde(alias = "雪")]
    Snow, // 雪
    #[serde(alias = "冰雪")]
    SnowIce, // 冰雪
    #[serde(alias = "霜")]
    Frost, // 霜
    #[serde(alias = "冰雹")]
    Hail, // 冰雹
    #[serde(alias = "雷暴")]
    Thunderstorm, // 雷暴
    Unknown,
}

impl WeatherCondition {
    /// 是否为降雨类天气
    pub fn is_rain(&self) -> bool {
        matches!(
            self,
            WeatherCondition::LightRain
                | WeatherCondition::ModerateRain
                | WeatherCondition::HeavyRain
                | WeatherCondition::Rainstorm
                | WeatherCondition::ContinuousRain
        )
    }

    /// 是否为冰雪类天气 (含霜、冰雹)
    pub fn is_snow_or_ice(&self) -> bool {
        matches!(
            self,
            WeatherCondition::Snow
                | WeatherCondition::SnowIce
                | WeatherCondition::Frost
                | WeatherCondition::Hail
        )
    }
}

// ==========================================
// 高峰期规则状态 (Rule Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RuleStatus {
    #[default]
    #[serde(alias = "活跃")]
    Active, // 活跃
    #[serde(alias = "非活跃")]
    Inactive, // 非活跃
}

// ==========================================
// 异常指标与类型 (Anomaly)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnomalyMetric {
    Flow,  // 流量
    Speed, // 速度
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnomalyKind {
    Spike,  // 流量突增
    Drop,   // 流量突降
    Surge,  // 速度骤增
    Plunge, // 速度骤降
}

impl fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalyKind::Spike => write!(f, "spike"),
            AnomalyKind::Drop => write!(f, "drop"),
            AnomalyKind::Surge => write!(f, "surge"),
            AnomalyKind::Plunge => write!(f, "plunge"),
        }
    }
}

// ==========================================
// 服务水平 (Service Level)
// ==========================================
// A 最畅通 ... F 极度拥堵
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ServiceLevel {
    A,
    B,
    C,
    D,
    E,
    F,
    Unknown,
}

// ==========================================
// 降水等级 (Precipitation Level)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrecipitationLevel {
    None,           // 无降水
    Light,          // 小雨
    Moderate,       // 中雨
    Heavy,          // 大雨
    Rainstorm,      // 暴雨
    HeavyRainstorm, // 大暴雨
    Extreme,        // 特大暴雨
}

// ==========================================
// 能见度等级 (Visibility Level)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisibilityLevel {
    ExtremelyDenseFog, // 特浓雾 (<50m)
    DenseFog,          // 浓雾 (<200m)
    HeavyFog,          // 大雾 (<500m)
    Fog,               // 雾 (<1000m)
    Mist,              // 轻雾 (<2000m)
    Haze,              // 霾 (<5000m)
    LightHaze,         // 轻度霾 (<10000m)
    Good,              // 良好
    Unknown,           // 未知
}

// ==========================================
// 滑坡风险 (Landslide Risk)
// ==========================================
// 顺序: None < Low < Medium < High < VeryHigh
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LandslideRisk {
    None,
    Low,
    Medium,
    High,
    VeryHigh,
}

impl LandslideRisk {
    /// 风险上升一级 (None 与 VeryHigh 保持不变)
    pub fn escalate(self) -> Self {
        match self {
            LandslideRisk::None => LandslideRisk::None,
            LandslideRisk::Low => LandslideRisk::Medium,
            LandslideRisk::Medium => LandslideRisk::High,
            LandslideRisk::High | LandslideRisk::VeryHigh => LandslideRisk::VeryHigh,
        }
    }
}

// ==========================================
// 驾驶建议档位 (Driving Advisory)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrivingAdvisory {
    Normal,          // 正常驾驶
    MinorImpact,     // 轻微影响
    ReduceSpeed,     // 适当减速
    ExtremeCaution,  // 谨慎驾驶
    AvoidTravel,     // 非必要不出行
}

impl DrivingAdvisory {
    /// 由天气影响指数分档
    pub fn from_impact_index(index: f64) -> Self {
        if index >= 8.0 {
            DrivingAdvisory::AvoidTravel
        } else if index >= 6.0 {
            DrivingAdvisory::ExtremeCaution
        } else if index >= 4.0 {
            DrivingAdvisory::ReduceSpeed
        } else if index >= 2.0 {
            DrivingAdvisory::MinorImpact
        } else {
            DrivingAdvisory::Normal
        }
    }
}

// ==========================================
// 安全隐患 (Safety Hazard)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "type")]
pub enum SafetyHazard {
    SteepSlope { max_slope: f64 },
    SharpCurve { average_curvature: f64 },
    GeologicalRisk { tags: Vec<GeologicalRiskTag> },
    PoorSurface,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_bands() {
        assert_eq!(RiskLevel::from_index(None), RiskLevel::Unknown);
        assert_eq!(RiskLevel::from_index(Some(0.0)), RiskLevel::VeryLow);
        assert_eq!(RiskLevel::from_index(Some(1.99)), RiskLevel::VeryLow);
        assert_eq!(RiskLevel::from_index(Some(2.0)), RiskLevel::Low);
        assert_eq!(RiskLevel::from_index(Some(4.0)), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_index(Some(6.0)), RiskLevel::High);
        assert_eq!(RiskLevel::from_index(Some(8.0)), RiskLevel::VeryHigh);
        assert_eq!(RiskLevel::from_index(Some(10.0)), RiskLevel::VeryHigh);
    }

    #[test]
    fn test_congestion_status_bands() {
        assert_eq!(CongestionStatus::from_index(None), CongestionStatus::InsufficientData);
        assert_eq!(CongestionStatus::from_index(Some(1.99)), CongestionStatus::Clear);
        assert_eq!(CongestionStatus::from_index(Some(2.0)), CongestionStatus::Light);
        assert_eq!(CongestionStatus::from_index(Some(5.0)), CongestionStatus::Moderate);
        assert_eq!(CongestionStatus::from_index(Some(7.0)), CongestionStatus::Severe);
        assert_eq!(CongestionStatus::InsufficientData.to_string(), "insufficient-data");
    }

    #[test]
    fn test_vocabulary_parsing() {
        assert_eq!(SurfaceCondition::parse("较差"), SurfaceCondition::Poor);
        assert_eq!(SurfaceCondition::parse(" Poor "), SurfaceCondition::Poor);
        assert_eq!(SurfaceCondition::parse("碎石"), SurfaceCondition::Unknown);

        assert_eq!(GeologicalRiskTag::parse("泥石流"), Some(GeologicalRiskTag::DebrisFlow));
        assert_eq!(GeologicalRiskTag::parse("medium-risk"), Some(GeologicalRiskTag::MediumRisk));
        assert_eq!(GeologicalRiskTag::parse("岩溶"), None);
    }

    #[test]
    fn test_serde_aliases() {
        let surface: SurfaceCondition = serde_json::from_str("\"较差\"").unwrap();
        assert_eq!(surface, SurfaceCondition::Poor);

        let condition: WeatherCondition = serde_json::from_str("\"heavy-fog\"").unwrap();
        assert_eq!(condition, WeatherCondition::HeavyFog);
    }

    #[test]
    fn test_landslide_escalation() {
        assert_eq!(LandslideRisk::None.escalate(), LandslideRisk::None);
        assert_eq!(LandslideRisk::Low.escalate(), LandslideRisk::Medium);
        assert_eq!(LandslideRisk::High.escalate(), LandslideRisk::VeryHigh);
        assert_eq!(LandslideRisk::VeryHigh.escalate(), LandslideRisk::VeryHigh);
    }
}
