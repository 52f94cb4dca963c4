// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use enshi_traffic_metrics::domain::types::{GeologicalRiskTag, SurfaceCondition};
use enshi_traffic_metrics::{
    FlowSample, InMemoryTrafficRepository, PeakPeriodRule, RoadSegmentGeometry,
    WeatherObservation,
};

/// 构造本地时间 (2025 年)
pub fn dt(month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

pub fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

// ==========================================
// RoadSegmentGeometry 构建器
// ==========================================

pub struct GeometryBuilder {
    geometry: RoadSegmentGeometry,
}

impl GeometryBuilder {
    pub fn new(section_id: &str) -> Self {
        Self {
            geometry: RoadSegmentGeometry::new(section_id),
        }
    }

    pub fn capacity(mut self, capacity: u32) -> Self {
        self.geometry.design_capacity = Some(capacity);
        self
    }

    pub fn average_slope(mut self, slope: f64) -> Self {
        self.geometry.average_slope = Some(slope);
        self
    }

    pub fn max_slope(mut self, slope: f64) -> Self {
        self.geometry.max_slope = Some(slope);
        self
    }

    pub fn curvature(mut self, curvature: f64) -> Self {
        self.geometry.average_curvature = Some(curvature);
        self
    }

    pub fn surface(mut self, surface: SurfaceCondition) -> Self {
        self.geometry.surface_condition = Some(surface);
        self
    }

    pub fn tag(mut self, tag: GeologicalRiskTag) -> Self {
        self.geometry.geological_risk_tags.push(tag);
        self
    }

    pub fn build(self) -> RoadSegmentGeometry {
        self.geometry
    }
}

// ==========================================
// FlowSample 构建
// ==========================================

pub fn flow_sample(point_id: &str, at: NaiveDateTime, flow: u32) -> FlowSample {
    let mut sample = FlowSample::new(point_id, at);
    sample.flow_rate = Some(flow);
    sample
}

/// 按固定间隔生成流量序列
pub fn flow_series(
    point_id: &str,
    start: NaiveDateTime,
    step: Duration,
    flows: &[u32],
) -> Vec<FlowSample> {
    flows
        .iter()
        .enumerate()
        .map(|(i, flow)| flow_sample(point_id, start + step * i as i32, *flow))
        .collect()
}

// ==========================================
// WeatherObservation 构建
// ==========================================

pub fn rain(region_id: &str, at: NaiveDateTime, precipitation: f64) -> WeatherObservation {
    let mut obs = WeatherObservation::new(region_id, at);
    obs.precipitation = Some(precipitation);
    obs
}

// ==========================================
// 内存数据源装配
// ==========================================

pub const ROAD_ID: &str = "G209";
pub const REGION_ID: &str = "ENSHI";

/// 一条道路 + 若干路段, 每个路段挂一个同名监测点 ("<section>-P1")
pub fn repository_with_sections(sections: Vec<RoadSegmentGeometry>) -> InMemoryTrafficRepository {
    let repo = InMemoryTrafficRepository::new();
    repo.add_road(ROAD_ID).unwrap();
    for geometry in sections {
        let section_id = geometry.section_id.clone();
        repo.add_section(ROAD_ID, REGION_ID, geometry, Some(60)).unwrap();
        repo.add_point(&section_id, &point_of(&section_id)).unwrap();
    }
    repo
}

pub fn point_of(section_id: &str) -> String {
    format!("{}-P1", section_id)
}

pub fn morning_rule(rule_id: &str) -> PeakPeriodRule {
    PeakPeriodRule::new(rule_id, "早高峰", hm(7, 0), hm(9, 0))
}
