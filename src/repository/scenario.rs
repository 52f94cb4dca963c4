// ==========================================
// 恩施山区交通平台 - 场景数据装载
// ==========================================
// 职责: 从 JSON 场景描述构建内存仓储
// 格式: { roads: [{ road_id, sections: [...] }], samples: [...], weather: [...] }
// ==========================================

use crate::domain::flow::FlowSample;
use crate::domain::geometry::RoadSegmentGeometry;
use crate::domain::peak_rule::PeakPeriodRule;
use crate::domain::weather::WeatherObservation;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::memory::InMemoryTrafficRepository;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

// ==========================================
// 场景结构
// ==========================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrafficScenario {
    #[serde(default)]
    pub roads: Vec<ScenarioRoad>,
    #[serde(default)]
    pub samples: Vec<FlowSample>,
    #[serde(default)]
    pub weather: Vec<WeatherObservation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioRoad {
    pub road_id: String,
    #[serde(default)]
    pub sections: Vec<ScenarioSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSection {
    pub region_id: String,
    pub geometry: RoadSegmentGeometry,
    #[serde(default)]
    pub base_speed_limit: Option<u32>,
    #[serde(default)]
    pub point_ids: Vec<String>,
    #[serde(default)]
    pub peak_rules: Vec<PeakPeriodRule>,
}

impl TrafficScenario {
    /// 从 JSON 文件读取场景
    pub fn from_file<P: AsRef<Path>>(path: P) -> RepositoryResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            RepositoryError::DataSourceError(format!("读取场景文件失败 {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// 从 JSON 字符串解析场景
    pub fn from_json(content: &str) -> RepositoryResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| RepositoryError::ValidationError(format!("场景 JSON 解析失败: {}", e)))
    }

    /// 装载到新的内存仓储
    pub fn into_repository(self) -> RepositoryResult<InMemoryTrafficRepository> {
        let repo = InMemoryTrafficRepository::new();

        let mut section_count = 0;
        for road in self.roads {
            repo.add_road(&road.road_id)?;
            for section in road.sections {
                let section_id = section.geometry.section_id.clone();
                repo.add_section(
                    &road.road_id,
                    &section.region_id,
                    section.geometry,
                    section.base_speed_limit,
                )?;
                for point_id in &section.point_ids {
                    repo.add_point(&section_id, point_id)?;
                }
                for rule in section.peak_rules {
                    repo.add_peak_rule(&section_id, rule)?;
                }
                section_count += 1;
            }
        }

        let sample_count = repo.add_samples(self.samples)?;
        let weather_count = self.weather.len();
        for observation in self.weather {
            repo.add_weather(observation)?;
        }

        info!(
            sections = section_count,
            samples = sample_count,
            weather = weather_count,
            "场景装载完成"
        );
        Ok(repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::traffic_source::TrafficDataSource;

    const SCENARIO: &str = r#"{
        "roads": [{
            "road_id": "G209",
            "sections": [{
                "region_id": "ENSHI",
                "geometry": { "section_id": "S1", "average_slope": 6.5, "design_capacity": 1200,
                              "surface_condition": "较差", "geological_risk_tags": ["滑坡"] },
                "base_speed_limit": 60,
                "point_ids": ["P1"],
                "peak_rules": [{ "rule_id": "R1", "name": "早高峰",
                                 "start_time": "07:00:00", "end_time": "09:00:00",
                                 "applicable_days": 31 }]
            }]
        }],
        "samples": [{ "point_id": "P1", "record_time": "2025-03-10T08:00:00", "flow_rate": 600 }],
        "weather": [{ "region_id": "ENSHI", "record_time": "2025-03-10T06:00:00", "precipitation": 12.0 }]
    }"#;

    #[test]
    fn test_scenario_loads_hierarchy() {
        let repo = TrafficScenario::from_json(SCENARIO)
            .unwrap()
            .into_repository()
            .unwrap();

        assert_eq!(repo.sections_of_road("G209").unwrap(), vec!["S1".to_string()]);
        assert_eq!(repo.points_of_section("S1").unwrap(), vec!["P1".to_string()]);
        assert_eq!(repo.base_speed_limit("S1").unwrap(), Some(60));
        assert_eq!(repo.peak_rules_for_section("S1").unwrap().len(), 1);

        let geometry = repo.section_geometry("S1").unwrap();
        assert_eq!(geometry.design_capacity, Some(1200));
        assert_eq!(geometry.geological_risk_tags.len(), 1);
    }

    #[test]
    fn test_sample_for_unknown_point_rejected() {
        let bad = r#"{ "samples": [{ "point_id": "P9", "record_time": "2025-03-10T08:00:00" }] }"#;
        let result = TrafficScenario::from_json(bad).unwrap().into_repository();
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            TrafficScenario::from_json("{ not json"),
            Err(RepositoryError::ValidationError(_))
        ));
    }
}
