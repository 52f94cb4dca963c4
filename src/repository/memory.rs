// ==========================================
// 恩施山区交通平台 - 内存交通数据仓储
// ==========================================
// 职责: TrafficDataSource 的参考实现
// 存储: 道路 → 路段 → 监测点 层级 + 样本/气象/高峰期规则
// 并发: 单把 Mutex 保护全部数据, 读写均短暂持锁
// ==========================================

use crate::domain::flow::FlowSample;
use crate::domain::geometry::RoadSegmentGeometry;
use crate::domain::peak_rule::PeakPeriodRule;
use crate::domain::weather::WeatherObservation;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::traffic_source::TrafficDataSource;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

// ==========================================
// 内部存储结构
// ==========================================

#[derive(Debug, Clone)]
struct SectionEntry {
    geometry: RoadSegmentGeometry,
    region_id: String,
    base_speed_limit: Option<u32>,
    point_ids: Vec<String>,
    peak_rules: Vec<PeakPeriodRule>,
}

#[derive(Debug, Default)]
struct TrafficStore {
    roads: HashMap<String, Vec<String>>,           // road_id → section_ids
    sections: HashMap<String, SectionEntry>,       // section_id → 路段
    points: HashMap<String, String>,               // point_id → section_id
    samples: HashMap<String, Vec<FlowSample>>,     // point_id → 升序样本
    weather: HashMap<String, Vec<WeatherObservation>>, // region_id → 升序观测
}

// ==========================================
// InMemoryTrafficRepository - 内存仓储
// ==========================================
#[derive(Debug, Default)]
pub struct InMemoryTrafficRepository {
    store: Mutex<TrafficStore>,
}

impl InMemoryTrafficRepository {
    /// 创建空仓储
    pub fn new() -> Self {
        Self::default()
    }

    fn get_store(&self) -> RepositoryResult<MutexGuard<'_, TrafficStore>> {
        self.store
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入 (层级注册)
    // ==========================================

    /// 注册道路 (已存在时保持不变)
    pub fn add_road(&self, road_id: &str) -> RepositoryResult<()> {
        let mut store = self.get_store()?;
        store.roads.entry(road_id.to_string()).or_default();
        Ok(())
    }

    /// 注册路段 (同 ID 覆盖几何/区域/限速, 保留已挂接的监测点与规则)
    ///
    /// # 参数
    /// - `road_id`: 所属道路 (必须已注册)
    /// - `region_id`: 所属区域 (用于关联气象)
    /// - `geometry`: 路段几何快照
    /// - `base_speed_limit`: 基础限速
    pub fn add_section(
        &self,
        road_id: &str,
        region_id: &str,
        geometry: RoadSegmentGeometry,
        base_speed_limit: Option<u32>,
    ) -> RepositoryResult<()> {
        let mut store = self.get_store()?;
        let section_id = geometry.section_id.clone();

        let road_sections = store
            .roads
            .get_mut(road_id)
            .ok_or_else(|| RepositoryError::not_found("Road", road_id))?;
        if !road_sections.contains(&section_id) {
            road_sections.push(section_id.clone());
        }

        let entry = store
            .sections
            .entry(section_id)
            .or_insert_with(|| SectionEntry {
                geometry: RoadSegmentGeometry::default(),
                region_id: String::new(),
                base_speed_limit: None,
                point_ids: Vec::new(),
                peak_rules: Vec::new(),
            });
        entry.geometry = geometry;
        entry.region_id = region_id.to_string();
        entry.base_speed_limit = base_speed_limit;
        Ok(())
    }

    /// 挂接监测点到路段
    pub fn add_point(&self, section_id: &str, point_id: &str) -> RepositoryResult<()> {
        let mut store = self.get_store()?;
        let section = store
            .sections
            .get_mut(section_id)
            .ok_or_else(|| RepositoryError::not_found("RoadSection", section_id))?;
        if !section.point_ids.iter().any(|p| p == point_id) {
            section.point_ids.push(point_id.to_string());
        }
        store
            .points
            .insert(point_id.to_string(), section_id.to_string());
        store.samples.entry(point_id.to_string()).or_default();
        Ok(())
    }

    /// 追加高峰期规则
    pub fn add_peak_rule(&self, section_id: &str, rule: PeakPeriodRule) -> RepositoryResult<()> {
        let mut store = self.get_store()?;
        let section = store
            .sections
            .get_mut(section_id)
            .ok_or_else(|| RepositoryError::not_found("RoadSection", section_id))?;
        section.peak_rules.push(rule);
        Ok(())
    }

    /// 批量追加样本 (按 point_id 分组, 保持 record_time 升序)
    ///
    /// # 返回
    /// 写入的样本数
    pub fn add_samples(&self, samples: Vec<FlowSample>) -> RepositoryResult<usize> {
        let mut store = self.get_store()?;

        // 先整体校验监测点, 避免部分写入
        if let Some(unknown) = samples.iter().find(|s| !store.points.contains_key(&s.point_id)) {
            return Err(RepositoryError::not_found("MonitoringPoint", &unknown.point_id));
        }

        let count = samples.len();
        for sample in samples {
            store
                .samples
                .entry(sample.point_id.clone())
                .or_default()
                .push(sample);
        }
        for series in store.samples.values_mut() {
            series.sort_by_key(|s| s.record_time);
        }

        debug!(count, "样本写入内存仓储");
        Ok(count)
    }

    /// 追加气象观测
    pub fn add_weather(&self, observation: WeatherObservation) -> RepositoryResult<()> {
        let mut store = self.get_store()?;
        let series = store
            .weather
            .entry(observation.region_id.clone())
            .or_default();
        series.push(observation);
        series.sort_by_key(|o| o.record_time);
        Ok(())
    }

    /// 回写路段风险等级
    pub fn update_section_geometry(&self, geometry: RoadSegmentGeometry) -> RepositoryResult<()> {
        let mut store = self.get_store()?;
        let section = store
            .sections
            .get_mut(&geometry.section_id)
            .ok_or_else(|| RepositoryError::not_found("RoadSection", &geometry.section_id))?;
        section.geometry = geometry;
        Ok(())
    }

    /// 全部路段 ID (升序)
    pub fn section_ids(&self) -> RepositoryResult<Vec<String>> {
        let store = self.get_store()?;
        let mut ids: Vec<String> = store.sections.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

// ==========================================
// TrafficDataSource 实现
// ==========================================
impl TrafficDataSource for InMemoryTrafficRepository {
    fn section_geometry(&self, section_id: &str) -> RepositoryResult<RoadSegmentGeometry> {
        let store = self.get_store()?;
        store
            .sections
            .get(section_id)
            .map(|s| s.geometry.clone())
            .ok_or_else(|| RepositoryError::not_found("RoadSection", section_id))
    }

    fn points_of_section(&self, section_id: &str) -> RepositoryResult<Vec<String>> {
        let store = self.get_store()?;
        store
            .sections
            .get(section_id)
            .map(|s| s.point_ids.clone())
            .ok_or_else(|| RepositoryError::not_found("RoadSection", section_id))
    }

    fn sections_of_road(&self, road_id: &str) -> RepositoryResult<Vec<String>> {
        let store = self.get_store()?;
        store
            .roads
            .get(road_id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("Road", road_id))
    }

    fn peak_rules_for_section(&self, section_id: &str) -> RepositoryResult<Vec<PeakPeriodRule>> {
        let store = self.get_store()?;
        store
            .sections
            .get(section_id)
            .map(|s| s.peak_rules.clone())
            .ok_or_else(|| RepositoryError::not_found("RoadSection", section_id))
    }

    fn base_speed_limit(&self, section_id: &str) -> RepositoryResult<Option<u32>> {
        let store = self.get_store()?;
        store
            .sections
            .get(section_id)
            .map(|s| s.base_speed_limit)
            .ok_or_else(|| RepositoryError::not_found("RoadSection", section_id))
    }

    fn samples_in_window(
        &self,
        point_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> RepositoryResult<Vec<FlowSample>> {
        let store = self.get_store()?;
        let series = store
            .samples
            .get(point_id)
            .ok_or_else(|| RepositoryError::not_found("MonitoringPoint", point_id))?;
        Ok(series
            .iter()
            .filter(|s| s.record_time >= from && s.record_time <= to)
            .cloned()
            .collect())
    }

    fn latest_sample_per_point(
        &self,
        section_id: &str,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
    ) -> RepositoryResult<Vec<FlowSample>> {
        let store = self.get_store()?;
        let section = store
            .sections
            .get(section_id)
            .ok_or_else(|| RepositoryError::not_found("RoadSection", section_id))?;

        let latest = section
            .point_ids
            .iter()
            .filter_map(|point_id| store.samples.get(point_id))
            .filter_map(|series| {
                series
                    .iter()
                    .rev()
                    .find(|s| s.record_time > window_start && s.record_time < window_end)
                    .cloned()
            })
            .collect();
        Ok(latest)
    }

    fn weather_for(
        &self,
        section_id: &str,
        at: NaiveDateTime,
    ) -> RepositoryResult<Option<WeatherObservation>> {
        let store = self.get_store()?;
        let section = store
            .sections
            .get(section_id)
            .ok_or_else(|| RepositoryError::not_found("RoadSection", section_id))?;

        Ok(store.weather.get(&section.region_id).and_then(|series| {
            series
                .iter()
                .rev()
                .find(|o| o.record_time <= at)
                .cloned()
        }))
    }
}
