// ==========================================
// 恩施山区交通平台 - 交通数据源 Trait
// ==========================================
// 职责: 定义指标核心所需的只读数据访问接口
// 红线: 数据源不含业务规则, 只负责按 ID / 时间窗取数
// 实现者: InMemoryTrafficRepository (参考实现)
// ==========================================

use crate::domain::flow::FlowSample;
use crate::domain::geometry::RoadSegmentGeometry;
use crate::domain::peak_rule::PeakPeriodRule;
use crate::domain::weather::WeatherObservation;
use crate::repository::error::RepositoryResult;
use chrono::NaiveDateTime;

// ==========================================
// TrafficDataSource Trait
// ==========================================
// 约定: 未知的路段/监测点/道路 ID 返回 RepositoryError::NotFound;
//       数据缺失 (无样本/无天气) 返回空集合或 None
pub trait TrafficDataSource: Send + Sync {
    // ===== 静态查询 =====

    /// 路段几何快照
    fn section_geometry(&self, section_id: &str) -> RepositoryResult<RoadSegmentGeometry>;

    /// 路段下的监测点 ID 列表
    fn points_of_section(&self, section_id: &str) -> RepositoryResult<Vec<String>>;

    /// 道路下的路段 ID 列表
    fn sections_of_road(&self, road_id: &str) -> RepositoryResult<Vec<String>>;

    /// 路段关联的高峰期规则
    fn peak_rules_for_section(&self, section_id: &str) -> RepositoryResult<Vec<PeakPeriodRule>>;

    /// 路段基础限速 (km/h), 未配置时为 None
    fn base_speed_limit(&self, section_id: &str) -> RepositoryResult<Option<u32>>;

    // ===== 时间窗查询 =====

    /// 监测点 [from, to] 内的样本, 按 record_time 升序
    fn samples_in_window(
        &self,
        point_id: &str,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> RepositoryResult<Vec<FlowSample>>;

    /// 路段每个监测点在 (window_start, window_end) 内的最新样本 (每点至多一条)
    fn latest_sample_per_point(
        &self,
        section_id: &str,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
    ) -> RepositoryResult<Vec<FlowSample>>;

    /// 路段所属区域在 at 时刻及之前的最新气象观测
    fn weather_for(
        &self,
        section_id: &str,
        at: NaiveDateTime,
    ) -> RepositoryResult<Option<WeatherObservation>>;
}
