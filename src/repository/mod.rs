// ==========================================
// 恩施山区交通平台 - 数据源层
// ==========================================
// 红线: 数据源不含业务逻辑
// ==========================================
// 职责: 提供路段层级、样本、气象与规则的只读访问
// ==========================================

pub mod error;
pub mod memory;
pub mod scenario;
pub mod traffic_source;

// 重导出核心类型
pub use error::{RepositoryError, RepositoryResult};
pub use memory::InMemoryTrafficRepository;
pub use scenario::{ScenarioRoad, ScenarioSection, TrafficScenario};
pub use traffic_source::TrafficDataSource;
