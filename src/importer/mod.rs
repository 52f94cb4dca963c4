// ==========================================
// 恩施山区交通平台 - 导入层
// ==========================================
// 职责: 外部流量样本文件 → FlowSample
// 支持: CSV
// ==========================================

// 模块声明
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod flow_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::FlowSampleFieldMapper;
pub use file_parser::{CsvParser, ParsedCsv};
pub use flow_importer::{FlowImportOutcome, FlowSampleImporter, RejectedRow};
