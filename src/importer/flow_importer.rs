// ==========================================
// 恩施山区交通平台 - 流量样本导入器
// ==========================================
// 流程: 解析 CSV → 字段映射 → 逐行校验 → 按时间排序
// 红线: 类型错误整批失败; 取值越界的行剔除并记录
// ==========================================

use crate::api::validator::validate_flow_sample;
use crate::domain::flow::FlowSample;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{columns, FlowSampleFieldMapper};
use crate::importer::file_parser::{CsvParser, ParsedCsv};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::{info, instrument, warn};

// ==========================================
// 导入结果
// ==========================================

/// 被剔除的行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRow {
    pub row_number: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowImportOutcome {
    pub samples: Vec<FlowSample>, // 按 record_time 升序
    pub rejected: Vec<RejectedRow>,
}

impl FlowImportOutcome {
    pub fn total_rows(&self) -> usize {
        self.samples.len() + self.rejected.len()
    }
}

// ==========================================
// FlowSampleImporter
// ==========================================
pub struct FlowSampleImporter {
    parser: CsvParser,
    mapper: FlowSampleFieldMapper,
}

impl FlowSampleImporter {
    pub fn new() -> Self {
        Self {
            parser: CsvParser,
            mapper: FlowSampleFieldMapper,
        }
    }

    /// 从 CSV 文件导入单个监测点的样本
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn import_file<P: AsRef<Path>>(
        &self,
        path: P,
        point_id: &str,
    ) -> ImportResult<FlowImportOutcome> {
        let parsed = self.parser.parse_file(path.as_ref())?;
        self.import_parsed(parsed, point_id)
    }

    /// 从任意 Reader 导入
    pub fn import_reader<R: Read>(&self, reader: R, point_id: &str) -> ImportResult<FlowImportOutcome> {
        let parsed = self.parser.parse_reader(reader)?;
        self.import_parsed(parsed, point_id)
    }

    fn import_parsed(&self, parsed: ParsedCsv, point_id: &str) -> ImportResult<FlowImportOutcome> {
        if !parsed.has_column(columns::RECORD_TIME) {
            return Err(ImportError::FieldMissing(columns::RECORD_TIME.to_string()));
        }

        let mut outcome = FlowImportOutcome::default();
        for (row_number, row) in &parsed.rows {
            let sample = self.mapper.map_row(point_id, row, *row_number)?;
            match validate_flow_sample(&sample) {
                Ok(()) => outcome.samples.push(sample),
                Err(e) => {
                    warn!(row = row_number, point_id = %point_id, error = %e, "剔除非法样本行");
                    outcome.rejected.push(RejectedRow {
                        row_number: *row_number,
                        reason: e.to_string(),
                    });
                }
            }
        }
        outcome.samples.sort_by_key(|s| s.record_time);

        info!(
            point_id = %point_id,
            accepted = outcome.samples.len(),
            rejected = outcome.rejected.len(),
            "流量样本导入完成"
        );
        Ok(outcome)
    }
}

impl Default for FlowSampleImporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_sorts_and_rejects() {
        let data = "\
record_time,flow_rate,average_speed,occupancy_rate,max_speed,min_speed
2025-03-10 08:10:00,300,40,,,
2025-03-10 08:00:00,200,45,15,60,30
2025-03-10 08:05:00,250,44,150,,
";
        let outcome = FlowSampleImporter::new()
            .import_reader(data.as_bytes(), "P1")
            .unwrap();
        assert_eq!(outcome.total_rows(), 3);
        assert_eq!(outcome.samples.len(), 2);
        assert_eq!(outcome.samples[0].flow_rate, Some(200));
        assert_eq!(outcome.samples[1].flow_rate, Some(300));
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].row_number, 3);
    }

    #[test]
    fn test_missing_time_column() {
        let data = "flow_rate\n100\n";
        assert!(matches!(
            FlowSampleImporter::new().import_reader(data.as_bytes(), "P1"),
            Err(ImportError::FieldMissing(_))
        ));
    }

    #[test]
    fn test_type_error_fails_batch() {
        let data = "record_time,flow_rate\n2025-03-10 08:00:00,abc\n";
        assert!(matches!(
            FlowSampleImporter::new().import_reader(data.as_bytes(), "P1"),
            Err(ImportError::TypeConversionError { row: 1, .. })
        ));
    }
}
