// ==========================================
// 恩施山区交通平台 - CSV 文件解析器
// ==========================================
// 职责: 读取 CSV → 行记录 (表头 → 单元格文本)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// 原始行记录: (数据行号, 表头 → 去空白后的单元格)
pub type RawRow = (usize, HashMap<String, String>);

/// 解析结果
#[derive(Debug, Clone, Default)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

impl ParsedCsv {
    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }
}

// ==========================================
// CSV Parser
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 解析 CSV 文件
    ///
    /// # 返回
    /// 表头与非空白行记录; 行号从 1 开始 (不含表头)
    pub fn parse_file(&self, path: &Path) -> ImportResult<ParsedCsv> {
        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if !ext.eq_ignore_ascii_case("csv") {
            return Err(ImportError::UnsupportedFormat(ext.to_string()));
        }

        let file = File::open(path)?;
        self.parse_reader(file)
    }

    /// 从任意 Reader 解析 (表头必须存在)
    pub fn parse_reader<R: Read>(&self, reader: R) -> ImportResult<ParsedCsv> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let row_map: HashMap<String, String> = headers
                .iter()
                .zip(record.iter())
                .map(|(header, value)| (header.clone(), value.trim().to_string()))
                .collect();

            // 跳过完全空白的行
            if row_map.values().all(|v| v.is_empty()) {
                continue;
            }

            rows.push((row_idx + 1, row_map));
        }

        Ok(ParsedCsv { headers, rows })
    }
}
