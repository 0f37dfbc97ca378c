// ==========================================
// 经销商经营指标系统 - 导入层
// ==========================================
// 职责: 外部表格文件 → 损益表数据集
// 支持: Excel, CSV
// ==========================================

pub mod dre_importer;
pub mod error;
pub mod file_parser;

// 重导出核心类型
pub use dre_importer::{rows_to_dre, DreImportReport, DreImporter};
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRow, UniversalFileParser};
