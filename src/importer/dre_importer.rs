// ==========================================
// 经销商经营指标系统 - 损益表 (DRE) 文件导入
// ==========================================
// 职责: 表格文件 → DreDataset → 仓储
// 列约定（表头不区分大小写）:
//   id / codigo                  行 id（缺失时使用 "row<行号>"）
//   label / descricao / conta    行名称（缺失时使用 id）
//   Jan..Dez 或 m1..m12          月份数值（"Jan/25" 同样识别）
//   subtotal / issubtotal        1/true/sim/s/x 视为小计行
// 红线: 行顺序 = 文件顺序
// 红线: 任一单元格无法解析 → 整个文件拒绝,不做写入
// ==========================================

use crate::domain::defaults::MONTH_ABBREVIATIONS;
use crate::domain::dre::{DreDataset, DreLine};
use crate::domain::metrics::{MonthSeries, MONTHS_PER_YEAR};
use crate::domain::types::{Department, FiscalYear};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{FileParser, RawRow, UniversalFileParser};
use crate::repository::MetricsRepository;
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

const ID_COLUMNS: &[&str] = &["id", "codigo"];
const LABEL_COLUMNS: &[&str] = &["label", "descricao", "descrição", "conta"];
const SUBTOTAL_COLUMNS: &[&str] = &["subtotal", "issubtotal"];
const TRUTHY: &[&str] = &["1", "true", "sim", "s", "x", "yes"];

/// 单次导入结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DreImportReport {
    pub year: FiscalYear,
    pub department: Department,
    pub lines: usize,
    pub subtotals: usize,
}

// ==========================================
// DreImporter - 损益表导入器
// ==========================================
pub struct DreImporter {
    repo: Arc<MetricsRepository>,
    parser: Box<dyn FileParser>,
}

impl DreImporter {
    pub fn new(repo: Arc<MetricsRepository>) -> Self {
        Self {
            repo,
            parser: Box::new(UniversalFileParser),
        }
    }

    /// 使用自定义解析器（测试用）
    pub fn with_parser(repo: Arc<MetricsRepository>, parser: Box<dyn FileParser>) -> Self {
        Self { repo, parser }
    }

    /// 只解析不落库
    pub fn parse_file(&self, file_path: &Path) -> ImportResult<DreDataset> {
        let rows = self.parser.parse_to_raw_records(file_path)?;
        rows_to_dre(&rows)
    }

    /// 解析文件并保存到 (年度, 部门)
    ///
    /// 合并部门需要 `force = true`，否则返回写保护错误
    #[instrument(skip(self, file_path), fields(file = %file_path.display()))]
    pub fn import_file(
        &self,
        file_path: &Path,
        year: FiscalYear,
        department: Department,
        force: bool,
    ) -> ImportResult<DreImportReport> {
        let lines = self.parse_file(file_path)?;
        self.repo.try_save_dre(year, &lines, department, force)?;

        let report = DreImportReport {
            year,
            department,
            lines: lines.len(),
            subtotals: lines.iter().filter(|l| l.is_subtotal()).count(),
        };
        info!(lines = report.lines, subtotals = report.subtotals, "DRE 导入完成");
        Ok(report)
    }
}

/// 表头规范化: 小写、去空白、去掉 "/YY" 后缀
///
/// 日期型表头（"2025-01-01"，Excel 把 "Jan/25" 自动转成了日期）映射回月份缩写
fn normalize_header(header: &str) -> String {
    let lowered = header.trim().to_lowercase();
    if let Some(month0) = header_month(&lowered) {
        return MONTH_ABBREVIATIONS[month0].to_lowercase();
    }
    match lowered.split_once('/') {
        Some((head, _)) => head.trim().to_string(),
        None => lowered,
    }
}

/// ISO 日期表头 → 月份下标（0 起）
fn header_month(header: &str) -> Option<usize> {
    let date = header.get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .map(|d| d.month0() as usize)
}

fn normalize_row(row: &RawRow) -> HashMap<String, &str> {
    row.iter()
        .map(|(header, value)| (normalize_header(header), value.as_str()))
        .collect()
}

fn first_present<'a>(row: &HashMap<String, &'a str>, columns: &[&str]) -> Option<&'a str> {
    columns
        .iter()
        .filter_map(|c| row.get(*c).copied())
        .find(|v| !v.is_empty())
}

/// 某个月份（0 起）可能使用的列名
fn month_columns(month_index: usize) -> [String; 2] {
    [
        MONTH_ABBREVIATIONS[month_index].to_lowercase(),
        format!("m{}", month_index + 1),
    ]
}

/// 是否为按 "." 分组的千位整数（"1.234" / "-12.345.678"）
fn is_dot_grouped(digits: &str) -> bool {
    let digits = digits.strip_prefix('-').unwrap_or(digits);
    let mut groups = digits.split('.');
    let head_ok = groups
        .next()
        .map(|g| (1..=3).contains(&g.len()) && g.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false);
    let mut tail_count = 0;
    for group in groups {
        if group.len() != 3 || !group.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        tail_count += 1;
    }
    head_ok && tail_count > 0
}

/// 解析单元格数值（巴西格式）
///
/// - 空单元格视为 0
/// - "," 为小数点，"." 为千位分隔符: "1.234,56" / "3,5" / "1.234"
/// - 不含 "," 且不符合千位分组时按普通小数读取: "12.5"
/// - "1,234.56" 等混合写法拒绝
fn parse_amount(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }

    let normalized = match trimmed.split_once(',') {
        Some((integer, fraction)) => {
            if fraction.is_empty() || !fraction.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            let integer = if integer.contains('.') {
                if !is_dot_grouped(integer) {
                    return None;
                }
                integer.replace('.', "")
            } else {
                integer.to_string()
            };
            format!("{}.{}", integer, fraction)
        }
        None if is_dot_grouped(trimmed) => trimmed.replace('.', ""),
        None => trimmed.to_string(),
    };
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// 行记录 → 损益表
pub fn rows_to_dre(rows: &[RawRow]) -> ImportResult<DreDataset> {
    if rows.is_empty() {
        return Err(ImportError::EmptyFile);
    }

    let normalized: Vec<HashMap<String, &str>> = rows.iter().map(normalize_row).collect();

    let has_month_column = normalized.iter().any(|row| {
        (0..MONTHS_PER_YEAR).any(|m| month_columns(m).iter().any(|c| row.contains_key(c)))
    });
    if !has_month_column {
        return Err(ImportError::MissingColumn("Jan..Dez / m1..m12".to_string()));
    }

    let mut lines = Vec::with_capacity(rows.len());
    for (idx, row) in normalized.iter().enumerate() {
        // 表头占第 1 行
        let row_number = idx + 2;

        let mut values = [0.0; MONTHS_PER_YEAR];
        for (month_index, slot) in values.iter_mut().enumerate() {
            let columns = month_columns(month_index);
            let raw = columns
                .iter()
                .find_map(|c| row.get(c.as_str()).copied())
                .unwrap_or("");
            *slot = parse_amount(raw).ok_or_else(|| ImportError::TypeConversionError {
                row: row_number,
                field: MONTH_ABBREVIATIONS[month_index].to_string(),
                message: format!("无法解析数值 '{}'", raw),
            })?;
        }

        // 缺失 id 时使用带前缀的行号，避免与显式 id 冲突
        let id = first_present(row, ID_COLUMNS)
            .map(str::to_string)
            .unwrap_or_else(|| format!("row{}", row_number));
        let label = first_present(row, LABEL_COLUMNS)
            .map(str::to_string)
            .unwrap_or_else(|| id.clone());

        let mut line = DreLine::new(id, label, MonthSeries::new(values));
        if let Some(flag) = first_present(row, SUBTOTAL_COLUMNS) {
            if TRUTHY.contains(&flag.to_lowercase().as_str()) {
                line = line.subtotal();
            }
        }
        lines.push(line);
    }

    Ok(lines)
}
