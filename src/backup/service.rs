// ==========================================
// 经销商经营指标系统 - 备份/恢复服务
// ==========================================
// 职责: 全量导出为单个 JSON 文档; 从文档按段容错导入
// 红线: 顶层解析失败 → 返回 false,不做任何写入
// 红线: 文档中未出现的 (年度, 部门) 保持原样（合并导入,不是覆盖）
// 红线: 只经由仓储读写,不直接访问键值存储
// ==========================================
// 导入: 合并语义 (import_all)
// 重置: 先清空再导入 (reset_and_import)
// ==========================================

use crate::backup::document::{BackupData, BackupDocument, BackupEntry, BACKUP_FORMAT_VERSION};
use crate::backup::error::{BackupError, BackupResult};
use crate::config::preferences::SelectionPreferences;
use crate::domain::dre::DreDataset;
use crate::domain::metrics::MetricsDataset;
use crate::domain::types::{Department, FiscalYear};
use crate::repository::error::RepositoryResult;
use crate::repository::MetricsRepository;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// 导入结果统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// 恢复的选择偏好数量（0~2）
    pub selections_restored: usize,
    pub metrics_written: usize,
    pub dre_written: usize,
    /// dre 字段为 null 时清除的记录数
    pub dre_cleared: usize,
    /// 被跳过的段及原因
    pub skipped: Vec<String>,
}

impl ImportSummary {
    fn skip(&mut self, reason: String) {
        warn!(reason = %reason, "备份段已跳过");
        self.skipped.push(reason);
    }
}

// ==========================================
// BackupService - 备份/恢复服务
// ==========================================
pub struct BackupService {
    repo: Arc<MetricsRepository>,
    preferences: SelectionPreferences,
}

impl BackupService {
    /// 偏好与仓储共用同一存储
    pub fn new(repo: Arc<MetricsRepository>) -> Self {
        let preferences = SelectionPreferences::new(repo.store());
        Self { repo, preferences }
    }

    pub fn preferences(&self) -> &SelectionPreferences {
        &self.preferences
    }

    // ==========================================
    // 导出
    // ==========================================

    /// 构建全量备份文档
    ///
    /// # 规则
    /// - 每个年度 × 每个真实部门: 指标（从未写入则为默认值）+ 损益表（无则 null）
    /// - 合并部门: 仅在存在覆盖记录时导出，且只导出被覆盖的部分
    pub fn build_document(&self) -> BackupDocument {
        let mut data = BackupData::new();

        for year in FiscalYear::ALL {
            let mut departments = BTreeMap::new();
            for department in Department::REAL {
                departments.insert(
                    department.as_str().to_string(),
                    BackupEntry {
                        metrics: Some(self.repo.load_metrics(year, department)),
                        dre: self.repo.load_dre(year, department),
                    },
                );
            }

            if let Some(entry) = self.export_override(year) {
                departments.insert(Department::Consolidado.as_str().to_string(), entry);
            }

            data.insert(year.to_string(), departments);
        }

        BackupDocument {
            version: BACKUP_FORMAT_VERSION,
            selected_year: Some(self.preferences.selected_year_or_default()),
            selected_department: Some(self.preferences.selected_department_or_default()),
            export_date: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            data: Some(data),
        }
    }

    fn export_override(&self, year: FiscalYear) -> Option<BackupEntry> {
        let department = Department::Consolidado;

        let metrics = self
            .repo
            .try_read_metrics(year, department)
            .unwrap_or_else(|e| {
                warn!(year = %year, error = %e, "合并部门指标覆盖记录损坏，不导出");
                None
            });
        let dre = self
            .repo
            .try_read_dre(year, department)
            .unwrap_or_else(|e| {
                warn!(year = %year, error = %e, "合并部门损益表覆盖记录损坏，不导出");
                None
            })
            .filter(|lines| !lines.is_empty());

        if metrics.is_none() && dre.is_none() {
            return None;
        }
        Some(BackupEntry { metrics, dre })
    }

    /// 导出为 JSON 文本
    pub fn export_all(&self) -> RepositoryResult<String> {
        let document = self.build_document();
        let text = serde_json::to_string_pretty(&document)?;
        info!(
            entries = document.entry_count(),
            bytes = text.len(),
            "全量备份导出完成"
        );
        Ok(text)
    }

    // ==========================================
    // 导入
    // ==========================================

    /// 导入备份（返回是否成功解析）
    ///
    /// 解析成功后，单个段的失败不影响其他段，结果仍为 true
    pub fn import_all(&self, text: &str) -> bool {
        match self.try_import_all(text) {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "备份导入失败，未做任何修改");
                false
            }
        }
    }

    /// 导入备份并返回统计
    pub fn try_import_all(&self, text: &str) -> BackupResult<ImportSummary> {
        let root = parse_root(text)?;
        Ok(self.apply(&root))
    }

    /// 重置导入: 文档可解析时先清空全部数据，再导入
    pub fn reset_and_import(&self, text: &str) -> bool {
        let root = match parse_root(text) {
            Ok(root) => root,
            Err(e) => {
                warn!(error = %e, "备份文档无法解析，重置导入已取消");
                return false;
            }
        };

        if !self.repo.clear_all_data() {
            warn!("清空数据失败，重置导入已取消");
            return false;
        }
        self.apply(&root);
        true
    }

    fn apply(&self, root: &Map<String, Value>) -> ImportSummary {
        let mut summary = ImportSummary::default();

        self.restore_selections(root, &mut summary);

        match root.get("data") {
            None | Some(Value::Null) => {
                info!("备份文档不含 data 段，仅恢复选择偏好");
            }
            Some(Value::Object(years)) => {
                for (year_key, departments) in years {
                    self.import_year(year_key, departments, &mut summary);
                }
            }
            Some(other) => summary.skip(format!("data 段类型错误: {}", json_kind(other))),
        }

        info!(
            selections = summary.selections_restored,
            metrics = summary.metrics_written,
            dre = summary.dre_written,
            dre_cleared = summary.dre_cleared,
            skipped = summary.skipped.len(),
            "备份导入完成"
        );
        summary
    }

    fn restore_selections(&self, root: &Map<String, Value>, summary: &mut ImportSummary) {
        if let Some(value) = root.get("selectedYear") {
            match parse_year_value(value) {
                Some(year) => {
                    if self.preferences.set_selected_year(year) {
                        summary.selections_restored += 1;
                    }
                }
                None => summary.skip(format!("selectedYear 非法: {}", value)),
            }
        }

        if let Some(value) = root.get("selectedDepartment") {
            match value.as_str().and_then(|s| s.parse::<Department>().ok()) {
                Some(department) => {
                    if self.preferences.set_selected_department(department) {
                        summary.selections_restored += 1;
                    }
                }
                None => summary.skip(format!("selectedDepartment 非法: {}", value)),
            }
        }
    }

    fn import_year(&self, year_key: &str, departments: &Value, summary: &mut ImportSummary) {
        let year = match year_key.parse::<FiscalYear>() {
            Ok(year) => year,
            Err(e) => {
                summary.skip(format!("data.{}: {}", year_key, e));
                return;
            }
        };

        let departments = match departments.as_object() {
            Some(departments) => departments,
            None => {
                summary.skip(format!("data.{}: 类型错误 {}", year_key, json_kind(departments)));
                return;
            }
        };

        for (department_key, entry) in departments {
            match department_key.parse::<Department>() {
                Ok(department) => self.import_entry(year, department, entry, summary),
                Err(e) => summary.skip(format!("data.{}.{}: {}", year_key, department_key, e)),
            }
        }
    }

    fn import_entry(
        &self,
        year: FiscalYear,
        department: Department,
        entry: &Value,
        summary: &mut ImportSummary,
    ) {
        let location = format!("data.{}.{}", year, department);
        let entry = match entry.as_object() {
            Some(entry) => entry,
            None => {
                summary.skip(format!("{}: 类型错误 {}", location, json_kind(entry)));
                return;
            }
        };
        // 合并部门的条目即覆盖记录
        let force = department.is_derived();

        match entry.get("metrics") {
            None | Some(Value::Null) => {}
            Some(value) => match serde_json::from_value::<MetricsDataset>(value.clone()) {
                Ok(dataset) => match self.repo.try_save_metrics(year, &dataset, department, force) {
                    Ok(()) => summary.metrics_written += 1,
                    Err(e) => summary.skip(format!("{}.metrics: {}", location, e)),
                },
                Err(e) => summary.skip(format!("{}.metrics: {}", location, e)),
            },
        }

        match entry.get("dre") {
            None => {}
            Some(Value::Null) => match self.repo.try_remove_dre(year, department, force) {
                Ok(()) => summary.dre_cleared += 1,
                Err(e) => summary.skip(format!("{}.dre: {}", location, e)),
            },
            Some(value) => match serde_json::from_value::<DreDataset>(value.clone()) {
                Ok(lines) => match self.repo.try_save_dre(year, &lines, department, force) {
                    Ok(()) => summary.dre_written += 1,
                    Err(e) => summary.skip(format!("{}.dre: {}", location, e)),
                },
                Err(e) => summary.skip(format!("{}.dre: {}", location, e)),
            },
        }
    }
}

/// 解析顶层文档（任何写入之前完成）
fn parse_root(text: &str) -> BackupResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(map),
        other => Err(BackupError::InvalidRoot(json_kind(&other))),
    }
}

/// 年度既可以是数字也可以是字符串
fn parse_year_value(value: &Value) -> Option<FiscalYear> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|y| u16::try_from(y).ok())
            .and_then(FiscalYear::from_u16),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
