// ==========================================
// 经销商经营指标系统 - 备份文档格式
// ==========================================
// 红线: 唯一具有兼容性要求的线格式
// 顶层字段: version / selectedYear / selectedDepartment / exportDate / data
// data: { "<年度>": { "<部门>": { metrics, dre } } }
// ==========================================

use crate::domain::dre::DreDataset;
use crate::domain::metrics::MetricsDataset;
use crate::domain::types::{Department, FiscalYear};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 当前备份格式版本
pub const BACKUP_FORMAT_VERSION: u32 = 1;

fn default_version() -> u32 {
    BACKUP_FORMAT_VERSION
}

/// 年度 → 部门 → 条目
pub type BackupData = BTreeMap<String, BTreeMap<String, BackupEntry>>;

/// 全量备份文档
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_year: Option<FiscalYear>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_department: Option<Department>,

    /// ISO-8601 导出时间
    #[serde(default, alias = "exportTimestamp", skip_serializing_if = "Option::is_none")]
    pub export_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<BackupData>,
}

impl BackupDocument {
    /// 读取某个 (年度, 部门) 条目
    pub fn entry(&self, year: FiscalYear, department: Department) -> Option<&BackupEntry> {
        self.data
            .as_ref()?
            .get(&year.to_string())?
            .get(department.as_str())
    }

    /// 条目总数
    pub fn entry_count(&self) -> usize {
        self.data
            .as_ref()
            .map(|data| data.values().map(|departments| departments.len()).sum())
            .unwrap_or(0)
    }
}

/// 单个 (年度, 部门) 条目
///
/// 合并部门仅导出存在覆盖记录的部分，缺失的指标字段省略
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsDataset>,

    #[serde(default)]
    pub dre: Option<DreDataset>,
}
