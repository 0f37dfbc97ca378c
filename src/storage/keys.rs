// ==========================================
// 经销商经营指标系统 - 持久化键布局
// ==========================================
// 红线: 键格式为持久化契约,不得随意修改（向后兼容）
// 格式: {kind}_{year}_{department}
//   例: metrics_2025_usados / dre_2025_consolidado
// ==========================================

use crate::domain::types::{Department, FiscalYear, RecordKind};

/// 已选年度偏好键
pub const SELECTED_YEAR_KEY: &str = "selected_fiscal_year";

/// 已选部门偏好键
pub const SELECTED_DEPARTMENT_KEY: &str = "selected_department";

/// 记录键
pub fn record_key(year: FiscalYear, department: Department, kind: RecordKind) -> String {
    format!("{}_{}_{}", kind.key_prefix(), year, department)
}

/// 某年度全部记录键（全部部门，含派生部门）
pub fn year_record_keys(year: FiscalYear) -> Vec<String> {
    Department::ALL
        .into_iter()
        .flat_map(|department| {
            RecordKind::ALL
                .into_iter()
                .map(move |kind| record_key(year, department, kind))
        })
        .collect()
}

/// 全部已知记录键
pub fn all_record_keys() -> Vec<String> {
    FiscalYear::ALL
        .into_iter()
        .flat_map(year_record_keys)
        .collect()
}

/// 偏好键
pub fn preference_keys() -> Vec<String> {
    vec![
        SELECTED_YEAR_KEY.to_string(),
        SELECTED_DEPARTMENT_KEY.to_string(),
    ]
}

/// 全部已知键（记录 + 偏好）
pub fn all_known_keys() -> Vec<String> {
    let mut keys = all_record_keys();
    keys.extend(preference_keys());
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_record_key_layout() {
        assert_eq!(
            record_key(FiscalYear::Y2025, Department::Usados, RecordKind::Metrics),
            "metrics_2025_usados"
        );
        assert_eq!(
            record_key(FiscalYear::Y2024, Department::VendaDireta, RecordKind::Dre),
            "dre_2024_vendaDireta"
        );
    }

    #[test]
    fn test_all_keys_are_unique() {
        let keys = all_known_keys();
        let unique: HashSet<&String> = keys.iter().collect();
        assert_eq!(keys.len(), unique.len());
        assert_eq!(
            keys.len(),
            FiscalYear::ALL.len() * Department::ALL.len() * RecordKind::ALL.len() + 2
        );
    }
}
