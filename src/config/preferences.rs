// ==========================================
// 经销商经营指标系统 - 选择偏好
// ==========================================
// 职责: 当前选中年度 / 部门的标量读写
// 存储: selected_fiscal_year / selected_department 两个独立键
// 注: 非法的存储值视为未设置
// ==========================================

use crate::domain::types::{Department, FiscalYear};
use crate::repository::error::RepositoryResult;
use crate::storage::keys::{SELECTED_DEPARTMENT_KEY, SELECTED_YEAR_KEY};
use crate::storage::kv_store_trait::KeyValueStore;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

/// 默认选中年度
pub const DEFAULT_FISCAL_YEAR: FiscalYear = FiscalYear::Y2025;

/// 默认选中部门
pub const DEFAULT_DEPARTMENT: Department = Department::Consolidado;

pub struct SelectionPreferences {
    store: Arc<dyn KeyValueStore>,
}

impl SelectionPreferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn read<T: FromStr<Err = String>>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %key, error = %e, "偏好读取失败");
                return None;
            }
        };

        match raw.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, value = %raw, error = %e, "偏好值非法，视为未设置");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) -> bool {
        match self.store.set(key, value) {
            Ok(()) => true,
            Err(e) => {
                warn!(key = %key, error = %e, "偏好写入失败");
                false
            }
        }
    }

    // ===== 年度 =====

    pub fn selected_year(&self) -> Option<FiscalYear> {
        self.read(SELECTED_YEAR_KEY)
    }

    pub fn selected_year_or_default(&self) -> FiscalYear {
        self.selected_year().unwrap_or(DEFAULT_FISCAL_YEAR)
    }

    pub fn set_selected_year(&self, year: FiscalYear) -> bool {
        self.write(SELECTED_YEAR_KEY, &year.to_string())
    }

    // ===== 部门 =====

    pub fn selected_department(&self) -> Option<Department> {
        self.read(SELECTED_DEPARTMENT_KEY)
    }

    pub fn selected_department_or_default(&self) -> Department {
        self.selected_department().unwrap_or(DEFAULT_DEPARTMENT)
    }

    pub fn set_selected_department(&self, department: Department) -> bool {
        self.write(SELECTED_DEPARTMENT_KEY, department.as_str())
    }

    /// 清除两个偏好
    pub fn clear(&self) -> RepositoryResult<()> {
        self.store.remove(SELECTED_YEAR_KEY)?;
        self.store.remove(SELECTED_DEPARTMENT_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory_store::MemoryKvStore;

    fn setup() -> (Arc<MemoryKvStore>, SelectionPreferences) {
        let store = Arc::new(MemoryKvStore::new());
        let prefs = SelectionPreferences::new(store.clone());
        (store, prefs)
    }

    #[test]
    fn test_defaults_when_unset() {
        let (_store, prefs) = setup();
        assert_eq!(prefs.selected_year(), None);
        assert_eq!(prefs.selected_year_or_default(), DEFAULT_FISCAL_YEAR);
        assert_eq!(prefs.selected_department_or_default(), DEFAULT_DEPARTMENT);
    }

    #[test]
    fn test_set_and_get() {
        let (store, prefs) = setup();
        assert!(prefs.set_selected_year(FiscalYear::Y2027));
        assert!(prefs.set_selected_department(Department::Funilaria));

        assert_eq!(prefs.selected_year(), Some(FiscalYear::Y2027));
        assert_eq!(prefs.selected_department(), Some(Department::Funilaria));
        assert_eq!(store.get(SELECTED_YEAR_KEY).unwrap(), Some("2027".to_string()));
        assert_eq!(
            store.get(SELECTED_DEPARTMENT_KEY).unwrap(),
            Some("funilaria".to_string())
        );

        prefs.clear().unwrap();
        assert_eq!(prefs.selected_year(), None);
        assert_eq!(prefs.selected_department(), None);
    }

    #[test]
    fn test_invalid_stored_value_reads_as_unset() {
        let (store, prefs) = setup();
        store.set(SELECTED_YEAR_KEY, "1999").unwrap();
        store.set(SELECTED_DEPARTMENT_KEY, "marketing").unwrap();

        assert_eq!(prefs.selected_year(), None);
        assert_eq!(prefs.selected_department(), None);
    }
}
