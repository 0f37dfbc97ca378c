// ==========================================
// 经销商经营指标系统 - 应用状态
// ==========================================
// 职责: 按配置组装共享存储、仓储与服务
// 注: 所有组件共用同一个键值存储实例
// ==========================================

use std::sync::Arc;

use crate::backup::BackupService;
use crate::config::{SelectionPreferences, StoreConfig};
use crate::importer::DreImporter;
use crate::repository::error::RepositoryResult;
use crate::repository::MetricsRepository;
use crate::storage::KeyValueStore;

/// 应用状态
pub struct AppState {
    /// 生效的存储配置
    pub config: StoreConfig,

    /// 底层键值存储
    pub store: Arc<dyn KeyValueStore>,

    /// 指标/损益表仓储
    pub repo: Arc<MetricsRepository>,

    /// 备份/恢复服务
    pub backup: BackupService,

    /// 损益表文件导入
    pub dre_importer: DreImporter,

    /// 年度/部门选择偏好
    pub preferences: SelectionPreferences,
}

impl AppState {
    /// 按配置创建应用状态
    pub fn new(config: StoreConfig) -> RepositoryResult<Self> {
        tracing::info!(backend = %config.backend, db_path = %config.db_path, "初始化AppState");

        let store = config.open_store()?;
        Ok(Self::with_store(config, store))
    }

    /// 使用已打开的存储创建（测试 / 嵌入场景）
    pub fn with_store(config: StoreConfig, store: Arc<dyn KeyValueStore>) -> Self {
        let repo = Arc::new(MetricsRepository::new(Arc::clone(&store)));
        let backup = BackupService::new(Arc::clone(&repo));
        let dre_importer = DreImporter::new(Arc::clone(&repo));
        let preferences = SelectionPreferences::new(Arc::clone(&store));

        Self {
            config,
            store,
            repo,
            backup,
            dre_importer,
            preferences,
        }
    }

    /// 从环境变量配置创建
    pub fn from_env() -> RepositoryResult<Self> {
        Self::new(StoreConfig::from_env())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{Department, FiscalYear};

    #[test]
    fn test_components_share_one_store() {
        let state = AppState::new(StoreConfig::memory()).unwrap();

        state.preferences.set_selected_year(FiscalYear::Y2027);
        assert_eq!(
            state.backup.preferences().selected_year(),
            Some(FiscalYear::Y2027)
        );

        assert!(state.repo.clear_all_data());
        assert!(state.preferences.selected_year().is_none());
        assert!(!state.repo.has_stored_data(FiscalYear::Y2027, Department::Novos));
    }

    #[test]
    fn test_sqlite_state_opens_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("state.db");
        let state = AppState::new(StoreConfig::sqlite(db_path.to_string_lossy())).unwrap();

        assert!(state.preferences.set_selected_department(Department::Pecas));
        assert!(db_path.exists());
    }
}
