// ==========================================
// 经销商经营指标系统 - 存储配置
// ==========================================
// 职责: 决定使用哪种键值存储、数据库文件位置
// 来源: 环境变量（便于调试/测试/CI）→ 用户数据目录 → 当前目录
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::storage::{KeyValueStore, MemoryKvStore, SqliteKvStore};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// 环境变量键
pub mod config_keys {
    /// 数据库文件路径
    pub const ENV_DB_PATH: &str = "DEALER_METRICS_DB_PATH";
    /// 存储后端 (sqlite | memory)
    pub const ENV_BACKEND: &str = "DEALER_METRICS_BACKEND";
}

/// 默认数据库文件名
pub const DEFAULT_DB_FILE_NAME: &str = "dealer_metrics.db";

// ==========================================
// 存储后端
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    #[default]
    Sqlite, // 本地 SQLite 文件
    Memory, // 进程内存（退出即丢失）
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" | "" => Ok(StorageBackend::Sqlite),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            other => Err(format!("未知存储后端: {}", other)),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Sqlite => write!(f, "SQLITE"),
            StorageBackend::Memory => write!(f, "MEMORY"),
        }
    }
}

// ==========================================
// StoreConfig - 存储配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: StorageBackend,
    pub db_path: String,
}

impl StoreConfig {
    /// 从进程环境变量加载
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键查找函数加载（测试注入）
    ///
    /// 非法的后端取值回退为 SQLite 并告警
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let backend = match lookup(config_keys::ENV_BACKEND) {
            Some(raw) => raw.parse().unwrap_or_else(|e: String| {
                tracing::warn!(value = %raw, "{}，回退为 SQLite", e);
                StorageBackend::Sqlite
            }),
            None => StorageBackend::Sqlite,
        };

        let db_path = lookup(config_keys::ENV_DB_PATH)
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(get_default_db_path);

        Self { backend, db_path }
    }

    /// 使用指定数据库文件的 SQLite 配置
    pub fn sqlite(db_path: impl Into<String>) -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            db_path: db_path.into(),
        }
    }

    /// 内存配置
    pub fn memory() -> Self {
        Self {
            backend: StorageBackend::Memory,
            db_path: String::new(),
        }
    }

    /// 按配置打开键值存储
    pub fn open_store(&self) -> RepositoryResult<Arc<dyn KeyValueStore>> {
        match self.backend {
            StorageBackend::Sqlite => {
                if self.db_path.trim().is_empty() {
                    return Err(RepositoryError::DatabaseConnectionError(
                        "数据库路径为空".to_string(),
                    ));
                }
                tracing::info!(db_path = %self.db_path, "使用 SQLite 存储");
                Ok(Arc::new(SqliteKvStore::open(&self.db_path)?))
            }
            StorageBackend::Memory => {
                tracing::info!("使用内存存储（数据不会持久化）");
                Ok(Arc::new(MemoryKvStore::new()))
            }
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::sqlite(get_default_db_path())
    }
}

/// 默认数据库路径
///
/// 优先级: 环境变量 → 用户数据目录/dealer-metrics/ → 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(config_keys::ENV_DB_PATH) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from(".").join(DEFAULT_DB_FILE_NAME);

    if let Some(data_dir) = dirs::data_dir() {
        let app_dir = data_dir.join("dealer-metrics");
        // 确保目录存在；失败时保留当前目录回退值
        if std::fs::create_dir_all(&app_dir).is_ok() {
            path = app_dir.join(DEFAULT_DB_FILE_NAME);
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_reads_backend_and_path() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            (config_keys::ENV_BACKEND, "memory"),
            (config_keys::ENV_DB_PATH, "/tmp/x.db"),
        ]));
        assert_eq!(config.backend, StorageBackend::Memory);
        assert_eq!(config.db_path, "/tmp/x.db");
    }

    #[test]
    fn test_invalid_backend_falls_back_to_sqlite() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            (config_keys::ENV_BACKEND, "redis"),
            (config_keys::ENV_DB_PATH, "a.db"),
        ]));
        assert_eq!(config.backend, StorageBackend::Sqlite);
    }

    #[test]
    fn test_memory_store_opens() {
        let store = StoreConfig::memory().open_store().unwrap();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn test_sqlite_with_empty_path_is_rejected() {
        assert!(StoreConfig::sqlite("  ").open_store().is_err());
    }
}
