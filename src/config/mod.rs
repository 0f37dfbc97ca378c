// ==========================================
// 经销商经营指标系统 - 配置层
// ==========================================
// 职责: 存储后端配置 + 选择偏好
// 来源: 环境变量 / 键值存储中的偏好键
// ==========================================

pub mod preferences;
pub mod store_config;

// 重导出核心配置
pub use preferences::{SelectionPreferences, DEFAULT_DEPARTMENT, DEFAULT_FISCAL_YEAR};
pub use store_config::{config_keys, get_default_db_path, StorageBackend, StoreConfig};
