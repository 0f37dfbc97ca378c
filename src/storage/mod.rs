// ==========================================
// 经销商经营指标系统 - 存储适配层
// ==========================================
// 职责: 键值存储端口 + 内存/SQLite 实现 + 键布局 + 镜像
// 红线: 存储层不理解数据内容,只存取字符串
// ==========================================

pub mod keys;
pub mod kv_store_trait;
pub mod memory_store;
pub mod mirror;
pub mod sqlite_store;

// 重导出核心类型
pub use kv_store_trait::{KeyValueStore, KvEntry};
pub use memory_store::MemoryKvStore;
pub use mirror::{mirror_records, MirrorReport};
pub use sqlite_store::SqliteKvStore;
