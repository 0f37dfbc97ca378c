// ==========================================
// 经销商经营指标系统 - 备份/恢复层
// ==========================================
// 职责: 全量状态 ↔ 单个 JSON 文档
// ==========================================

pub mod document;
pub mod error;
pub mod service;

// 重导出核心类型
pub use document::{BackupDocument, BackupEntry, BACKUP_FORMAT_VERSION};
pub use error::{BackupError, BackupResult};
pub use service::{BackupService, ImportSummary};
