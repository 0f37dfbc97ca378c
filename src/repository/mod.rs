// ==========================================
// 经销商经营指标系统 - 数据仓储层
// ==========================================
// 职责: 提供指标/损益表记录访问接口,屏蔽键值存储细节
// 红线: 仓储是记录的唯一写入方
// ==========================================

pub mod error;
pub mod metrics_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use metrics_repo::MetricsRepository;
