// ==========================================
// 经销商经营指标系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 注: 对外公开操作一律吞掉错误并返回值/布尔,
//     try_* 系列操作返回本类型供日志与测试使用
// ==========================================

use crate::domain::types::{Department, FiscalYear, RecordKind};
use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 写保护 =====
    #[error("派生部门写保护: {department} 年度 {year} 的 {kind} 写入需显式 force")]
    GuardedWriteRejected {
        year: FiscalYear,
        department: Department,
        kind: RecordKind,
    },

    // ===== 数据质量错误 =====
    #[error("记录已损坏 (key={key}): {message}")]
    CorruptedRecord { key: String, message: String },

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("序列化失败: {0}")]
    SerializationError(#[from] serde_json::Error),

    // ===== 存储错误 =====
    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RepositoryError {
    /// 是否为派生部门写保护拒绝
    pub fn is_guard_rejection(&self) -> bool {
        matches!(self, RepositoryError::GuardedWriteRejected { .. })
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                RepositoryError::DatabaseQueryError(msg)
            }
            rusqlite::Error::SqliteFailure(code, None) => {
                RepositoryError::DatabaseQueryError(code.to_string())
            }
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
