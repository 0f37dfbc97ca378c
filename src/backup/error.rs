// ==========================================
// 经销商经营指标系统 - 备份模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 以下错误均发生在任何写入之前（整体无副作用）
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("备份文档不是合法 JSON: {0}")]
    MalformedDocument(#[from] serde_json::Error),

    #[error("备份文档顶层必须是对象，实际为 {0}")]
    InvalidRoot(&'static str),
}

pub type BackupResult<T> = Result<T, BackupError>;
