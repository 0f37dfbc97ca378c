// ==========================================
// 经销商经营指标系统 - 核心库
// ==========================================
// 职责: 按 (财年, 部门) 持久化经营指标与损益表 (DRE)
// 技术栈: Rust + SQLite
// 合并部门 (consolidado) 由真实部门逐月汇总得出,可被显式覆盖
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 存储层 - 键值存储端口与实现
pub mod storage;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 合并汇总
pub mod engine;

// 备份层 - 导出/导入
pub mod backup;

// 导入层 - 外部表格文件
pub mod importer;

// 配置层 - 存储配置与选择偏好
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 应用层 - 组件组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    Department, DreDataset, DreLine, FiscalYear, MetricNode, MetricsDataset, MonthSeries,
    RecordKind,
};

// 存储
pub use storage::{KeyValueStore, MemoryKvStore, SqliteKvStore};

// 仓储
pub use repository::{MetricsRepository, RepositoryError, RepositoryResult};

// 引擎
pub use engine::ConsolidationEngine;

// 备份
pub use backup::{BackupDocument, BackupService, ImportSummary};

// 应用
pub use app::AppState;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "经销商经营指标系统";
