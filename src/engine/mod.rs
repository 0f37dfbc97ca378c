// ==========================================
// 经销商经营指标系统 - 引擎层
// ==========================================
// 职责: 派生数据计算（合并部门）
// 红线: 引擎只读,写入一律经由仓储层的受保护接口
// ==========================================

pub mod consolidation;

// 重导出核心引擎
pub use consolidation::{Consolidation, ConsolidationEngine, MetricsSource, SchemaConflict};
