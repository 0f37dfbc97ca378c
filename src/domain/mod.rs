// ==========================================
// 经销商经营指标系统 - 领域模型层
// ==========================================
// 职责: 定义年度/部门类型、指标树、损益表、默认数据集
// 红线: 不含数据访问逻辑,不含合并逻辑
// ==========================================

pub mod defaults;
pub mod dre;
pub mod metrics;
pub mod types;

// 重导出核心类型
pub use defaults::{default_dre, default_metrics, month_labels};
pub use dre::{validate_dre, DreDataset, DreLine};
pub use metrics::{MetricNode, MetricsDataset, MonthSeries, MONTHS_PER_YEAR};
pub use types::{Department, FiscalYear, RecordKind};
