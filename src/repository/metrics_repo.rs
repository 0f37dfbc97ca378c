// ==========================================
// 经销商经营指标系统 - 指标数据仓储
// ==========================================
// 职责: 按 (年度, 部门) 读写指标与损益表记录
// 红线: 派生部门 (consolidado) 写入必须显式 force
// 红线: 读取永不报错,损坏记录回退为默认值
// 红线: 清理操作只作用于指定的 (年度, 部门),互不影响
// ==========================================

mod core;
mod dre;


pub use core::MetricsRepository;
