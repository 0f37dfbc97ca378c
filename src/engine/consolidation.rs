// ==========================================
// 经销商经营指标系统 - 合并引擎
// ==========================================
// 职责: 将全部真实部门的指标数据集逐字段求和,得到合并部门数据集
// 输入: 各真实部门的指标 / 损益表（经由仓储读取）
// 输出: 与单部门结构相同的数据集
// ==========================================
// 红线: 只读引擎,不写入任何记录
// 红线: 按键的并集遍历,缺失键视为 0（加法单位元）
// 红线: 合并结果必须为有限值,溢出时饱和到 ±f64::MAX
// 红线: 同一路径在不同部门类型不一致（序列 vs 分组）时,
//       记录告警并将序列排除在求和之外,分组优先
// ==========================================

use crate::domain::defaults::month_labels;
use crate::domain::dre::DreDataset;
use crate::domain::metrics::{join_path, MetricNode, MetricsDataset, MonthSeries};
use crate::domain::types::{Department, FiscalYear};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, warn};

// ==========================================
// MetricsSource - 合并引擎的数据来源
// ==========================================
// 实现者: MetricsRepository
pub trait MetricsSource {
    /// 读取指标数据集（不存在/损坏时返回默认数据集）
    fn load_metrics(&self, year: FiscalYear, department: Department) -> MetricsDataset;

    /// 读取损益表（不存在/空/损坏时返回 None）
    fn load_dre(&self, year: FiscalYear, department: Department) -> Option<DreDataset>;
}

/// 结构冲突: 同一路径在部分部门为序列、在其他部门为分组
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaConflict {
    pub path: String,
    /// 该路径为序列的数据集数量（已排除）
    pub series_count: usize,
    /// 该路径为分组的数据集数量
    pub group_count: usize,
}

/// 合并结果（数据集 + 结构冲突明细）
#[derive(Debug, Clone)]
pub struct Consolidation {
    pub dataset: MetricsDataset,
    pub conflicts: Vec<SchemaConflict>,
}

// ==========================================
// ConsolidationEngine - 合并引擎
// ==========================================
// 无状态引擎
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsolidationEngine;

impl ConsolidationEngine {
    pub fn new() -> Self {
        Self
    }

    /// 合并某年度全部真实部门的指标
    pub fn consolidate(&self, source: &dyn MetricsSource, year: FiscalYear) -> MetricsDataset {
        self.consolidate_with_report(source, year).dataset
    }

    /// 合并并返回结构冲突明细
    pub fn consolidate_with_report(
        &self,
        source: &dyn MetricsSource,
        year: FiscalYear,
    ) -> Consolidation {
        let datasets: Vec<MetricsDataset> = Department::REAL
            .into_iter()
            .map(|department| source.load_metrics(year, department))
            .collect();

        let result = self.sum_datasets(year, &datasets);
        debug!(
            year = %year,
            departments = datasets.len(),
            series = result.dataset.series_count(),
            conflicts = result.conflicts.len(),
            "指标合并完成"
        );
        result
    }

    /// 对任意一组数据集做结构求和
    ///
    /// 月份标签取自该年度默认标签（不参与求和）。
    /// 求和满足交换律与结合律，数据集顺序不影响结果。
    pub fn sum_datasets(&self, year: FiscalYear, datasets: &[MetricsDataset]) -> Consolidation {
        let mut conflicts = Vec::new();
        let maps: Vec<&BTreeMap<String, MetricNode>> =
            datasets.iter().map(|dataset| &dataset.groups).collect();
        let groups = sum_children(&maps, "", &mut conflicts);

        Consolidation {
            dataset: MetricsDataset::new(month_labels(year), groups),
            conflicts,
        }
    }

    /// 合并某年度全部真实部门的损益表
    ///
    /// # 规则
    /// - 按行 id 取并集，数值逐月求和
    /// - 行顺序 / 名称 / 小计标记取自首个（规范部门顺序）定义该 id 的部门
    /// - 所有部门均无损益表时返回 None
    pub fn consolidate_dre(&self, source: &dyn MetricsSource, year: FiscalYear) -> Option<DreDataset> {
        let sources: Vec<DreDataset> = Department::REAL
            .into_iter()
            .filter_map(|department| source.load_dre(year, department))
            .collect();

        self.sum_dre(&sources)
    }

    /// 对任意一组损益表按行 id 求和
    pub fn sum_dre(&self, sources: &[DreDataset]) -> Option<DreDataset> {
        if sources.is_empty() {
            return None;
        }

        let mut merged: DreDataset = Vec::new();
        let mut index_by_id: HashMap<String, usize> = HashMap::new();

        for lines in sources {
            for line in lines {
                match index_by_id.get(&line.id) {
                    Some(&idx) => merged[idx].values.add_assign(&line.values),
                    None => {
                        index_by_id.insert(line.id.clone(), merged.len());
                        merged.push(line.clone());
                    }
                }
            }
        }

        for line in merged.iter_mut() {
            if line.values.saturate() {
                warn!(id = %line.id, "损益表合并结果溢出，已饱和到有限值");
            }
        }

        if merged.is_empty() {
            None
        } else {
            Some(merged)
        }
    }
}

/// 对一组同层级子节点映射按键并集求和
fn sum_children(
    maps: &[&BTreeMap<String, MetricNode>],
    path: &str,
    conflicts: &mut Vec<SchemaConflict>,
) -> BTreeMap<String, MetricNode> {
    let keys: BTreeSet<&String> = maps.iter().flat_map(|map| map.keys()).collect();

    let mut result = BTreeMap::new();
    for key in keys {
        let child_path = join_path(path, key);

        let mut series: Vec<&MonthSeries> = Vec::new();
        let mut groups: Vec<&BTreeMap<String, MetricNode>> = Vec::new();
        for node in maps.iter().filter_map(|map| map.get(key)) {
            match node {
                MetricNode::Series(s) => series.push(s),
                MetricNode::Group(g) => groups.push(g),
            }
        }

        let node = if groups.is_empty() {
            let mut total = MonthSeries::zeros();
            for s in series {
                total.add_assign(s);
            }
            if total.saturate() {
                warn!(path = %child_path, "指标合并结果溢出，已饱和到有限值");
            }
            MetricNode::Series(total)
        } else {
            if !series.is_empty() {
                warn!(
                    path = %child_path,
                    series_count = series.len(),
                    group_count = groups.len(),
                    "指标结构冲突: 同一路径既是序列又是分组，序列已排除在合并之外"
                );
                conflicts.push(SchemaConflict {
                    path: child_path.clone(),
                    series_count: series.len(),
                    group_count: groups.len(),
                });
            }
            MetricNode::Group(sum_children(&groups, &child_path, conflicts))
        };

        result.insert(key.clone(), node);
    }
    result
}

#[cfg(test)]
mod tests;
