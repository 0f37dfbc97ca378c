// ==========================================
// 经销商经营指标系统 - 指标数据集
// ==========================================
// 职责: 月度序列 (MonthSeries) + 不规则嵌套指标树 (MetricNode)
// 红线: 每个月度序列长度恒为 12,数值必须有限 (非 NaN/Infinity)
// ==========================================
// 注: 各部门结构并不统一（如配件部门无库存数量），
//     因此采用通用树结构而非固定字段结构体
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 每个会计年度的月份数
pub const MONTHS_PER_YEAR: usize = 12;

/// 指标路径分隔符（"vendas.receitaBruta"）
pub const PATH_SEPARATOR: char = '.';

/// 月份标签字段名，与顶层分组共用同一 JSON 对象，不能用作分组名
pub const MONTHS_FIELD: &str = "months";

// ==========================================
// MonthSeries - 月度序列
// ==========================================
// 下标 0 = 1 月, 下标 11 = 12 月
// 反序列化时长度不为 12 直接失败
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MonthSeries([f64; MONTHS_PER_YEAR]);

impl MonthSeries {
    /// 全零序列
    pub fn zeros() -> Self {
        Self([0.0; MONTHS_PER_YEAR])
    }

    pub fn new(values: [f64; MONTHS_PER_YEAR]) -> Self {
        Self(values)
    }

    /// 从切片构建（长度必须为 12）
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        let array: [f64; MONTHS_PER_YEAR] = values.try_into().ok()?;
        Some(Self(array))
    }

    pub fn values(&self) -> &[f64; MONTHS_PER_YEAR] {
        &self.0
    }

    pub fn get(&self, month_index: usize) -> Option<f64> {
        self.0.get(month_index).copied()
    }

    /// 全年合计
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// 逐月累加
    pub fn add_assign(&mut self, other: &MonthSeries) {
        for (acc, v) in self.0.iter_mut().zip(other.0.iter()) {
            *acc += v;
        }
    }

    /// 将溢出的数值饱和到 ±f64::MAX（NaN 置 0）
    ///
    /// 返回是否发生了修正
    pub fn saturate(&mut self) -> bool {
        let mut changed = false;
        for v in self.0.iter_mut() {
            if v.is_finite() {
                continue;
            }
            *v = if v.is_nan() {
                0.0
            } else if v.is_sign_positive() {
                f64::MAX
            } else {
                f64::MIN
            };
            changed = true;
        }
        changed
    }

    /// 按连续月份分桶求和
    ///
    /// # 参数
    /// - `months_per_bucket`: 每桶月数，必须整除 12（1/2/3/4/6/12）
    ///
    /// # 返回
    /// - `Some(Vec<f64>)`: 12 / months_per_bucket 个桶（如季度为 4 个桶）
    /// - `None`: 分组因子不能整除 12
    pub fn aggregate(&self, months_per_bucket: usize) -> Option<Vec<f64>> {
        if months_per_bucket == 0 || MONTHS_PER_YEAR % months_per_bucket != 0 {
            return None;
        }

        Some(
            self.0
                .chunks(months_per_bucket)
                .map(|chunk| chunk.iter().sum())
                .collect(),
        )
    }
}

impl From<[f64; MONTHS_PER_YEAR]> for MonthSeries {
    fn from(values: [f64; MONTHS_PER_YEAR]) -> Self {
        Self(values)
    }
}

impl Default for MonthSeries {
    fn default() -> Self {
        Self::zeros()
    }
}

// ==========================================
// MetricNode - 指标树节点
// ==========================================
// JSON 形态: 数组 → 月度序列; 对象 → 分组
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricNode {
    Series(MonthSeries),
    Group(BTreeMap<String, MetricNode>),
}

impl MetricNode {
    pub fn as_series(&self) -> Option<&MonthSeries> {
        match self {
            MetricNode::Series(series) => Some(series),
            MetricNode::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&BTreeMap<String, MetricNode>> {
        match self {
            MetricNode::Series(_) => None,
            MetricNode::Group(children) => Some(children),
        }
    }

    /// 节点类型名（用于日志）
    pub fn kind_name(&self) -> &'static str {
        match self {
            MetricNode::Series(_) => "series",
            MetricNode::Group(_) => "group",
        }
    }

    fn validate(&self, path: &str) -> Result<(), String> {
        match self {
            MetricNode::Series(series) => {
                if !series.is_finite() {
                    return Err(format!("指标 {} 含有非有限数值", path));
                }
                Ok(())
            }
            MetricNode::Group(children) => {
                for (name, child) in children {
                    if name.trim().is_empty() {
                        return Err(format!("分组 {} 含有空名称节点", path));
                    }
                    child.validate(&join_path(path, name))?;
                }
                Ok(())
            }
        }
    }

    fn visit_series<'a>(&'a self, path: &str, visitor: &mut dyn FnMut(&str, &'a MonthSeries)) {
        match self {
            MetricNode::Series(series) => visitor(path, series),
            MetricNode::Group(children) => {
                for (name, child) in children {
                    child.visit_series(&join_path(path, name), visitor);
                }
            }
        }
    }
}

pub(crate) fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", parent, PATH_SEPARATOR, name)
    }
}

// ==========================================
// MetricsDataset - 单部门单年度指标数据集
// ==========================================
// JSON 形态: { "months": [...12 个标签], "<分组>": {...}, ... }
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsDataset {
    /// 月份标签（"Jan/25" … "Dez/25"）
    pub months: Vec<String>,

    /// 顶层指标分组
    #[serde(flatten)]
    pub groups: BTreeMap<String, MetricNode>,
}

impl MetricsDataset {
    pub fn new(months: Vec<String>, groups: BTreeMap<String, MetricNode>) -> Self {
        Self { months, groups }
    }

    /// 按路径查找节点
    pub fn node(&self, path: &str) -> Option<&MetricNode> {
        let mut segments = path.split(PATH_SEPARATOR);
        let first = segments.next()?;
        let mut current = self.groups.get(first)?;
        for segment in segments {
            current = current.as_group()?.get(segment)?;
        }
        Some(current)
    }

    /// 按路径查找月度序列
    pub fn series(&self, path: &str) -> Option<&MonthSeries> {
        self.node(path).and_then(MetricNode::as_series)
    }

    /// 按路径写入月度序列，中间分组不存在时自动创建
    ///
    /// # 返回
    /// - `true`: 写入成功
    /// - `false`: 路径为空，或路径中间节点是序列（结构冲突）
    pub fn set_series(&mut self, path: &str, series: MonthSeries) -> bool {
        let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        if segments.iter().any(|s| s.trim().is_empty()) || segments[0] == MONTHS_FIELD {
            return false;
        }

        let (last, parents) = match segments.split_last() {
            Some(split) => split,
            None => return false,
        };

        let mut children = &mut self.groups;
        for segment in parents {
            let node = children
                .entry(segment.to_string())
                .or_insert_with(|| MetricNode::Group(BTreeMap::new()));
            children = match node {
                MetricNode::Group(inner) => inner,
                MetricNode::Series(_) => return false,
            };
        }

        if let Some(MetricNode::Group(_)) = children.get(*last) {
            return false;
        }
        children.insert(last.to_string(), MetricNode::Series(series));
        true
    }

    /// 按路径删除节点，返回被删除的节点
    pub fn remove(&mut self, path: &str) -> Option<MetricNode> {
        let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
        let (last, parents) = segments.split_last()?;

        let mut children = &mut self.groups;
        for segment in parents {
            children = match children.get_mut(*segment)? {
                MetricNode::Group(inner) => inner,
                MetricNode::Series(_) => return None,
            };
        }
        children.remove(*last)
    }

    /// 遍历全部月度序列（路径按字典序）
    pub fn for_each_series<'a>(&'a self, mut visitor: impl FnMut(&str, &'a MonthSeries)) {
        for (name, node) in &self.groups {
            node.visit_series(name, &mut visitor);
        }
    }

    /// 月度序列数量
    pub fn series_count(&self) -> usize {
        let mut count = 0;
        self.for_each_series(|_, _| count += 1);
        count
    }

    /// 校验数据集结构
    ///
    /// # 校验规则
    /// 1. 月份标签恰为 12 个
    /// 2. 顶层分组不能为空
    /// 3. 节点名称不能为空，顶层不能使用保留名 months
    /// 4. 所有序列数值有限
    ///
    /// 注: 序列长度已由类型保证（反序列化阶段校验）
    pub fn validate(&self) -> Result<(), String> {
        if self.months.len() != MONTHS_PER_YEAR {
            return Err(format!(
                "月份标签数量错误: 期望 {}, 实际 {}",
                MONTHS_PER_YEAR,
                self.months.len()
            ));
        }

        if self.groups.is_empty() {
            return Err("指标数据集没有任何顶层分组".to_string());
        }

        for (name, node) in &self.groups {
            if name.trim().is_empty() {
                return Err("顶层分组名称不能为空".to_string());
            }
            if name == MONTHS_FIELD {
                return Err(format!("顶层分组名称 {} 为保留字段", MONTHS_FIELD));
            }
            node.validate(name)?;
        }

        Ok(())
    }
}
