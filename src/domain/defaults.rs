// ==========================================
// 经销商经营指标系统 - 默认数据集注册表
// ==========================================
// 职责: 提供规范结构的零值数据集
// 红线: 纯函数,同一年度始终得到结构相同的数据集
// ==========================================
// 用途: 任何读取方在"从未写入"时也能拿到完整结构,
//       下游合并与展示无需逐层判空
// ==========================================

use crate::domain::dre::DreDataset;
use crate::domain::metrics::{MetricsDataset, MonthSeries};
use crate::domain::types::FiscalYear;
use std::collections::BTreeMap;

/// 月份缩写（葡语）
pub const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// 规范指标结构: (分组路径, 叶子名称列表)
///
/// 路径中的 "." 表示子分组
const CANONICAL_LAYOUT: &[(&str, &[&str])] = &[
    (
        "vendas",
        &[
            "volume",
            "receitaBruta",
            "deducoes",
            "receitaLiquida",
            "custoMercadoria",
            "lucroBruto",
        ],
    ),
    ("estoque", &["quantidade", "valor"]),
    ("despesas.fixas", &["pessoal", "ocupacao", "administrativas"]),
    ("despesas.variaveis", &["comissoes", "marketing"]),
    (
        "financiamento",
        &["volumeFinanciado", "receitaFinanciamento", "jurosEstoque"],
    ),
    ("impostos", &["icms", "pisCofins", "irCsll"]),
    ("resultado", &["operacional", "liquido"]),
];

/// 某年度的 12 个月份标签（"Jan/25" … "Dez/25"）
pub fn month_labels(year: FiscalYear) -> Vec<String> {
    let suffix = year.short_suffix();
    MONTH_ABBREVIATIONS
        .iter()
        .map(|abbr| format!("{}/{}", abbr, suffix))
        .collect()
}

/// 某年度的默认指标数据集（全部叶子为零）
pub fn default_metrics(year: FiscalYear) -> MetricsDataset {
    let mut dataset = MetricsDataset::new(month_labels(year), BTreeMap::new());
    for (group_path, leaves) in CANONICAL_LAYOUT {
        for leaf in leaves.iter() {
            let path = format!("{}.{}", group_path, leaf);
            dataset.set_series(&path, MonthSeries::zeros());
        }
    }
    dataset
}

/// 默认损益表: 无（"尚未导入"，区别于校验失败）
pub fn default_dre() -> Option<DreDataset> {
    None
}

/// 规范结构中的全部叶子路径
pub fn canonical_series_paths() -> Vec<String> {
    CANONICAL_LAYOUT
        .iter()
        .flat_map(|(group_path, leaves)| {
            leaves
                .iter()
                .map(move |leaf| format!("{}.{}", group_path, leaf))
        })
        .collect()
}

/// 判断数据集是否与默认零值数据集完全一致
pub fn is_default_metrics(year: FiscalYear, dataset: &MetricsDataset) -> bool {
    *dataset == default_metrics(year)
}
