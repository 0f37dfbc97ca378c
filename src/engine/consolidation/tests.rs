use super::*;
use crate::domain::defaults::default_metrics;
use crate::domain::dre::DreLine;
use std::collections::HashMap;

/// 测试用数据来源: 未配置的部门返回默认数据集 / 无损益表
#[derive(Default)]
struct FakeSource {
    metrics: HashMap<Department, MetricsDataset>,
    dre: HashMap<Department, DreDataset>,
}

impl MetricsSource for FakeSource {
    fn load_metrics(&self, year: FiscalYear, department: Department) -> MetricsDataset {
        self.metrics
            .get(&department)
            .cloned()
            .unwrap_or_else(|| default_metrics(year))
    }

    fn load_dre(&self, _year: FiscalYear, department: Department) -> Option<DreDataset> {
        self.dre.get(&department).cloned()
    }
}

fn series_from(first: f64, step: f64) -> MonthSeries {
    let mut values = [0.0; 12];
    for (i, v) in values.iter_mut().enumerate() {
        *v = first + step * i as f64;
    }
    MonthSeries::new(values)
}

fn dataset_with(year: FiscalYear, entries: &[(&str, MonthSeries)]) -> MetricsDataset {
    let mut dataset = MetricsDataset::new(month_labels(year), BTreeMap::new());
    for (path, series) in entries {
        assert!(dataset.set_series(path, *series));
    }
    dataset
}

#[test]
fn test_leaf_is_element_wise_sum_and_missing_contributes_zero() {
    let year = FiscalYear::Y2025;
    let engine = ConsolidationEngine::new();

    let a = dataset_with(year, &[("vendas.volume", series_from(1.0, 1.0))]); // [1,2,...]
    let b = dataset_with(year, &[("vendas.volume", series_from(3.0, 1.0))]); // [3,4,...]
    let c = dataset_with(year, &[("vendas.volume", MonthSeries::zeros())]);
    // 第四个部门完全没有该叶子
    let d = dataset_with(year, &[("impostos.icms", series_from(5.0, 0.0))]);

    let result = engine.sum_datasets(year, &[a, b, c, d]);
    assert!(result.conflicts.is_empty());

    let volume = result.dataset.series("vendas.volume").unwrap();
    for i in 0..12 {
        let expected = (1.0 + i as f64) + (3.0 + i as f64);
        assert_eq!(volume.get(i), Some(expected));
    }
    assert_eq!(result.dataset.series("impostos.icms").unwrap().total(), 60.0);
}

#[test]
fn test_labels_come_from_defaults_not_sources() {
    let year = FiscalYear::Y2026;
    let mut odd = dataset_with(year, &[("vendas.volume", MonthSeries::zeros())]);
    odd.months = vec!["x".to_string(); 12];

    let result = ConsolidationEngine::new().sum_datasets(year, &[odd]);
    assert_eq!(result.dataset.months, month_labels(year));
}

#[test]
fn test_order_independence() {
    let year = FiscalYear::Y2024;
    let engine = ConsolidationEngine::new();

    let datasets = vec![
        dataset_with(
            year,
            &[
                ("vendas.volume", series_from(1.0, 2.0)),
                ("estoque.quantidade", series_from(7.0, 0.0)),
            ],
        ),
        dataset_with(year, &[("vendas.volume", series_from(10.0, -1.0))]),
        dataset_with(
            year,
            &[
                ("despesas.fixas.pessoal", series_from(100.0, 5.0)),
                ("vendas.receitaBruta", series_from(2.0, 2.0)),
            ],
        ),
    ];

    let forward = engine.sum_datasets(year, &datasets).dataset;

    let mut reversed = datasets.clone();
    reversed.reverse();
    let backward = engine.sum_datasets(year, &reversed).dataset;

    let rotated = vec![datasets[1].clone(), datasets[2].clone(), datasets[0].clone()];
    let rotated = engine.sum_datasets(year, &rotated).dataset;

    assert_eq!(forward, backward);
    assert_eq!(forward, rotated);
}

#[test]
fn test_schema_conflict_excludes_leaf_and_keeps_group() {
    let year = FiscalYear::Y2025;
    let engine = ConsolidationEngine::new();

    let as_leaf = dataset_with(year, &[("estoque.quantidade", series_from(50.0, 0.0))]);
    let as_group = dataset_with(
        year,
        &[
            ("estoque.quantidade.novos", series_from(1.0, 0.0)),
            ("estoque.quantidade.usados", series_from(2.0, 0.0)),
        ],
    );

    for order in [
        vec![as_leaf.clone(), as_group.clone()],
        vec![as_group.clone(), as_leaf.clone()],
    ] {
        let result = engine.sum_datasets(year, &order);

        assert_eq!(
            result.conflicts,
            vec![SchemaConflict {
                path: "estoque.quantidade".to_string(),
                series_count: 1,
                group_count: 1,
            }]
        );
        assert!(result.dataset.series("estoque.quantidade").is_none());
        assert_eq!(
            result.dataset.series("estoque.quantidade.novos").unwrap().total(),
            12.0
        );
        assert_eq!(
            result.dataset.series("estoque.quantidade.usados").unwrap().total(),
            24.0
        );
    }
}

#[test]
fn test_consolidate_reads_every_real_department() {
    let year = FiscalYear::Y2025;
    let mut source = FakeSource::default();
    for department in Department::REAL {
        source.metrics.insert(
            department,
            dataset_with(year, &[("vendas.receitaBruta", series_from(1.0, 0.0))]),
        );
    }

    let dataset = ConsolidationEngine::new().consolidate(&source, year);
    let revenue = dataset.series("vendas.receitaBruta").unwrap();
    assert_eq!(revenue.get(0), Some(Department::REAL.len() as f64));
    assert_eq!(dataset.months, month_labels(year));
}

#[test]
fn test_consolidate_of_defaults_equals_defaults() {
    let year = FiscalYear::Y2027;
    let dataset = ConsolidationEngine::new().consolidate(&FakeSource::default(), year);
    assert_eq!(dataset, default_metrics(year));
}

#[test]
fn test_consolidate_dre_by_line_id() {
    let year = FiscalYear::Y2025;
    let mut source = FakeSource::default();
    source.dre.insert(
        Department::Novos,
        vec![
            DreLine::new("1", "Receita", series_from(10.0, 0.0)),
            DreLine::new("2", "Custo", series_from(4.0, 0.0)),
        ],
    );
    source.dre.insert(
        Department::Pecas,
        vec![
            DreLine::new("3", "Outras", series_from(1.0, 0.0)),
            DreLine::new("1", "Receita Peças", series_from(5.0, 0.0)),
        ],
    );

    let merged = ConsolidationEngine::new().consolidate_dre(&source, year).unwrap();

    let ids: Vec<&str> = merged.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);
    assert_eq!(merged[0].label, "Receita");
    assert_eq!(merged[0].values.get(0), Some(15.0));
    assert_eq!(merged[1].values.get(0), Some(4.0));
}

#[test]
fn test_consolidate_dre_none_when_nothing_imported() {
    let merged = ConsolidationEngine::new().consolidate_dre(&FakeSource::default(), FiscalYear::Y2025);
    assert!(merged.is_none());
}

#[test]
fn test_overflowing_sum_saturates_to_finite() {
    let year = FiscalYear::Y2027;
    let engine = ConsolidationEngine::new();

    let huge = MonthSeries::new([f64::MAX; 12]);
    let a = dataset_with(year, &[("vendas.receitaBruta", huge)]);
    let b = dataset_with(year, &[("vendas.receitaBruta", huge)]);
    let c = dataset_with(year, &[("vendas.deducoes", MonthSeries::new([f64::MIN; 12]))]);
    let d = dataset_with(year, &[("vendas.deducoes", MonthSeries::new([f64::MIN; 12]))]);

    let result = engine.sum_datasets(year, &[a, b, c, d]);

    assert!(result.dataset.validate().is_ok());
    assert_eq!(result.dataset.series("vendas.receitaBruta").unwrap().get(0), Some(f64::MAX));
    assert_eq!(result.dataset.series("vendas.deducoes").unwrap().get(11), Some(f64::MIN));

    let lines = vec![DreLine::new("1", "Receita", huge)];
    let merged = engine.sum_dre(&[lines.clone(), lines]).unwrap();
    assert!(merged[0].values.is_finite());
    assert_eq!(merged[0].values.get(5), Some(f64::MAX));
}
