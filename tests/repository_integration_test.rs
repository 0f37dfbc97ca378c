// ==========================================
// Repository 层集成测试
// ==========================================
// 测试目标: SQLite 持久化 → 重新打开 → 读取/合并
// ==========================================


use dealer_metrics::domain::defaults::default_metrics;
use dealer_metrics::domain::{Department, FiscalYear};
use dealer_metrics::logging;
use dealer_metrics::storage::{mirror_records, MemoryKvStore, SqliteKvStore};
use test_helpers::{constant, create_test_db, dataset_with, open_repo, sample_dre};

#[test]
fn test_records_survive_reopen() {
    logging::init_test();
    let (_temp_file, db_path) = create_test_db().unwrap();

    let novos = dataset_with(FiscalYear::Y2025, "vendas.volume", 12.0);
    {
        let (_store, repo) = open_repo(&db_path);
        assert!(repo.save_metrics(FiscalYear::Y2025, &novos, Department::Novos, false));
        assert!(repo.save_dre(FiscalYear::Y2025, &sample_dre(100.0), Department::Novos, false));
    }

    let (_store, repo) = open_repo(&db_path);
    assert!(repo.has_stored_data(FiscalYear::Y2025, Department::Novos));
    assert_eq!(repo.load_metrics(FiscalYear::Y2025, Department::Novos), novos);

    let dre = repo.load_dre(FiscalYear::Y2025, Department::Novos).unwrap();
    assert_eq!(dre, sample_dre(100.0));
}

#[test]
fn test_consolidation_over_sqlite() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let (_store, repo) = open_repo(&db_path);

    let real = [Department::Novos, Department::Usados, Department::Oficina];
    for (i, department) in real.iter().enumerate() {
        let dataset = dataset_with(FiscalYear::Y2026, "despesas.fixas.pessoal", (i + 1) as f64);
        assert!(repo.save_metrics(FiscalYear::Y2026, &dataset, *department, false));
    }

    let consolidated = repo.load_metrics(FiscalYear::Y2026, Department::Consolidado);
    assert_eq!(consolidated.series("despesas.fixas.pessoal"), Some(&constant(6.0)));
    assert_eq!(consolidated.months, default_metrics(FiscalYear::Y2026).months);

    // 合并部门写入需 force
    assert!(!repo.save_metrics(FiscalYear::Y2026, &consolidated, Department::Consolidado, false));
    assert!(!repo.has_stored_data(FiscalYear::Y2026, Department::Consolidado));
}

#[test]
fn test_years_and_departments_are_isolated() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let (_store, repo) = open_repo(&db_path);

    let dataset = dataset_with(FiscalYear::Y2024, "estoque.valor", 50.0);
    assert!(repo.save_metrics(FiscalYear::Y2024, &dataset, Department::Pecas, false));

    for year in FiscalYear::ALL {
        for department in Department::REAL {
            if year == FiscalYear::Y2024 && department == Department::Pecas {
                continue;
            }
            assert!(!repo.has_stored_data(year, department), "{} {}", year, department);
            assert_eq!(repo.load_metrics(year, department), default_metrics(year));
        }
    }

    assert!(repo.clear_year_data(FiscalYear::Y2025));
    assert!(repo.has_stored_data(FiscalYear::Y2024, Department::Pecas));

    assert!(repo.clear_fiscal_year_data(FiscalYear::Y2024, Department::Pecas));
    assert!(!repo.has_stored_data(FiscalYear::Y2024, Department::Pecas));
}

#[test]
fn test_mirror_between_memory_and_sqlite() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let (sqlite_store, sqlite_repo) = open_repo(&db_path);

    // 目标库中已有一条源中不存在的记录
    assert!(sqlite_repo.save_dre(FiscalYear::Y2027, &sample_dre(1.0), Department::Funilaria, false));

    let memory = std::sync::Arc::new(MemoryKvStore::new());
    let memory_repo = dealer_metrics::repository::MetricsRepository::new(memory.clone());
    let dataset = dataset_with(FiscalYear::Y2025, "impostos.icms", 3.0);
    assert!(memory_repo.save_metrics(FiscalYear::Y2025, &dataset, Department::Usados, false));

    let report = mirror_records(memory.as_ref(), sqlite_store.as_ref()).unwrap();
    assert_eq!(report.copied, 1);
    assert_eq!(report.removed, 1);

    let reopened = SqliteKvStore::open(&db_path).unwrap();
    let repo = dealer_metrics::repository::MetricsRepository::new(std::sync::Arc::new(reopened));
    assert_eq!(repo.load_metrics(FiscalYear::Y2025, Department::Usados), dataset);
    assert!(repo.load_dre(FiscalYear::Y2027, Department::Funilaria).is_none());
}
