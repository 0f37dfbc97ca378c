// ==========================================
// DRE 导入集成测试
// ==========================================


use dealer_metrics::domain::{Department, FiscalYear};
use dealer_metrics::importer::{DreImporter, ImportError};
use std::io::Write;
use std::sync::Arc;
use test_helpers::{create_test_db, open_repo};

fn write_csv(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn test_imported_dre_feeds_consolidation() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let (_store, repo) = open_repo(&db_path);
    let importer = DreImporter::new(Arc::clone(&repo));
    let dir = tempfile::tempdir().unwrap();

    let novos = write_csv(&dir, "novos.csv", "id,label,Jan,Fev\nrec,Receita,10,20\nres,Resultado,1,2\n");
    let pecas = write_csv(&dir, "pecas.csv", "id,label,Jan,Fev\nrec,Receita,5,5\nout,Outros,3,\n");

    importer
        .import_file(&novos, FiscalYear::Y2025, Department::Novos, false)
        .unwrap();
    importer
        .import_file(&pecas, FiscalYear::Y2025, Department::Pecas, false)
        .unwrap();

    let consolidated = repo
        .load_dre(FiscalYear::Y2025, Department::Consolidado)
        .unwrap();
    let ids: Vec<&str> = consolidated.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["rec", "res", "out"]);
    assert_eq!(consolidated[0].values.get(0), Some(15.0));
    assert_eq!(consolidated[0].values.get(1), Some(25.0));
    assert_eq!(consolidated[2].values.get(0), Some(3.0));
}

#[test]
fn test_unsupported_file_is_rejected() {
    let (_temp_file, db_path) = create_test_db().unwrap();
    let (_store, repo) = open_repo(&db_path);
    let importer = DreImporter::new(Arc::clone(&repo));
    let dir = tempfile::tempdir().unwrap();
    let path = write_csv(&dir, "dre.txt", "id,label,Jan\n1,x,1\n");

    let result = importer.import_file(&path, FiscalYear::Y2025, Department::Novos, false);
    assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    assert!(!repo.has_stored_dre(FiscalYear::Y2025, Department::Novos));
}
