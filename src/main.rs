// ==========================================
// 经销商经营指标系统 - 命令行入口
// ==========================================
// 用法:
//   dealer-metrics status
//   dealer-metrics export [file]
//   dealer-metrics import <file>
//   dealer-metrics restore <file>
//   dealer-metrics import-dre <year> <department> <file> [--force]
//   dealer-metrics clear <year> [department]
//   dealer-metrics clear-all
//   dealer-metrics mirror <target-db>
//
// 存储位置由 DEALER_METRICS_DB_PATH / DEALER_METRICS_BACKEND 决定
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use dealer_metrics::app::AppState;
use dealer_metrics::domain::defaults::is_default_metrics;
use dealer_metrics::domain::{Department, FiscalYear};
use dealer_metrics::storage::{mirror_records, SqliteKvStore};
use std::path::Path;

const USAGE: &str = "\
用法:
  dealer-metrics status
  dealer-metrics export [file]
  dealer-metrics import <file>
  dealer-metrics restore <file>
  dealer-metrics import-dre <year> <department> <file> [--force]
  dealer-metrics clear <year> [department]
  dealer-metrics clear-all
  dealer-metrics mirror <target-db>";

fn main() -> Result<()> {
    dealer_metrics::logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{}", USAGE);
        return Ok(());
    };
    let rest = &args[1..];

    let state = AppState::from_env().context("无法初始化存储")?;
    tracing::debug!(command = %command, version = dealer_metrics::VERSION, "执行命令");

    match command.as_str() {
        "status" => status(&state),
        "export" => export(&state, rest.first().map(String::as_str)),
        "import" => import(&state, required(rest, 0, "file")?, false),
        "restore" => import(&state, required(rest, 0, "file")?, true),
        "import-dre" => import_dre(&state, rest),
        "clear" => clear(&state, rest),
        "clear-all" => {
            if !state.repo.clear_all_data() {
                bail!("清空全部数据失败");
            }
            println!("已清空全部数据");
            Ok(())
        }
        "mirror" => mirror(&state, required(rest, 0, "target-db")?),
        "help" | "--help" | "-h" => {
            println!("{}", USAGE);
            Ok(())
        }
        other => bail!("未知命令: {}\n{}", other, USAGE),
    }
}

fn required<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("缺少参数 <{}>\n{}", name, USAGE))
}

fn parse_year(raw: &str) -> Result<FiscalYear> {
    raw.parse::<FiscalYear>().map_err(|e| anyhow!(e))
}

fn parse_department(raw: &str) -> Result<Department> {
    raw.parse::<Department>().map_err(|e| anyhow!(e))
}

fn status(state: &AppState) -> Result<()> {
    println!("{} v{}", dealer_metrics::APP_NAME, dealer_metrics::VERSION);
    println!("存储: {} {}", state.config.backend, state.config.db_path);
    println!(
        "当前选择: {} / {}",
        state.preferences.selected_year_or_default(),
        state.preferences.selected_department_or_default()
    );

    for year in FiscalYear::ALL {
        println!("{}:", year);
        for department in Department::ALL {
            let metrics = if !state.repo.has_stored_data(year, department) {
                "-"
            } else if is_default_metrics(year, &state.repo.load_metrics(year, department)) {
                "零值"
            } else {
                "已存储"
            };
            let dre = match state.repo.load_dre(year, department) {
                Some(lines) => format!("{} 行", lines.len()),
                None => "-".to_string(),
            };
            println!("  {:<14} 指标: {:<6} DRE: {}", department.as_str(), metrics, dre);
        }
    }
    Ok(())
}

fn export(state: &AppState, target: Option<&str>) -> Result<()> {
    let text = state.backup.export_all().context("导出失败")?;
    match target {
        Some(path) => {
            std::fs::write(path, &text).with_context(|| format!("无法写入 {}", path))?;
            println!("已导出到 {}", path);
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn import(state: &AppState, path: &str, reset: bool) -> Result<()> {
    let text = std::fs::read_to_string(path).with_context(|| format!("无法读取 {}", path))?;

    if reset {
        if !state.backup.reset_and_import(&text) {
            bail!("备份文档无法解析，未做任何修改");
        }
        println!("已从 {} 重置并恢复", path);
        return Ok(());
    }

    let summary = state
        .backup
        .try_import_all(&text)
        .context("备份文档无法解析，未做任何修改")?;
    println!(
        "导入完成: 指标 {} 条, DRE {} 条, 清除 DRE {} 条, 偏好 {} 项, 跳过 {} 段",
        summary.metrics_written,
        summary.dre_written,
        summary.dre_cleared,
        summary.selections_restored,
        summary.skipped.len()
    );
    for reason in &summary.skipped {
        println!("  跳过: {}", reason);
    }
    Ok(())
}

fn import_dre(state: &AppState, args: &[String]) -> Result<()> {
    let force = args.iter().any(|a| a == "--force");
    let positional: Vec<String> = args.iter().filter(|a| *a != "--force").cloned().collect();

    let year = parse_year(required(&positional, 0, "year")?)?;
    let department = parse_department(required(&positional, 1, "department")?)?;
    let file = required(&positional, 2, "file")?;

    let report = state
        .dre_importer
        .import_file(Path::new(file), year, department, force)
        .with_context(|| format!("DRE 导入失败: {}", file))?;
    println!(
        "已导入 {} 行 DRE ({} 个小计) 到 {} / {}",
        report.lines, report.subtotals, report.year, report.department
    );
    Ok(())
}

fn clear(state: &AppState, args: &[String]) -> Result<()> {
    let year = parse_year(required(args, 0, "year")?)?;

    let cleared = match args.get(1) {
        Some(raw) => {
            let department = parse_department(raw)?;
            state.repo.clear_fiscal_year_data(year, department)
        }
        None => state.repo.clear_year_data(year),
    };
    if !cleared {
        bail!("清除 {} 数据失败", year);
    }
    println!("已清除 {} 数据", year);
    Ok(())
}

fn mirror(state: &AppState, target_db: &str) -> Result<()> {
    let target = SqliteKvStore::open(target_db).with_context(|| format!("无法打开 {}", target_db))?;
    let report = mirror_records(state.store.as_ref(), &target).context("镜像失败")?;
    println!(
        "已镜像到 {}: 写入 {} 个键, 删除 {} 个键",
        target_db, report.copied, report.removed
    );
    Ok(())
}
