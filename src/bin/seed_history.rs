// ==========================================
// 水泥厂监控演示系统 - 历史播种工具
// ==========================================
// 用法: seed_history [db_path] [rows] [--reset]
// 生成 rows 条合成读数 (最后一条为当前时刻) 写入 plant_reading
// ==========================================

use anyhow::{anyhow, Result};

use cemmind::app::{get_default_db_path, AppState};
use cemmind::config::PlantConfig;
use cemmind::logging;

fn main() -> Result<()> {
    logging::init();

    let config = PlantConfig::from_env();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let reset = args.iter().any(|a| a == "--reset");
    let positional: Vec<&String> = args.iter().filter(|a| !a.starts_with("--")).collect();

    let db_path = positional
        .first()
        .map(|s| s.to_string())
        .or_else(|| config.db_path.clone())
        .unwrap_or_else(get_default_db_path);

    let rows = match positional.get(1) {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|e| anyhow!("rows 解析失败({}): {}", raw, e))?,
        None => config.num_rows,
    };

    let state = AppState::new(db_path.clone()).map_err(|e| anyhow!(e))?;

    if reset {
        let removed = state.reading_repo.delete_all()?;
        eprintln!("Cleared {} rows from {}", removed, db_path);
    }

    let batch_id = state.plant_api.seed_history(rows)?;
    let total = state.reading_repo.count()?;

    println!("seeded {} rows into {} (batch_id={}, total={})", rows, db_path, batch_id, total);
    Ok(())
}
