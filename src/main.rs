// ==========================================
// 水泥厂监控演示系统 - 命令行入口
// ==========================================
// 用法:
//   cemmind generate [rows] [csv_path]
//   cemmind stream [iterations] [delay_secs]
//   cemmind import <csv_path>
//   cemmind export <csv_path>
//   cemmind analyze
//   cemmind drift [column] [window] [threshold]
//   cemmind kpi
//   cemmind optimize
// 日志写 stderr, 结果写 stdout
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use std::path::Path;

use cemmind::app::AppState;
use cemmind::config::PlantConfig;
use cemmind::engine::generator::delay_from_secs;
use cemmind::engine::{GeneratorConfig, ReadingGenerator};
use cemmind::export::{pump_stream, read_readings_csv, write_readings_csv, JsonLineSink};
use cemmind::{logging, DriftOutcome};

const DEFAULT_STREAM_ITERATIONS: usize = 10;
const DEFAULT_STREAM_DELAY_SECS: f64 = 1.0;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let config = PlantConfig::from_env();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("help");
    let rest = &args[args.len().min(1)..];

    tracing::debug!(command, version = cemmind::VERSION, "启动");

    match command {
        "generate" => cmd_generate(&config, rest),
        "stream" => cmd_stream(rest).await,
        "import" => cmd_import(&config, rest),
        "export" => cmd_export(&config, rest),
        "analyze" => cmd_analyze(&config),
        "drift" => cmd_drift(&config, rest),
        "kpi" => cmd_kpi(&config),
        "optimize" => cmd_optimize(&config),
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            print_usage();
            bail!("未知命令: {}", other)
        }
    }
}

fn print_usage() {
    eprintln!("{} v{}", cemmind::APP_NAME, cemmind::VERSION);
    eprintln!("用法:");
    eprintln!("  cemmind generate [rows] [csv_path]");
    eprintln!("  cemmind stream [iterations] [delay_secs]");
    eprintln!("  cemmind import <csv_path>");
    eprintln!("  cemmind export <csv_path>");
    eprintln!("  cemmind analyze");
    eprintln!("  cemmind drift [column] [window] [threshold]");
    eprintln!("  cemmind kpi");
    eprintln!("  cemmind optimize");
}

fn open_state(config: &PlantConfig) -> Result<AppState> {
    AppState::from_config(config).map_err(|e| anyhow!(e))
}

fn parse_arg<T: std::str::FromStr>(args: &[String], index: usize, name: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match args.get(index) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow!("{} 解析失败({}): {}", name, raw, e)),
        None => Ok(None),
    }
}

// ==========================================
// 批量 / 实时生成
// ==========================================

fn cmd_generate(config: &PlantConfig, args: &[String]) -> Result<()> {
    let rows = parse_arg::<usize>(args, 0, "rows")?.unwrap_or(config.num_rows);
    let csv_path = args.get(1).cloned().unwrap_or_else(|| config.local_csv.clone());

    let mut generator = ReadingGenerator::new(GeneratorConfig::default())?;
    let readings = generator.generate_batch(rows)?;
    let written = write_readings_csv(&csv_path, &readings)?;

    if let Some(uri) = config.warehouse.blob_uri(
        Path::new(&csv_path)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(csv_path.as_str()),
    ) {
        tracing::info!(target_uri = %uri, "上传目标 (未执行上传)");
    }

    println!("{} rows -> {}", written, csv_path);
    Ok(())
}

async fn cmd_stream(args: &[String]) -> Result<()> {
    let iterations =
        parse_arg::<usize>(args, 0, "iterations")?.unwrap_or(DEFAULT_STREAM_ITERATIONS);
    let delay_secs =
        parse_arg::<f64>(args, 1, "delay_secs")?.unwrap_or(DEFAULT_STREAM_DELAY_SECS);

    let delay = delay_from_secs(delay_secs)?;
    let generator = ReadingGenerator::new(GeneratorConfig::default())?;
    let stream = generator.stream_async(iterations, delay)?;

    let sink = JsonLineSink::new(std::io::stdout());
    let delivered = pump_stream(stream, &sink).await?;
    tracing::info!(delivered, "实时流结束");
    Ok(())
}

// ==========================================
// 历史导入 / 导出
// ==========================================

fn cmd_import(config: &PlantConfig, args: &[String]) -> Result<()> {
    let csv_path = args.first().context("缺少参数 csv_path")?;
    let readings = read_readings_csv(csv_path)?;
    if readings.is_empty() {
        bail!("{} 不含任何读数", csv_path);
    }

    let state = open_state(config)?;
    let batch_id = state.reading_repo.batch_insert(&readings)?;
    println!("imported {} rows (batch_id={})", readings.len(), batch_id);
    Ok(())
}

fn cmd_export(config: &PlantConfig, args: &[String]) -> Result<()> {
    let csv_path = args.first().context("缺少参数 csv_path")?;
    let state = open_state(config)?;
    let rows = state.plant_api.export_history_csv(Path::new(csv_path))?;
    println!("{} rows -> {}", rows, csv_path);
    Ok(())
}

// ==========================================
// 看板动作
// ==========================================

fn cmd_analyze(config: &PlantConfig) -> Result<()> {
    let state = open_state(config)?;
    let result = state.plant_api.analyze_latest()?;

    println!("{}", result.report);
    for (stage, severity) in result.severity.iter() {
        println!("{:<8} {}", stage.label(), severity);
    }
    Ok(())
}

fn cmd_drift(config: &PlantConfig, args: &[String]) -> Result<()> {
    let state = open_state(config)?;

    let outcome = match args.first() {
        Some(column) => {
            let defaults = state
                .config_manager
                .load_drift_config()
                .map_err(|e| anyhow!("读取漂移配置失败: {}", e))?;
            let window = parse_arg::<usize>(args, 1, "window")?.unwrap_or(defaults.window);
            let threshold = parse_arg::<f64>(args, 2, "threshold")?.unwrap_or(defaults.threshold);
            state.plant_api.check_drift(column, window, threshold)?
        }
        None => state.plant_api.check_drift_default()?,
    };

    match outcome {
        DriftOutcome::InsufficientHistory { available, required } => {
            println!("insufficient history: {}/{}", available, required);
        }
        DriftOutcome::Signal(signal) => {
            println!("{}", serde_json::to_string(&signal)?);
        }
    }
    Ok(())
}

fn cmd_kpi(config: &PlantConfig) -> Result<()> {
    let state = open_state(config)?;
    for tile in state.plant_api.kpi_tiles_latest()? {
        println!("{:<14} {:>10.1}  {}", tile.label, tile.value, tile.band);
    }
    Ok(())
}

fn cmd_optimize(config: &PlantConfig) -> Result<()> {
    let state = open_state(config)?;
    let plan = state.plant_api.optimize_latest()?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
