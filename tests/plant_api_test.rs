// ==========================================
// PlantApi 集成测试
// ==========================================
// 测试目标: 接入 → 历史 → 看板动作 全链路
// 数据库: tempfile 临时 SQLite 文件
// ==========================================


use cemmind::config::config_keys;
use cemmind::domain::{DriftOutcome, KpiBand};
use cemmind::export::read_readings_csv;
use cemmind::{
    ApiError, DriftDetector, GeneratorConfig, Metric, Reading, ReadingGenerator, Severity, Stage,
};
use tempfile::NamedTempFile;
use test_helpers::{create_test_state, lime_history, normal_reading, snapshot};

#[test]
fn test_ingest_and_latest() {
    println!("\n=== 测试接入与最新读数 ===");

    let (_tmp, state) = create_test_state().unwrap();
    let api = &state.plant_api;

    assert!(api.latest().unwrap().is_none());

    let receipt = api.ingest(normal_reading(0)).unwrap();
    assert_eq!(receipt.status, "ok");
    assert_eq!(receipt.buffer_len, 1);

    let receipt = api.ingest(normal_reading(1)).unwrap();
    assert_eq!(receipt.buffer_len, 2);
    assert_eq!(api.latest().unwrap(), Some(normal_reading(1)));
}

#[test]
fn test_ingest_rejects_non_finite() {
    let (_tmp, state) = create_test_state().unwrap();
    let reading = Reading {
        kiln_temp_c: f64::NAN,
        ..normal_reading(0)
    };
    assert!(matches!(
        state.plant_api.ingest(reading),
        Err(ApiError::InvalidInput(_))
    ));
}

#[test]
fn test_empty_history_not_found() {
    let (_tmp, state) = create_test_state().unwrap();
    let api = &state.plant_api;

    assert!(matches!(api.analyze_latest(), Err(ApiError::NotFound(_))));
    assert!(matches!(api.kpi_tiles_latest(), Err(ApiError::NotFound(_))));
    assert!(matches!(api.optimize_latest(), Err(ApiError::NotFound(_))));
}

#[test]
fn test_analyze_latest_and_dashboard() {
    println!("\n=== 测试看板动作 ===");

    let (_tmp, state) = create_test_state().unwrap();
    let api = &state.plant_api;

    api.ingest(Reading {
        kiln_temp_c: 1475.0,
        mill_power_kw: 4500.0,
        af_rate_percent: 12.0,
        ..normal_reading(0)
    })
    .unwrap();

    let result = api.analyze_latest().unwrap();
    assert_eq!(result.severity.get(Stage::Preheat), Severity::Warning);
    assert_eq!(result.suggestions.len(), 1);

    let tiles = api.kpi_tiles_latest().unwrap();
    assert_eq!(tiles.len(), 5);
    let kiln = tiles.iter().find(|t| t.metric == Metric::KilnTemp).unwrap();
    assert_eq!(kiln.band, KpiBand::Watch);
    let af = tiles.iter().find(|t| t.metric == Metric::AfRate).unwrap();
    assert_eq!(af.band, KpiBand::Watch);

    let plan = api.optimize_latest().unwrap();
    assert_eq!(plan.actions.len(), 2);
    assert_eq!(plan.estimated_savings_percent, 1.2);
}

#[test]
fn test_analyze_missing_metric() {
    let (_tmp, state) = create_test_state().unwrap();
    let mut fields = snapshot(1440.0, 4000.0, 20.0, 1.0, 700.0);
    fields.remove("AF_rate_percent");

    match state.plant_api.analyze(&fields) {
        Err(ApiError::MissingMetric(key)) => assert_eq!(key, "AF_rate_percent"),
        other => panic!("Expected MissingMetric, got {:?}", other),
    }
}

#[test]
fn test_threshold_overrides_apply() {
    println!("\n=== 测试 config_kv 阈值覆写 ===");

    let (_tmp, state) = create_test_state().unwrap();
    let fields = snapshot(1440.0, 4000.0, 2.0, 1.0, 850.0);

    let before = state.plant_api.analyze(&fields).unwrap();
    assert_eq!(before.severity.get(Stage::Sustain), Severity::Warning);

    state
        .config_manager
        .set_config_value(config_keys::CONFLICT_POLICY, "MOST_SEVERE_WINS")
        .unwrap();
    state
        .config_manager
        .set_config_value(&config_keys::threshold_key(Metric::KilnTemp, "warning"), "1430")
        .unwrap();

    let after = state.plant_api.analyze(&fields).unwrap();
    assert_eq!(after.severity.get(Stage::Sustain), Severity::Critical);
    assert_eq!(after.severity.get(Stage::Preheat), Severity::Warning);
}

#[test]
fn test_drift_matches_pure_detector() {
    println!("\n=== 测试 API 漂移检测与纯引擎一致 ===");

    let (_tmp, state) = create_test_state().unwrap();

    // 前 20 条为噪声 (不在 3*window 范围内), 后 30 条阶跃
    let mut values: Vec<f64> = (0..20).map(|i| 5.0 + i as f64).collect();
    values.extend(vec![1.0; 20]);
    values.extend(vec![2.0; 10]);
    let history = lime_history(&values);
    state.reading_repo.batch_insert(&history).unwrap();

    let via_api = state
        .plant_api
        .check_drift("clinker_free_lime_percent", 10, 0.5)
        .unwrap();
    let direct = DriftDetector::new()
        .detect(&history[history.len() - 30..], Metric::FreeLime, 10, 0.5)
        .unwrap();
    assert_eq!(via_api, direct);

    let signal = via_api.signal().unwrap();
    assert!(signal.anomaly);

    // 默认参数 window=30 需要 30 条, 50 条足够
    assert!(matches!(
        state.plant_api.check_drift_default().unwrap(),
        DriftOutcome::Signal(_)
    ));
}

#[test]
fn test_drift_invalid_column() {
    let (_tmp, state) = create_test_state().unwrap();
    assert!(matches!(
        state.plant_api.check_drift("unknown", 10, 0.5),
        Err(ApiError::InvalidInput(_))
    ));
    assert!(matches!(
        state.plant_api.check_drift("kiln_temp_C", 0, 0.5),
        Err(ApiError::InvalidInput(_))
    ));
}

#[test]
fn test_generated_reading_reads_back_equal() {
    println!("\n=== 测试新生成读数写入后读回相等 ===");

    let (_tmp, state) = create_test_state().unwrap();
    let mut generator = ReadingGenerator::with_seed(GeneratorConfig::default(), 11).unwrap();
    let reading = generator.generate_one();

    state.plant_api.ingest(reading.clone()).unwrap();
    assert_eq!(state.plant_api.latest().unwrap(), Some(reading));
}

#[test]
fn test_seed_history_and_export() {
    println!("\n=== 测试历史播种与 CSV 导出 ===");

    let (_tmp, state) = create_test_state().unwrap();
    let batch_id = state.plant_api.seed_history(120).unwrap();
    assert!(!batch_id.is_empty());
    assert_eq!(state.reading_repo.count().unwrap(), 120);
    assert_eq!(state.reading_repo.list_by_batch(&batch_id).unwrap().len(), 120);

    let recent = state.plant_api.history(3).unwrap();
    assert_eq!(recent.len(), 3);
    assert!(recent[0].timestamp < recent[2].timestamp);

    let csv_file = NamedTempFile::new().unwrap();
    let rows = state.plant_api.export_history_csv(csv_file.path()).unwrap();
    assert_eq!(rows, 120);
    assert_eq!(read_readings_csv(csv_file.path()).unwrap().len(), 120);

    assert!(matches!(
        state.plant_api.seed_history(0),
        Err(ApiError::InvalidInput(_))
    ));
}
