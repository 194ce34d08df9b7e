// ==========================================
// PlantEvaluator 引擎集成测试
// ==========================================
// 测试目标: 工段严重度判定 / 建议文本 / 报告
// 覆盖范围: 严格边界、Sustain 冲突、端到端场景
// ==========================================


use cemmind::engine::evaluator::ALL_NORMAL_TEXT;
use cemmind::{EngineError, PlantEvaluator, Severity, Stage, StageConflictPolicy, ThresholdTable};
use test_helpers::snapshot;

#[test]
fn test_end_to_end_all_warning_branches() {
    println!("\n=== 测试端到端: 五个 warning 分支全部触发 ===");

    let evaluator = PlantEvaluator::new();
    let result = evaluator
        .evaluate(&snapshot(1475.0, 5100.0, 4.0, 3.0, 900.0))
        .unwrap();

    assert_eq!(
        result.suggestions,
        vec![
            "⚠️ Kiln temperature is high, monitor fuel closely.".to_string(),
            "Increase alternative fuel rate to improve sustainability.".to_string(),
            "Free lime is high; adjust kiln process.".to_string(),
            "High CO₂ emission; consider process efficiency improvements.".to_string(),
            "Mill power is high; check grinding efficiency.".to_string(),
        ]
    );

    assert_eq!(result.severity.get(Stage::Raw), Severity::Normal);
    assert_eq!(result.severity.get(Stage::Preheat), Severity::Warning);
    assert_eq!(result.severity.get(Stage::Clinker), Severity::Warning);
    assert_eq!(result.severity.get(Stage::Grind), Severity::Warning);
    assert_eq!(result.severity.get(Stage::Sustain), Severity::Warning);

    assert!(result.report.starts_with("Kiln Temp: 1475.0°C\n"));
    assert!(result.report.contains("Mill Power: 5100.0 kW"));
    assert!(result.report.ends_with("Mill power is high; check grinding efficiency."));
    println!("{}", result.report);
}

#[test]
fn test_end_to_end_all_critical_branches() {
    println!("\n=== 测试端到端: 五个 critical 分支全部触发 ===");

    let result = PlantEvaluator::new()
        .evaluate(&snapshot(1510.0, 6100.0, 2.5, 4.5, 1001.0))
        .unwrap();

    assert_eq!(
        result.suggestions,
        vec![
            "🔥 Kiln temperature is critical! Reduce fuel immediately.".to_string(),
            "Critical low AF rate; sustainability compromised.".to_string(),
            "Clinker free lime is critically high; poor quality risk.".to_string(),
            "Critical CO₂ emissions; energy optimization needed.".to_string(),
            "Critical grinding load; immediate action required.".to_string(),
        ]
    );

    assert_eq!(result.severity.get(Stage::Raw), Severity::Normal);
    assert_eq!(result.severity.get(Stage::Preheat), Severity::Critical);
    assert_eq!(result.severity.get(Stage::Clinker), Severity::Critical);
    assert_eq!(result.severity.get(Stage::Grind), Severity::Critical);
    assert_eq!(result.severity.get(Stage::Sustain), Severity::Critical);
    assert!(result.report.ends_with("Critical grinding load; immediate action required."));
}

#[test]
fn test_low_af_alone_marks_sustain_critical() {
    println!("\n=== 测试 AF 率过低单独触发 Sustain critical ===");

    let result = PlantEvaluator::new()
        .evaluate(&snapshot(1440.0, 4000.0, 2.0, 1.0, 700.0))
        .unwrap();

    assert_eq!(result.severity.get(Stage::Sustain), Severity::Critical);
    assert_eq!(
        result.suggestions,
        vec!["Critical low AF rate; sustainability compromised.".to_string()]
    );
    assert_eq!(result.severity.get(Stage::Preheat), Severity::Normal);
}

#[test]
fn test_kiln_temp_bands() {
    println!("\n=== 测试窑温分档 (严格不等式) ===");

    let evaluator = PlantEvaluator::new();
    let cases = [
        (1400.0, Severity::Normal),
        (1450.0, Severity::Normal),
        (1450.1, Severity::Warning),
        (1500.0, Severity::Warning),
        (1500.1, Severity::Critical),
    ];

    for (kiln, expected) in cases {
        let result = evaluator
            .evaluate(&snapshot(kiln, 4000.0, 20.0, 1.0, 700.0))
            .unwrap();
        assert_eq!(result.severity.get(Stage::Preheat), expected, "kiln={}", kiln);
    }
}

#[test]
fn test_severity_map_has_five_stages() {
    let evaluator = PlantEvaluator::new();
    for fields in [
        snapshot(1440.0, 4000.0, 20.0, 1.0, 700.0),
        snapshot(1600.0, 7000.0, 1.0, 5.0, 1200.0),
    ] {
        let result = evaluator.evaluate(&fields).unwrap();
        assert_eq!(result.severity.len(), 5);
        assert_eq!(result.severity.get(Stage::Raw), Severity::Normal);
        for stage in Stage::ALL {
            assert!(result.severity.iter().any(|(s, _)| s == stage));
        }
    }
}

#[test]
fn test_all_normal_report() {
    let result = PlantEvaluator::new()
        .evaluate(&snapshot(1440.0, 4000.0, 20.0, 1.0, 700.0))
        .unwrap();
    assert!(result.suggestions.is_empty());
    assert!(result.is_all_normal());
    assert!(result.report.ends_with(ALL_NORMAL_TEXT));
}

#[test]
fn test_idempotent_evaluation() {
    let evaluator = PlantEvaluator::new();
    let fields = snapshot(1510.0, 5500.0, 2.5, 4.5, 1001.0);

    let first = evaluator.evaluate(&fields).unwrap();
    let second = evaluator.evaluate(&fields).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_sustain_conflict_policies() {
    println!("\n=== 测试 Sustain 工段冲突策略 ===");

    let fields = snapshot(1440.0, 4000.0, 2.0, 1.0, 850.0);

    let last_writer = PlantEvaluator::new().evaluate(&fields).unwrap();
    assert_eq!(last_writer.severity.get(Stage::Sustain), Severity::Warning);
    assert_eq!(last_writer.suggestions.len(), 2);

    let most_severe = PlantEvaluator::with_table(
        ThresholdTable::default().with_policy(StageConflictPolicy::MostSevereWins),
    )
    .evaluate(&fields)
    .unwrap();
    assert_eq!(most_severe.severity.get(Stage::Sustain), Severity::Critical);
    assert_eq!(most_severe.suggestions, last_writer.suggestions);
}

#[test]
fn test_missing_metric_fails_fast() {
    let mut fields = snapshot(1440.0, 4000.0, 20.0, 1.0, 700.0);
    fields.remove("CO2_emission_kgpt");

    let err = PlantEvaluator::new().evaluate(&fields).unwrap_err();
    assert_eq!(err, EngineError::MissingMetric("CO2_emission_kgpt".to_string()));
}
