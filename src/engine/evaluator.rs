// ==========================================
// 水泥厂监控演示系统 - 工况评估引擎
// ==========================================
// 职责: 单个快照 → 工段严重度 + 文字建议 + 报告
// 输入: 列名 → 数值 映射
// 输出: EvaluationResult
// 纯函数: 不修改输入, 无副作用
// ==========================================

use crate::domain::evaluation::{EvaluationResult, SeverityMap};
use crate::domain::reading::Reading;
use crate::domain::types::Metric;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::thresholds::{StageConflictPolicy, ThresholdTable};
use std::collections::HashMap;

/// 无建议时的报告尾行
pub const ALL_NORMAL_TEXT: &str = "All metrics within normal range.";

// ==========================================
// PlantEvaluator - 工况评估引擎
// ==========================================
pub struct PlantEvaluator {
    table: ThresholdTable,
}

impl PlantEvaluator {
    /// 使用默认规则表
    pub fn new() -> Self {
        Self {
            table: ThresholdTable::default(),
        }
    }

    /// 使用指定规则表 (如来自 config_kv 覆写)
    pub fn with_table(table: ThresholdTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ThresholdTable {
        &self.table
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 评估一个快照
    ///
    /// # 参数
    /// - `fields`: 列名 → 数值, 必须包含五个评估指标
    ///
    /// # 返回
    /// - Ok(EvaluationResult)
    /// - Err(EngineError::MissingMetric): 缺少必需列 (不做默认值填充)
    pub fn evaluate(&self, fields: &HashMap<String, f64>) -> EngineResult<EvaluationResult> {
        // 1. 提取必需指标
        let values = self.required_values(fields)?;

        // 2. 逐条规则判定
        let mut suggestions = Vec::new();
        let mut severity = SeverityMap::all_normal();

        for rule in self.table.rules() {
            let value = values
                .iter()
                .find(|(m, _)| *m == rule.metric)
                .map(|(_, v)| *v)
                .ok_or_else(|| EngineError::MissingMetric(rule.metric.column_name().to_string()))?;

            if let Some((level, message)) = rule.classify(value) {
                tracing::debug!(
                    metric = %rule.metric,
                    stage = %rule.stage,
                    value,
                    level = %level,
                    "规则触发"
                );
                suggestions.push(message.to_string());

                let next = match self.table.conflict_policy {
                    StageConflictPolicy::LastWriterWins => level,
                    StageConflictPolicy::MostSevereWins => level.max(severity.get(rule.stage)),
                };
                severity.set(rule.stage, next);
            }
        }

        // 3. 生成报告
        let report = build_report(&values, &suggestions);

        Ok(EvaluationResult {
            report,
            suggestions,
            severity,
        })
    }

    /// 评估 Reading
    pub fn evaluate_reading(&self, reading: &Reading) -> EngineResult<EvaluationResult> {
        self.evaluate(&reading.to_metric_map())
    }

    /// 提取报告行指标 + 规则表引用的指标
    fn required_values(&self, fields: &HashMap<String, f64>) -> EngineResult<Vec<(Metric, f64)>> {
        let mut metrics: Vec<Metric> = Metric::EVALUATED.to_vec();
        for rule in self.table.rules() {
            if !metrics.contains(&rule.metric) {
                metrics.push(rule.metric);
            }
        }

        metrics
            .into_iter()
            .map(|metric| {
                fields
                    .get(metric.column_name())
                    .copied()
                    .map(|v| (metric, v))
                    .ok_or_else(|| EngineError::MissingMetric(metric.column_name().to_string()))
            })
            .collect()
    }
}

impl Default for PlantEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 报告格式
// ==========================================
// 五行数值回显 (一位小数 + 单位), 空行, 建议或全部正常提示
fn build_report(values: &[(Metric, f64)], suggestions: &[String]) -> String {
    let lines: Vec<String> = Metric::EVALUATED
        .iter()
        .filter_map(|metric| {
            values
                .iter()
                .find(|(m, _)| m == metric)
                .map(|(m, v)| format!("{}: {:.1}{}", m.label(), v, m.unit_suffix()))
        })
        .collect();

    let body = if suggestions.is_empty() {
        ALL_NORMAL_TEXT.to_string()
    } else {
        suggestions.join("\n")
    };

    format!("{}\n\n{}", lines.join("\n"), body)
}
