// ==========================================
// 水泥厂监控演示系统 - 评估结果领域模型
// ==========================================
// SeverityMap / EvaluationResult / DriftSignal / DriftOutcome
// 均为一次调用产生的不可变值,不做持久化
// ==========================================

use crate::domain::types::{Severity, Stage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// SeverityMap - 工段严重度映射
// ==========================================
// 不变量: 恒含五个工段键; 对外只读
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityMap {
    levels: BTreeMap<Stage, Severity>,
}

impl SeverityMap {
    /// 全部工段为 normal
    pub fn all_normal() -> Self {
        Self {
            levels: Stage::ALL.iter().map(|s| (*s, Severity::Normal)).collect(),
        }
    }

    /// 查询工段严重度
    pub fn get(&self, stage: Stage) -> Severity {
        self.levels.get(&stage).copied().unwrap_or(Severity::Normal)
    }

    /// 按工艺顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (Stage, Severity)> + '_ {
        self.levels.iter().map(|(s, l)| (*s, *l))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// 最高严重度
    pub fn worst(&self) -> Severity {
        self.levels.values().copied().max().unwrap_or(Severity::Normal)
    }

    pub(crate) fn set(&mut self, stage: Stage, severity: Severity) {
        self.levels.insert(stage, severity);
    }
}

impl Default for SeverityMap {
    fn default() -> Self {
        Self::all_normal()
    }
}

// ==========================================
// EvaluationResult - 单次评估结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub report: String,           // 报告文本 (数值回显 + 建议)
    pub suggestions: Vec<String>, // 建议列表, 顺序 = 规则评估顺序
    pub severity: SeverityMap,    // 工段严重度
}

impl EvaluationResult {
    /// 是否全部正常 (无任何规则触发)
    pub fn is_all_normal(&self) -> bool {
        self.suggestions.is_empty()
    }
}

// ==========================================
// DriftSignal - 漂移信号
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftSignal {
    pub anomaly: bool, // |delta| > threshold
    pub delta: f64,    // 近期均值 - 基线均值 (带符号)
}

// ==========================================
// DriftOutcome - 漂移检测输出
// ==========================================
// InsufficientHistory 表示"尚不可判定",不等于"无异常"
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriftOutcome {
    InsufficientHistory { available: usize, required: usize },
    Signal(DriftSignal),
}

impl DriftOutcome {
    /// 取出信号 (数据不足时为 None)
    pub fn signal(&self) -> Option<DriftSignal> {
        match self {
            DriftOutcome::Signal(signal) => Some(*signal),
            DriftOutcome::InsufficientHistory { .. } => None,
        }
    }

    pub fn is_insufficient(&self) -> bool {
        matches!(self, DriftOutcome::InsufficientHistory { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_normal_has_five_stages() {
        let map = SeverityMap::all_normal();
        assert_eq!(map.len(), 5);
        for stage in Stage::ALL {
            assert_eq!(map.get(stage), Severity::Normal);
        }
        assert_eq!(map.worst(), Severity::Normal);
    }

    #[test]
    fn test_worst_severity() {
        let mut map = SeverityMap::all_normal();
        map.set(Stage::Grind, Severity::Warning);
        map.set(Stage::Clinker, Severity::Critical);
        assert_eq!(map.worst(), Severity::Critical);
        assert_eq!(map.len(), 5);
    }

    #[test]
    fn test_drift_outcome_signal() {
        let outcome = DriftOutcome::InsufficientHistory {
            available: 3,
            required: 30,
        };
        assert!(outcome.is_insufficient());
        assert_eq!(outcome.signal(), None);

        let signal = DriftSignal {
            anomaly: true,
            delta: 0.7,
        };
        assert_eq!(DriftOutcome::Signal(signal).signal(), Some(signal));
    }
}
