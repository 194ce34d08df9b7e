// ==========================================
// 水泥厂监控演示系统 - 阈值规则表
// ==========================================
// 职责: 以表驱动方式描述五组评估规则
// 规则顺序即建议输出顺序, 也决定同一工段的写入顺序
// ==========================================

use crate::domain::types::{Metric, Severity, Stage};
use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

// ==========================================
// 比较方向
// ==========================================
// 均为严格比较: 恰好等于阈值不触发
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Above, // value > limit
    Below, // value < limit
}

impl Direction {
    pub fn breaches(&self, value: f64, limit: f64) -> bool {
        match self {
            Direction::Above => value > limit,
            Direction::Below => value < limit,
        }
    }
}

// ==========================================
// 同一工段多规则冲突时的取值策略
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageConflictPolicy {
    /// 后评估的规则覆盖先写入的值 (AF 率与 CO2 同写 Sustain 时, CO2 生效)
    #[default]
    LastWriterWins,
    /// 取更严重者
    MostSevereWins,
}

// ==========================================
// ThresholdRule - 单组规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRule {
    pub metric: Metric,
    pub stage: Stage,
    pub direction: Direction,
    pub critical: Option<f64>, // 为 None 时该规则只有 warning 一档
    pub warning: Option<f64>,
    pub critical_message: String,
    pub warning_message: String,
}

impl ThresholdRule {
    /// 判定档位及对应建议
    ///
    /// # 返回
    /// - Some((Severity::Critical | Severity::Warning, message))
    /// - None: 未触发
    pub fn classify(&self, value: f64) -> Option<(Severity, &str)> {
        if let Some(limit) = self.critical {
            if self.direction.breaches(value, limit) {
                return Some((Severity::Critical, self.critical_message.as_str()));
            }
        }
        if let Some(limit) = self.warning {
            if self.direction.breaches(value, limit) {
                return Some((Severity::Warning, self.warning_message.as_str()));
            }
        }
        None
    }

    /// 校验阈值: 有限数值, 且 critical 比 warning 更"远"
    fn validate(&self) -> EngineResult<()> {
        for limit in [self.critical, self.warning].into_iter().flatten() {
            if !limit.is_finite() {
                return Err(EngineError::InvalidArgument(format!(
                    "{} 阈值必须为有限数值: {}",
                    self.metric, limit
                )));
            }
        }

        if let (Some(critical), Some(warning)) = (self.critical, self.warning) {
            let ordered = match self.direction {
                Direction::Above => critical >= warning,
                Direction::Below => critical <= warning,
            };
            if !ordered {
                return Err(EngineError::InvalidArgument(format!(
                    "{} 阈值顺序错误: critical={}, warning={}",
                    self.metric, critical, warning
                )));
            }
        }

        if self.critical.is_none() && self.warning.is_none() {
            return Err(EngineError::InvalidArgument(format!(
                "{} 规则至少需要一个阈值",
                self.metric
            )));
        }

        Ok(())
    }
}

// ==========================================
// ThresholdTable - 规则表
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    rules: Vec<ThresholdRule>,
    pub conflict_policy: StageConflictPolicy,
}

impl ThresholdTable {
    /// 从规则列表构造并校验
    pub fn new(rules: Vec<ThresholdRule>, conflict_policy: StageConflictPolicy) -> EngineResult<Self> {
        for rule in &rules {
            rule.validate()?;
        }
        Ok(Self {
            rules,
            conflict_policy,
        })
    }

    pub fn rules(&self) -> &[ThresholdRule] {
        &self.rules
    }

    /// 按指标查找规则
    pub fn rule_for(&self, metric: Metric) -> Option<&ThresholdRule> {
        self.rules.iter().find(|r| r.metric == metric)
    }

    /// 覆写某指标的阈值 (返回校验后的新表)
    pub fn with_limits(
        &self,
        metric: Metric,
        critical: Option<f64>,
        warning: Option<f64>,
    ) -> EngineResult<Self> {
        let mut rules = self.rules.clone();
        let rule = rules
            .iter_mut()
            .find(|r| r.metric == metric)
            .ok_or_else(|| EngineError::InvalidArgument(format!("{} 没有对应规则", metric)))?;
        rule.critical = critical;
        rule.warning = warning;
        Self::new(rules, self.conflict_policy)
    }

    /// 切换冲突策略
    pub fn with_policy(mut self, policy: StageConflictPolicy) -> Self {
        self.conflict_policy = policy;
        self
    }
}

impl Default for ThresholdTable {
    /// 默认规则表
    ///
    /// 顺序: 窑温 → AF 率 → 游离钙 → CO2 → 磨机功率
    fn default() -> Self {
        let rule = |metric, stage, direction, critical, warning, cm: &str, wm: &str| ThresholdRule {
            metric,
            stage,
            direction,
            critical: Some(critical),
            warning: Some(warning),
            critical_message: cm.to_string(),
            warning_message: wm.to_string(),
        };

        Self {
            rules: vec![
                rule(
                    Metric::KilnTemp,
                    Stage::Preheat,
                    Direction::Above,
                    1500.0,
                    1450.0,
                    "🔥 Kiln temperature is critical! Reduce fuel immediately.",
                    "⚠️ Kiln temperature is high, monitor fuel closely.",
                ),
                rule(
                    Metric::AfRate,
                    Stage::Sustain,
                    Direction::Below,
                    3.0,
                    5.0,
                    "Critical low AF rate; sustainability compromised.",
                    "Increase alternative fuel rate to improve sustainability.",
                ),
                rule(
                    Metric::FreeLime,
                    Stage::Clinker,
                    Direction::Above,
                    4.0,
                    2.5,
                    "Clinker free lime is critically high; poor quality risk.",
                    "Free lime is high; adjust kiln process.",
                ),
                rule(
                    Metric::Co2Emission,
                    Stage::Sustain,
                    Direction::Above,
                    1000.0,
                    800.0,
                    "Critical CO₂ emissions; energy optimization needed.",
                    "High CO₂ emission; consider process efficiency improvements.",
                ),
                rule(
                    Metric::MillPower,
                    Stage::Grind,
                    Direction::Above,
                    6000.0,
                    5000.0,
                    "Critical grinding load; immediate action required.",
                    "Mill power is high; check grinding efficiency.",
                ),
            ],
            conflict_policy: StageConflictPolicy::LastWriterWins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_order() {
        let table = ThresholdTable::default();
        let metrics: Vec<Metric> = table.rules().iter().map(|r| r.metric).collect();
        assert_eq!(
            metrics,
            vec![
                Metric::KilnTemp,
                Metric::AfRate,
                Metric::FreeLime,
                Metric::Co2Emission,
                Metric::MillPower
            ]
        );
        assert_eq!(table.conflict_policy, StageConflictPolicy::LastWriterWins);
    }

    #[test]
    fn test_classify_strict_boundaries() {
        let table = ThresholdTable::default();
        let kiln = table.rule_for(Metric::KilnTemp).unwrap();

        assert_eq!(kiln.classify(1450.0), None);
        assert_eq!(kiln.classify(1450.1).map(|(s, _)| s), Some(Severity::Warning));
        assert_eq!(kiln.classify(1500.0).map(|(s, _)| s), Some(Severity::Warning));
        assert_eq!(kiln.classify(1500.1).map(|(s, _)| s), Some(Severity::Critical));

        let af = table.rule_for(Metric::AfRate).unwrap();
        assert_eq!(af.classify(5.0), None);
        assert_eq!(af.classify(3.0).map(|(s, _)| s), Some(Severity::Warning));
        assert_eq!(af.classify(2.9).map(|(s, _)| s), Some(Severity::Critical));
    }

    #[test]
    fn test_warning_only_rule() {
        let table = ThresholdTable::default()
            .with_limits(Metric::MillPower, None, Some(5000.0))
            .unwrap();
        let mill = table.rule_for(Metric::MillPower).unwrap();
        assert_eq!(mill.classify(9000.0).map(|(s, _)| s), Some(Severity::Warning));
    }

    #[test]
    fn test_inverted_limits_rejected() {
        let err = ThresholdTable::default()
            .with_limits(Metric::KilnTemp, Some(1400.0), Some(1450.0))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));

        let err = ThresholdTable::default()
            .with_limits(Metric::AfRate, Some(6.0), Some(5.0))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn test_unknown_metric_override_rejected() {
        let err = ThresholdTable::default()
            .with_limits(Metric::BlaineSurface, Some(1.0), Some(0.5))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }
}
