// ==========================================
// 水泥厂监控演示系统 - 能耗优化启发式
// ==========================================
// 职责: 基于最新读数给出设定值微调建议
// 输出: OptimizationPlan (可解释, 不自动下发)
// ==========================================

use crate::domain::advisory::{OptimizationPlan, SetpointAction};
use crate::domain::reading::Reading;
use crate::domain::types::Metric;
use crate::engine::error::{EngineError, EngineResult};
use std::collections::HashMap;

// ==========================================
// OptimizerConfig - 启发式参数
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerConfig {
    pub mill_power_limit_kw: f64,   // 超过则建议减料
    pub feed_reduction_percent: f64,
    pub af_rate_target_percent: f64, // 低于则建议提高 AF
    pub af_increase_percent: f64,
    pub estimated_savings_percent: f64, // 有动作时的预估节能
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            mill_power_limit_kw: 4300.0,
            feed_reduction_percent: 1.5,
            af_rate_target_percent: 20.0,
            af_increase_percent: 1.0,
            estimated_savings_percent: 1.2,
        }
    }
}

// ==========================================
// EnergyOptimizer
// ==========================================
pub struct EnergyOptimizer {
    config: OptimizerConfig,
}

impl EnergyOptimizer {
    pub fn new() -> Self {
        Self {
            config: OptimizerConfig::default(),
        }
    }

    pub fn with_config(config: OptimizerConfig) -> Self {
        Self { config }
    }

    /// 生成优化方案
    ///
    /// # 规则
    /// - mill_power_kW > 上限 → mill / reduce_feed
    /// - AF_rate_percent < 目标 → fuel / increase_AF
    /// - 无动作时预估节能为 0
    pub fn optimize(&self, fields: &HashMap<String, f64>) -> EngineResult<OptimizationPlan> {
        let mill_power = require(fields, Metric::MillPower)?;
        let af_rate = require(fields, Metric::AfRate)?;

        let mut actions = Vec::new();

        if mill_power > self.config.mill_power_limit_kw {
            actions.push(SetpointAction {
                control_loop: "mill".to_string(),
                action: "reduce_feed".to_string(),
                amount_percent: self.config.feed_reduction_percent,
            });
        }

        if af_rate < self.config.af_rate_target_percent {
            actions.push(SetpointAction {
                control_loop: "fuel".to_string(),
                action: "increase_AF".to_string(),
                amount_percent: self.config.af_increase_percent,
            });
        }

        let estimated_savings_percent = if actions.is_empty() {
            0.0
        } else {
            self.config.estimated_savings_percent
        };

        Ok(OptimizationPlan {
            actions,
            estimated_savings_percent,
        })
    }

    pub fn optimize_reading(&self, reading: &Reading) -> EngineResult<OptimizationPlan> {
        self.optimize(&reading.to_metric_map())
    }
}

impl Default for EnergyOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

fn require(fields: &HashMap<String, f64>, metric: Metric) -> EngineResult<f64> {
    fields
        .get(metric.column_name())
        .copied()
        .ok_or_else(|| EngineError::MissingMetric(metric.column_name().to_string()))
}
