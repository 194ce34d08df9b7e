// ==========================================
// 水泥厂监控演示系统 - 看板与优化建议模型
// ==========================================
// KpiTile: 看板指标卡分档
// OptimizationPlan: 启发式设定值调整建议
// ==========================================

use crate::domain::types::Metric;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 指标卡分档 (KPI Band)
// ==========================================
// 与工段严重度相互独立, 只服务看板着色
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KpiBand {
    Good,  // 绿
    Watch, // 橙
    Alarm, // 红
}

impl fmt::Display for KpiBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KpiBand::Good => write!(f, "good"),
            KpiBand::Watch => write!(f, "watch"),
            KpiBand::Alarm => write!(f, "alarm"),
        }
    }
}

// ==========================================
// KpiTile - 指标卡
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiTile {
    pub metric: Metric,
    pub label: String,
    pub value: f64,
    pub band: KpiBand,
}

// ==========================================
// SetpointAction - 单条设定值调整
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetpointAction {
    #[serde(rename = "loop")]
    pub control_loop: String, // 控制回路: mill / fuel
    pub action: String,       // 动作: reduce_feed / increase_AF
    pub amount_percent: f64,  // 调整幅度 %
}

// ==========================================
// OptimizationPlan - 优化方案
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationPlan {
    pub actions: Vec<SetpointAction>,
    pub estimated_savings_percent: f64,
}
