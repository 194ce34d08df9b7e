// ==========================================
// 水泥厂监控演示系统 - 领域层
// ==========================================
// 职责: 纯值类型, 不含 IO
// ==========================================

pub mod advisory;
pub mod evaluation;
pub mod reading;
pub mod types;

// 重导出核心类型
pub use advisory::{KpiBand, KpiTile, OptimizationPlan, SetpointAction};
pub use evaluation::{DriftOutcome, DriftSignal, EvaluationResult, SeverityMap};
pub use reading::Reading;
pub use types::{Metric, Severity, Stage};
