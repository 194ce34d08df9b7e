// ==========================================
// 水泥厂监控演示系统 - 引擎层
// ==========================================
// 职责: 纯计算 (生成 / 评估 / 漂移 / 看板分档 / 优化)
// 红线: Engine 不访问数据库, 所有判定必须可解释
// ==========================================

pub mod drift;
pub mod error;
pub mod evaluator;
pub mod generator;
pub mod kpi;
pub mod optimizer;
pub mod thresholds;

// 重导出核心引擎
pub use drift::{DriftConfig, DriftDetector};
pub use error::{EngineError, EngineResult};
pub use evaluator::PlantEvaluator;
pub use generator::{GeneratorConfig, MetricDistribution, ReadingGenerator, ReadingStream};
pub use kpi::kpi_tiles;
pub use optimizer::{EnergyOptimizer, OptimizerConfig};
pub use thresholds::{Direction, StageConflictPolicy, ThresholdRule, ThresholdTable};
