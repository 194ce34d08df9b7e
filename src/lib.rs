// ==========================================
// 水泥厂监控演示系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite + tokio
// 系统定位: 监控演示 (合成遥测 / 工况评估 / 漂移检测)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 值类型
pub mod domain;

// 引擎层 - 纯计算
pub mod engine;

// 数据仓储层 - 读数历史
pub mod repository;

// 导出层 - CSV / JSON 行 / 流下游
pub mod export;

// 配置层 - 环境变量 + config_kv 覆写
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    DriftOutcome, DriftSignal, EvaluationResult, KpiBand, KpiTile, Metric, OptimizationPlan,
    Reading, SetpointAction, Severity, SeverityMap, Stage,
};

// 引擎
pub use engine::{
    DriftDetector, EnergyOptimizer, EngineError, EngineResult, GeneratorConfig, PlantEvaluator,
    ReadingGenerator, StageConflictPolicy, ThresholdTable,
};

// API
pub use api::{ApiError, ApiResult, IngestReceipt, PlantApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "水泥厂监控演示系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
