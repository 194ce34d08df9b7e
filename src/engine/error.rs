// ==========================================
// 水泥厂监控演示系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 引擎错误均为纯计算错误, 无重试语义
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// 参数非法 (数量/窗口/阈值/分布配置)
    #[error("参数非法: {0}")]
    InvalidArgument(String),

    /// 评估输入缺少必需指标
    #[error("缺少必需指标: {0}")]
    MissingMetric(String),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
