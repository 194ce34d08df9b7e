// ==========================================
// 水泥厂监控演示系统 - API 层
// ==========================================
// 职责: 进程内业务接口, 供 CLI 与上层展示调用
// ==========================================

pub mod error;
pub mod plant_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use plant_api::{IngestReceipt, PlantApi};
