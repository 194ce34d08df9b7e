// ==========================================
// 水泥厂监控演示系统 - 配置层
// ==========================================
// 职责: 运行配置 (环境变量) 与引擎参数覆写 (config_kv)
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod plant_config;

// 重导出核心配置
pub use config_manager::{config_keys, ConfigManager};
pub use plant_config::{PlantConfig, WarehouseConfig, DEFAULT_NUM_ROWS};
