// ==========================================
// 水泥厂监控演示系统 - 导出层
// ==========================================
// 职责: 批量 CSV 文件 / 实时 JSON 行 / 流下游
// ==========================================

pub mod csv_export;
pub mod error;
pub mod jsonl;
pub mod sink;

// 重导出
pub use csv_export::{read_readings_csv, write_readings_csv};
pub use error::{ExportError, ExportResult};
pub use jsonl::{from_json_line, to_json_line};
pub use sink::{pump_stream, JsonLineSink, ReadingSink, RepositorySink};
