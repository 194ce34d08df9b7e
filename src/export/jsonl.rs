// ==========================================
// 水泥厂监控演示系统 - JSON 行编解码
// ==========================================
// 实时流的线格式: 每条读数一行 JSON 对象
// ==========================================

use crate::domain::reading::Reading;
use crate::export::error::ExportResult;

/// 单条读数 → 一行 JSON (不含换行)
pub fn to_json_line(reading: &Reading) -> ExportResult<String> {
    Ok(serde_json::to_string(reading)?)
}

/// 一行 JSON → 读数
pub fn from_json_line(line: &str) -> ExportResult<Reading> {
    Ok(serde_json::from_str(line.trim())?)
}
