// ==========================================
// 水泥厂监控演示系统 - 批量 CSV 导出
// ==========================================
// 格式: 表头 = timestamp + 7 个指标列名, 每行一条读数
// 时间戳: ISO-8601 UTC (毫秒, 'Z' 结尾)
// ==========================================

use crate::domain::reading::Reading;
use crate::export::error::{ExportError, ExportResult};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// 写出到任意 Writer
///
/// # 返回
/// - Ok(usize): 写出行数 (不含表头)
pub fn write_readings<W: Write>(writer: W, readings: &[Reading]) -> ExportResult<usize> {
    let mut csv_writer = WriterBuilder::new().has_headers(true).from_writer(writer);

    for reading in readings {
        csv_writer.serialize(reading)?;
    }
    csv_writer.flush()?;

    Ok(readings.len())
}

/// 写出到文件 (覆盖)
pub fn write_readings_csv<P: AsRef<Path>>(path: P, readings: &[Reading]) -> ExportResult<usize> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let rows = write_readings(file, readings)?;
    tracing::info!(path = %path.display(), rows, "CSV 导出完成");
    Ok(rows)
}

/// 从任意 Reader 读取
pub fn read_readings<R: Read>(reader: R) -> ExportResult<Vec<Reading>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut readings = Vec::new();
    for result in csv_reader.deserialize::<Reading>() {
        readings.push(result?);
    }
    Ok(readings)
}

/// 从文件读取
pub fn read_readings_csv<P: AsRef<Path>>(path: P) -> ExportResult<Vec<Reading>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ExportError::FileNotFound(path.display().to_string()));
    }
    let file = File::open(path)?;
    read_readings(file)
}
