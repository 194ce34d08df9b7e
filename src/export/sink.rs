// ==========================================
// 水泥厂监控演示系统 - 实时流下游
// ==========================================
// 职责: 把实时流的每条读数交给下游 (stdout / 历史库)
// 约束: 下游报错即停止泵送, 已发送条数保留在错误日志中
// ==========================================

use crate::domain::reading::Reading;
use crate::export::error::{ExportError, ExportResult};
use crate::export::jsonl::to_json_line;
use crate::repository::ReadingRepository;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use std::io::Write;
use std::sync::{Arc, Mutex};

// ==========================================
// ReadingSink Trait
// ==========================================
#[async_trait]
pub trait ReadingSink: Send + Sync {
    /// 接收一条读数
    async fn accept(&self, reading: &Reading) -> ExportResult<()>;
}

// ==========================================
// JsonLineSink - 每条一行 JSON
// ==========================================
pub struct JsonLineSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLineSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// 取回内部 Writer
    pub fn into_inner(self) -> ExportResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| ExportError::SinkClosed(e.to_string()))
    }
}

#[async_trait]
impl<W: Write + Send> ReadingSink for JsonLineSink<W> {
    async fn accept(&self, reading: &Reading) -> ExportResult<()> {
        let line = to_json_line(reading)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| ExportError::SinkClosed(e.to_string()))?;
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }
}

// ==========================================
// RepositorySink - 追加到历史库
// ==========================================
pub struct RepositorySink {
    repo: Arc<ReadingRepository>,
}

impl RepositorySink {
    pub fn new(repo: Arc<ReadingRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ReadingSink for RepositorySink {
    async fn accept(&self, reading: &Reading) -> ExportResult<()> {
        self.repo.insert(reading)?;
        Ok(())
    }
}

/// 把流泵送到下游, 直到流结束或下游报错
///
/// # 返回
/// - Ok(usize): 成功交付条数
pub async fn pump_stream<S>(stream: S, sink: &dyn ReadingSink) -> ExportResult<usize>
where
    S: Stream<Item = Reading>,
{
    futures::pin_mut!(stream);

    let mut delivered = 0usize;
    while let Some(reading) = stream.next().await {
        if let Err(e) = sink.accept(&reading).await {
            tracing::warn!(delivered, error = %e, "下游写入失败, 停止泵送");
            return Err(e);
        }
        delivered += 1;
    }

    tracing::debug!(delivered, "实时流结束");
    Ok(delivered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};
    use crate::engine::{GeneratorConfig, ReadingGenerator};
    use crate::export::jsonl::from_json_line;
    use rusqlite::Connection;
    use std::time::Duration;

    struct FailingSink;

    #[async_trait]
    impl ReadingSink for FailingSink {
        async fn accept(&self, _reading: &Reading) -> ExportResult<()> {
            Err(ExportError::SinkClosed("broken pipe".to_string()))
        }
    }

    fn generator() -> ReadingGenerator {
        ReadingGenerator::with_seed(GeneratorConfig::default(), 5).unwrap()
    }

    #[tokio::test]
    async fn test_pump_to_json_lines() {
        let stream = generator().stream_async(3, Duration::ZERO).unwrap();
        let sink = JsonLineSink::new(Vec::new());

        assert_eq!(pump_stream(stream, &sink).await.unwrap(), 3);

        let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in lines {
            let reading = from_json_line(line).unwrap();
            assert!((0.0..=40.0).contains(&reading.af_rate_percent));
        }
    }

    #[tokio::test]
    async fn test_pump_to_repository() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        let repo = Arc::new(ReadingRepository::from_connection(Arc::new(Mutex::new(conn))));

        let stream = generator().stream_async(4, Duration::ZERO).unwrap();
        let sink = RepositorySink::new(repo.clone());
        assert_eq!(pump_stream(stream, &sink).await.unwrap(), 4);
        assert_eq!(repo.count().unwrap(), 4);
    }

    #[tokio::test]
    async fn test_pump_stops_on_sink_error() {
        let stream = generator().stream_async(3, Duration::ZERO).unwrap();
        let result = pump_stream(stream, &FailingSink).await;
        assert!(matches!(result, Err(ExportError::SinkClosed(_))));
    }
}
