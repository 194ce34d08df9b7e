// ==========================================
// 水泥厂监控演示系统 - 读数历史仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: plant_reading 表的追加与按时间顺序读取
// 约定: 所有列表查询按时间升序返回 (最新在末尾)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::reading::{iso8601_utc, Reading};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const SELECT_COLUMNS: &str = r#"
    timestamp, kiln_temp_C, mill_power_kW, raw_feed_rate_tph, AF_rate_percent,
    clinker_free_lime_percent, blain_surface_cm2g, CO2_emission_kgpt
"#;

// ==========================================
// ReadingRepository - 读数历史仓储
// ==========================================
pub struct ReadingRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ReadingRepository {
    /// 创建新的 ReadingRepository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例 (调用方负责建表)
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 追加单条读数
    ///
    /// # 返回
    /// - Ok(i64): reading_id
    pub fn insert(&self, reading: &Reading) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        insert_row(&conn, reading, None)?;
        Ok(conn.last_insert_rowid())
    }

    /// 批量追加 (单事务)
    ///
    /// # 返回
    /// - Ok(String): 本批次 batch_id
    pub fn batch_insert(&self, readings: &[Reading]) -> RepositoryResult<String> {
        let batch_id = Uuid::new_v4().to_string();
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        for reading in readings {
            insert_row(&tx, reading, Some(&batch_id))?;
        }

        tx.commit()?;
        tracing::info!(batch_id = %batch_id, rows = readings.len(), "批量写入读数");
        Ok(batch_id)
    }

    /// 历史总条数
    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM plant_reading", [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// 最新一条
    pub fn find_latest(&self) -> RepositoryResult<Option<Reading>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM plant_reading ORDER BY timestamp DESC, reading_id DESC LIMIT 1",
            SELECT_COLUMNS
        );
        let reading = conn.query_row(&sql, [], map_reading).optional()?;
        Ok(reading)
    }

    /// 最近 limit 条, 时间升序 (最新在末尾)
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<Reading>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM plant_reading ORDER BY timestamp DESC, reading_id DESC LIMIT ?1",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut readings = stmt
            .query_map(params![limit as i64], map_reading)?
            .collect::<Result<Vec<_>, _>>()?;

        readings.reverse();
        Ok(readings)
    }

    /// 全量历史, 时间升序
    pub fn list_all(&self) -> RepositoryResult<Vec<Reading>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM plant_reading ORDER BY timestamp ASC, reading_id ASC",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let readings = stmt
            .query_map([], map_reading)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(readings)
    }

    /// 按批次查询
    pub fn list_by_batch(&self, batch_id: &str) -> RepositoryResult<Vec<Reading>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM plant_reading WHERE batch_id = ?1 ORDER BY timestamp ASC, reading_id ASC",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let readings = stmt
            .query_map(params![batch_id], map_reading)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(readings)
    }

    /// 清空历史
    ///
    /// # 返回
    /// - Ok(usize): 删除条数
    pub fn delete_all(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n = conn.execute("DELETE FROM plant_reading", [])?;
        Ok(n)
    }
}

fn insert_row(conn: &Connection, reading: &Reading, batch_id: Option<&str>) -> rusqlite::Result<usize> {
    conn.execute(
        r#"
        INSERT INTO plant_reading (
            batch_id, timestamp,
            kiln_temp_C, mill_power_kW, raw_feed_rate_tph, AF_rate_percent,
            clinker_free_lime_percent, blain_surface_cm2g, CO2_emission_kgpt
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            batch_id,
            iso8601_utc::format(&reading.timestamp),
            reading.kiln_temp_c,
            reading.mill_power_kw,
            reading.raw_feed_rate_tph,
            reading.af_rate_percent,
            reading.clinker_free_lime_percent,
            reading.blain_surface_cm2g,
            reading.co2_emission_kgpt,
        ],
    )
}

fn map_reading(row: &Row<'_>) -> rusqlite::Result<Reading> {
    let raw_ts: String = row.get(0)?;
    let timestamp = iso8601_utc::parse(&raw_ts)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

    Ok(Reading {
        timestamp,
        kiln_temp_c: row.get(1)?,
        mill_power_kw: row.get(2)?,
        raw_feed_rate_tph: row.get(3)?,
        af_rate_percent: row.get(4)?,
        clinker_free_lime_percent: row.get(5)?,
        blain_surface_cm2g: row.get(6)?,
        co2_emission_kgpt: row.get(7)?,
    })
}
