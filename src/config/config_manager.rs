// ==========================================
// 水泥厂监控演示系统 - 配置管理器
// ==========================================
// 职责: 阈值 / 漂移参数的覆写读取与快照
// 存储: config_kv 表 (key-value + scope)
// 未配置的键一律回退到引擎默认值
// ==========================================

use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::domain::types::Metric;
use crate::engine::drift::DriftConfig;
use crate::engine::thresholds::{StageConflictPolicy, ThresholdTable};
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入配置值 (UPSERT)
    pub fn set_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        tracing::info!(key, value, "配置已更新");
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key"
        )?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
            ))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    /// 从配置快照恢复配置
    ///
    /// # 返回
    /// - Ok(usize): 恢复的配置项数量
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> Result<usize, Box<dyn Error>> {
        let config_map: HashMap<String, String> = serde_json::from_str(snapshot_json)?;

        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for (key, value) in config_map.iter() {
            count += tx.execute(
                "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
                 ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2",
                params![key, value],
            )?;
        }

        tx.commit()?;
        Ok(count)
    }

    // ===== 评估阈值 =====

    /// 读取阈值表 (默认表 + config_kv 覆写)
    ///
    /// # 说明
    /// - 键: threshold.<列名>.critical / threshold.<列名>.warning
    /// - 值为 "none" 时关闭该档
    /// - 覆写后的表需通过顺序校验, 否则返回错误
    pub fn load_threshold_table(&self) -> Result<ThresholdTable, Box<dyn Error>> {
        let mut table = ThresholdTable::default();

        let metrics: Vec<Metric> = table.rules().iter().map(|r| r.metric).collect();
        for metric in metrics {
            let critical_key = config_keys::threshold_key(metric, "critical");
            let warning_key = config_keys::threshold_key(metric, "warning");
            let critical_raw = self.get_config_value(&critical_key)?;
            let warning_raw = self.get_config_value(&warning_key)?;

            if critical_raw.is_none() && warning_raw.is_none() {
                continue;
            }

            let current = table
                .rule_for(metric)
                .map(|r| (r.critical, r.warning))
                .unwrap_or((None, None));

            let critical = match critical_raw {
                Some(raw) => parse_limit(&critical_key, &raw)?,
                None => current.0,
            };
            let warning = match warning_raw {
                Some(raw) => parse_limit(&warning_key, &raw)?,
                None => current.1,
            };

            tracing::debug!(metric = %metric, ?critical, ?warning, "阈值覆写");
            table = table.with_limits(metric, critical, warning)?;
        }

        let policy = match self.get_config_value(config_keys::CONFLICT_POLICY)? {
            Some(raw) => parse_policy(&raw)?,
            None => StageConflictPolicy::default(),
        };

        Ok(table.with_policy(policy))
    }

    // ===== 漂移检测 =====

    /// 读取漂移检测默认参数
    pub fn load_drift_config(&self) -> Result<DriftConfig, Box<dyn Error>> {
        let mut config = DriftConfig::default();

        if let Some(column) = self.get_config_value(config_keys::DRIFT_COLUMN)? {
            config.metric = Metric::from_column(&column)
                .ok_or_else(|| format!("{} 未知指标列: {}", config_keys::DRIFT_COLUMN, column))?;
        }

        if let Some(raw) = self.get_config_value(config_keys::DRIFT_WINDOW)? {
            let window: usize = raw.trim().parse()?;
            if window == 0 {
                return Err(format!("{} 必须 >= 1", config_keys::DRIFT_WINDOW).into());
            }
            config.window = window;
        }

        if let Some(raw) = self.get_config_value(config_keys::DRIFT_THRESHOLD)? {
            let threshold: f64 = raw.trim().parse()?;
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(format!("{} 必须为非负数", config_keys::DRIFT_THRESHOLD).into());
            }
            config.threshold = threshold;
        }

        Ok(config)
    }
}

fn parse_limit(key: &str, raw: &str) -> Result<Option<f64>, Box<dyn Error>> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let value: f64 = trimmed
        .parse()
        .map_err(|e| format!("{} 解析失败({}): {}", key, raw, e))?;
    Ok(Some(value))
}

fn parse_policy(raw: &str) -> Result<StageConflictPolicy, Box<dyn Error>> {
    match raw.trim().to_uppercase().as_str() {
        "LAST_WRITER_WINS" => Ok(StageConflictPolicy::LastWriterWins),
        "MOST_SEVERE_WINS" => Ok(StageConflictPolicy::MostSevereWins),
        other => Err(format!("{} 未知取值: {}", config_keys::CONFLICT_POLICY, other).into()),
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    use crate::domain::types::Metric;

    pub const CONFLICT_POLICY: &str = "evaluator.conflict_policy";
    pub const DRIFT_COLUMN: &str = "drift.column";
    pub const DRIFT_WINDOW: &str = "drift.window";
    pub const DRIFT_THRESHOLD: &str = "drift.threshold";

    /// threshold.<列名>.<tier>
    pub fn threshold_key(metric: Metric, tier: &str) -> String {
        format!("threshold.{}.{}", metric.column_name(), tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;

    fn memory_manager() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_without_overrides() {
        let manager = memory_manager();
        assert_eq!(manager.load_threshold_table().unwrap(), ThresholdTable::default());
        assert_eq!(manager.load_drift_config().unwrap(), DriftConfig::default());
    }

    #[test]
    fn test_threshold_override() {
        let manager = memory_manager();
        manager
            .set_config_value("threshold.kiln_temp_C.warning", "1460")
            .unwrap();
        manager
            .set_config_value("threshold.mill_power_kW.critical", "none")
            .unwrap();

        let table = manager.load_threshold_table().unwrap();
        let kiln = table.rule_for(Metric::KilnTemp).unwrap();
        assert_eq!(kiln.warning, Some(1460.0));
        assert_eq!(kiln.critical, Some(1500.0));
        assert_eq!(table.rule_for(Metric::MillPower).unwrap().critical, None);
    }

    #[test]
    fn test_invalid_threshold_override_rejected() {
        let manager = memory_manager();
        manager
            .set_config_value("threshold.kiln_temp_C.critical", "1400")
            .unwrap();
        assert!(manager.load_threshold_table().is_err());
    }

    #[test]
    fn test_conflict_policy_and_drift_override() {
        let manager = memory_manager();
        manager
            .set_config_value(config_keys::CONFLICT_POLICY, "most_severe_wins")
            .unwrap();
        manager
            .set_config_value(config_keys::DRIFT_COLUMN, "kiln_temp_C")
            .unwrap();
        manager.set_config_value(config_keys::DRIFT_WINDOW, "10").unwrap();

        let table = manager.load_threshold_table().unwrap();
        assert_eq!(table.conflict_policy, StageConflictPolicy::MostSevereWins);

        let drift = manager.load_drift_config().unwrap();
        assert_eq!(drift.metric, Metric::KilnTemp);
        assert_eq!(drift.window, 10);
        assert_eq!(drift.threshold, 0.5);
    }

    #[test]
    fn test_snapshot_restore() {
        let source = memory_manager();
        source.set_config_value(config_keys::DRIFT_WINDOW, "12").unwrap();
        let snapshot = source.get_config_snapshot().unwrap();

        let target = memory_manager();
        assert_eq!(target.restore_config_from_snapshot(&snapshot).unwrap(), 1);
        assert_eq!(
            target.get_config_value(config_keys::DRIFT_WINDOW).unwrap().as_deref(),
            Some("12")
        );
    }
}
