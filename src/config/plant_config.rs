// ==========================================
// 水泥厂监控演示系统 - 运行配置
// ==========================================
// 职责: 从环境变量读取一次, 以显式结构体传递
// 核心引擎不读取任何全局状态
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 默认批量条数 (一天的分钟数)
pub const DEFAULT_NUM_ROWS: usize = 1440;

/// 默认区域
pub const DEFAULT_REGION: &str = "us-central1";

/// 默认本地 CSV 文件名
pub const DEFAULT_LOCAL_CSV: &str = "cement_plant_data.csv";

// ==========================================
// WarehouseConfig - 仓库/存储桶标识
// ==========================================
// 仅作为外部协作方的标识透传, 本仓库不做云端上传
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarehouseConfig {
    pub project: Option<String>,
    pub dataset: Option<String>,
    pub table: Option<String>,
    pub gcs_bucket: Option<String>,
    pub gcs_dest_prefix: Option<String>,
    pub gcs_uri: Option<String>,
    pub region: String,
}

impl WarehouseConfig {
    /// project.dataset.table (三者齐全时)
    pub fn table_ref(&self) -> Option<String> {
        match (&self.project, &self.dataset, &self.table) {
            (Some(p), Some(d), Some(t)) => Some(format!("{}.{}.{}", p, d, t)),
            _ => None,
        }
    }

    /// 上传目标 gs://bucket/prefix/file_name
    pub fn blob_uri(&self, file_name: &str) -> Option<String> {
        let bucket = self.gcs_bucket.as_ref()?;
        Some(match &self.gcs_dest_prefix {
            Some(prefix) if !prefix.is_empty() => {
                format!("gs://{}/{}/{}", bucket, prefix.trim_end_matches('/'), file_name)
            }
            _ => format!("gs://{}/{}", bucket, file_name),
        })
    }
}

// ==========================================
// PlantConfig - 运行配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantConfig {
    pub db_path: Option<String>, // 为 None 时使用默认数据目录
    pub local_csv: String,
    pub num_rows: usize,
    pub warehouse: WarehouseConfig,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            local_csv: DEFAULT_LOCAL_CSV.to_string(),
            num_rows: DEFAULT_NUM_ROWS,
            warehouse: WarehouseConfig {
                region: DEFAULT_REGION.to_string(),
                ..WarehouseConfig::default()
            },
        }
    }
}

impl PlantConfig {
    /// 从进程环境变量读取
    pub fn from_env() -> Self {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// 从给定变量表读取 (便于测试)
    ///
    /// # 变量
    /// - CEMMIND_DB_PATH, LOCAL_CSV, NUM_ROWS
    /// - PROJECT, DATASET, TABLE, GCS_BUCKET, GCS_DEST_PREFIX, GCS_URI, REGION
    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let num_rows = match get("NUM_ROWS") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    tracing::warn!("NUM_ROWS 非法({})，使用默认值 {}", raw, DEFAULT_NUM_ROWS);
                    DEFAULT_NUM_ROWS
                }
            },
            None => DEFAULT_NUM_ROWS,
        };

        Self {
            db_path: get("CEMMIND_DB_PATH"),
            local_csv: get("LOCAL_CSV").unwrap_or_else(|| DEFAULT_LOCAL_CSV.to_string()),
            num_rows,
            warehouse: WarehouseConfig {
                project: get("PROJECT"),
                dataset: get("DATASET"),
                table: get("TABLE"),
                gcs_bucket: get("GCS_BUCKET"),
                gcs_dest_prefix: get("GCS_DEST_PREFIX"),
                gcs_uri: get("GCS_URI"),
                region: get("REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = PlantConfig::from_vars(&HashMap::new());
        assert_eq!(config.num_rows, 1440);
        assert_eq!(config.warehouse.region, "us-central1");
        assert_eq!(config.db_path, None);
        assert_eq!(config.warehouse.table_ref(), None);
    }

    #[test]
    fn test_from_vars() {
        let config = PlantConfig::from_vars(&vars(&[
            ("PROJECT", "plant-demo"),
            ("DATASET", "cement"),
            ("TABLE", "readings"),
            ("GCS_BUCKET", "cement-raw"),
            ("GCS_DEST_PREFIX", "batches/"),
            ("NUM_ROWS", "60"),
            ("LOCAL_CSV", "/tmp/out.csv"),
        ]));

        assert_eq!(config.num_rows, 60);
        assert_eq!(config.local_csv, "/tmp/out.csv");
        assert_eq!(
            config.warehouse.table_ref().as_deref(),
            Some("plant-demo.cement.readings")
        );
        assert_eq!(
            config.warehouse.blob_uri("out.csv").as_deref(),
            Some("gs://cement-raw/batches/out.csv")
        );
    }

    #[test]
    fn test_invalid_num_rows_falls_back() {
        let config = PlantConfig::from_vars(&vars(&[("NUM_ROWS", "zero")]));
        assert_eq!(config.num_rows, DEFAULT_NUM_ROWS);

        let config = PlantConfig::from_vars(&vars(&[("NUM_ROWS", "0")]));
        assert_eq!(config.num_rows, DEFAULT_NUM_ROWS);
    }
}
