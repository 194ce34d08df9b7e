// ==========================================
// 水泥厂监控演示系统 - 工厂监控 API
// ==========================================
// 职责: 读数接入 + 看板动作 (评估 / 漂移 / KPI / 优化)
// 架构: API 层 → Engine 层 (纯计算) + Repository 层 (历史)
// 阈值与漂移参数每次调用时从 config_kv 读取
// ==========================================

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::advisory::{KpiTile, OptimizationPlan};
use crate::domain::evaluation::{DriftOutcome, EvaluationResult};
use crate::domain::reading::Reading;
use crate::domain::types::Metric;
use crate::engine::{
    kpi_tiles, DriftConfig, DriftDetector, EnergyOptimizer, GeneratorConfig, PlantEvaluator,
    ReadingGenerator,
};
use crate::export::csv_export::write_readings_csv;
use crate::repository::ReadingRepository;

// ==========================================
// IngestReceipt - 接入回执
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReceipt {
    pub status: String,   // 固定 "ok"
    pub buffer_len: usize, // 接入后历史总条数
}

// ==========================================
// PlantApi - 工厂监控 API
// ==========================================
pub struct PlantApi {
    reading_repo: Arc<ReadingRepository>,
    config_manager: Arc<ConfigManager>,
    drift_detector: DriftDetector,
    optimizer: EnergyOptimizer,
}

impl PlantApi {
    /// 创建新的PlantApi实例
    ///
    /// # 参数
    /// - reading_repo: 读数历史仓储
    /// - config_manager: 阈值/漂移参数覆写来源
    pub fn new(reading_repo: Arc<ReadingRepository>, config_manager: Arc<ConfigManager>) -> Self {
        Self {
            reading_repo,
            config_manager,
            drift_detector: DriftDetector::new(),
            optimizer: EnergyOptimizer::new(),
        }
    }

    // ==========================================
    // 接入
    // ==========================================

    /// 接入一条读数 (追加到历史)
    ///
    /// # 返回
    /// - Ok(IngestReceipt): status="ok", buffer_len=当前历史条数
    /// - Err(ApiError::InvalidInput): 存在非有限数值
    pub fn ingest(&self, reading: Reading) -> ApiResult<IngestReceipt> {
        if let Some(metric) = Metric::ALL.iter().find(|m| !reading.value(**m).is_finite()) {
            return Err(ApiError::InvalidInput(format!(
                "{} 必须为有限数值",
                metric.column_name()
            )));
        }

        self.reading_repo.insert(&reading)?;
        let buffer_len = self.reading_repo.count()?;

        tracing::debug!(buffer_len, timestamp = %reading.timestamp, "读数已接入");
        Ok(IngestReceipt {
            status: "ok".to_string(),
            buffer_len,
        })
    }

    /// 最新一条读数 (历史为空时 None)
    pub fn latest(&self) -> ApiResult<Option<Reading>> {
        Ok(self.reading_repo.find_latest()?)
    }

    /// 最近 limit 条 (最新在末尾)
    pub fn history(&self, limit: usize) -> ApiResult<Vec<Reading>> {
        if limit == 0 {
            return Err(ApiError::InvalidInput("limit 必须 >= 1".to_string()));
        }
        Ok(self.reading_repo.list_recent(limit)?)
    }

    // ==========================================
    // 工况评估
    // ==========================================

    /// 评估任意快照 (列名 → 数值)
    pub fn analyze(&self, fields: &HashMap<String, f64>) -> ApiResult<EvaluationResult> {
        let evaluator = self.build_evaluator()?;
        Ok(evaluator.evaluate(fields)?)
    }

    /// 评估最新一条读数
    pub fn analyze_latest(&self) -> ApiResult<EvaluationResult> {
        let reading = self.require_latest()?;
        self.analyze(&reading.to_metric_map())
    }

    // ==========================================
    // 漂移检测
    // ==========================================

    /// 按指定参数检测漂移
    ///
    /// # 说明
    /// - 读取最近 3*window 条历史, 与纯引擎在同一数据上的结果一致
    pub fn check_drift(&self, column: &str, window: usize, threshold: f64) -> ApiResult<DriftOutcome> {
        let metric = Metric::from_column(column)
            .ok_or_else(|| ApiError::InvalidInput(format!("未知指标列: {}", column)))?;

        self.run_drift(&DriftConfig {
            metric,
            window,
            threshold,
        })
    }

    /// 按 config_kv 中的默认参数检测漂移
    pub fn check_drift_default(&self) -> ApiResult<DriftOutcome> {
        let config = self
            .config_manager
            .load_drift_config()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        self.run_drift(&config)
    }

    fn run_drift(&self, config: &DriftConfig) -> ApiResult<DriftOutcome> {
        let history = if config.window == 0 {
            Vec::new()
        } else {
            self.reading_repo
                .list_recent(DriftDetector::required_history(config.window))?
        };
        Ok(self.drift_detector.detect_with(&history, config)?)
    }

    // ==========================================
    // 看板 / 优化
    // ==========================================

    /// 最新读数的 KPI 卡片
    pub fn kpi_tiles_latest(&self) -> ApiResult<Vec<KpiTile>> {
        let reading = self.require_latest()?;
        Ok(kpi_tiles(&reading))
    }

    /// 最新读数的设定值调整建议
    pub fn optimize_latest(&self) -> ApiResult<OptimizationPlan> {
        let reading = self.require_latest()?;
        Ok(self.optimizer.optimize_reading(&reading)?)
    }

    // ==========================================
    // 历史维护
    // ==========================================

    /// 生成 n 条合成读数写入历史, 最后一条时间戳为当前时刻
    ///
    /// # 返回
    /// - Ok(String): batch_id
    pub fn seed_history(&self, n: usize) -> ApiResult<String> {
        let mut generator = ReadingGenerator::new(GeneratorConfig::default())?;
        let readings = generator.generate_batch_ending(Utc::now(), n)?;

        let batch_id = self.reading_repo.batch_insert(&readings)?;
        tracing::info!(batch_id = %batch_id, rows = n, "历史已播种");
        Ok(batch_id)
    }

    /// 全量历史导出为 CSV
    pub fn export_history_csv(&self, path: &Path) -> ApiResult<usize> {
        let readings = self.reading_repo.list_all()?;
        Ok(write_readings_csv(path, &readings)?)
    }

    // ==========================================
    // 内部工具
    // ==========================================

    fn build_evaluator(&self) -> ApiResult<PlantEvaluator> {
        let table = self
            .config_manager
            .load_threshold_table()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        Ok(PlantEvaluator::with_table(table))
    }

    fn require_latest(&self) -> ApiResult<Reading> {
        self.reading_repo
            .find_latest()?
            .ok_or_else(|| ApiError::NotFound("历史读数为空".to_string()))
    }
}
