// ==========================================
// 水泥厂监控演示系统 - 漂移检测引擎
// ==========================================
// 职责: 近期窗口均值 vs 更长的尾部基线均值
// 输入: 按时间升序的历史读数 (最新在末尾)
// 输出: DriftOutcome
// ==========================================
// 说明: 基线窗口 (3*window) 包含近期窗口本身, 不是不相交的前一时段;
//       需要不相交基线时由调用方先截断历史
// ==========================================

use crate::domain::evaluation::{DriftOutcome, DriftSignal};
use crate::domain::reading::{column_values, Reading};
use crate::domain::types::Metric;
use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};

/// 基线窗口相对近期窗口的倍数
pub const BASELINE_FACTOR: usize = 3;

// ==========================================
// DriftConfig - 默认检测参数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftConfig {
    pub metric: Metric,
    pub window: usize,
    pub threshold: f64,
}

impl Default for DriftConfig {
    fn default() -> Self {
        Self {
            metric: Metric::FreeLime,
            window: 30,
            threshold: 0.5,
        }
    }
}

// ==========================================
// DriftDetector - 漂移检测引擎
// ==========================================
pub struct DriftDetector {
    // 无状态引擎
}

impl DriftDetector {
    pub fn new() -> Self {
        Self {}
    }

    /// 给定窗口下能得到完整基线所需的历史条数
    pub fn required_history(window: usize) -> usize {
        window.saturating_mul(BASELINE_FACTOR)
    }

    /// 漂移检测
    ///
    /// # 参数
    /// - `history`: 历史读数, 最新在末尾
    /// - `metric`: 检测列
    /// - `window`: 近期窗口 (>= 1)
    /// - `threshold`: 判定阈值 (>= 0)
    ///
    /// # 返回
    /// - Ok(DriftOutcome::InsufficientHistory): 历史条数 < window
    /// - Ok(DriftOutcome::Signal): anomaly = |delta| > threshold
    /// - Err(EngineError::InvalidArgument): 参数非法
    pub fn detect(
        &self,
        history: &[Reading],
        metric: Metric,
        window: usize,
        threshold: f64,
    ) -> EngineResult<DriftOutcome> {
        let values = column_values(history, metric);
        self.detect_values(&values, window, threshold)
    }

    /// 按列名检测
    pub fn detect_by_name(
        &self,
        history: &[Reading],
        column: &str,
        window: usize,
        threshold: f64,
    ) -> EngineResult<DriftOutcome> {
        let metric = Metric::from_column(column)
            .ok_or_else(|| EngineError::InvalidArgument(format!("未知指标列: {}", column)))?;
        self.detect(history, metric, window, threshold)
    }

    /// 使用 DriftConfig 检测
    pub fn detect_with(&self, history: &[Reading], config: &DriftConfig) -> EngineResult<DriftOutcome> {
        self.detect(history, config.metric, config.window, config.threshold)
    }

    /// 对数值序列检测 (核心算法)
    pub fn detect_values(
        &self,
        values: &[f64],
        window: usize,
        threshold: f64,
    ) -> EngineResult<DriftOutcome> {
        // 参数校验先于历史长度判断
        if window == 0 {
            return Err(EngineError::InvalidArgument("window 必须 >= 1".to_string()));
        }
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(EngineError::InvalidArgument(format!(
                "threshold 必须为非负有限数值: {}",
                threshold
            )));
        }

        // 1. 数据不足
        if values.len() < window {
            tracing::debug!(available = values.len(), required = window, "漂移检测历史不足");
            return Ok(DriftOutcome::InsufficientHistory {
                available: values.len(),
                required: window,
            });
        }

        // 以最新值为参考点求均值: 常数序列的 delta 恒为 0
        let reference = values[values.len() - 1];

        // 2. 近期均值
        let recent = trailing_mean(values, window, reference);

        // 3. 基线均值
        let baseline_len = Self::required_history(window);
        let baseline = if values.len() >= baseline_len {
            trailing_mean(values, baseline_len, reference)
        } else {
            trailing_mean(values, values.len(), reference)
        };

        // 4. delta / anomaly
        let delta = recent - baseline;
        let anomaly = delta.abs() > threshold;

        if anomaly {
            tracing::info!(delta, threshold, window, "检测到漂移");
        }

        Ok(DriftOutcome::Signal(DriftSignal { anomaly, delta }))
    }
}

impl Default for DriftDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// 末尾 n 个值的算术均值 (n >= 1, n <= len)
fn trailing_mean(values: &[f64], n: usize, reference: f64) -> f64 {
    let tail = &values[values.len() - n..];
    let offset: f64 = tail.iter().map(|v| v - reference).sum();
    reference + offset / n as f64
}
