// ==========================================
// 水泥厂监控演示系统 - 合成读数生成器
// ==========================================
// 职责: 批量生成 / 单条追加 / 实时流模拟
// 各指标独立正态采样, 不建模指标间相关性
// ==========================================

use crate::domain::reading::Reading;
use crate::domain::types::Metric;
use crate::engine::error::{EngineError, EngineResult};
use chrono::{DateTime, Duration, SubsecRound, Utc};
use futures::stream::{self, Stream};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

// ==========================================
// 分布参数
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricDistribution {
    pub mean: f64,
    pub std_dev: f64,
}

impl MetricDistribution {
    pub const fn new(mean: f64, std_dev: f64) -> Self {
        Self { mean, std_dev }
    }
}

// ==========================================
// GeneratorConfig - 生成器配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub kiln_temp: MetricDistribution,
    pub mill_power: MetricDistribution,
    pub raw_feed_rate: MetricDistribution,
    pub af_rate: MetricDistribution,
    pub free_lime: MetricDistribution,
    pub blaine_surface: MetricDistribution,
    pub co2_emission: MetricDistribution,

    pub af_rate_min: f64, // AF 率截断下限
    pub af_rate_max: f64, // AF 率截断上限

    pub batch_step_secs: i64,         // 批量数据相邻时间戳间隔
    pub stream_decimals: Option<u32>, // 实时流输出保留小数位
}

impl GeneratorConfig {
    /// 某指标的分布参数
    pub fn distribution(&self, metric: Metric) -> MetricDistribution {
        match metric {
            Metric::KilnTemp => self.kiln_temp,
            Metric::MillPower => self.mill_power,
            Metric::RawFeedRate => self.raw_feed_rate,
            Metric::AfRate => self.af_rate,
            Metric::FreeLime => self.free_lime,
            Metric::BlaineSurface => self.blaine_surface,
            Metric::Co2Emission => self.co2_emission,
        }
    }

    fn validate(&self) -> EngineResult<()> {
        if !(self.af_rate_min.is_finite() && self.af_rate_max.is_finite())
            || self.af_rate_min > self.af_rate_max
        {
            return Err(EngineError::InvalidArgument(format!(
                "AF 率截断区间非法: [{}, {}]",
                self.af_rate_min, self.af_rate_max
            )));
        }
        if self.batch_step_secs <= 0 || Duration::try_seconds(self.batch_step_secs).is_none() {
            return Err(EngineError::InvalidArgument(format!(
                "batch_step_secs 必须 > 0 且在时间范围内: {}",
                self.batch_step_secs
            )));
        }
        Ok(())
    }

    /// 第 index 条相对批量起点的偏移 (溢出时返回 InvalidArgument)
    fn batch_offset(&self, index: usize) -> EngineResult<Duration> {
        i64::try_from(index)
            .ok()
            .and_then(|i| self.batch_step_secs.checked_mul(i))
            .and_then(Duration::try_seconds)
            .ok_or_else(|| {
                EngineError::InvalidArgument(format!(
                    "批量时间偏移溢出: step={}s, index={}",
                    self.batch_step_secs, index
                ))
            })
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            kiln_temp: MetricDistribution::new(1450.0, 15.0),
            mill_power: MetricDistribution::new(4200.0, 150.0),
            raw_feed_rate: MetricDistribution::new(250.0, 10.0),
            af_rate: MetricDistribution::new(15.0, 5.0),
            free_lime: MetricDistribution::new(1.5, 0.3),
            blaine_surface: MetricDistribution::new(3400.0, 100.0),
            co2_emission: MetricDistribution::new(850.0, 30.0),
            af_rate_min: 0.0,
            af_rate_max: 40.0,
            batch_step_secs: 60,
            stream_decimals: Some(3),
        }
    }
}

// ==========================================
// ReadingGenerator - 合成读数生成器
// ==========================================
pub struct ReadingGenerator {
    config: GeneratorConfig,
    samplers: Vec<(Metric, Normal<f64>)>,
    rng: StdRng,
}

impl ReadingGenerator {
    /// 使用系统熵初始化
    pub fn new(config: GeneratorConfig) -> EngineResult<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// 固定种子 (可复现)
    pub fn with_seed(config: GeneratorConfig, seed: u64) -> EngineResult<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GeneratorConfig, rng: StdRng) -> EngineResult<Self> {
        config.validate()?;

        let samplers = Metric::ALL
            .iter()
            .map(|metric| {
                let dist = config.distribution(*metric);
                if !dist.mean.is_finite() || !dist.std_dev.is_finite() {
                    return Err(EngineError::InvalidArgument(format!(
                        "{} 分布参数必须为有限数值",
                        metric
                    )));
                }
                Normal::new(dist.mean, dist.std_dev)
                    .map(|normal| (*metric, normal))
                    .map_err(|e| EngineError::InvalidArgument(format!("{} 分布参数非法: {}", metric, e)))
            })
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(Self {
            config,
            samplers,
            rng,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    // ==========================================
    // 批量生成
    // ==========================================

    /// 从当前时刻开始生成 n 条, 时间戳按 batch_step_secs 递增
    pub fn generate_batch(&mut self, n: usize) -> EngineResult<Vec<Reading>> {
        self.generate_batch_from(Utc::now(), n)
    }

    /// 从指定时刻开始生成 n 条
    pub fn generate_batch_from(
        &mut self,
        start: DateTime<Utc>,
        n: usize,
    ) -> EngineResult<Vec<Reading>> {
        if n < 1 {
            return Err(EngineError::InvalidArgument("批量条数必须 >= 1".to_string()));
        }

        let mut readings = Vec::with_capacity(n);
        for i in 0..n {
            let offset = self.config.batch_offset(i)?;
            let timestamp = start.checked_add_signed(offset).ok_or_else(|| {
                EngineError::InvalidArgument(format!("批量时间戳超出范围: {} + {}", start, offset))
            })?;
            readings.push(self.sample(timestamp));
        }

        tracing::debug!(rows = n, start = %start, "生成合成批量数据");
        Ok(readings)
    }

    /// 生成 n 条, 最后一条落在 end (用于回填历史)
    pub fn generate_batch_ending(
        &mut self,
        end: DateTime<Utc>,
        n: usize,
    ) -> EngineResult<Vec<Reading>> {
        if n < 1 {
            return Err(EngineError::InvalidArgument("批量条数必须 >= 1".to_string()));
        }

        let span = self.config.batch_offset(n - 1)?;
        let start = end.checked_sub_signed(span).ok_or_else(|| {
            EngineError::InvalidArgument(format!("批量起点超出范围: {} - {}", end, span))
        })?;
        self.generate_batch_from(start, n)
    }

    /// 生成单条 (时间戳为当前时刻), 用于逐条追加历史
    pub fn generate_one(&mut self) -> Reading {
        self.sample(Utc::now())
    }

    // ==========================================
    // 实时流
    // ==========================================

    /// 阻塞式实时流: 每次发射之间 sleep(delay)
    ///
    /// # 参数
    /// - `iterations`: 发射条数 (>= 1)
    /// - `delay`: 两次发射之间的间隔
    pub fn stream(
        &mut self,
        iterations: usize,
        delay: std::time::Duration,
    ) -> EngineResult<ReadingStream<'_>> {
        validate_iterations(iterations)?;
        Ok(ReadingStream {
            generator: self,
            remaining: iterations,
            emitted: 0,
            delay,
        })
    }

    /// 协作式实时流: 两次发射之间让出执行权 (tokio 定时器)
    pub fn stream_async(
        self,
        iterations: usize,
        delay: std::time::Duration,
    ) -> EngineResult<impl Stream<Item = Reading>> {
        validate_iterations(iterations)?;

        Ok(stream::unfold((self, 0usize), move |(mut generator, emitted)| async move {
            if emitted >= iterations {
                return None;
            }
            if emitted > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let reading = generator.emit_live();
            Some((reading, (generator, emitted + 1)))
        }))
    }

    /// 实时流单条: 当前时刻 + 可选取整
    fn emit_live(&mut self) -> Reading {
        let reading = self.sample(Utc::now());
        match self.config.stream_decimals {
            Some(decimals) => reading.rounded(decimals),
            None => reading,
        }
    }

    /// 采样一条读数
    ///
    /// 时间戳截断到毫秒, 与序列化精度一致, 写出再读回后保持相等
    fn sample(&mut self, timestamp: DateTime<Utc>) -> Reading {
        let mut draw = [0.0f64; 7];
        for (slot, (_, normal)) in draw.iter_mut().zip(self.samplers.iter()) {
            *slot = normal.sample(&mut self.rng);
        }

        Reading {
            timestamp: timestamp.trunc_subsecs(3),
            kiln_temp_c: draw[0],
            mill_power_kw: draw[1],
            raw_feed_rate_tph: draw[2],
            af_rate_percent: draw[3].clamp(self.config.af_rate_min, self.config.af_rate_max),
            clinker_free_lime_percent: draw[4],
            blain_surface_cm2g: draw[5],
            co2_emission_kgpt: draw[6],
        }
    }
}

/// 秒数 → Duration (负数/非有限值非法)
pub fn delay_from_secs(secs: f64) -> EngineResult<std::time::Duration> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(EngineError::InvalidArgument(format!(
            "delay 必须为非负有限秒数: {}",
            secs
        )));
    }
    std::time::Duration::try_from_secs_f64(secs).map_err(|e| {
        EngineError::InvalidArgument(format!("delay 超出可表示范围 ({}s): {}", secs, e))
    })
}

fn validate_iterations(iterations: usize) -> EngineResult<()> {
    if iterations < 1 {
        return Err(EngineError::InvalidArgument("iterations 必须 >= 1".to_string()));
    }
    Ok(())
}

// ==========================================
// ReadingStream - 阻塞式有限流
// ==========================================
// 拉取式: 调用方停止 next() 即取消
pub struct ReadingStream<'a> {
    generator: &'a mut ReadingGenerator,
    remaining: usize,
    emitted: usize,
    delay: std::time::Duration,
}

impl Iterator for ReadingStream<'_> {
    type Item = Reading;

    fn next(&mut self) -> Option<Reading> {
        if self.remaining == 0 {
            return None;
        }
        if self.emitted > 0 && !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        self.remaining -= 1;
        self.emitted += 1;
        Some(self.generator.emit_live())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
