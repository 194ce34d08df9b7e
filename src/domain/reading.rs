// ==========================================
// 水泥厂监控演示系统 - 传感器读数领域模型
// ==========================================
// 一条 Reading = 某一时刻的全厂遥测快照
// 序列化字段名与外部列名严格一致
// ==========================================

use crate::domain::types::Metric;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// Reading - 遥测快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(with = "iso8601_utc")]
    pub timestamp: DateTime<Utc>, // 采样时刻 (UTC)

    #[serde(rename = "kiln_temp_C")]
    pub kiln_temp_c: f64, // 窑温 °C

    #[serde(rename = "mill_power_kW")]
    pub mill_power_kw: f64, // 磨机功率 kW

    pub raw_feed_rate_tph: f64, // 生料喂料量 t/h

    #[serde(rename = "AF_rate_percent")]
    pub af_rate_percent: f64, // 替代燃料率 %, [0, 40]

    pub clinker_free_lime_percent: f64, // 熟料游离钙 %

    pub blain_surface_cm2g: f64, // 比表面积 cm²/g

    #[serde(rename = "CO2_emission_kgpt")]
    pub co2_emission_kgpt: f64, // 吨熟料 CO2 排放 kg/t
}

impl Reading {
    /// 按指标取值
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::KilnTemp => self.kiln_temp_c,
            Metric::MillPower => self.mill_power_kw,
            Metric::RawFeedRate => self.raw_feed_rate_tph,
            Metric::AfRate => self.af_rate_percent,
            Metric::FreeLime => self.clinker_free_lime_percent,
            Metric::BlaineSurface => self.blain_surface_cm2g,
            Metric::Co2Emission => self.co2_emission_kgpt,
        }
    }

    /// 转换为 列名 → 数值 映射 (评估器输入格式)
    pub fn to_metric_map(&self) -> HashMap<String, f64> {
        Metric::ALL
            .iter()
            .map(|m| (m.column_name().to_string(), self.value(*m)))
            .collect()
    }

    /// 所有数值字段保留指定小数位
    pub fn rounded(&self, decimals: u32) -> Reading {
        // f64 超过 15 位小数已无意义, 同时避免 powi 溢出为 inf
        let factor = 10f64.powi(decimals.min(15) as i32);
        let round = |v: f64| (v * factor).round() / factor;

        Reading {
            timestamp: self.timestamp,
            kiln_temp_c: round(self.kiln_temp_c),
            mill_power_kw: round(self.mill_power_kw),
            raw_feed_rate_tph: round(self.raw_feed_rate_tph),
            af_rate_percent: round(self.af_rate_percent),
            clinker_free_lime_percent: round(self.clinker_free_lime_percent),
            blain_surface_cm2g: round(self.blain_surface_cm2g),
            co2_emission_kgpt: round(self.co2_emission_kgpt),
        }
    }
}

/// 取出历史序列中某一指标列 (保持原顺序)
pub fn column_values(history: &[Reading], metric: Metric) -> Vec<f64> {
    history.iter().map(|r| r.value(metric)).collect()
}

// ==========================================
// 时间戳序列化: ISO-8601, 以 Z 结尾, 毫秒精度
// ==========================================
pub mod iso8601_utc {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn parse(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(s.trim()).map(|dt| dt.with_timezone(&Utc))
    }

    pub fn serialize<S>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(ts))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}
