// ==========================================
// 水泥厂监控演示系统 - 领域类型定义
// ==========================================
// 工段 / 严重度 / 指标列
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 工段 (Process Stage)
// ==========================================
// 仅用于严重度归类展示,不模拟物理流程
// 顺序: Raw → Preheat → Clinker → Grind → Sustain
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Stage {
    Raw,     // 生料制备
    Preheat, // 预热分解
    Clinker, // 熟料煅烧
    Grind,   // 粉磨冷却
    Sustain, // 可持续性
}

impl Stage {
    /// 全部工段 (按工艺顺序)
    pub const ALL: [Stage; 5] = [
        Stage::Raw,
        Stage::Preheat,
        Stage::Clinker,
        Stage::Grind,
        Stage::Sustain,
    ];

    /// 展示名称
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Raw => "Raw Material Prep",
            Stage::Preheat => "Preheating & Calcination",
            Stage::Clinker => "Clinker Formation",
            Stage::Grind => "Grinding & Cooling",
            Stage::Sustain => "Sustainability",
        }
    }

    /// 工艺流向 (相邻工段连线)
    pub fn process_edges() -> Vec<(Stage, Stage)> {
        Stage::ALL.windows(2).map(|w| (w[0], w[1])).collect()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Raw => write!(f, "Raw"),
            Stage::Preheat => write!(f, "Preheat"),
            Stage::Clinker => write!(f, "Clinker"),
            Stage::Grind => write!(f, "Grind"),
            Stage::Sustain => write!(f, "Sustain"),
        }
    }
}

// ==========================================
// 严重度 (Severity)
// ==========================================
// 顺序: Normal < Warning < Critical
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Normal,   // 正常
    Warning,  // 预警
    Critical, // 严重
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Normal => write!(f, "normal"),
            Severity::Warning => write!(f, "warning"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

// ==========================================
// 指标列 (Metric)
// ==========================================
// column_name 与外部表结构/导出格式的列名严格一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    KilnTemp,
    MillPower,
    RawFeedRate,
    AfRate,
    FreeLime,
    BlaineSurface,
    Co2Emission,
}

impl Metric {
    /// 全部指标 (按导出列顺序)
    pub const ALL: [Metric; 7] = [
        Metric::KilnTemp,
        Metric::MillPower,
        Metric::RawFeedRate,
        Metric::AfRate,
        Metric::FreeLime,
        Metric::BlaineSurface,
        Metric::Co2Emission,
    ];

    /// 评估器必需的五个指标 (按报告行顺序)
    pub const EVALUATED: [Metric; 5] = [
        Metric::KilnTemp,
        Metric::MillPower,
        Metric::AfRate,
        Metric::FreeLime,
        Metric::Co2Emission,
    ];

    /// 外部列名
    pub fn column_name(&self) -> &'static str {
        match self {
            Metric::KilnTemp => "kiln_temp_C",
            Metric::MillPower => "mill_power_kW",
            Metric::RawFeedRate => "raw_feed_rate_tph",
            Metric::AfRate => "AF_rate_percent",
            Metric::FreeLime => "clinker_free_lime_percent",
            Metric::BlaineSurface => "blain_surface_cm2g",
            Metric::Co2Emission => "CO2_emission_kgpt",
        }
    }

    /// 从外部列名解析 (大小写敏感)
    pub fn from_column(name: &str) -> Option<Self> {
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.column_name() == name.trim())
    }

    /// 报告/看板使用的短名称
    pub fn label(&self) -> &'static str {
        match self {
            Metric::KilnTemp => "Kiln Temp",
            Metric::MillPower => "Mill Power",
            Metric::RawFeedRate => "Raw Feed",
            Metric::AfRate => "AF Rate",
            Metric::FreeLime => "Free Lime",
            Metric::BlaineSurface => "Blaine",
            Metric::Co2Emission => "CO₂ Emission",
        }
    }

    /// 报告行中紧跟数值的单位后缀
    pub fn unit_suffix(&self) -> &'static str {
        match self {
            Metric::KilnTemp => "°C",
            Metric::MillPower => " kW",
            Metric::RawFeedRate => " t/h",
            Metric::AfRate => "%",
            Metric::FreeLime => "%",
            Metric::BlaineSurface => " cm²/g",
            Metric::Co2Emission => " kg/ton",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name())
    }
}
