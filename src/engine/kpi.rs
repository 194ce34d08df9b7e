// ==========================================
// 水泥厂监控演示系统 - 看板指标卡分档
// ==========================================
// 职责: 为五个核心指标生成看板指标卡 (绿/橙/红)
// 分档与工段严重度独立: 指标卡偏向工艺目标值, 严重度偏向报警
// ==========================================

use crate::domain::advisory::{KpiBand, KpiTile};
use crate::domain::reading::Reading;
use crate::domain::types::Metric;

/// 窑温分档
///
/// - Good: 1430 ≤ v ≤ 1470
/// - Watch: 1400 ≤ v < 1430 或 1470 < v ≤ 1500
/// - Alarm: 其余
pub fn kiln_temp_band(value: f64) -> KpiBand {
    if (1430.0..=1470.0).contains(&value) {
        KpiBand::Good
    } else if (1400.0..1430.0).contains(&value) || (value > 1470.0 && value <= 1500.0) {
        KpiBand::Watch
    } else {
        KpiBand::Alarm
    }
}

/// 磨机功率分档
pub fn mill_power_band(value: f64) -> KpiBand {
    if value < 4200.0 {
        KpiBand::Good
    } else if value < 4600.0 {
        KpiBand::Watch
    } else {
        KpiBand::Alarm
    }
}

/// AF 率分档 (越高越好)
pub fn af_rate_band(value: f64) -> KpiBand {
    if value >= 15.0 {
        KpiBand::Good
    } else if value >= 10.0 {
        KpiBand::Watch
    } else {
        KpiBand::Alarm
    }
}

/// 游离钙分档
pub fn free_lime_band(value: f64) -> KpiBand {
    if value < 1.5 {
        KpiBand::Good
    } else if value < 2.5 {
        KpiBand::Watch
    } else {
        KpiBand::Alarm
    }
}

/// CO2 分档
pub fn co2_band(value: f64) -> KpiBand {
    if value < 850.0 {
        KpiBand::Good
    } else if value < 900.0 {
        KpiBand::Watch
    } else {
        KpiBand::Alarm
    }
}

/// 单个指标分档 (非看板指标返回 None)
pub fn band_for(metric: Metric, value: f64) -> Option<KpiBand> {
    match metric {
        Metric::KilnTemp => Some(kiln_temp_band(value)),
        Metric::MillPower => Some(mill_power_band(value)),
        Metric::AfRate => Some(af_rate_band(value)),
        Metric::FreeLime => Some(free_lime_band(value)),
        Metric::Co2Emission => Some(co2_band(value)),
        Metric::RawFeedRate | Metric::BlaineSurface => None,
    }
}

/// 生成五张指标卡 (窑温, 磨机功率, AF 率, 游离钙, CO2)
pub fn kpi_tiles(reading: &Reading) -> Vec<KpiTile> {
    Metric::EVALUATED
        .iter()
        .filter_map(|metric| {
            let value = reading.value(*metric);
            band_for(*metric, value).map(|band| KpiTile {
                metric: *metric,
                label: metric.label().to_string(),
                value,
                band,
            })
        })
        .collect()
}
