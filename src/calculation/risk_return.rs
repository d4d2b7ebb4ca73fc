use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{
    calculation::{
        log_return::{closes, log_return},
        volatility::annualized_volatility,
    },
    declare::{DailyClose, Period, TRADING_DAYS_PER_YEAR},
    logging,
};

/// 單一區間的年化報酬與年化風險
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Default, PartialEq)]
pub struct PeriodMetrics {
    #[serde(rename = "return")]
    pub ret: Option<f64>,
    pub risk: Option<f64>,
}

/// 報酬風險比，風險為零或無效時回傳 `None`
pub fn risk_return_ratio(ret: f64, risk: f64) -> Option<f64> {
    if risk > 0.0 && ret.is_finite() {
        Some(ret / risk)
    } else {
        None
    }
}

/// 取出落在區間內的最後一段資料，`series` 需依日期遞增排序
pub fn window(series: &[DailyClose], period: Period) -> &[DailyClose] {
    let last = match series.last() {
        Some(dc) => dc.date,
        None => return series,
    };

    let start = series.partition_point(|dc| !period.includes(dc.date, last));
    &series[start..]
}

/// 計算單一區間的報酬與風險
///
/// 報酬以區間內實際的交易日數年化：`ln(last/first) / (rows / 252)`。
pub fn period_metrics(series: &[DailyClose], period: Period) -> Result<PeriodMetrics> {
    let slice = window(series, period);
    if slice.is_empty() {
        return Err(anyhow!("No prices inside period {}", period));
    }

    let prices = closes(slice);
    let years = slice.len() as f64 / TRADING_DAYS_PER_YEAR;
    let ret = log_return(&prices)
        .map(|r| r / years)
        .ok_or_else(|| {
            anyhow!(
                "Not enough valid prices inside period {} ({} rows)",
                period,
                slice.len()
            )
        })?;

    Ok(PeriodMetrics {
        ret: Some(ret),
        risk: annualized_volatility(&prices),
    })
}

/// 計算所有區間的報酬與風險，無法計算的區間以 `None` 表示
pub fn risk_return_by_period(symbol: &str, series: &[DailyClose]) -> BTreeMap<Period, PeriodMetrics> {
    Period::iter()
        .map(|period| {
            let metrics = period_metrics(series, period).unwrap_or_else(|why| {
                logging::error_file_async(format!(
                    "Failed to calculate return and risk of {} for period {} because {:?}",
                    symbol, period, why
                ));
                PeriodMetrics::default()
            });
            (period, metrics)
        })
        .collect()
}
