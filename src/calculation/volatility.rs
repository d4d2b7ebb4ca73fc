use crate::{
    calculation::log_return::{is_valid_price, log_returns},
    declare::TRADING_DAYS_PER_YEAR,
};

/// 樣本標準差（分母為 n - 1）
///
/// 少於兩筆數值時回傳 `None`。
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);

    if variance.is_finite() {
        Some(variance.sqrt())
    } else {
        None
    }
}

/// 年化波動度：日對數報酬的樣本標準差乘以 √252
///
/// 需要至少三筆有效價格（兩筆日報酬）。
pub fn annualized_volatility(prices: &[f64]) -> Option<f64> {
    if !prices.iter().all(|p| is_valid_price(*p)) {
        return None;
    }

    sample_std_dev(&log_returns(prices)).map(|daily| daily * TRADING_DAYS_PER_YEAR.sqrt())
}
