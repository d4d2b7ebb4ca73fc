use anyhow::{anyhow, Result};

/// 複利終值 `initial × (1 + rate)^periods`
///
/// * `initial` - 初始投入金額
/// * `rate` - 每期報酬率 (小數)
/// * `periods` - 期數，可為小數，例如 3 個月為 0.25
pub fn future_value(initial: f64, rate: f64, periods: f64) -> f64 {
    initial * (1.0 + rate).powf(periods)
}

/// 與 [`future_value`] 相同，但檢查輸入
///
/// 初始金額必須為非負數，且結果必須是有限值。
pub fn checked_future_value(initial: f64, rate: f64, periods: f64) -> Result<f64> {
    if !initial.is_finite() || initial < 0.0 {
        return Err(anyhow!("Initial investment must be >= 0, got {}", initial));
    }

    if !periods.is_finite() || periods < 0.0 {
        return Err(anyhow!("Periods must be >= 0, got {}", periods));
    }

    let value = future_value(initial, rate, periods);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(anyhow!(
            "Future value of {} at {} over {} periods is not finite",
            initial,
            rate,
            periods
        ))
    }
}
