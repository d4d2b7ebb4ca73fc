use crate::declare::DailyClose;

/// 逐日的對數報酬 `ln(p[i] / p[i-1])`
///
/// 少於兩筆價格時回傳空集合。
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect()
}

/// 整段期間的對數報酬 `ln(last / first)`
///
/// 少於兩筆價格，或頭尾價格不是正數時回傳 `None`。
pub fn log_return(prices: &[f64]) -> Option<f64> {
    if prices.len() < 2 {
        return None;
    }

    let first = *prices.first()?;
    let last = *prices.last()?;
    if !is_valid_price(first) || !is_valid_price(last) {
        return None;
    }

    Some((last / first).ln())
}

/// 年化對數報酬：整段對數報酬除以年數
pub fn annualized_log_return(prices: &[f64], years: f64) -> Option<f64> {
    if years.is_nan() || years <= 0.0 {
        return None;
    }

    log_return(prices).map(|r| r / years)
}

/// 取出收盤價
pub fn closes(series: &[DailyClose]) -> Vec<f64> {
    series.iter().map(|dc| dc.close).collect()
}

pub(crate) fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}
