use rust_decimal::{prelude::FromPrimitive, Decimal};

use crate::declare::NOT_AVAILABLE;

/// 以百分比顯示，例︰0.1234 => 12.34%
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}%", v * 100.0),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// 顯示到小數第二位
pub fn format_ratio(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}", v),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// 以美元顯示的價格，例︰$123.45
pub fn format_price(value: Option<Decimal>) -> String {
    match value {
        Some(v) => format!("${:.2}", v.round_dp(2)),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// 以美元顯示並加上千分位，例︰$1,234,567.89
pub fn format_money(value: Option<f64>) -> String {
    let amount = match value.and_then(Decimal::from_f64) {
        Some(v) => v.round_dp(2),
        None => return NOT_AVAILABLE.to_string(),
    };

    let text = format!("{:.2}", amount.abs());
    let (integer, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, c) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };

    format!("{}${}.{}", sign, grouped, fraction)
}
