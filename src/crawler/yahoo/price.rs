use anyhow::{anyhow, Result};
use rust_decimal::{prelude::FromPrimitive, Decimal};

use crate::{
    crawler::yahoo::{ChartData, ChartResponse, CHART_HOST},
    util,
};

/// 取得最近一個交易日的 chart 資料
pub(super) async fn visit(symbol: &str) -> Result<ChartData> {
    let url = format!(
        "https://{host}/v8/finance/chart/{symbol}?range=1d&interval=1d",
        host = CHART_HOST,
        symbol = urlencoding::encode(symbol),
    );
    let res = util::http::get_json::<ChartResponse>(&url).await?;
    res.into_data(symbol)
}

/// 最新成交價，沒有時改用序列中最後一筆收盤價
pub(super) fn latest_price(data: &ChartData) -> Result<Decimal> {
    let price = data
        .meta
        .regular_market_price
        .filter(|p| p.is_finite() && *p > 0.0)
        .or_else(|| {
            data.indicators
                .quote
                .first()
                .and_then(|q| q.close.iter().rev().flatten().next().copied())
        })
        .ok_or_else(|| {
            anyhow!(
                "No price found for {}",
                data.meta.symbol.as_deref().unwrap_or_default()
            )
        })?;

    Decimal::from_f64(price)
        .map(|d| d.round_dp(4).normalize())
        .ok_or_else(|| anyhow!("Failed to convert {} to Decimal", price))
}
