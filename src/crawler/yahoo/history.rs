use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};

use crate::{
    crawler::{
        yahoo::{ChartData, ChartResponse, Yahoo, CHART_HOST},
        PriceHistory,
    },
    declare::DailyClose,
    util::{self, datetime},
};

#[async_trait]
impl PriceHistory for Yahoo {
    async fn fetch_history(
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>> {
        // period2 不含當天，往後多取一天
        let url = format!(
            "https://{host}/v8/finance/chart/{symbol}?period1={from}&period2={to}&interval=1d&events=div%7Csplit&includeAdjustedClose=true",
            host = CHART_HOST,
            symbol = urlencoding::encode(symbol),
            from = datetime::to_unix_timestamp(start),
            to = datetime::to_unix_timestamp(end + Duration::days(1)),
        );
        let res = util::http::get_json::<ChartResponse>(&url).await?;
        let data = res.into_data(symbol)?;
        let history = parse_history(&data);

        if history.is_empty() {
            return Err(anyhow!(
                "No historical prices for {} between {} and {}",
                symbol,
                start,
                end
            ));
        }

        Ok(history)
    }
}

/// 將 chart API 的時間序列轉成每日收盤價，略過沒有收盤價的日子
pub(super) fn parse_history(data: &ChartData) -> Vec<DailyClose> {
    let mut history: Vec<DailyClose> = data
        .timestamp
        .iter()
        .zip(data.closes())
        .filter_map(|(ts, close)| {
            let close = close.filter(|c| c.is_finite() && *c > 0.0)?;
            let date = datetime::from_unix_timestamp(*ts, data.meta.gmt_offset)?;
            Some(DailyClose::new(date, close))
        })
        .collect();

    history.sort_by_key(|dc| dc.date);
    history.dedup_by_key(|dc| dc.date);
    history
}
