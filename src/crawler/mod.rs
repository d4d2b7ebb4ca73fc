use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use futures::{stream, StreamExt};
use hashbrown::HashMap;
use rust_decimal::Decimal;

use crate::{
    crawler::yahoo::Yahoo,
    declare::{DailyClose, EtfProfile},
    logging, util,
};

/// finviz 財經
pub mod finviz;
/// Google 翻譯
pub mod google;
/// 雅虎財經
pub mod yahoo;

/// 歷史股價來源
#[async_trait]
pub trait PriceHistory {
    /// 取得 `[start, end]` 區間內的每日收盤價，依日期遞增排序
    async fn fetch_history(
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DailyClose>>;
}

/// 即時報價與基本資料來源
#[async_trait]
pub trait QuoteInfo {
    async fn fetch_latest_price(symbol: &str) -> Result<Decimal>;
    async fn fetch_profile(symbol: &str) -> Result<EtfProfile>;
}

/// 同時抓取多檔 ETF 的歷史股價
///
/// 個別代碼失敗時記錄錯誤並以 `None` 表示，不影響其他代碼。
pub async fn fetch_all_history(
    symbols: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> HashMap<String, Option<Vec<DailyClose>>> {
    stream::iter(symbols.iter().cloned())
        .map(|symbol| async move {
            let history = match Yahoo::fetch_history(&symbol, start, end).await {
                Ok(history) => Some(history),
                Err(why) => {
                    logging::error_file_async(format!(
                        "Failed to download history for {} because {:?}",
                        symbol, why
                    ));
                    None
                }
            };
            (symbol, history)
        })
        .buffer_unordered(util::concurrent_limit_16())
        .collect::<HashMap<_, _>>()
        .await
}

/// 取得目前價格，失敗時回傳 `None`
pub async fn get_latest_price(symbol: &str) -> Option<Decimal> {
    match Yahoo::fetch_latest_price(symbol).await {
        Ok(price) => Some(price),
        Err(why) => {
            logging::error_file_async(format!(
                "Failed to get the current price for {} because {:?}",
                symbol, why
            ));
            None
        }
    }
}

/// 取得名稱與描述，失敗時回傳預設文字
pub async fn get_profile(symbol: &str) -> EtfProfile {
    match Yahoo::fetch_profile(symbol).await {
        Ok(profile) => profile,
        Err(why) => {
            logging::error_file_async(format!(
                "Failed to get the profile for {} because {:?}",
                symbol, why
            ));
            EtfProfile::default()
        }
    }
}
