use std::fmt::Write;

use anyhow::{anyhow, Result};
use chrono::Local;
use futures::{stream, StreamExt};
use rayon::prelude::*;
use rust_decimal::Decimal;

use crate::{
    cache::SHARE,
    config::SETTINGS,
    crawler::{self, google::translate},
    declare::{DailyClose, EtfListing, EtfProfile},
    logging,
    snapshot::EtfSnapshot,
    util::{self, datetime, text},
};

/// 單一 ETF 計算前所需的原始資料
struct Fetched {
    listing: EtfListing,
    history: Option<Vec<DailyClose>>,
    price: Option<Decimal>,
    profile: EtfProfile,
}

/// 重新抓取所有設定中的 ETF，計算指標後整批更新 [`SHARE`]
pub async fn execute() -> Result<()> {
    let listings = SETTINGS.etfs.clone();
    if listings.is_empty() {
        return Err(anyhow!("No ETF is configured"));
    }

    logging::info_file_async(format!("開始更新 {} 檔 ETF", listings.len()));

    let years = SETTINGS.system.lookback_years;
    let (start, end) = datetime::lookback_window(Local::now(), years);
    let symbols: Vec<String> = listings.iter().map(|etf| etf.symbol.clone()).collect();
    let mut histories = crawler::fetch_all_history(&symbols, start, end).await;

    let fetched: Vec<Fetched> = stream::iter(listings)
        .map(|listing| {
            let history = histories.remove(&listing.symbol).flatten();
            async move {
                let price = crawler::get_latest_price(&listing.symbol).await;
                let mut profile = crawler::get_profile(&listing.symbol).await;
                profile.description =
                    translate::translate(&profile.description, &SETTINGS.dashboard.translate_to)
                        .await;

                Fetched {
                    listing,
                    history,
                    price,
                    profile,
                }
            }
        })
        .buffered(util::concurrent_limit_16())
        .collect()
        .await;

    let snapshots = tokio::task::spawn_blocking(move || build_snapshots(fetched, years as f64))
        .await
        .map_err(|why| anyhow!("Failed to build snapshots because {:?}", why))?;

    let failed = snapshots.iter().filter(|s| !s.has_history()).count();
    let msg = summary(&snapshots);
    logging::info_console(format!("\r\n{}", msg));
    logging::info_file_async(msg);
    SHARE.replace(snapshots);

    logging::info_file_async(format!("結束更新，{} 檔沒有歷史股價", failed));

    Ok(())
}

/// 計算每檔 ETF 的指標，保留原本的順序
fn build_snapshots(fetched: Vec<Fetched>, lookback_years: f64) -> Vec<EtfSnapshot> {
    fetched
        .into_par_iter()
        .map(|f| EtfSnapshot::build(&f.listing, f.history, f.price, f.profile, lookback_years))
        .collect()
}

/// 每檔 ETF 一行的摘要：代碼、年化報酬、平均風險、報酬風險比
pub fn summary(snapshots: &[EtfSnapshot]) -> String {
    let mut msg = String::with_capacity(64 * (snapshots.len() + 1));
    let _ = writeln!(
        &mut msg,
        "{:<6} {:>10} {:>10} {:>10}",
        "Symbol", "Return", "Risk", "Ratio"
    );

    for s in snapshots {
        let _ = writeln!(
            &mut msg,
            "{:<6} {:>10} {:>10} {:>10}",
            s.symbol,
            text::format_percent(s.annual_return),
            text::format_percent(s.average_risk),
            text::format_ratio(s.risk_return_ratio)
        );
    }

    msg
}
