//! # Yahoo Finance 採集模組
//!
//! - **歷史股價 (`history`)**：chart API 的每日還原收盤價。
//! - **即時報價 (`price`)**：chart API 的最新成交價。
//! - **基本資料 (`profile`)**：簡稱取自 chart API，描述由 profile 頁面擷取。

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    crawler::QuoteInfo,
    declare::EtfProfile,
    logging,
};

/// 歷史股價採集子模組
pub mod history;
/// 即時報價採集子模組
pub mod price;
/// 基本資料採集子模組
pub mod profile;

/// chart API 的主機域名
const CHART_HOST: &str = "query1.finance.yahoo.com";
/// 網頁的主機域名
const WEB_HOST: &str = "finance.yahoo.com";

/// Yahoo 財經採集器
pub struct Yahoo {}

#[async_trait]
impl QuoteInfo for Yahoo {
    async fn fetch_latest_price(symbol: &str) -> Result<Decimal> {
        let data = price::visit(symbol).await?;
        price::latest_price(&data)
    }

    /// 描述抓取失敗時仍回傳簡稱
    async fn fetch_profile(symbol: &str) -> Result<EtfProfile> {
        let data = price::visit(symbol).await?;
        let mut profile = EtfProfile::default();

        if let Some(name) = profile::short_name(&data.meta) {
            profile.short_name = name;
        }

        match profile::visit_description(symbol).await {
            Ok(Some(description)) => profile.description = description,
            Ok(None) => logging::warn_file_async(format!(
                "The description of {} was not found on the profile page",
                symbol
            )),
            Err(why) => logging::error_file_async(format!(
                "Failed to get the description of {} because {:?}",
                symbol, why
            )),
        }

        Ok(profile)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub(super) struct Chart {
    pub result: Option<Vec<ChartData>>,
    pub error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChartData {
    pub meta: ChartMeta,
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ChartMeta {
    pub symbol: Option<String>,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub regular_market_price: Option<f64>,
    #[serde(default, rename = "gmtoffset")]
    pub gmt_offset: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteData>,
    pub adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct QuoteData {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct AdjClose {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

impl ChartResponse {
    /// 取出第一筆結果，API 回傳錯誤時轉成 `anyhow::Error`
    pub fn into_data(self, symbol: &str) -> anyhow::Result<ChartData> {
        if let Some(err) = self.chart.error {
            return Err(anyhow::anyhow!(
                "Yahoo chart API error for {} [{}]: {}",
                symbol,
                err.code,
                err.description
            ));
        }

        self.chart
            .result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) })
            .ok_or_else(|| anyhow::anyhow!("Yahoo chart API returned no data for {}", symbol))
    }
}

impl ChartData {
    /// 還原收盤價優先，沒有時使用收盤價
    pub fn closes(&self) -> &[Option<f64>] {
        if let Some(adj) = self.indicators.adjclose.as_ref().and_then(|a| a.first()) {
            if !adj.adjclose.is_empty() {
                return &adj.adjclose;
            }
        }

        self.indicators
            .quote
            .first()
            .map(|q| q.close.as_slice())
            .unwrap_or(&[])
    }
}
