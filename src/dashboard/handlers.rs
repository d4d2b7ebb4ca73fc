use std::collections::BTreeMap;

use askama::Template;
use axum::{
    extract::{Path, RawQuery},
    response::Html,
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    cache::{TtlCacheInner, SHARE, TTL},
    config::SETTINGS,
    crawler::finviz::Finviz,
    dashboard::{error::AppError, query::DashboardQuery, view},
    declare::{EtfListing, Period},
    logging,
    snapshot::EtfSnapshot,
};

/// `/api/etfs` 的每一筆，不含歷史股價
#[derive(Serialize, Debug)]
pub struct EtfSummary {
    pub name: String,
    pub symbol: String,
    pub short_name: String,
    pub current_price: Option<Decimal>,
    pub annual_return: Option<f64>,
    pub average_risk: Option<f64>,
    pub risk_return_ratio: Option<f64>,
    pub returns: BTreeMap<Period, Option<f64>>,
    pub risks: BTreeMap<Period, Option<f64>>,
}

impl From<&EtfSnapshot> for EtfSummary {
    fn from(s: &EtfSnapshot) -> Self {
        EtfSummary {
            name: s.name.clone(),
            symbol: s.symbol.clone(),
            short_name: s.short_name.clone(),
            current_price: s.current_price,
            annual_return: s.annual_return,
            average_risk: s.average_risk,
            risk_return_ratio: s.risk_return_ratio,
            returns: s.returns.clone(),
            risks: s.risks.clone(),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub refreshed_at: Option<String>,
    pub etfs: usize,
}

fn find_listing(symbol: &str) -> Result<&'static EtfListing, AppError> {
    SETTINGS
        .find_etf(symbol)
        .ok_or_else(|| AppError::NotFound(format!("Unknown ETF symbol: {}", symbol)))
}

/// 產生 HTML，樣板錯誤以 500 回應
fn render_template<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    template
        .render()
        .map(Html)
        .map_err(|why| AppError::Internal(format!("Failed to render template because {:?}", why)))
}

/// GET /
pub async fn index(RawQuery(raw): RawQuery) -> Result<Html<String>, AppError> {
    let query = DashboardQuery::parse(raw.as_deref(), &SETTINGS.etfs)?;
    let (snapshots, refreshed_at) = SHARE.get_snapshots(&query.etfs);

    render_template(&view::dashboard(&SETTINGS.etfs, &snapshots, &query, refreshed_at))
}

/// GET /news/{symbol}
pub async fn news(Path(symbol): Path<String>) -> Result<Html<String>, AppError> {
    let listing = find_listing(&symbol)?;

    let news = match TTL.news_get(&listing.symbol) {
        Some(news) => Some(news),
        None => match Finviz::fetch_news(&listing.symbol, SETTINGS.dashboard.news_limit).await {
            Ok(news) => {
                TTL.news_set(listing.symbol.clone(), news.clone());
                Some(news)
            }
            Err(why) => {
                logging::error_file_async(format!(
                    "Failed to fetch news of {} because {:?}",
                    listing.symbol, why
                ));
                None
            }
        },
    };

    render_template(&view::news_page(listing, news.as_deref()))
}

/// GET /api/etfs
pub async fn list_etfs() -> Result<Json<Vec<EtfSummary>>, AppError> {
    let (snapshots, refreshed_at) = SHARE.loaded();
    if refreshed_at.is_none() {
        return Err(AppError::Unavailable("The data is still loading".to_string()));
    }

    Ok(Json(snapshots.iter().map(EtfSummary::from).collect()))
}

/// GET /api/etfs/{symbol}
pub async fn get_etf(Path(symbol): Path<String>) -> Result<Json<EtfSnapshot>, AppError> {
    let listing = find_listing(&symbol)?;
    if !SHARE.is_loaded() {
        return Err(AppError::Unavailable("The data is still loading".to_string()));
    }

    SHARE
        .get_snapshot(&listing.symbol)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No data for {}", listing.symbol)))
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    let (snapshots, refreshed_at) = SHARE.loaded();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        refreshed_at: refreshed_at.map(|at| at.to_rfc3339()),
        etfs: snapshots.len(),
    })
}
