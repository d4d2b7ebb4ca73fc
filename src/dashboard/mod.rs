//! # 儀表板
//!
//! 以 axum 提供伺服器端產生的 HTML 頁面與 JSON API。

use anyhow::{anyhow, Result};
use axum::{routing::get, Router};
use tokio::net::TcpListener;

use crate::logging;

/// 圖表座標
pub mod chart;
/// 錯誤回應
pub mod error;
mod handlers;
/// 查詢參數
pub mod query;
/// 頁面樣板
pub mod view;

pub fn router() -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/news/{symbol}", get(handlers::news))
        .route("/api/etfs", get(handlers::list_etfs))
        .route("/api/etfs/{symbol}", get(handlers::get_etf))
        .route("/health", get(handlers::health))
}

/// 啟動 HTTP 服務，直到程序結束
pub async fn serve(addr: &str) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|why| anyhow!("Failed to bind {} because {:?}", addr, why))?;

    logging::info_file_async(format!("Dashboard is listening on http://{}", addr));

    axum::serve(listener, router())
        .await
        .map_err(|why| anyhow!("The dashboard server stopped because {:?}", why))
}
