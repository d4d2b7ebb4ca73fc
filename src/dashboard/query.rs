use std::str::FromStr;

use strum::{AsRefStr, Display, EnumString};

use crate::{
    dashboard::error::AppError,
    declare::{EtfListing, Period},
};

/// 表格或圖表
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum View {
    #[default]
    Table,
    Chart,
}

/// 首頁的查詢參數
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardQuery {
    /// 勾選的 ETF 代碼，依勾選順序
    pub etfs: Vec<String>,
    /// 各檔 ETF 區間報酬與風險的呈現方式
    pub view: View,
    /// 比較區塊的呈現方式
    pub compare_view: View,
    /// 比較區塊的區間
    pub period: Period,
    /// 初始投資金額 (USD)
    pub investment: f64,
}

impl Default for DashboardQuery {
    fn default() -> Self {
        DashboardQuery {
            etfs: Vec::new(),
            view: View::Table,
            compare_view: View::Table,
            period: Period::OneMonth,
            investment: 0.0,
        }
    }
}

impl DashboardQuery {
    /// 解析 `etf=QQQ&etf=SPY&view=chart&period=1y&investment=1000`
    ///
    /// 未設定的 ETF 回傳 404，其餘格式錯誤回傳 400。
    pub fn parse(raw: Option<&str>, listings: &[EtfListing]) -> Result<Self, AppError> {
        let mut query = DashboardQuery::default();
        let raw = match raw {
            Some(raw) => raw,
            None => return Ok(query),
        };

        for pair in raw.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = decode(value)?;
            let value = value.trim();

            match key {
                "etf" => {
                    if value.is_empty() {
                        continue;
                    }
                    let listing = listings
                        .iter()
                        .find(|etf| etf.symbol.eq_ignore_ascii_case(value))
                        .ok_or_else(|| AppError::NotFound(format!("Unknown ETF symbol: {}", value)))?;
                    if !query.etfs.contains(&listing.symbol) {
                        query.etfs.push(listing.symbol.clone());
                    }
                }
                "view" => query.view = parse_view(value)?,
                "compare_view" => query.compare_view = parse_view(value)?,
                "period" => {
                    query.period = Period::from_str(value)
                        .ok()
                        .filter(|p| Period::displayed().contains(p))
                        .ok_or_else(|| AppError::BadRequest(format!("Invalid period: {}", value)))?;
                }
                "investment" => {
                    query.investment = value
                        .parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite() && *v >= 0.0)
                        .ok_or_else(|| {
                            AppError::BadRequest(format!(
                                "The initial investment must be a number greater than or equal to 0: {}",
                                value
                            ))
                        })?;
                }
                _ => {}
            }
        }

        Ok(query)
    }
}

fn parse_view(value: &str) -> Result<View, AppError> {
    View::from_str(value).map_err(|_| AppError::BadRequest(format!("Invalid view: {}", value)))
}

/// 表單送出的值以 `+` 代表空白
fn decode(value: &str) -> Result<String, AppError> {
    urlencoding::decode(&value.replace('+', " "))
        .map(|v| v.into_owned())
        .map_err(|why| AppError::BadRequest(format!("Invalid query string because {:?}", why)))
}
