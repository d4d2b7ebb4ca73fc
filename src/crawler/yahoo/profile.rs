use anyhow::Result;
use scraper::Html;

use crate::{
    crawler::yahoo::{ChartMeta, WEB_HOST},
    util::{self, http::element},
};

/// 基金描述可能出現的位置，依序嘗試
const DESCRIPTION_SELECTORS: [&str; 4] = [
    "section[data-testid='description'] p",
    "section[data-testid='asset-profile'] p",
    "div[data-test='qsp-profile'] p",
    "section.quote-sub-section p",
];

/// 抓取 profile 頁面上的基金描述
pub(super) async fn visit_description(symbol: &str) -> Result<Option<String>> {
    let url = format!(
        "https://{host}/quote/{symbol}/profile/",
        host = WEB_HOST,
        symbol = urlencoding::encode(symbol)
    );
    let text = util::http::get(&url, None).await?;
    Ok(parse_description(&text, &url))
}

pub(super) fn parse_description(html: &str, url: &str) -> Option<String> {
    let document = Html::parse_document(html);
    DESCRIPTION_SELECTORS
        .iter()
        .find_map(|css| element::get_one_element(&document, css, url).ok())
}

/// 簡稱優先，沒有時改用全名
pub(super) fn short_name(meta: &ChartMeta) -> Option<String> {
    meta.short_name
        .as_ref()
        .or(meta.long_name.as_ref())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}
