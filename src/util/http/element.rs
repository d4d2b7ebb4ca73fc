use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};

/// 解析 CSS selector，失敗時回傳錯誤
pub fn selector(css_selector: &str) -> Result<Selector> {
    Selector::parse(css_selector)
        .map_err(|why| anyhow!("Failed to Selector::parse({}) because: {:?}", css_selector, why))
}

/// Extracts the trimmed text of the first element under `element` that matches `css_selector`.
///
/// 找不到元素或 selector 無效時回傳 `None`。
pub fn parse_value(element: &ElementRef, css_selector: &str) -> Option<String> {
    let s = Selector::parse(css_selector).ok()?;
    element
        .select(&s)
        .next()
        .map(|v| v.text().collect::<String>().trim().to_string())
}

/// Extracts an attribute of the first element under `element` that matches `css_selector`.
pub fn parse_attr(element: &ElementRef, css_selector: &str, attr: &str) -> Option<String> {
    let s = Selector::parse(css_selector).ok()?;
    element
        .select(&s)
        .next()
        .and_then(|v| v.value().attr(attr))
        .map(str::to_string)
}

/// 取出整份文件中第一個符合 selector 的元素文字
pub fn get_one_element(document: &Html, css_selector: &str, url: &str) -> Result<String> {
    let s = selector(css_selector)?;
    document
        .select(&s)
        .next()
        .map(|element| element.text().collect::<Vec<_>>().join(" ").trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| anyhow!("The element({}) not found from {}", css_selector, url))
}
