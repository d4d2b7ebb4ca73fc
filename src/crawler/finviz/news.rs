use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

use crate::{
    crawler::finviz::{Finviz, HOST},
    declare::NewsHeadline,
    util::{self, http::element},
};

/// 新聞列表的第一欄若有日期會出現在開頭，例︰Oct-18-24 08:30PM、Today 07:15AM
static DATE_PREFIX: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^(?:[A-Z][a-z]{2}-\d{2}-\d{2}|Today)\b").ok());

impl Finviz {
    /// 取得 ETF 最新的新聞標題
    pub async fn fetch_news(symbol: &str, limit: usize) -> Result<Vec<NewsHeadline>> {
        let url = format!(
            "https://{host}/quote.ashx?t={symbol}",
            host = HOST,
            symbol = urlencoding::encode(symbol)
        );
        let text = util::http::get(&url, None).await?;
        parse_news(&text, limit)
            .map_err(|why| anyhow!("Failed to parse news of {} from {} because {:?}", symbol, url, why))
    }
}

/// 解析新聞表格，只取前 `limit` 筆
///
/// 同一天的新聞只有第一筆帶日期，其餘沿用上一筆的日期。
pub fn parse_news(html: &str, limit: usize) -> Result<Vec<NewsHeadline>> {
    let document = Html::parse_document(html);
    let table_selector = element::selector("table.fullview-news-outer")?;
    let row_selector = element::selector("tr")?;
    let table = document
        .select(&table_selector)
        .next()
        .ok_or_else(|| anyhow!("The news table was not found"))?;

    let mut headlines = Vec::with_capacity(limit);
    let mut current_date = String::new();

    for row in table.select(&row_selector) {
        if headlines.len() >= limit {
            break;
        }

        let stamp = match element::parse_value(&row, "td") {
            Some(stamp) if !stamp.is_empty() => stamp,
            _ => continue,
        };
        let (title, link) = match (
            element::parse_value(&row, "a"),
            element::parse_attr(&row, "a", "href"),
        ) {
            (Some(title), Some(link)) if !title.is_empty() => (title, link),
            _ => continue,
        };

        let date_time = match date_prefix(&stamp) {
            Some(date) => {
                current_date = date.to_string();
                stamp
            }
            None if current_date.is_empty() => stamp,
            None => format!("{} {}", current_date, stamp),
        };

        headlines.push(NewsHeadline {
            date_time,
            title,
            link: absolute_link(&link),
        });
    }

    Ok(headlines)
}

fn date_prefix(stamp: &str) -> Option<&str> {
    DATE_PREFIX
        .as_ref()
        .and_then(|re| re.find(stamp))
        .map(|m| m.as_str())
}

/// finviz 自家的新聞是相對路徑
fn absolute_link(link: &str) -> String {
    if link.starts_with('/') {
        format!("https://{}{}", HOST, link)
    } else {
        link.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging;

    const NEWS_HTML: &str = r#"
        <html><body>
        <table width="100%" class="fullview-news-outer news-table" id="news-table">
            <tr>
                <td width="130" align="right">Oct-18-24 08:30PM</td>
                <td align="left"><div class="news-link-container"><div class="news-link-left">
                    <a class="tab-link-news" href="https://www.example.com/markets/1" target="_blank">
                        Nasdaq closes at record high
                    </a></div></div></td>
            </tr>
            <tr>
                <td width="130" align="right">07:15AM</td>
                <td align="left"><a class="tab-link-news" href="/news/123/tech-rally">Tech rally extends</a></td>
            </tr>
            <tr>
                <td width="130" align="right">Oct-17-24 04:00PM</td>
                <td align="left"><a class="tab-link-news" href="https://www.example.com/markets/3">Third headline</a></td>
            </tr>
            <tr>
                <td width="130" align="right">03:10PM</td>
                <td align="left"><a class="tab-link-news" href="https://www.example.com/markets/4">Fourth headline</a></td>
            </tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_parse_news_limit() {
        let news = parse_news(NEWS_HTML, 3).unwrap();
        assert_eq!(news.len(), 3);
        assert_eq!(news[0].date_time, "Oct-18-24 08:30PM");
        assert_eq!(news[0].title, "Nasdaq closes at record high");
        assert_eq!(news[0].link, "https://www.example.com/markets/1");
        assert_eq!(news[2].title, "Third headline");
    }

    #[test]
    fn test_parse_news_inherits_date() {
        let news = parse_news(NEWS_HTML, 10).unwrap();
        assert_eq!(news.len(), 4);
        assert_eq!(news[1].date_time, "Oct-18-24 07:15AM");
        assert_eq!(news[1].link, "https://finviz.com/news/123/tech-rally");
        assert_eq!(news[3].date_time, "Oct-17-24 03:10PM");
    }

    #[test]
    fn test_parse_news_today() {
        let html = r#"<table class="fullview-news-outer">
            <tr><td>Today 09:05AM</td><td><a href="https://a.example/1">A</a></td></tr>
            <tr><td>08:00AM</td><td><a href="https://a.example/2">B</a></td></tr>
        </table>"#;
        let news = parse_news(html, 3).unwrap();
        assert_eq!(news[1].date_time, "Today 08:00AM");
    }

    #[test]
    fn test_parse_news_without_table() {
        assert!(parse_news("<html><body></body></html>", 3).is_err());
        assert!(parse_news(NEWS_HTML, 0).unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore]
    async fn test_fetch_news() {
        dotenv::dotenv().ok();
        logging::debug_file_async("開始 fetch_news".to_string());

        match Finviz::fetch_news("SPY", 3).await {
            Ok(news) => {
                logging::debug_file_async(format!("news : {:#?}", news));
            }
            Err(why) => {
                logging::debug_file_async(format!("Failed to fetch_news because {:?}", why));
            }
        }

        logging::debug_file_async("結束 fetch_news".to_string());
    }
}
