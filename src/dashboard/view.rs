//! 頁面的資料模型，由 `templates/` 下的 askama 樣板產生 HTML

use askama::Template;
use chrono::{DateTime, Local, NaiveDate};

use crate::{
    dashboard::{
        chart::{self, BarGroup, LineSeries, Plot, PALETTE},
        query::{DashboardQuery, View},
    },
    declare::{EtfListing, NewsHeadline, Period},
    snapshot::EtfSnapshot,
    util::text,
};

/// 下拉選單或單選按鈕的一個選項
pub struct Choice {
    pub value: String,
    pub caption: String,
    pub selected: bool,
}

impl Choice {
    fn new(value: impl ToString, caption: impl ToString, selected: bool) -> Self {
        Choice {
            value: value.to_string(),
            caption: caption.to_string(),
            selected,
        }
    }
}

fn view_choices(current: View) -> Vec<Choice> {
    [(View::Table, "Table"), (View::Chart, "Chart")]
        .into_iter()
        .map(|(view, caption)| Choice::new(view, caption, view == current))
        .collect()
}

/// 以表格或圖表呈現的內容
pub enum Panel<T> {
    Table(Vec<T>),
    Chart(Plot),
    /// 圖表沒有任何數值
    Unavailable,
}

/// 區間表格的一欄
pub struct PeriodCell {
    pub period: Period,
    pub ret: String,
    pub risk: String,
}

/// 單檔 ETF 的區塊
pub struct EtfSection<'a> {
    pub snapshot: &'a EtfSnapshot,
    pub current_price: String,
    pub annual_return: String,
    pub average_risk: String,
    pub ratio: String,
    pub history: Option<Plot>,
    pub breakdown: Panel<PeriodCell>,
    /// 已經過 URL 編碼的代碼
    pub news_path: String,
}

/// 比較表格的一列
pub struct ComparisonRow<'a> {
    pub name: &'a str,
    pub ret: String,
    pub risk: String,
    pub future_value: String,
}

/// 兩檔以上時的比較區塊
pub struct Comparison<'a> {
    pub history: Option<Plot>,
    pub periods: Vec<Choice>,
    pub investment: String,
    pub views: Vec<Choice>,
    pub body: Panel<ComparisonRow<'a>>,
}

/// 首頁
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage<'a> {
    pub etfs: Vec<Choice>,
    pub views: Vec<Choice>,
    /// `None` 表示第一次計算尚未完成
    pub refreshed_at: Option<String>,
    pub sections: Vec<EtfSection<'a>>,
    pub comparison: Option<Comparison<'a>>,
}

/// 新聞頁
#[derive(Template)]
#[template(path = "news.html")]
pub struct NewsPage<'a> {
    pub listing: &'a EtfListing,
    pub etf_param: String,
    pub headlines: &'a [NewsHeadline],
}

fn history_series(snapshot: &EtfSnapshot) -> LineSeries<'_> {
    LineSeries {
        label: &snapshot.symbol,
        points: snapshot.history.iter().map(|dc| (dc.date, dc.close)).collect(),
    }
}

fn return_risk_groups(returns: Vec<Option<f64>>, risks: Vec<Option<f64>>) -> [BarGroup<'static>; 2] {
    [
        BarGroup {
            label: "Return",
            color: PALETTE[0],
            values: returns,
        },
        BarGroup {
            label: "Risk",
            color: PALETTE[1],
            values: risks,
        },
    ]
}

fn period_breakdown(snapshot: &EtfSnapshot, view: View) -> Panel<PeriodCell> {
    match view {
        View::Table => Panel::Table(
            Period::displayed()
                .into_iter()
                .map(|period| PeriodCell {
                    period,
                    ret: text::format_percent(snapshot.period_return(period)),
                    risk: text::format_percent(snapshot.period_risk(period)),
                })
                .collect(),
        ),
        View::Chart => {
            let periods = Period::displayed();
            let categories: Vec<String> = periods.iter().map(|p| p.to_string()).collect();
            let groups = return_risk_groups(
                periods.iter().map(|p| snapshot.period_return(*p)).collect(),
                periods.iter().map(|p| snapshot.period_risk(*p)).collect(),
            );
            let title = format!("Return and Risk by Period: {}", snapshot.name);
            chart::grouped_bar_chart(&title, &categories, &groups)
                .map_or(Panel::Unavailable, Panel::Chart)
        }
    }
}

pub fn etf_section(snapshot: &EtfSnapshot, view: View) -> EtfSection<'_> {
    let title = format!("{} ({})", snapshot.short_name, snapshot.symbol);

    EtfSection {
        snapshot,
        current_price: text::format_price(snapshot.current_price),
        annual_return: text::format_percent(snapshot.annual_return),
        average_risk: text::format_percent(snapshot.average_risk),
        ratio: text::format_ratio(snapshot.risk_return_ratio),
        history: chart::line_chart(&title, &[history_series(snapshot)]),
        breakdown: period_breakdown(snapshot, view),
        news_path: urlencoding::encode(&snapshot.symbol).into_owned(),
    }
}

/// 終值以各檔最後交易日計算 YTD 的期數，沒有歷史股價時用 `as_of`
pub fn comparison_section<'a>(
    snapshots: &'a [EtfSnapshot],
    query: &DashboardQuery,
    as_of: NaiveDate,
) -> Comparison<'a> {
    let series: Vec<LineSeries> = snapshots
        .iter()
        .filter(|s| s.has_history())
        .map(history_series)
        .collect();

    let body = match query.compare_view {
        View::Table => Panel::Table(
            snapshots
                .iter()
                .map(|s| ComparisonRow {
                    name: &s.name,
                    ret: text::format_percent(s.period_return(query.period)),
                    risk: text::format_percent(s.period_risk(query.period)),
                    future_value: text::format_money(s.future_value(
                        query.period,
                        query.investment,
                        s.last_date().unwrap_or(as_of),
                    )),
                })
                .collect(),
        ),
        View::Chart => {
            let categories: Vec<String> = snapshots.iter().map(|s| s.symbol.clone()).collect();
            let groups = return_risk_groups(
                snapshots.iter().map(|s| s.period_return(query.period)).collect(),
                snapshots.iter().map(|s| s.period_risk(query.period)).collect(),
            );
            chart::grouped_bar_chart("Return and Risk Comparison", &categories, &groups)
                .map_or(Panel::Unavailable, Panel::Chart)
        }
    };

    Comparison {
        history: chart::line_chart("Historical Price Comparison", &series),
        periods: Period::displayed()
            .into_iter()
            .map(|p| Choice::new(p, p, p == query.period))
            .collect(),
        investment: format!("{:.2}", query.investment),
        views: view_choices(query.compare_view),
        body,
    }
}

pub fn dashboard<'a>(
    listings: &[EtfListing],
    snapshots: &'a [EtfSnapshot],
    query: &DashboardQuery,
    refreshed_at: Option<DateTime<Local>>,
) -> DashboardPage<'a> {
    let comparison = if snapshots.len() > 1 {
        Some(comparison_section(snapshots, query, Local::now().date_naive()))
    } else {
        None
    };

    DashboardPage {
        etfs: listings
            .iter()
            .map(|etf| Choice::new(&etf.symbol, &etf.name, query.etfs.contains(&etf.symbol)))
            .collect(),
        views: view_choices(query.view),
        refreshed_at: refreshed_at.map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string()),
        sections: snapshots.iter().map(|s| etf_section(s, query.view)).collect(),
        comparison,
    }
}

pub fn news_page<'a>(listing: &'a EtfListing, news: Option<&'a [NewsHeadline]>) -> NewsPage<'a> {
    NewsPage {
        listing,
        etf_param: urlencoding::encode(&listing.symbol).into_owned(),
        headlines: news.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::declare::{DailyClose, EtfProfile};

    fn listings() -> Vec<EtfListing> {
        vec![
            EtfListing::new("AZ QQQ NASDAQ 100", "QQQ"),
            EtfListing::new("AZ SPDR S&P 500 ETF TRUST", "SPY"),
        ]
    }

    fn history(days: i64, step: f64) -> Vec<DailyClose> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        (0..days)
            .map(|i| {
                let wobble = if i % 3 == 0 { 0.7 } else { -0.2 };
                DailyClose::new(start + Duration::days(i), 100.0 + step * i as f64 + wobble)
            })
            .collect()
    }

    fn snapshot(listing: &EtfListing, with_history: bool) -> EtfSnapshot {
        EtfSnapshot::build(
            listing,
            if with_history { Some(history(600, 0.1)) } else { None },
            if with_history { Some(dec!(489.12)) } else { None },
            EtfProfile {
                short_name: format!("{} short", listing.symbol),
                description: "Tracks <b>large</b> caps".to_string(),
            },
            10.0,
        )
    }

    fn selected(symbols: &[&str]) -> DashboardQuery {
        DashboardQuery {
            etfs: symbols.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_etf_section() {
        let listings = listings();
        let snapshots = vec![snapshot(&listings[0], true)];

        let section = etf_section(&snapshots[0], View::Table);
        assert_eq!(section.current_price, "$489.12");
        assert!(section.history.is_some());
        match &section.breakdown {
            Panel::Table(cells) => {
                assert_eq!(cells.len(), 7);
                assert!(cells.iter().all(|c| c.period != Period::YearToDate));
            }
            _ => panic!("expected a table"),
        }

        let html = dashboard(&listings, &snapshots, &selected(&["QQQ"]), Some(Local::now()))
            .render()
            .unwrap();
        assert!(html.contains("<h3>AZ QQQ NASDAQ 100</h3>"));
        assert!(html.contains("<strong>Current price:</strong> $489.12"));
        assert!(html.contains("Tracks &lt;b&gt;large&lt;/b&gt; caps"));
        assert!(html.contains("<polyline"));
        assert!(html.contains("<th>10y</th>"));
        assert!(!html.contains("<th>YTD</th>"));
        assert!(html.contains(r#"href="/news/QQQ""#));
        assert!(!html.contains("Risk and Return Comparison"));
    }

    #[test]
    fn test_etf_section_chart_view() {
        let listings = listings();
        let snapshots = vec![snapshot(&listings[0], true)];
        let query = DashboardQuery {
            view: View::Chart,
            ..selected(&["QQQ"])
        };

        let html = dashboard(&listings, &snapshots, &query, Some(Local::now()))
            .render()
            .unwrap();
        assert!(html.contains("Return and Risk by Period: AZ QQQ NASDAQ 100"));
        assert!(!html.contains("<table"));
    }

    #[test]
    fn test_etf_section_without_history() {
        let listings = listings();
        let snapshots = vec![snapshot(&listings[0], false)];

        let chart = etf_section(&snapshots[0], View::Chart);
        assert!(matches!(chart.breakdown, Panel::Unavailable));

        let html = dashboard(&listings, &snapshots, &selected(&["QQQ"]), Some(Local::now()))
            .render()
            .unwrap();
        assert!(html.contains("<strong>Current price:</strong> Not available"));
        assert!(html.contains("<strong>Annualized return:</strong> Not available"));
        assert!(html.contains("<strong>Historical prices:</strong> Not available"));
        assert!(!html.contains("<polyline"));
    }

    #[test]
    fn test_dashboard_prompt_when_nothing_selected() {
        let html = dashboard(&listings(), &[], &DashboardQuery::default(), Some(Local::now()))
            .render()
            .unwrap();
        assert!(html.contains("Please select at least one ETF to see the details."));
        assert!(html.contains(r#"<option value="SPY">AZ SPDR S&amp;P 500 ETF TRUST</option>"#));
        assert!(html.contains(r#"<input type="radio" name="view" value="table" checked>"#));
    }

    #[test]
    fn test_dashboard_loading() {
        let page = dashboard(&listings(), &[], &DashboardQuery::default(), None);
        let html = page.render().unwrap();
        assert!(html.contains("still loading"));
        assert!(!html.contains("Please select at least one ETF"));
    }

    #[test]
    fn test_dashboard_comparison() {
        let listings = listings();
        let snapshots = vec![snapshot(&listings[0], true), snapshot(&listings[1], false)];
        let query = DashboardQuery {
            period: Period::OneYear,
            investment: 1000.0,
            ..selected(&["QQQ", "SPY"])
        };

        let html = dashboard(&listings, &snapshots, &query, Some(Local::now()))
            .render()
            .unwrap();
        assert!(html.contains("Risk and Return Comparison"));
        assert!(html.contains(r#"<option value="1y" selected>1y</option>"#));
        assert!(html.contains(r#"<option value="QQQ" selected>"#));
        assert!(html.contains(r#"value="1000.00" form="controls""#));
        // SPY 沒有數據，終值顯示 Not available
        assert!(html.contains("<tr><th>AZ SPDR S&amp;P 500 ETF TRUST</th><td>Not available</td><td>Not available</td><td>Not available</td></tr>"));
        assert!(html.contains("<td>$1,"));
    }

    #[test]
    fn test_comparison_chart_without_values() {
        let listings = listings();
        let snapshots = vec![snapshot(&listings[0], false), snapshot(&listings[1], false)];
        let query = DashboardQuery {
            compare_view: View::Chart,
            ..selected(&["QQQ", "SPY"])
        };

        let comparison = comparison_section(&snapshots, &query, NaiveDate::from_ymd_opt(2024, 10, 18).unwrap());
        assert!(comparison.history.is_none());
        assert!(matches!(comparison.body, Panel::Unavailable));

        let html = dashboard(&listings, &snapshots, &query, Some(Local::now()))
            .render()
            .unwrap();
        assert!(html.contains("No data available to plot return and risk."));
    }

    #[test]
    fn test_news_page() {
        let listing = &listings()[1];
        let news = vec![NewsHeadline {
            date_time: "Oct-18-24 08:30PM".to_string(),
            title: "Stocks & bonds".to_string(),
            link: "https://a.example/1".to_string(),
        }];
        let html = news_page(listing, Some(&news)).render().unwrap();
        assert!(html.contains("<title>News SPY</title>"));
        assert!(html.contains("<strong>Oct-18-24 08:30PM</strong>"));
        assert!(html.contains("Stocks &amp; bonds"));
        assert!(html.contains(r#"<a href="/?etf=SPY">Back</a>"#));

        let empty = news_page(listing, None).render().unwrap();
        assert!(empty.contains("<strong>News:</strong> Not available"));
    }
}
