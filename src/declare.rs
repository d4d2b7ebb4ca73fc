use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// 一年的交易日數
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// 無法取得數據時顯示的文字
pub const NOT_AVAILABLE: &str = "Not available";

/// 設定檔中的一檔 ETF
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EtfListing {
    /// 顯示名稱，例︰AZ QQQ NASDAQ 100
    pub name: String,
    /// 交易代碼，例︰QQQ
    pub symbol: String,
}

impl EtfListing {
    pub fn new(name: &str, symbol: &str) -> Self {
        EtfListing {
            name: name.to_string(),
            symbol: symbol.to_uppercase(),
        }
    }
}

/// 單一交易日的收盤價
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct DailyClose {
    pub date: NaiveDate,
    pub close: f64,
}

impl DailyClose {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        DailyClose { date, close }
    }
}

/// 基本資料
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EtfProfile {
    pub short_name: String,
    pub description: String,
}

impl Default for EtfProfile {
    fn default() -> Self {
        EtfProfile {
            short_name: NOT_AVAILABLE.to_string(),
            description: "Description not available".to_string(),
        }
    }
}

/// 新聞標題
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NewsHeadline {
    pub date_time: String,
    pub title: String,
    pub link: String,
}

/// 計算報酬與風險的區間
#[derive(
    Serialize,
    Deserialize,
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    EnumString,
    Display,
    AsRefStr,
)]
pub enum Period {
    #[serde(rename = "1m")]
    #[strum(serialize = "1m")]
    OneMonth,
    #[serde(rename = "3m")]
    #[strum(serialize = "3m")]
    ThreeMonths,
    #[serde(rename = "6m")]
    #[strum(serialize = "6m")]
    SixMonths,
    #[serde(rename = "1y")]
    #[strum(serialize = "1y")]
    OneYear,
    #[serde(rename = "YTD")]
    #[strum(to_string = "YTD", serialize = "ytd")]
    YearToDate,
    #[serde(rename = "3y")]
    #[strum(serialize = "3y")]
    ThreeYears,
    #[serde(rename = "5y")]
    #[strum(serialize = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    #[strum(serialize = "10y")]
    TenYears,
}

impl Period {
    /// 往回推算的月數，YTD 沒有固定月數
    pub fn months(&self) -> Option<u32> {
        match self {
            Period::OneMonth => Some(1),
            Period::ThreeMonths => Some(3),
            Period::SixMonths => Some(6),
            Period::OneYear => Some(12),
            Period::YearToDate => None,
            Period::ThreeYears => Some(36),
            Period::FiveYears => Some(60),
            Period::TenYears => Some(120),
        }
    }

    /// 以年為單位的複利期數
    ///
    /// YTD 以 `as_of` 當年已經過的天數 / 365 計算。
    pub fn years(&self, as_of: NaiveDate) -> f64 {
        match self.months() {
            Some(months) => months as f64 / 12.0,
            None => as_of.ordinal0() as f64 / 365.0,
        }
    }

    /// `date` 是否落在以 `last` 為最後交易日的區間內
    ///
    /// 滾動區間不含起點：`date > last - N 個月`；YTD 則含當年 1 月 1 日。
    /// 1y 以上的區間同樣是往回推 N 個月，不對齊到年底。
    pub fn includes(&self, date: NaiveDate, last: NaiveDate) -> bool {
        match self.months() {
            Some(months) => match last.checked_sub_months(Months::new(months)) {
                Some(start) => date > start && date <= last,
                None => date <= last,
            },
            None => date.year() == last.year() && date <= last,
        }
    }

    /// 表格與選單上顯示的區間，YTD 只計算不顯示
    pub fn displayed() -> [Period; 7] {
        [
            Period::OneMonth,
            Period::ThreeMonths,
            Period::SixMonths,
            Period::OneYear,
            Period::ThreeYears,
            Period::FiveYears,
            Period::TenYears,
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_period_labels() {
        let labels: Vec<String> = Period::iter().map(|p| p.to_string()).collect();
        assert_eq!(
            labels,
            vec!["1m", "3m", "6m", "1y", "YTD", "3y", "5y", "10y"]
        );
        assert_eq!(Period::from_str("10y").unwrap(), Period::TenYears);
        assert_eq!(Period::from_str("ytd").unwrap(), Period::YearToDate);
        assert!(Period::from_str("2y").is_err());
    }

    #[test]
    fn test_period_serde_uses_labels() {
        let json = serde_json::to_string(&Period::SixMonths).unwrap();
        assert_eq!(json, "\"6m\"");
        let p: Period = serde_json::from_str("\"YTD\"").unwrap();
        assert_eq!(p, Period::YearToDate);
    }

    #[test]
    fn test_period_years() {
        let as_of = date(2024, 10, 18);
        assert!((Period::OneMonth.years(as_of) - 1.0 / 12.0).abs() < 1e-12);
        assert!((Period::SixMonths.years(as_of) - 0.5).abs() < 1e-12);
        assert_eq!(Period::TenYears.years(as_of), 10.0);
        assert_eq!(Period::YearToDate.years(date(2024, 1, 1)), 0.0);
        assert!((Period::YearToDate.years(date(2023, 7, 2)) - 182.0 / 365.0).abs() < 1e-12);
    }

    #[test]
    fn test_period_includes() {
        let last = date(2024, 3, 31);
        // 2024-03-31 - 1 month = 2024-02-29，起點本身不含
        assert!(!Period::OneMonth.includes(date(2024, 2, 29), last));
        assert!(Period::OneMonth.includes(date(2024, 3, 1), last));
        assert!(!Period::OneMonth.includes(date(2024, 4, 1), last));
        assert!(Period::YearToDate.includes(date(2024, 1, 1), last));
        assert!(!Period::YearToDate.includes(date(2023, 12, 29), last));
        assert!(Period::TenYears.includes(date(2014, 4, 1), last));
        assert!(!Period::TenYears.includes(date(2014, 3, 31), last));
    }

    #[test]
    fn test_displayed_excludes_ytd() {
        assert!(!Period::displayed().contains(&Period::YearToDate));
        assert_eq!(Period::displayed().len(), 7);
    }

    #[test]
    fn test_listing_symbol_is_upper_case() {
        let etf = EtfListing::new("AZ MSCI EMU", "ezu");
        assert_eq!(etf.symbol, "EZU");
    }
}
