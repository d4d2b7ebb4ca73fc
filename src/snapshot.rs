use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::{
    calculation::{
        future_value::checked_future_value,
        log_return::{annualized_log_return, closes},
        risk_return::{risk_return_by_period, risk_return_ratio},
        volatility::annualized_volatility,
    },
    declare::{DailyClose, EtfListing, EtfProfile, Period},
    logging,
};

/// 一檔 ETF 計算完成後的所有數據
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EtfSnapshot {
    pub name: String,
    pub symbol: String,
    pub short_name: String,
    pub description: String,
    /// 回溯期間內的每日收盤價
    #[serde(default)]
    pub history: Vec<DailyClose>,
    pub current_price: Option<Decimal>,
    /// 整段回溯期間的年化對數報酬
    pub annual_return: Option<f64>,
    /// 整段回溯期間的年化風險
    pub average_risk: Option<f64>,
    pub risk_return_ratio: Option<f64>,
    pub returns: BTreeMap<Period, Option<f64>>,
    pub risks: BTreeMap<Period, Option<f64>>,
}

impl EtfSnapshot {
    /// 由抓回來的數據計算出完整的 snapshot
    ///
    /// `history` 為 `None` 或空集合時，所有指標皆為 `None`。
    pub fn build(
        listing: &EtfListing,
        history: Option<Vec<DailyClose>>,
        current_price: Option<Decimal>,
        profile: EtfProfile,
        lookback_years: f64,
    ) -> Self {
        let mut snapshot = EtfSnapshot {
            name: listing.name.clone(),
            symbol: listing.symbol.clone(),
            short_name: profile.short_name,
            description: profile.description,
            history: Vec::new(),
            current_price,
            annual_return: None,
            average_risk: None,
            risk_return_ratio: None,
            returns: Period::iter().map(|p| (p, None)).collect(),
            risks: Period::iter().map(|p| (p, None)).collect(),
        };

        let mut history = match history {
            Some(h) if !h.is_empty() => h,
            _ => {
                logging::warn_file_async(format!(
                    "No historical prices for {}, metrics are not available",
                    listing.symbol
                ));
                return snapshot;
            }
        };

        history.sort_by_key(|dc| dc.date);
        history.dedup_by_key(|dc| dc.date);

        let prices = closes(&history);
        snapshot.annual_return = annualized_log_return(&prices, lookback_years);
        snapshot.average_risk = annualized_volatility(&prices);
        snapshot.risk_return_ratio = match (snapshot.annual_return, snapshot.average_risk) {
            (Some(ret), Some(risk)) => risk_return_ratio(ret, risk),
            _ => None,
        };

        for (period, metrics) in risk_return_by_period(&listing.symbol, &history) {
            snapshot.returns.insert(period, metrics.ret);
            snapshot.risks.insert(period, metrics.risk);
        }

        snapshot.history = history;
        snapshot
    }

    pub fn period_return(&self, period: Period) -> Option<f64> {
        self.returns.get(&period).copied().flatten()
    }

    pub fn period_risk(&self, period: Period) -> Option<f64> {
        self.risks.get(&period).copied().flatten()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.history.last().map(|dc| dc.date)
    }

    /// 以區間的年化報酬作為每期報酬率，試算投資終值
    pub fn future_value(&self, period: Period, initial: f64, as_of: NaiveDate) -> Option<f64> {
        let rate = self.period_return(period)?;
        match checked_future_value(initial, rate, period.years(as_of)) {
            Ok(value) => Some(value),
            Err(why) => {
                logging::warn_file_async(format!(
                    "Failed to calculate future value of {} because {:?}",
                    self.symbol, why
                ));
                None
            }
        }
    }

    pub fn has_history(&self) -> bool {
        !self.history.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rust_decimal_macros::dec;

    use super::*;

    fn listing() -> EtfListing {
        EtfListing::new("AZ SPDR S&P 500 ETF TRUST", "SPY")
    }

    fn profile() -> EtfProfile {
        EtfProfile {
            short_name: "SPDR S&P 500".to_string(),
            description: "Tracks the S&P 500".to_string(),
        }
    }

    /// 十年間價格由 100 漲到 200，每日等比上漲
    fn doubling_history() -> Vec<DailyClose> {
        let start = NaiveDate::from_ymd_opt(2014, 10, 20).unwrap();
        let days = 3652;
        let daily = 2f64.ln() / (days - 1) as f64;
        (0..days)
            .map(|i| DailyClose::new(start + Duration::days(i), 100.0 * (daily * i as f64).exp()))
            .collect()
    }

    #[test]
    fn test_build_doubling() {
        let snapshot = EtfSnapshot::build(
            &listing(),
            Some(doubling_history()),
            Some(dec!(200.00)),
            profile(),
            10.0,
        );

        assert!((snapshot.annual_return.unwrap() - 2f64.ln() / 10.0).abs() < 1e-9);
        assert!(snapshot.average_risk.unwrap() < 1e-9);
        assert_eq!(snapshot.returns.len(), 8);
        assert!(snapshot.period_return(Period::OneYear).unwrap() > 0.0);
        assert_eq!(snapshot.current_price, Some(dec!(200.00)));
        assert_eq!(snapshot.short_name, "SPDR S&P 500");
    }

    #[test]
    fn test_flat_history_has_no_ratio() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let flat = (0..30)
            .map(|i| DailyClose::new(start + Duration::days(i), 100.0))
            .collect();
        let snapshot = EtfSnapshot::build(&listing(), Some(flat), None, profile(), 10.0);

        assert_eq!(snapshot.annual_return, Some(0.0));
        assert_eq!(snapshot.average_risk, Some(0.0));
        // 風險為零時沒有報酬風險比
        assert_eq!(snapshot.risk_return_ratio, None);
    }

    #[test]
    fn test_build_without_history() {
        let snapshot = EtfSnapshot::build(&listing(), None, None, EtfProfile::default(), 10.0);
        assert_eq!(snapshot.annual_return, None);
        assert_eq!(snapshot.average_risk, None);
        assert_eq!(snapshot.risk_return_ratio, None);
        assert_eq!(snapshot.returns.len(), 8);
        assert!(snapshot.returns.values().all(Option::is_none));
        assert!(snapshot.risks.values().all(Option::is_none));
        assert!(!snapshot.has_history());

        let empty = EtfSnapshot::build(&listing(), Some(vec![]), None, EtfProfile::default(), 10.0);
        assert_eq!(empty.annual_return, None);
    }

    #[test]
    fn test_build_sorts_history() {
        let mut history = vec![
            DailyClose::new(NaiveDate::from_ymd_opt(2024, 1, 4).unwrap(), 110.0),
            DailyClose::new(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 100.0),
            DailyClose::new(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(), 90.0),
        ];
        history.push(history[0]);

        let snapshot = EtfSnapshot::build(&listing(), Some(history), None, profile(), 1.0);
        assert_eq!(snapshot.history.len(), 3);
        assert_eq!(snapshot.history[0].close, 100.0);
        assert!((snapshot.annual_return.unwrap() - 1.1f64.ln()).abs() < 1e-12);
        let ratio = snapshot.risk_return_ratio.unwrap();
        assert!((ratio - snapshot.annual_return.unwrap() / snapshot.average_risk.unwrap()).abs() < 1e-12);
    }

    #[test]
    fn test_future_value_uses_period_return() {
        let snapshot = EtfSnapshot::build(&listing(), Some(doubling_history()), None, profile(), 10.0);
        let as_of = snapshot.last_date().unwrap();
        let rate = snapshot.period_return(Period::ThreeYears).unwrap();
        let fv = snapshot.future_value(Period::ThreeYears, 1000.0, as_of).unwrap();
        assert!((fv - 1000.0 * (1.0 + rate).powf(3.0)).abs() < 1e-6);
        assert_eq!(snapshot.future_value(Period::ThreeYears, -5.0, as_of), None);

        let missing = EtfSnapshot::build(&listing(), None, None, profile(), 10.0);
        assert_eq!(missing.future_value(Period::OneYear, 1000.0, as_of), None);
    }
}
