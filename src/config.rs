use std::{env, path::PathBuf, str::FromStr};

use anyhow::Result;
use config::{Config as config_config, File as config_file};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::{declare::EtfListing, logging};

const CONFIG_PATH: &str = "app.json";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct App {
    #[serde(default)]
    pub system: System,
    #[serde(default)]
    pub dashboard: Dashboard,
    #[serde(default = "default_etfs")]
    pub etfs: Vec<EtfListing>,
}

impl Default for App {
    fn default() -> Self {
        App {
            system: Default::default(),
            dashboard: Default::default(),
            etfs: default_etfs(),
        }
    }
}

const ETF_HTTP_HOST: &str = "ETF_HTTP_HOST";
const ETF_HTTP_PORT: &str = "ETF_HTTP_PORT";
const ETF_LOOKBACK_YEARS: &str = "ETF_LOOKBACK_YEARS";
const ETF_REFRESH_CRON: &str = "ETF_REFRESH_CRON";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct System {
    #[serde(default = "default_http_host")]
    pub http_host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// 回溯抓取歷史股價的年數
    #[serde(default = "default_lookback_years")]
    pub lookback_years: u32,
    /// 重新計算的排程 (UTC)
    #[serde(default = "default_refresh_cron")]
    pub refresh_cron: String,
}

impl Default for System {
    fn default() -> Self {
        System {
            http_host: default_http_host(),
            http_port: default_http_port(),
            lookback_years: default_lookback_years(),
            refresh_cron: default_refresh_cron(),
        }
    }
}

const ETF_NEWS_LIMIT: &str = "ETF_NEWS_LIMIT";
const ETF_TRANSLATE_TO: &str = "ETF_TRANSLATE_TO";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Dashboard {
    /// 每檔 ETF 顯示的新聞筆數
    #[serde(default = "default_news_limit")]
    pub news_limit: usize,
    /// 描述翻譯的目標語言，`en` 表示不翻譯
    #[serde(default = "default_translate_to")]
    pub translate_to: String,
}

impl Default for Dashboard {
    fn default() -> Self {
        Dashboard {
            news_limit: default_news_limit(),
            translate_to: default_translate_to(),
        }
    }
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8501
}

fn default_lookback_years() -> u32 {
    10
}

fn default_refresh_cron() -> String {
    "0 30 22 * * *".to_string()
}

fn default_news_limit() -> usize {
    3
}

fn default_translate_to() -> String {
    "en".to_string()
}

fn default_etfs() -> Vec<EtfListing> {
    [
        ("AZ QQQ NASDAQ 100", "QQQ"),
        ("AZ SPDR S&P 500 ETF TRUST", "SPY"),
        ("AZ SPDR DJIA TRUST", "DIA"),
        ("AZ VANGUARD EMERGING MARKET ETF", "VWO"),
        ("AZ FINANCIAL SELECT SECTOR SPDR", "XLF"),
        ("AZ HEALTH CARE SELECT SECTOR", "XLV"),
        ("AZ DJ US HOME CONSTRUCT", "ITB"),
        ("AZ SILVER TRUST", "SLV"),
        ("AZ MSCI TAIWAN INDEX FD", "EWT"),
        ("AZ MSCI UNITED KINGDOM", "EWU"),
        ("AZ MSCI SOUTH KOREA IND", "EWY"),
        ("AZ MSCI EMU", "EZU"),
        ("AZ MSCI JAPAN INDEX FD", "EWJ"),
        ("AZ MSCI CANADA", "EWC"),
        ("AZ MSCI GERMANY INDEX", "EWG"),
        ("AZ MSCI AUSTRALIA INDEX", "EWA"),
        ("AZ BARCLAYS AGGREGATE", "AGG"),
    ]
    .iter()
    .map(|(name, symbol)| EtfListing::new(name, symbol))
    .collect()
}

pub static SETTINGS: Lazy<App> = Lazy::new(|| App::get().expect("Config error"));

impl App {
    fn get() -> Result<Self> {
        let config_path = config_path();
        if config_path.exists() {
            let config: App = config_config::builder()
                .add_source(config_file::from(config_path))
                .build()?
                .try_deserialize()?;
            return Ok(config.override_with_env());
        }

        Ok(App::default().override_with_env())
    }

    /// 將來至於 env 的設定值覆蓋掉 json 上的設定值
    fn override_with_env(mut self) -> Self {
        if let Ok(host) = env::var(ETF_HTTP_HOST) {
            self.system.http_host = host;
        }

        if let Ok(port) = env::var(ETF_HTTP_PORT) {
            self.system.http_port = u16::from_str(&port).unwrap_or_else(|why| {
                logging::error_file_async(format!(
                    "Failed to parse {}({}) because {:?}",
                    ETF_HTTP_PORT, port, why
                ));
                default_http_port()
            });
        }

        if let Ok(years) = env::var(ETF_LOOKBACK_YEARS) {
            self.system.lookback_years = u32::from_str(&years)
                .ok()
                .filter(|y| *y > 0)
                .unwrap_or_else(default_lookback_years);
        }

        if let Ok(cron) = env::var(ETF_REFRESH_CRON) {
            self.system.refresh_cron = cron;
        }

        if let Ok(limit) = env::var(ETF_NEWS_LIMIT) {
            self.dashboard.news_limit =
                usize::from_str(&limit).unwrap_or_else(|_| default_news_limit());
        }

        if let Ok(lang) = env::var(ETF_TRANSLATE_TO) {
            self.dashboard.translate_to = lang.to_lowercase();
        }

        self
    }

    /// 依代碼取得設定中的 ETF
    pub fn find_etf(&self, symbol: &str) -> Option<&EtfListing> {
        self.etfs
            .iter()
            .find(|etf| etf.symbol.eq_ignore_ascii_case(symbol))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.system.http_host, self.system.http_port)
    }
}

/// 回傳設定檔的路徑
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}
