//! 全域快取模組。
//!
//! 1. [`SHARE`]：最近一次計算完成的 ETF 數據，依設定檔順序排列。
//! 2. [`TTL`]：短時效快取，新聞在 15 分鐘內不重複抓取。

use std::{sync::RwLock, time::Duration};

use chrono::{DateTime, Local};
use moka::sync::Cache;
use once_cell::sync::Lazy;

use crate::{declare::NewsHeadline, snapshot::EtfSnapshot};

/// 新聞快取的存活時間
const NEWS_TTL: Duration = Duration::from_secs(15 * 60);

pub static SHARE: Lazy<Share> = Lazy::new(Default::default);

/// 一次計算的結果與完成時間
type Loaded = (Vec<EtfSnapshot>, Option<DateTime<Local>>);

pub struct Share {
    /// 依設定檔順序排列的 ETF 數據，以及最後一次完成計算的時間
    loaded: RwLock<Loaded>,
}

impl Share {
    pub fn new() -> Self {
        Share {
            loaded: RwLock::new((Vec::new(), None)),
        }
    }

    /// 以新的計算結果整批取代舊資料，數據與時間同時更新
    pub fn replace(&self, snapshots: Vec<EtfSnapshot>) {
        if let Ok(mut loaded) = self.loaded.write() {
            *loaded = (snapshots, Some(Local::now()));
        }
    }

    /// 同一次讀取的數據與完成時間
    pub fn loaded(&self) -> Loaded {
        match self.loaded.read() {
            Ok(loaded) => loaded.clone(),
            Err(_) => (Vec::new(), None),
        }
    }

    /// 依代碼取得 ETF 數據，不分大小寫
    pub fn get_snapshot(&self, symbol: &str) -> Option<EtfSnapshot> {
        match self.loaded.read() {
            Ok(loaded) => loaded
                .0
                .iter()
                .find(|s| s.symbol.eq_ignore_ascii_case(symbol))
                .cloned(),
            Err(_) => None,
        }
    }

    /// 依傳入順序取得多檔 ETF 數據與完成時間，找不到的代碼略過
    pub fn get_snapshots(&self, symbols: &[String]) -> Loaded {
        match self.loaded.read() {
            Ok(loaded) => {
                let picked = symbols
                    .iter()
                    .filter_map(|symbol| {
                        loaded
                            .0
                            .iter()
                            .find(|s| s.symbol.eq_ignore_ascii_case(symbol))
                            .cloned()
                    })
                    .collect();
                (picked, loaded.1)
            }
            Err(_) => (Vec::new(), None),
        }
    }

    pub fn refreshed_at(&self) -> Option<DateTime<Local>> {
        match self.loaded.read() {
            Ok(loaded) => loaded.1,
            Err(_) => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.refreshed_at().is_some()
    }
}

impl Default for Share {
    fn default() -> Self {
        Self::new()
    }
}

/// 全域短時效快取實例。
pub static TTL: Lazy<Ttl> = Lazy::new(Default::default);

pub struct Ttl {
    /// Key:ETF 代碼
    news: Cache<String, Vec<NewsHeadline>>,
}

pub trait TtlCacheInner {
    fn clear(&self);
    fn news_get(&self, symbol: &str) -> Option<Vec<NewsHeadline>>;
    fn news_set(&self, symbol: String, news: Vec<NewsHeadline>);
}

impl TtlCacheInner for Ttl {
    fn clear(&self) {
        self.news.invalidate_all();
    }

    fn news_get(&self, symbol: &str) -> Option<Vec<NewsHeadline>> {
        self.news.get(&symbol.to_uppercase())
    }

    fn news_set(&self, symbol: String, news: Vec<NewsHeadline>) {
        self.news.insert(symbol.to_uppercase(), news);
    }
}

impl Ttl {
    pub fn new() -> Self {
        Ttl {
            news: Cache::builder()
                .max_capacity(256)
                .time_to_live(NEWS_TTL)
                .build(),
        }
    }
}

impl Default for Ttl {
    fn default() -> Self {
        Self::new()
    }
}
