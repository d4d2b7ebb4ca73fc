/// 抓取、計算並更新快取
pub mod refresh;
