use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};

/// 回溯 `years` 年的起訖日，一年以 365 天計
pub fn lookback_window(now: DateTime<Local>, years: u32) -> (NaiveDate, NaiveDate) {
    let end = now.date_naive();
    let start = end - Duration::days(365 * years as i64);
    (start, end)
}

/// 該日 00:00 UTC 的 Unix timestamp
pub fn to_unix_timestamp(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// 將 Unix timestamp 依交易所的 UTC 偏移秒數轉成交易日
pub fn from_unix_timestamp(timestamp: i64, gmt_offset: i64) -> Option<NaiveDate> {
    Utc.timestamp_opt(timestamp + gmt_offset, 0)
        .single()
        .map(|dt| dt.date_naive())
}
