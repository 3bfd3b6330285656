//! Cadence rule — when does the configured frequency require a new fetch?

use chrono::{Local, NaiveDate, TimeZone};

use crate::types::FetchFrequency;

const HOUR_MS: i64 = 3_600_000;

/// Whether a new fetch is required.
///
/// `daily` compares local calendar dates, not elapsed time: 23:59 and 00:01
/// the next day are different days, while 00:01 and 23:59 of the same day
/// are not. `hourly` is a plain elapsed-time check. An absent or
/// unrepresentable `last_fetch_ms` always requires a fetch.
pub fn should_fetch(frequency: FetchFrequency, last_fetch_ms: Option<i64>, now_ms: i64) -> bool {
    let Some(last) = last_fetch_ms else {
        return true;
    };

    match frequency {
        FetchFrequency::EachTab => true,
        FetchFrequency::Hourly => now_ms.saturating_sub(last) >= HOUR_MS,
        FetchFrequency::Daily => match (local_date(last), local_date(now_ms)) {
            (Some(then), Some(today)) => then != today,
            _ => true,
        },
    }
}

fn local_date(ms: i64) -> Option<NaiveDate> {
    Local.timestamp_millis_opt(ms).single().map(|dt| dt.date_naive())
}
