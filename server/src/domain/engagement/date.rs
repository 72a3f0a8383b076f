//! Day-key encoding and calendar helpers
//!
//! A day key is the integer `YYYYMMDD`. Keys compare in the same order as the
//! dates they encode, so SQL range filters and `BTreeMap` ordering work on them
//! directly. All conversions are in UTC.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Utc};

/// Encode a date as `YYYYMMDD`. Years before 0 clamp to 0.
pub fn to_day_key(date: NaiveDate) -> u32 {
    encode(date.year(), date.month(), date.day())
}

fn encode(year: i32, month: u32, day: u32) -> u32 {
    // chrono caps years at 262143, so the product stays below u32::MAX
    u32::try_from(year).unwrap_or(0) * 10_000 + month * 100 + day
}

/// Decode a `YYYYMMDD` key. Returns `None` for keys that are not real dates.
pub fn from_day_key(key: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt((key / 10_000) as i32, (key / 100) % 100, key % 100)
}

/// Days spanned by `[a, b]`, both ends included. Argument order does not matter.
pub fn inclusive_day_count(a: NaiveDate, b: NaiveDate) -> u32 {
    (b - a).num_days().unsigned_abs() as u32 + 1
}

/// Unix seconds at 00:00 UTC of `date`
pub fn day_start_ts(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Day key of a unix timestamp (seconds)
pub fn day_key_of_ts(ts: i64) -> Option<u32> {
    DateTime::<Utc>::from_timestamp(ts, 0).map(|dt| to_day_key(dt.date_naive()))
}

pub fn days_before(date: NaiveDate, n: u32) -> NaiveDate {
    date - Days::new(u64::from(n))
}

pub fn days_after(date: NaiveDate, n: u32) -> NaiveDate {
    date + Days::new(u64::from(n))
}

/// Calendar date split into the fields sessions are bucketed by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestructuredDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl DestructuredDate {
    pub fn day_key(&self) -> u32 {
        encode(self.year, self.month, self.day)
    }
}

impl From<NaiveDate> for DestructuredDate {
    fn from(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }
}
