//! Deterministic classification rules for click analytics.
//!
//! These functions are pure so the aggregation service can be tested without
//! a store and the rules stay stable across backends.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use url::Url;

/// Bucket used for clicks without a usable referrer.
pub const DIRECT_REFERRER: &str = "Direct";

/// Coarse client category derived from a user-agent string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DeviceClass {
    Tablet,
    Mobile,
    Desktop,
}

/// Ordered substring rules, first match wins.
///
/// Tablet rules come first: iPad and Android tablet user agents also carry
/// mobile tokens.
const DEVICE_RULES: &[(DeviceClass, &[&str])] = &[
    (DeviceClass::Tablet, &["ipad", "tablet"]),
    (DeviceClass::Mobile, &["mobi", "iphone", "android"]),
];

impl DeviceClass {
    /// Classifies a raw user-agent header. Absent values are `Desktop`.
    pub fn classify(user_agent: Option<&str>) -> Self {
        let ua = user_agent.unwrap_or_default().to_ascii_lowercase();

        DEVICE_RULES
            .iter()
            .find(|(_, tokens)| tokens.iter().any(|token| ua.contains(token)))
            .map(|(class, _)| *class)
            .unwrap_or(DeviceClass::Desktop)
    }
}

/// Extracts the referring host with a leading `www.` removed.
///
/// Absent, empty, unparseable or host-less referrers are bucketed as
/// [`DIRECT_REFERRER`].
pub fn referrer_host(referrer: Option<&str>) -> String {
    referrer
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .and_then(|r| Url::parse(r).ok())
        .and_then(|url| {
            url.host_str().map(|host| {
                host.strip_prefix("www.")
                    .unwrap_or(host)
                    .to_ascii_lowercase()
            })
        })
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| DIRECT_REFERRER.to_string())
}

/// Click count for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyClicks {
    pub date: NaiveDate,
    pub clicks: u64,
}

/// First calendar day of a trailing window of `days` days ending on `today`.
///
/// A window of 0 is treated as 1.
pub fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
    let span = u64::from(days.max(1) - 1);
    today.checked_sub_days(Days::new(span)).unwrap_or(NaiveDate::MIN)
}

/// Builds a zero-filled, chronologically ordered series of exactly `days`
/// entries ending on `today` (inclusive), adding up the `(date, clicks)`
/// pairs in `counts`.
///
/// Dates outside the window are ignored.
pub fn daily_series<I>(counts: I, today: NaiveDate, days: u32) -> Vec<DailyClicks>
where
    I: IntoIterator<Item = (NaiveDate, u64)>,
{
    let start = window_start(today, days);

    let mut buckets: BTreeMap<NaiveDate, u64> = start
        .iter_days()
        .take_while(|d| *d <= today)
        .map(|d| (d, 0))
        .collect();

    for (date, clicks) in counts {
        if let Some(count) = buckets.get_mut(&date) {
            *count += clicks;
        }
    }

    buckets
        .into_iter()
        .map(|(date, clicks)| DailyClicks { date, clicks })
        .collect()
}

/// Sums `(referrer, clicks)` pairs per referring host.
pub fn count_by_referrer<'a, I>(referrers: I) -> BTreeMap<String, u64>
where
    I: IntoIterator<Item = (Option<&'a str>, u64)>,
{
    let mut counts = BTreeMap::new();
    for (referrer, clicks) in referrers {
        *counts.entry(referrer_host(referrer)).or_insert(0) += clicks;
    }
    counts
}

/// Sums `(user_agent, clicks)` pairs per device class.
pub fn count_by_device<'a, I>(user_agents: I) -> BTreeMap<DeviceClass, u64>
where
    I: IntoIterator<Item = (Option<&'a str>, u64)>,
{
    let mut counts = BTreeMap::new();
    for (ua, clicks) in user_agents {
        *counts.entry(DeviceClass::classify(ua)).or_insert(0) += clicks;
    }
    counts
}
