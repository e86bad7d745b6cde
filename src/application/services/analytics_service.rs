//! Read-only click analytics over links and the event log.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::json;

use crate::domain::analytics::{
    DailyClicks, DeviceClass, count_by_device, count_by_referrer, daily_series, window_start,
};
use crate::domain::entities::{LinkTotals, SlotCount};
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::error::AppError;
use crate::utils::store_timeout::with_timeout;

/// Default trailing window in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Upper bound on a requested window.
pub const MAX_WINDOW_DAYS: u32 = 366;

/// Global or per-link analytics over a trailing window.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_code: Option<String>,
    pub window_days: u32,
    pub total_clicks: i64,
    pub total_links: i64,
    pub avg_clicks_per_link: f64,
    pub clicks_by_date: Vec<DailyClicks>,
    pub clicks_by_referrer: BTreeMap<String, u64>,
    pub clicks_by_device: BTreeMap<DeviceClass, u64>,
}

/// Aggregates click events into dashboard series.
///
/// The store groups events into time slots and referrer/user-agent pairs,
/// so a report never loads individual events. Only the local-day bucketing
/// and the host and device classification happen here.
///
/// Reads tolerate concurrent writes: each query sees whatever the store has
/// committed, and counts from separate queries may differ slightly.
pub struct AnalyticsService {
    links: Arc<dyn LinkRepository>,
    clicks: Arc<dyn ClickRepository>,
    default_window_days: u32,
    store_timeout: Duration,
}

impl AnalyticsService {
    pub fn new(links: Arc<dyn LinkRepository>, clicks: Arc<dyn ClickRepository>) -> Self {
        Self {
            links,
            clicks,
            default_window_days: DEFAULT_WINDOW_DAYS,
            store_timeout: super::link_service::DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_default_window(mut self, days: u32) -> Self {
        self.default_window_days = days.clamp(1, MAX_WINDOW_DAYS);
        self
    }

    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }

    /// Builds the full report for the server's local calendar.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `days` is 0 or above [`MAX_WINDOW_DAYS`].
    /// Returns [`AppError::NotFound`] if `short_code` does not exist.
    pub async fn report(
        &self,
        short_code: Option<&str>,
        days: Option<u32>,
    ) -> Result<AnalyticsReport, AppError> {
        self.report_at(short_code, days, &Local, Utc::now()).await
    }

    /// Builds the report with an explicit time zone and clock.
    pub async fn report_at<Tz: TimeZone>(
        &self,
        short_code: Option<&str>,
        days: Option<u32>,
        tz: &Tz,
        now: DateTime<Utc>,
    ) -> Result<AnalyticsReport, AppError> {
        let window_days = self.window(days)?;

        let (link_id, totals) = match short_code {
            Some(code) => {
                let link = with_timeout(
                    self.store_timeout,
                    "find_by_code",
                    self.links.find_by_code(code),
                )
                .await?
                .ok_or_else(|| AppError::not_found("URL not found", json!({ "code": code })))?;

                let totals = LinkTotals {
                    total_clicks: link.clicks,
                    total_links: 1,
                };
                (Some(link.id), totals)
            }
            None => {
                let totals =
                    with_timeout(self.store_timeout, "totals", self.links.totals()).await?;
                (None, totals)
            }
        };

        let today = now.with_timezone(tz).date_naive();
        let since = start_of_day(tz, window_start(today, window_days));

        let slots = with_timeout(
            self.store_timeout,
            "counts_by_slot",
            self.clicks.counts_by_slot(link_id, since),
        )
        .await?;

        let sources = with_timeout(
            self.store_timeout,
            "counts_by_source",
            self.clicks.counts_by_source(link_id, since),
        )
        .await?;

        Ok(AnalyticsReport {
            short_code: short_code.map(str::to_string),
            window_days,
            total_clicks: totals.total_clicks,
            total_links: totals.total_links,
            avg_clicks_per_link: totals.average_clicks(),
            clicks_by_date: clicks_by_date(&slots, tz, today, window_days),
            clicks_by_referrer: count_by_referrer(
                sources
                    .iter()
                    .map(|s| (s.referrer.as_deref(), clamp_count(s.clicks))),
            ),
            clicks_by_device: count_by_device(
                sources
                    .iter()
                    .map(|s| (s.user_agent.as_deref(), clamp_count(s.clicks))),
            ),
        })
    }

    fn window(&self, days: Option<u32>) -> Result<u32, AppError> {
        let days = days.unwrap_or(self.default_window_days);
        if days == 0 || days > MAX_WINDOW_DAYS {
            return Err(AppError::bad_request(
                format!("days must be between 1 and {MAX_WINDOW_DAYS}"),
                json!({ "days": days }),
            ));
        }
        Ok(days)
    }
}

/// Buckets slot counts by the calendar day their slot starts on in `tz`.
pub fn clicks_by_date<Tz: TimeZone>(
    slots: &[SlotCount],
    tz: &Tz,
    today: NaiveDate,
    days: u32,
) -> Vec<DailyClicks> {
    daily_series(
        slots.iter().map(|s| {
            (
                s.slot_start.with_timezone(tz).date_naive(),
                clamp_count(s.clicks),
            )
        }),
        today,
        days,
    )
}

fn clamp_count(clicks: i64) -> u64 {
    u64::try_from(clicks).unwrap_or(0)
}

/// Earliest instant of `date` in `tz`, in UTC.
///
/// Days that start inside a DST gap fall back to midnight UTC.
fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}
