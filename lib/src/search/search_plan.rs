// lib/src/search/search_plan.rs

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use log::debug;
use models::{ActiveInterval, DateTimeRange, RideFilter};
use serde::Deserialize;
use thiserror::Error;

use crate::time_window::{MinuteOfDay, TimeWindow, TimeWindowError};

/// Window start assumed when only an end time is supplied.
pub const DEFAULT_WINDOW_START: &str = "12:00 AM";
/// Window end assumed when only a start time is supplied.
pub const DEFAULT_WINDOW_END: &str = "11:59 PM";

#[derive(Debug, Error, PartialEq)]
pub enum SearchError {
    #[error("At least one search filter is required")]
    NoFilters,
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Local time {0} does not exist in the reference timezone")]
    NonexistentLocalTime(String),
    #[error(transparent)]
    TimeWindow(#[from] TimeWindowError),
}

/// Raw search query parameters.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// How a search is executed: a coarse storage filter, optionally followed by
/// an in-memory time-of-day filter.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPlan {
    pub filter: RideFilter,
    pub time_of_day: Option<TimeWindow>,
}

impl SearchPlan {
    pub fn build(params: &SearchParams, tz: Tz) -> Result<Self, SearchError> {
        let from = present(&params.from);
        let to = present(&params.to);
        let start = present(&params.start_time);
        let end = present(&params.end_time);
        let date = present(&params.date)
            .map(|raw| decode_date(raw, tz))
            .transpose()?;

        let has_window = start.is_some() || end.is_some();
        if from.is_none() && to.is_none() && date.is_none() && !has_window {
            return Err(SearchError::NoFilters);
        }

        let mut filter = RideFilter {
            from: from.map(str::to_string),
            to: to.map(str::to_string),
            range: None,
        };
        let mut time_of_day = None;

        if has_window {
            let window = TimeWindow::from_clock_strings(
                start.unwrap_or(DEFAULT_WINDOW_START),
                end.unwrap_or(DEFAULT_WINDOW_END),
                tz,
            )?;
            match date {
                Some(date) => filter.range = Some(date_window_range(date, &window)?),
                // A time of day on every date cannot be expressed as one range.
                None => time_of_day = Some(window),
            }
        } else if let Some(date) = date {
            filter.range = Some(whole_day(date, tz)?);
        }

        debug!("Search plan: filter={:?}, time_of_day={:?}", filter, time_of_day);
        Ok(SearchPlan { filter, time_of_day })
    }

    /// Runs the in-memory stage over rides returned by the coarse filter.
    pub fn apply<R: ActiveInterval>(&self, rides: Vec<R>) -> Vec<R> {
        match &self.time_of_day {
            Some(window) => window.filter(rides),
            None => rides,
        }
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp, whose calendar date is taken
/// in the reference timezone.
pub fn decode_date(raw: &str, tz: Tz) -> Result<NaiveDate, SearchError> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&tz).date_naive())
        .map_err(|_| SearchError::InvalidDate(raw.to_string()))
}

fn to_naive_time(minute: MinuteOfDay) -> NaiveTime {
    let m = u32::from(minute.get());
    NaiveTime::from_hms_opt(m / 60, m % 60, 0).unwrap_or(NaiveTime::MIN)
}

fn local_instant(date: NaiveDate, time: NaiveTime, tz: Tz) -> Result<DateTime<Utc>, SearchError> {
    let naive = date.and_time(time);
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| SearchError::NonexistentLocalTime(naive.to_string()))
}

/// Absolute range covered by `window` on `date`. A window whose end clock is
/// before its start runs into the following day.
pub fn date_window_range(date: NaiveDate, window: &TimeWindow) -> Result<DateTimeRange, SearchError> {
    let tz = window.timezone();
    let start = local_instant(date, to_naive_time(window.start()), tz)?;
    let end = if window.is_single_point() {
        start
    } else {
        let end_date = if window.wraps_midnight() {
            date.succ_opt()
                .ok_or_else(|| SearchError::InvalidDate(date.to_string()))?
        } else {
            date
        };
        local_instant(end_date, to_naive_time(window.end()), tz)?
    };
    Ok(DateTimeRange { start, end })
}

/// From local midnight to the last millisecond of `date`.
pub fn whole_day(date: NaiveDate, tz: Tz) -> Result<DateTimeRange, SearchError> {
    let next = date
        .succ_opt()
        .ok_or_else(|| SearchError::InvalidDate(date.to_string()))?;
    let start = local_instant(date, NaiveTime::MIN, tz)?;
    let end = local_instant(next, NaiveTime::MIN, tz)? - Duration::milliseconds(1);
    Ok(DateTimeRange { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::New_York;

    fn params(pairs: &[(&str, &str)]) -> SearchParams {
        let mut params = SearchParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "from" => params.from = value,
                "to" => params.to = value,
                "date" => params.date = value,
                "startTime" => params.start_time = value,
                "endTime" => params.end_time = value,
                other => panic!("unknown key {other}"),
            }
        }
        params
    }

    fn ny(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        New_York
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn requires_at_least_one_filter() {
        assert_eq!(
            SearchPlan::build(&SearchParams::default(), New_York),
            Err(SearchError::NoFilters)
        );
        assert_eq!(
            SearchPlan::build(&params(&[("from", "   "), ("startTime", "")]), New_York),
            Err(SearchError::NoFilters)
        );
    }

    #[test]
    fn location_only_has_no_time_filters() {
        let plan = SearchPlan::build(&params(&[("from", " New Haven "), ("to", "JFK")]), New_York).unwrap();
        assert_eq!(plan.filter.from.as_deref(), Some("New Haven"));
        assert_eq!(plan.filter.to.as_deref(), Some("JFK"));
        assert!(plan.filter.range.is_none());
        assert!(plan.time_of_day.is_none());
    }

    #[test]
    fn window_without_date_filters_in_memory() {
        let plan = SearchPlan::build(&params(&[("startTime", "2:00 PM"), ("endTime", "4:00 PM")]), New_York).unwrap();
        assert!(plan.filter.range.is_none());
        let window = plan.time_of_day.unwrap();
        assert_eq!(window.start().get(), 14 * 60);
        assert_eq!(window.end().get(), 16 * 60);
    }

    #[test]
    fn partial_window_uses_smart_defaults() {
        let only_start = SearchPlan::build(&params(&[("startTime", "6:00 PM")]), New_York).unwrap();
        assert_eq!(only_start.time_of_day.unwrap().end().get(), 1439);

        let only_end = SearchPlan::build(&params(&[("endTime", "9:00 AM")]), New_York).unwrap();
        assert_eq!(only_end.time_of_day.unwrap().start().get(), 0);
    }

    #[test]
    fn window_with_date_becomes_absolute_range() {
        let plan = SearchPlan::build(
            &params(&[("date", "2024-03-05"), ("startTime", "2:00 PM"), ("endTime", "4:00 PM")]),
            New_York,
        )
        .unwrap();
        assert!(plan.time_of_day.is_none());
        let range = plan.filter.range.unwrap();
        assert_eq!(range.start, ny(2024, 3, 5, 14, 0));
        assert_eq!(range.end, ny(2024, 3, 5, 16, 0));
    }

    #[test]
    fn wrapping_window_with_date_runs_into_next_day() {
        let plan = SearchPlan::build(
            &params(&[("date", "2024-03-05"), ("startTime", "10:00 PM"), ("endTime", "2:00 AM")]),
            New_York,
        )
        .unwrap();
        let range = plan.filter.range.unwrap();
        assert_eq!(range.start, ny(2024, 3, 5, 22, 0));
        assert_eq!(range.end, ny(2024, 3, 6, 2, 0));
    }

    #[test]
    fn date_without_window_covers_the_whole_local_day() {
        let plan = SearchPlan::build(&params(&[("date", "2024-07-04")]), New_York).unwrap();
        let range = plan.filter.range.unwrap();
        assert_eq!(range.start, ny(2024, 7, 4, 0, 0));
        assert_eq!(range.end, ny(2024, 7, 5, 0, 0) - Duration::milliseconds(1));
        assert!(plan.time_of_day.is_none());
    }

    #[test]
    fn accepts_rfc3339_dates() {
        // Late evening UTC is still the same calendar day in New York.
        let date = decode_date("2024-07-05T02:00:00Z", New_York).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 7, 4).unwrap());
    }

    #[test]
    fn rejects_bad_dates_and_times() {
        assert_eq!(
            SearchPlan::build(&params(&[("date", "July 4th")]), New_York),
            Err(SearchError::InvalidDate("July 4th".to_string()))
        );
        assert!(matches!(
            SearchPlan::build(&params(&[("startTime", "25:00")]), New_York),
            Err(SearchError::TimeWindow(TimeWindowError::InvalidClockTime(_)))
        ));
    }
}
