// lib/src/time_window/time_window.rs

//! Time-of-day matching for rides.
//!
//! Both the requested window and every ride are reduced to minutes since
//! local midnight in a single reference timezone and compared as recurring
//! daily intervals, so a search for "2:00 PM to 4:00 PM" finds matching rides
//! on any date. Either side may wrap past midnight.

use chrono::{DateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use log::debug;
use models::ActiveInterval;
use thiserror::Error;

pub const MINUTES_IN_DAY: u16 = 1440;

/// Display format of clock times, e.g. `2:30 PM`.
pub const CLOCK_TIME_FORMAT: &str = "%I:%M %p";

#[derive(Debug, Error, PartialEq)]
pub enum TimeWindowError {
    #[error("invalid clock time '{0}', expected a time like 2:30 PM")]
    InvalidClockTime(String),
    #[error("unknown timezone '{0}'")]
    InvalidTimezone(String),
}

/// A clock time expressed as minutes since midnight. Always below 1440.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MinuteOfDay(u16);

impl MinuteOfDay {
    pub fn new(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_IN_DAY).then_some(Self(minutes))
    }

    pub fn get(self) -> u16 {
        self.0
    }

    pub fn from_naive_time(time: NaiveTime) -> Self {
        Self((time.hour() * 60 + time.minute()) as u16)
    }

    /// Projects an absolute instant into `tz` and keeps only its clock time.
    pub fn from_instant(instant: &DateTime<Utc>, tz: &Tz) -> Self {
        Self::from_naive_time(instant.with_timezone(tz).time())
    }

    /// Parses a 12-hour clock string such as `2:30 PM` or `12:00 am`.
    pub fn parse_clock_time(value: &str) -> Result<Self, TimeWindowError> {
        let trimmed = value.trim();
        NaiveTime::parse_from_str(trimmed, CLOCK_TIME_FORMAT)
            .map(Self::from_naive_time)
            .map_err(|_| TimeWindowError::InvalidClockTime(value.to_string()))
    }
}

/// A non-wrapping half-open interval `[start, end)` within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Segment {
    start: u16,
    end: u16,
}

impl Segment {
    fn overlaps(&self, other: &Segment) -> bool {
        self.end.min(other.end) > self.start.max(other.start)
    }
}

/// Splits a possibly wrapping interval into one or two non-wrapping segments.
fn split_interval(start: MinuteOfDay, end: MinuteOfDay) -> impl Iterator<Item = Segment> + Clone {
    let (start, end) = (start.get(), end.get());
    let (first, second) = if end > start {
        (Segment { start, end }, None)
    } else {
        (
            Segment { start, end: MINUTES_IN_DAY },
            Some(Segment { start: 0, end }),
        )
    };
    std::iter::once(first).chain(second)
}

fn intervals_overlap(
    mut a: impl Iterator<Item = Segment>,
    b: impl Iterator<Item = Segment> + Clone,
) -> bool {
    a.any(|seg_a| b.clone().any(|seg_b| seg_a.overlaps(&seg_b)))
}

/// A recurring daily window, interpreted in a reference timezone.
///
/// When `start == end` the window is a single point in time and matching is
/// closed at both ride boundaries. Otherwise matching is a strict half-open
/// overlap test, so rides that merely touch the window do not match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: MinuteOfDay,
    end: MinuteOfDay,
    tz: Tz,
}

impl TimeWindow {
    pub fn new(start: MinuteOfDay, end: MinuteOfDay, tz: Tz) -> Self {
        TimeWindow { start, end, tz }
    }

    pub fn from_clock_strings(start: &str, end: &str, tz: Tz) -> Result<Self, TimeWindowError> {
        Ok(TimeWindow {
            start: MinuteOfDay::parse_clock_time(start)?,
            end: MinuteOfDay::parse_clock_time(end)?,
            tz,
        })
    }

    pub fn start(&self) -> MinuteOfDay {
        self.start
    }

    pub fn end(&self) -> MinuteOfDay {
        self.end
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    pub fn is_single_point(&self) -> bool {
        self.start == self.end
    }

    pub fn wraps_midnight(&self) -> bool {
        self.end <= self.start
    }

    pub fn matches<R: ActiveInterval>(&self, ride: &R) -> bool {
        let rs = MinuteOfDay::from_instant(&ride.start_time(), &self.tz);
        let re = MinuteOfDay::from_instant(&ride.end_time(), &self.tz);

        if self.is_single_point() {
            let point = self.start;
            if re > rs {
                rs <= point && point <= re
            } else {
                point >= rs || point <= re
            }
        } else {
            intervals_overlap(split_interval(self.start, self.end), split_interval(rs, re))
        }
    }

    /// Keeps the rides that overlap this window, in their original order.
    pub fn filter<R, I>(&self, rides: I) -> Vec<R>
    where
        R: ActiveInterval,
        I: IntoIterator<Item = R>,
    {
        rides.into_iter().filter(|ride| self.matches(ride)).collect()
    }
}

/// Parses the two clock strings and filters `rides` by the resulting window.
pub fn filter_rides_by_time_window<R, I>(
    rides: I,
    start: &str,
    end: &str,
    tz: Tz,
) -> Result<Vec<R>, TimeWindowError>
where
    R: ActiveInterval,
    I: IntoIterator<Item = R>,
{
    let window = TimeWindow::from_clock_strings(start, end, tz)?;
    debug!(
        "Filtering rides by time of day {}..{} ({})",
        window.start.get(),
        window.end.get(),
        tz
    );
    Ok(window.filter(rides))
}

/// Parses an IANA timezone name such as `America/New_York`.
pub fn parse_timezone(name: &str) -> Result<Tz, TimeWindowError> {
    name.parse::<Tz>()
        .map_err(|_| TimeWindowError::InvalidTimezone(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    #[derive(Debug, Clone, PartialEq)]
    struct Span {
        label: &'static str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    }

    impl ActiveInterval for Span {
        fn start_time(&self) -> DateTime<Utc> {
            self.start
        }

        fn end_time(&self) -> DateTime<Utc> {
            self.end
        }
    }

    fn local(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        New_York
            .with_ymd_and_hms(2024, 1, day, hour, minute, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn span(label: &'static str, start: DateTime<Utc>, end: DateTime<Utc>) -> Span {
        Span { label, start, end }
    }

    fn window(start: &str, end: &str) -> TimeWindow {
        TimeWindow::from_clock_strings(start, end, New_York).unwrap()
    }

    #[test]
    fn parses_twelve_hour_clock_times() {
        assert_eq!(MinuteOfDay::parse_clock_time("12:00 AM").unwrap().get(), 0);
        assert_eq!(MinuteOfDay::parse_clock_time("2:30 PM").unwrap().get(), 870);
        assert_eq!(MinuteOfDay::parse_clock_time(" 11:59 pm ").unwrap().get(), 1439);
        assert_eq!(MinuteOfDay::parse_clock_time("12:15 PM").unwrap().get(), 735);
    }

    #[test]
    fn rejects_malformed_clock_times() {
        for bad in ["", "14:30", "25:00 PM", "2:30", "noon", "2:61 PM"] {
            assert_eq!(
                MinuteOfDay::parse_clock_time(bad),
                Err(TimeWindowError::InvalidClockTime(bad.to_string())),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn minute_of_day_is_bounded() {
        assert!(MinuteOfDay::new(1439).is_some());
        assert!(MinuteOfDay::new(1440).is_none());
    }

    #[test]
    fn projects_instants_into_reference_zone() {
        // 03:15 UTC on a January day is 22:15 the previous evening in New York.
        let instant = Utc.with_ymd_and_hms(2024, 1, 2, 3, 15, 0).unwrap();
        assert_eq!(MinuteOfDay::from_instant(&instant, &New_York).get(), 22 * 60 + 15);
    }

    #[test]
    fn same_day_ride_contains_any_inner_window() {
        let ride = span("day", local(1, 8, 0), local(1, 18, 0));
        let inner = [
            ("8:00 AM", "6:00 PM"),
            ("9:00 AM", "10:00 AM"),
            ("12:00 PM", "12:30 PM"),
            ("5:59 PM", "6:00 PM"),
            ("1:00 PM", "1:00 PM"),
        ];
        for (start, end) in inner {
            assert!(window(start, end).matches(&ride), "{start}..{end}");
        }
    }

    #[test]
    fn wrapping_ride_matches_point_and_wrapping_window() {
        let ride = span("late", local(1, 23, 0), local(2, 1, 0));
        assert!(window("12:30 AM", "12:30 AM").matches(&ride));
        assert!(window("11:30 PM", "12:30 AM").matches(&ride));
    }

    #[test]
    fn touching_endpoints_do_not_overlap() {
        let ride = span("ten", local(1, 10, 0), local(1, 11, 0));
        assert!(!window("9:00 AM", "10:00 AM").matches(&ride));
    }

    #[test]
    fn wrapping_window_matches_post_midnight_segment() {
        let early = span("early", local(1, 1, 0), local(1, 3, 0));
        let morning = span("morning", local(1, 5, 0), local(1, 6, 0));
        let overnight = window("10:00 PM", "2:00 AM");
        assert!(overnight.wraps_midnight());
        assert!(overnight.matches(&early));
        assert!(!overnight.matches(&morning));
    }

    #[test]
    fn midnight_point_matches_ride_wrapping_into_midnight() {
        let ride = span("straddle", local(1, 23, 30), local(2, 0, 30));
        let midnight = window("12:00 AM", "12:00 AM");
        assert_eq!(midnight.start().get(), 0);
        assert!(midnight.matches(&ride));
    }

    #[test]
    fn point_queries_are_closed_at_ride_boundaries() {
        let late = span("late", local(1, 23, 0), local(2, 1, 0));
        assert!(window("11:30 PM", "11:30 PM").matches(&late));

        let morning = span("morning", local(1, 9, 0), local(1, 10, 0));
        assert!(window("10:00 AM", "10:00 AM").matches(&morning));
        assert!(window("9:00 AM", "9:00 AM").matches(&morning));
        assert!(!window("10:01 AM", "10:01 AM").matches(&morning));
    }

    #[test]
    fn point_query_outside_wrapping_ride_does_not_match() {
        let ride = span("late", local(1, 23, 0), local(2, 1, 0));
        assert!(!window("12:00 PM", "12:00 PM").matches(&ride));
        assert!(!window("1:01 AM", "1:01 AM").matches(&ride));
    }

    #[test]
    fn filter_preserves_input_order() {
        let rides = vec![
            span("a", local(1, 14, 0), local(1, 15, 0)),
            span("b", local(1, 6, 0), local(1, 7, 0)),
            span("c", local(3, 13, 30), local(3, 14, 30)),
            span("d", local(2, 15, 30), local(2, 17, 0)),
        ];
        let kept = filter_rides_by_time_window(rides.clone(), "2:00 PM", "4:00 PM", New_York).unwrap();
        let labels: Vec<_> = kept.iter().map(|r| r.label).collect();
        assert_eq!(labels, vec!["a", "c", "d"]);
        // Borrowed input is left untouched.
        let by_ref = window("2:00 PM", "4:00 PM").filter(&rides);
        assert_eq!(by_ref.len(), 3);
        assert_eq!(rides.len(), 4);
    }

    #[test]
    fn malformed_window_is_an_error() {
        let rides: Vec<Span> = Vec::new();
        assert!(matches!(
            filter_rides_by_time_window(rides, "2pm", "4:00 PM", New_York),
            Err(TimeWindowError::InvalidClockTime(_))
        ));
    }

    #[test]
    fn parses_timezone_names() {
        assert_eq!(parse_timezone("America/New_York").unwrap(), New_York);
        assert!(parse_timezone("Mars/Olympus_Mons").is_err());
    }
}
