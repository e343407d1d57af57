pub mod time_window;

pub use time_window::{
    filter_rides_by_time_window, parse_timezone, MinuteOfDay, TimeWindow, TimeWindowError,
    CLOCK_TIME_FORMAT, MINUTES_IN_DAY,
};
