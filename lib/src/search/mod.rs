// lib/src/search/mod.rs

pub mod search_plan;

pub use search_plan::{
    date_window_range, decode_date, whole_day, SearchError, SearchParams, SearchPlan,
    DEFAULT_WINDOW_END, DEFAULT_WINDOW_START,
};
