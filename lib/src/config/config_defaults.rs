// lib/src/config/config_defaults.rs

use std::path::PathBuf;

pub const DEFAULT_CONFIG_FILE: &str = "yideshare";
pub const ENV_PREFIX: &str = "YIDESHARE";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_TIMEZONE: &str = "America/New_York";
pub const DEFAULT_FEED_LIMIT: usize = 500;

pub const DEFAULT_JWT_EXPIRES_IN: &str = "1h";
pub const DEFAULT_CAS_URL: &str = "https://secure-tst.its.yale.edu/cas";
pub const DEFAULT_DIRECTORY_URL: &str = "https://api.yalies.io/v2";

pub const DEFAULT_DATA_DIRECTORY: &str = "./data/yideshare";

pub fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

pub fn default_port() -> u16 {
    DEFAULT_PORT
}

pub fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

pub fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

pub fn default_feed_limit() -> usize {
    DEFAULT_FEED_LIMIT
}

pub fn default_jwt_expires_in() -> String {
    DEFAULT_JWT_EXPIRES_IN.to_string()
}

pub fn default_cas_url() -> String {
    DEFAULT_CAS_URL.to_string()
}

pub fn default_directory_url() -> String {
    DEFAULT_DIRECTORY_URL.to_string()
}

pub fn default_data_directory() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIRECTORY)
}
