use chrono::{NaiveDate, NaiveTime};
use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Date format used for completion logs and snapshot file names
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Time-of-day format used for reminder windows
pub const TIME_FORMAT: &str = "%H:%M";

/// Timestamp format used in the calendar file
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

impl Profile {
    fn app_name(self) -> &'static str {
        match self {
            Profile::Dev => "organizer-dev",
            Profile::Prod => "organizer",
        }
    }
}

/// Get the configuration directory path for the organizer
/// If profile is Dev, uses "organizer-dev" instead of "organizer"
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "organizer", profile.app_name())
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the data directory path for the organizer
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "organizer", profile.app_name())
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Parse a date string in ISO 8601 format (YYYY-MM-DD)
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str.trim(), DATE_FORMAT)
}

/// Parse a time-of-day string (HH:MM)
pub fn parse_time(time_str: &str) -> Result<NaiveTime, chrono::ParseError> {
    NaiveTime::parse_from_str(time_str.trim(), TIME_FORMAT)
}

/// Split a comma-separated list, dropping empty entries
pub fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dates_and_times() {
        assert_eq!(parse_date("2023-06-07").unwrap(), NaiveDate::from_ymd_opt(2023, 6, 7).unwrap());
        assert_eq!(parse_time("14:30").unwrap(), NaiveTime::from_hms_opt(14, 30, 0).unwrap());
        assert_eq!(parse_time(" 08:05 ").unwrap(), NaiveTime::from_hms_opt(8, 5, 0).unwrap());
    }

    #[test]
    fn rejects_malformed_times() {
        assert!(parse_time("2pm").is_err());
        assert!(parse_time("25:00").is_err());
        assert!(parse_date("07/06/2023").is_err());
    }

    #[test]
    fn splits_comma_lists() {
        assert_eq!(
            split_list("Monday, Wednesday,,Friday "),
            vec!["Monday", "Wednesday", "Friday"]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn leaves_plain_paths_alone() {
        assert_eq!(expand_path("/tmp/reminders.json"), PathBuf::from("/tmp/reminders.json"));
    }
}
