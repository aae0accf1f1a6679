use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::CompletedTask;
use crate::utils::DATE_FORMAT;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Invalid {field} '{value}': {source}")]
    InvalidTimestamp {
        field: &'static str,
        value: String,
        source: chrono::ParseError,
    },
    #[error("Failed to create data directory: {0}")]
    DirectoryError(String),
}

/// A reminder as it is stored in the calendar file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReminderRecord {
    pub title: String,
    pub start_time: String, // YYYY-MM-DD HH:MM
    pub end_time: String,   // YYYY-MM-DD HH:MM
    pub repetitions: Vec<String>,
    pub bank_holiday_adjustment: bool,
    pub permanent_offset: bool,
}

/// Top-level layout of the calendar file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarRecord {
    pub reminders: Vec<ReminderRecord>,
    pub completed_tasks: Vec<CompletedTask>,
}

/// Per-reminder counters captured by the daily completion snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub title: String,
    pub date: NaiveDate,
    pub trigger_count: u32,
    pub done_count: u32,
}

/// File name of the completion snapshot for `date`
pub fn snapshot_file_name(date: NaiveDate) -> String {
    format!("completion_data_{}.json", date.format(DATE_FORMAT))
}

/// Path of the completion snapshot for `date` inside `dir`
pub fn snapshot_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(snapshot_file_name(date))
}

pub fn save_calendar_record(path: &Path, record: &CalendarRecord) -> Result<(), StorageError> {
    write_json(path, record)?;
    log::debug!(
        "Saved {} reminders and {} completed tasks to {}",
        record.reminders.len(),
        record.completed_tasks.len(),
        path.display()
    );
    Ok(())
}

pub fn load_calendar_record(path: &Path) -> Result<CalendarRecord, StorageError> {
    let record: CalendarRecord = read_json(path)?;
    log::debug!(
        "Loaded {} reminders from {}",
        record.reminders.len(),
        path.display()
    );
    Ok(record)
}

pub fn write_snapshot(path: &Path, records: &[CompletionRecord]) -> Result<(), StorageError> {
    write_json(path, &records)
}

#[cfg(test)]
pub(crate) fn read_snapshot(path: &Path) -> Result<Vec<CompletionRecord>, StorageError> {
    read_json(path)
}

/// Overwrite `path` with pretty-printed JSON, creating the parent directory if needed
fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .map_err(|e| StorageError::DirectoryError(e.to_string()))?;
        }
    }

    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
