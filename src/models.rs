use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::scheduler::Clock;
use crate::storage::{ReminderRecord, StorageError};
use crate::utils::TIMESTAMP_FORMAT;

#[derive(Debug, Clone, PartialEq)]
pub struct Reminder {
    pub title: String,
    pub scheduled_date: NaiveDate,   // day bucket for the views
    pub window_start: NaiveTime,     // notification window, time-of-day only
    pub window_end: NaiveTime,
    pub done: bool,
    pub triggered: bool,             // latched until the daily snapshot resets it
    pub trigger_count: u32,
    pub done_count: u32,
    pub repetitions: Vec<String>,    // weekday names, not expanded
    pub bank_holiday_adjustment: bool,
    pub permanent_offset: bool,
}

/// One entry of the completion log, appended each time a reminder is marked done
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedTask {
    pub title: String,
    pub date: NaiveDate,
}

impl Reminder {
    /// Window bounds are truncated to the minute, which is all the calendar file keeps.
    pub fn new(
        title: String,
        scheduled_date: NaiveDate,
        window_start: NaiveTime,
        window_end: NaiveTime,
    ) -> Self {
        Self {
            title,
            scheduled_date,
            window_start: truncate_to_minute(window_start),
            window_end: truncate_to_minute(window_end),
            done: false,
            triggered: false,
            trigger_count: 0,
            done_count: 0,
            repetitions: Vec::new(),
            bank_holiday_adjustment: false,
            permanent_offset: false,
        }
    }

    /// Build a reminder from a start/end timestamp pair.
    /// The start's date becomes the scheduled day; only the end's time-of-day is kept.
    pub fn from_datetimes(title: String, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        if end.date() != start.date() {
            log::debug!(
                "Reminder '{}' ends on {} but is scheduled on {}; keeping the end time only",
                title,
                end.date(),
                start.date()
            );
        }
        Self::new(title, start.date(), start.time(), end.time())
    }

    pub fn start_datetime(&self) -> NaiveDateTime {
        self.scheduled_date.and_time(self.window_start)
    }

    pub fn end_datetime(&self) -> NaiveDateTime {
        self.scheduled_date.and_time(self.window_end)
    }

    /// Whether `time` falls inside the inclusive notification window
    pub fn is_due_at(&self, time: NaiveTime) -> bool {
        self.window_start <= time && time <= self.window_end
    }

    /// Check the reminder against the clock's current time-of-day
    pub fn check_notification(&mut self, clock: &dyn Clock) -> bool {
        self.check_notification_at(clock.time_of_day())
    }

    /// Fire the reminder if `time` is inside its window and it has not fired yet.
    /// Returns true when a notification was printed.
    pub fn check_notification_at(&mut self, time: NaiveTime) -> bool {
        if self.triggered || !self.is_due_at(time) {
            return false;
        }

        println!("Reminder: {} - It's time!", self.title);
        self.triggered = true;
        self.trigger_count += 1;
        if self.done {
            self.done_count += 1;
        }
        log::info!(
            "Reminder '{}' fired at {} (triggers: {}, done: {})",
            self.title,
            time.format("%H:%M:%S"),
            self.trigger_count,
            self.done_count
        );
        true
    }

    pub fn mark_as_done(&mut self) {
        self.done = true;
    }

    /// Convert to the on-disk record. Status flags and counters are not persisted.
    pub fn serialize(&self) -> ReminderRecord {
        ReminderRecord {
            title: self.title.clone(),
            start_time: self.start_datetime().format(TIMESTAMP_FORMAT).to_string(),
            end_time: self.end_datetime().format(TIMESTAMP_FORMAT).to_string(),
            repetitions: self.repetitions.clone(),
            bank_holiday_adjustment: self.bank_holiday_adjustment,
            permanent_offset: self.permanent_offset,
        }
    }

    /// Rebuild a reminder from its on-disk record, with fresh status and counters
    pub fn deserialize(record: &ReminderRecord) -> Result<Self, StorageError> {
        let start = parse_timestamp("start_time", &record.start_time)?;
        let end = parse_timestamp("end_time", &record.end_time)?;

        let mut reminder = Self::from_datetimes(record.title.clone(), start, end);
        reminder.repetitions = record.repetitions.clone();
        reminder.bank_holiday_adjustment = record.bank_holiday_adjustment;
        reminder.permanent_offset = record.permanent_offset;
        Ok(reminder)
    }
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<NaiveDateTime, StorageError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|source| {
        StorageError::InvalidTimestamp {
            field,
            value: value.to_string(),
            source,
        }
    })
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}
