use chrono::NaiveDate;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{CompletedTask, Reminder};
use crate::storage::{self, CalendarRecord, CompletionRecord, StorageError};
use crate::utils::parse_time;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("Reminder not found: {0}")]
    NotFound(String),
    #[error("Failed to parse time '{input}' (expected HH:MM): {source}")]
    InvalidTime {
        input: String,
        source: chrono::ParseError,
    },
    #[error("Input ended before the reminder was complete")]
    UnexpectedEof,
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}

/// The reminder collection and its completion log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Calendar {
    pub reminders: Vec<Reminder>,
    pub completed_tasks: Vec<CompletedTask>,
}

impl Calendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_reminder(&mut self, reminder: Reminder) {
        log::debug!("Adding reminder '{}'", reminder.title);
        self.reminders.push(reminder);
    }

    /// Prompt for a title and an HH:MM window, then add a reminder scheduled on `today`
    pub fn add_reminder_interactive<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
        today: NaiveDate,
    ) -> Result<&Reminder, CalendarError> {
        writeln!(output, "Adding a new reminder:")?;
        let title = prompt(input, output, "Enter the title: ")?;
        let start = prompt_time(input, output, "Enter the start time (HH:MM): ")?;
        let end = prompt_time(input, output, "Enter the end time (HH:MM): ")?;

        self.add_reminder(Reminder::new(title, today, start, end));
        writeln!(output, "Reminder added successfully!")?;

        let index = self.reminders.len() - 1;
        Ok(&self.reminders[index])
    }

    /// Remove the first reminder equal to `reminder`
    pub fn remove_reminder(&mut self, reminder: &Reminder) -> Result<Reminder, CalendarError> {
        let index = self.position_of(reminder)?;
        let removed = self.reminders.remove(index);
        log::debug!("Removed reminder '{}'", removed.title);
        Ok(removed)
    }

    /// Mark the first reminder equal to `reminder` as done and log the completion
    pub fn mark_reminder_as_done(
        &mut self,
        reminder: &Reminder,
        today: NaiveDate,
    ) -> Result<(), CalendarError> {
        let index = self.position_of(reminder)?;
        let target = &mut self.reminders[index];
        target.mark_as_done();
        self.completed_tasks.push(CompletedTask {
            title: target.title.clone(),
            date: today,
        });
        log::info!("Marked '{}' as done on {}", target.title, today);
        Ok(())
    }

    /// Index of the first reminder titled exactly `title`
    pub fn find_by_title(&self, title: &str) -> Option<usize> {
        self.reminders.iter().position(|r| r.title == title)
    }

    pub fn completion_snapshot(&self, today: NaiveDate) -> Vec<CompletionRecord> {
        self.reminders
            .iter()
            .map(|r| CompletionRecord {
                title: r.title.clone(),
                date: today,
                trigger_count: r.trigger_count,
                done_count: r.done_count,
            })
            .collect()
    }

    /// Write today's counters to `completion_data_<today>.json` in `dir` and
    /// re-arm every reminder for the next day. Returns the written path.
    pub fn save_completion_data(
        &mut self,
        dir: &Path,
        today: NaiveDate,
    ) -> Result<PathBuf, CalendarError> {
        let snapshot = self.completion_snapshot(today);
        for reminder in &mut self.reminders {
            reminder.triggered = false;
        }

        let path = storage::snapshot_path(dir, today);
        storage::write_snapshot(&path, &snapshot)?;
        log::info!(
            "Saved completion data for {} reminders to {}",
            snapshot.len(),
            path.display()
        );
        Ok(path)
    }

    /// Copy the unpersisted state (done, triggered, counters) over from `previous`.
    /// Each reminder takes it from the first unclaimed reminder with the same stored fields;
    /// reminders with no match keep their fresh state.
    pub fn carry_runtime_state_from(&mut self, previous: &Calendar) {
        let mut claimed = vec![false; previous.reminders.len()];
        for reminder in &mut self.reminders {
            let stored = reminder.serialize();
            let found = previous
                .reminders
                .iter()
                .enumerate()
                .find(|(i, old)| !claimed[*i] && old.serialize() == stored);
            if let Some((i, old)) = found {
                claimed[i] = true;
                reminder.done = old.done;
                reminder.triggered = old.triggered;
                reminder.trigger_count = old.trigger_count;
                reminder.done_count = old.done_count;
            }
        }
    }

    /// Mark done every reminder whose title appears in the completion log
    pub fn apply_completion_log(&mut self) {
        for reminder in &mut self.reminders {
            if !reminder.done && self.completed_tasks.iter().any(|t| t.title == reminder.title) {
                reminder.mark_as_done();
            }
        }
    }

    pub fn serialize(&self) -> CalendarRecord {
        CalendarRecord {
            reminders: self.reminders.iter().map(Reminder::serialize).collect(),
            completed_tasks: self.completed_tasks.clone(),
        }
    }

    pub fn deserialize(record: &CalendarRecord) -> Result<Self, StorageError> {
        let reminders = record
            .reminders
            .iter()
            .map(Reminder::deserialize)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            reminders,
            completed_tasks: record.completed_tasks.clone(),
        })
    }

    pub fn save_reminders_to_file(&self, path: &Path) -> Result<(), StorageError> {
        storage::save_calendar_record(path, &self.serialize())
    }

    pub fn load_reminders_from_file(path: &Path) -> Result<Self, StorageError> {
        let record = storage::load_calendar_record(path)?;
        Self::deserialize(&record)
    }

    fn position_of(&self, reminder: &Reminder) -> Result<usize, CalendarError> {
        self.reminders
            .iter()
            .position(|r| r == reminder)
            .ok_or_else(|| CalendarError::NotFound(reminder.title.clone()))
    }
}

fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> Result<String, CalendarError> {
    write!(output, "{}", label)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(CalendarError::UnexpectedEof);
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn prompt_time<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    label: &str,
) -> Result<chrono::NaiveTime, CalendarError> {
    let answer = prompt(input, output, label)?;
    parse_time(&answer).map_err(|source| CalendarError::InvalidTime {
        input: answer,
        source,
    })
}
