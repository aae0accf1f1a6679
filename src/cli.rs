use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::calendar::{Calendar, CalendarError};
use crate::config::Config;
use crate::models::Reminder;
use crate::scheduler::{Scheduler, SchedulerError, SystemClock};
use crate::storage::StorageError;
use crate::utils::{TIME_FORMAT, parse_date, parse_time, split_list};
use crate::views;

#[derive(Parser)]
#[command(name = "organizer")]
#[command(about = "Regular Organizer - personal reminders and calendar in the terminal")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Use development mode (uses separate dev config/data)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a reminder
    Add(AddArgs),
    /// Add a reminder for today by answering prompts
    AddInteractive,
    /// Remove the first reminder with this title
    Remove {
        title: String,
    },
    /// Mark the first reminder with this title as done
    Done {
        title: String,
    },
    /// Show the current week (default if no subcommand)
    Week,
    /// Show every reminder scheduled on a day
    Day {
        /// Day to show (YYYY-MM-DD), defaults to today
        date: Option<String>,
    },
    /// Poll the clock and print reminders as they come due.
    /// Reloads the calendar file when other commands change it and writes
    /// the completion snapshot when the day rolls over.
    Watch,
    /// Run the sample workflow against files in a directory
    Demo {
        /// Directory for the sample calendar and snapshot files
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// Reminder title
    pub title: String,
    /// Scheduled date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub date: Option<String>,
    /// Window start (HH:MM)
    #[arg(long)]
    pub start: String,
    /// Window end (HH:MM)
    #[arg(long)]
    pub end: String,
    /// Comma-separated weekday names
    #[arg(long)]
    pub repeat: Option<String>,
    /// Flag the reminder for bank holiday adjustment
    #[arg(long)]
    pub bank_holiday: bool,
    /// Flag the reminder as permanently offset
    #[arg(long)]
    pub permanent_offset: bool,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Calendar error: {0}")]
    CalendarError(#[from] CalendarError),
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
    #[error("Scheduler error: {0}")]
    SchedulerError(#[from] SchedulerError),
    #[error("Failed to parse date: {0}")]
    DateParseError(String),
    #[error("Failed to parse time: {0}")]
    TimeParseError(String),
    #[error("No reminder titled '{0}'")]
    UnknownTitle(String),
    #[error("Failed to encode calendar: {0}")]
    EncodeError(#[from] serde_json::Error),
}

/// Load the calendar file, treating a missing file as an empty calendar
pub fn load_calendar(path: &Path) -> Result<Calendar, CliError> {
    if path.exists() {
        Ok(Calendar::load_reminders_from_file(path)?)
    } else {
        log::debug!("No calendar at {}, starting empty", path.display());
        Ok(Calendar::new())
    }
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, CliError> {
    parse_date(value)
        .map_err(|e| CliError::DateParseError(format!("Invalid date format '{}': {}", value, e)))
}

fn parse_time_arg(value: &str) -> Result<chrono::NaiveTime, CliError> {
    parse_time(value)
        .map_err(|e| CliError::TimeParseError(format!("Invalid time format '{}': {}", value, e)))
}

fn reminder_by_title(calendar: &Calendar, title: &str) -> Result<Reminder, CliError> {
    calendar
        .find_by_title(title)
        .map(|index| calendar.reminders[index].clone())
        .ok_or_else(|| CliError::UnknownTitle(title.to_string()))
}

/// Handle the add command
pub fn handle_add(
    calendar: &mut Calendar,
    args: AddArgs,
    today: NaiveDate,
) -> Result<(), CliError> {
    let scheduled_date = match args.date {
        Some(ref date_str) => parse_date_arg(date_str)?,
        None => today,
    };

    let mut reminder = Reminder::new(
        args.title,
        scheduled_date,
        parse_time_arg(&args.start)?,
        parse_time_arg(&args.end)?,
    );
    reminder.repetitions = args.repeat.as_deref().map(split_list).unwrap_or_default();
    reminder.bank_holiday_adjustment = args.bank_holiday;
    reminder.permanent_offset = args.permanent_offset;

    println!(
        "Reminder '{}' added for {} {}-{}",
        reminder.title,
        reminder.scheduled_date,
        reminder.window_start.format(TIME_FORMAT),
        reminder.window_end.format(TIME_FORMAT)
    );
    calendar.add_reminder(reminder);
    Ok(())
}

/// Handle the add-interactive command
pub fn handle_add_interactive(calendar: &mut Calendar, today: NaiveDate) -> Result<(), CliError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    calendar.add_reminder_interactive(&mut input, &mut output, today)?;
    Ok(())
}

/// Handle the remove command
pub fn handle_remove(calendar: &mut Calendar, title: &str) -> Result<(), CliError> {
    let reminder = reminder_by_title(calendar, title)?;
    calendar.remove_reminder(&reminder)?;
    println!("Reminder '{}' removed.", title);
    Ok(())
}

/// Handle the done command
pub fn handle_done(
    calendar: &mut Calendar,
    title: &str,
    today: NaiveDate,
) -> Result<(), CliError> {
    let reminder = reminder_by_title(calendar, title)?;
    calendar.mark_reminder_as_done(&reminder, today)?;
    println!("Reminder marked as done.");
    Ok(())
}

/// Handle the day command
pub fn handle_day(
    calendar: &Calendar,
    date: Option<String>,
    today: NaiveDate,
) -> Result<(), CliError> {
    let day = match date {
        Some(date_str) => parse_date_arg(&date_str)?,
        None => today,
    };
    views::display_day_breakdown(calendar, day);
    Ok(())
}

/// Handle the watch command. Blocks until the process is killed.
pub fn handle_watch(calendar: &mut Calendar, config: &Config) -> Result<(), CliError> {
    let mut scheduler =
        Scheduler::from_config(SystemClock, config).watch_file(config.get_reminders_path());
    scheduler.start_clock(calendar)?;
    Ok(())
}

/// Handle the demo command: sample reminders, save, reload, views, completion and snapshot
pub fn handle_demo(dir: &Path, today: NaiveDate) -> Result<(), CliError> {
    let mut calendar = Calendar::new();
    for reminder in sample_reminders() {
        calendar.add_reminder(reminder);
    }

    let calendar_path = dir.join("reminders.json");
    calendar.save_reminders_to_file(&calendar_path)?;

    let loaded = Calendar::load_reminders_from_file(&calendar_path)?;
    views::display_weekly_calendar(&loaded, today);

    views::display_day_breakdown(&calendar, sample_datetime(7, 0).date());

    let meeting = reminder_by_title(&calendar, "Meeting")?;
    calendar.mark_reminder_as_done(&meeting, today)?;
    println!("Reminder marked as done.");

    let snapshot = calendar.save_completion_data(dir, today)?;
    println!("Completion data saved to {}.", snapshot.display());

    let record = calendar.serialize();
    println!("\nSerialized Calendar:\n{}", serde_json::to_string_pretty(&record)?);

    let restored = Calendar::deserialize(&record)?;
    log::debug!("Deserialized {} reminders", restored.reminders.len());
    Ok(())
}

fn sample_datetime(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 6, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .expect("valid sample date")
}

/// The three reminders used by the demo workflow
pub fn sample_reminders() -> Vec<Reminder> {
    let meeting = Reminder::from_datetimes(
        "Meeting".to_string(),
        sample_datetime(7, 14),
        sample_datetime(7, 15),
    );

    let mut exercise = Reminder::from_datetimes(
        "Exercise".to_string(),
        sample_datetime(8, 8),
        sample_datetime(8, 9),
    );
    exercise.repetitions = vec![
        "Monday".to_string(),
        "Wednesday".to_string(),
        "Friday".to_string(),
    ];

    let mut bins = Reminder::from_datetimes(
        "Bin Collection".to_string(),
        sample_datetime(9, 9),
        sample_datetime(9, 10),
    );
    bins.bank_holiday_adjustment = true;
    bins.permanent_offset = true;

    vec![meeting, exercise, bins]
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 6, 7).unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_flags() {
        let cli = Cli::try_parse_from([
            "organizer", "add", "Exercise", "--date", "2023-06-08", "--start", "08:00",
            "--end", "09:00", "--repeat", "Monday,Friday", "--bank-holiday",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Add(args)) => {
                assert_eq!(args.title, "Exercise");
                assert_eq!(args.date.as_deref(), Some("2023-06-08"));
                assert_eq!(args.repeat.as_deref(), Some("Monday,Friday"));
                assert!(args.bank_holiday);
                assert!(!args.permanent_offset);
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn add_builds_reminder() {
        let mut calendar = Calendar::new();
        let args = AddArgs {
            title: "Exercise".to_string(),
            date: None,
            start: "08:00".to_string(),
            end: "09:00".to_string(),
            repeat: Some("Monday, Friday".to_string()),
            bank_holiday: false,
            permanent_offset: true,
        };
        handle_add(&mut calendar, args, today()).unwrap();

        let reminder = &calendar.reminders[0];
        assert_eq!(reminder.scheduled_date, today());
        assert_eq!(reminder.repetitions, vec!["Monday", "Friday"]);
        assert!(reminder.permanent_offset);
    }

    #[test]
    fn add_rejects_bad_time() {
        let mut calendar = Calendar::new();
        let args = AddArgs {
            title: "X".to_string(),
            date: None,
            start: "8am".to_string(),
            end: "09:00".to_string(),
            repeat: None,
            bank_holiday: false,
            permanent_offset: false,
        };
        let result = handle_add(&mut calendar, args, today());
        assert!(matches!(result, Err(CliError::TimeParseError(_))));
        assert!(calendar.reminders.is_empty());
    }

    #[test]
    fn done_and_remove_address_by_title() {
        let mut calendar = Calendar::new();
        for reminder in sample_reminders() {
            calendar.add_reminder(reminder);
        }

        handle_done(&mut calendar, "Exercise", today()).unwrap();
        assert!(calendar.reminders[1].done);
        assert_eq!(calendar.completed_tasks.len(), 1);

        handle_remove(&mut calendar, "Meeting").unwrap();
        assert_eq!(calendar.reminders.len(), 2);

        assert!(matches!(
            handle_remove(&mut calendar, "Meeting"),
            Err(CliError::UnknownTitle(_))
        ));
    }

    #[test]
    fn completion_snapshots_come_only_from_watch() {
        assert!(Cli::try_parse_from(["organizer", "snapshot"]).is_err());
        assert!(matches!(
            Cli::try_parse_from(["organizer", "watch"]).unwrap().command,
            Some(Commands::Watch)
        ));
    }

    #[test]
    fn missing_calendar_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let calendar = load_calendar(&dir.path().join("reminders.json")).unwrap();
        assert!(calendar.reminders.is_empty());
    }

    #[test]
    fn demo_writes_calendar_and_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        handle_demo(dir.path(), today()).unwrap();

        let saved = Calendar::load_reminders_from_file(&dir.path().join("reminders.json")).unwrap();
        assert_eq!(saved.reminders.len(), 3);
        assert!(dir.path().join("completion_data_2023-06-07.json").exists());
    }
}
