use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, SystemTime};
use thiserror::Error;

use crate::calendar::{Calendar, CalendarError};
use crate::config::Config;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Calendar error: {0}")]
    CalendarError(#[from] CalendarError),
}

/// Source of the current local time
pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    fn time_of_day(&self) -> NaiveTime {
        self.now().time()
    }
}

/// Wall clock in the local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Run the notification check for every reminder whose window contains `time`.
/// Returns how many reminders fired.
pub fn poll(calendar: &mut Calendar, time: NaiveTime) -> usize {
    calendar
        .reminders
        .iter_mut()
        .filter(|r| r.is_due_at(time))
        .map(|r| r.check_notification_at(time))
        .filter(|fired| *fired)
        .count()
}

/// Size and modification time, enough to notice another process saving the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl FileStamp {
    fn read(path: &Path) -> Option<Self> {
        let metadata = fs::metadata(path).ok()?;
        Some(Self {
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }
}

struct WatchedFile {
    path: PathBuf,
    stamp: Option<FileStamp>,
}

/// Polling loop over a calendar. Also takes the daily completion snapshot
/// when the date changes between two ticks, and picks up edits to the
/// calendar file made by other commands.
pub struct Scheduler<C: Clock> {
    clock: C,
    interval: Duration,
    snapshot_dir: PathBuf,
    snapshot_on_rollover: bool,
    current_date: NaiveDate,
    calendar_file: Option<WatchedFile>,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(
        clock: C,
        interval: Duration,
        snapshot_dir: PathBuf,
        snapshot_on_rollover: bool,
    ) -> Self {
        let current_date = clock.today();
        Self {
            clock,
            interval,
            snapshot_dir,
            snapshot_on_rollover,
            current_date,
            calendar_file: None,
        }
    }

    /// Reload the calendar from `path` on every tick where the file has changed.
    /// Done flags, latches and counters survive the reload, and reminders named in
    /// the completion log are marked done.
    pub fn watch_file(mut self, path: PathBuf) -> Self {
        self.calendar_file = Some(WatchedFile { path, stamp: None });
        self
    }

    pub fn from_config(clock: C, config: &Config) -> Self {
        Self::new(
            clock,
            config.poll_interval(),
            config.get_snapshot_dir(),
            config.snapshot_on_rollover,
        )
    }

    #[cfg(test)]
    fn clock(&self) -> &C {
        &self.clock
    }

    /// One polling step: pick up file changes, handle a date rollover,
    /// then check every due reminder
    pub fn tick(&mut self, calendar: &mut Calendar) -> Result<usize, SchedulerError> {
        self.reload_if_changed(calendar);
        let now = self.clock.now();

        if now.date() != self.current_date {
            let finished = self.current_date;
            self.current_date = now.date();
            if self.snapshot_on_rollover {
                log::info!("Day rolled over from {} to {}", finished, self.current_date);
                calendar.save_completion_data(&self.snapshot_dir, finished)?;
            } else {
                log::debug!("Day rolled over from {}; snapshots disabled", finished);
            }
        }

        Ok(poll(calendar, now.time()))
    }

    fn reload_if_changed(&mut self, calendar: &mut Calendar) {
        let Some(watched) = self.calendar_file.as_mut() else {
            return;
        };

        let stamp = FileStamp::read(&watched.path);
        if stamp.is_none() || stamp == watched.stamp {
            return;
        }
        watched.stamp = stamp;

        match Calendar::load_reminders_from_file(&watched.path) {
            Ok(mut fresh) => {
                fresh.carry_runtime_state_from(calendar);
                fresh.apply_completion_log();
                log::info!(
                    "Reloaded {} reminders from {}",
                    fresh.reminders.len(),
                    watched.path.display()
                );
                *calendar = fresh;
            }
            Err(e) => {
                log::warn!(
                    "Keeping current reminders, failed to reload {}: {}",
                    watched.path.display(),
                    e
                );
            }
        }
    }

    /// Tick forever, sleeping for the configured interval in between.
    /// Only returns if a snapshot cannot be written.
    pub fn start_clock(&mut self, calendar: &mut Calendar) -> Result<(), SchedulerError> {
        log::info!(
            "Watching {} reminders every {}s",
            calendar.reminders.len(),
            self.interval.as_secs()
        );
        loop {
            let fired = self.tick(calendar)?;
            if fired > 0 {
                log::debug!("{} reminder(s) fired", fired);
            }
            thread::sleep(self.interval);
        }
    }
}
