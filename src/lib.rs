pub mod calendar;
pub mod cli;
pub mod config;
pub mod models;
pub mod scheduler;
pub mod storage;
pub mod utils;
pub mod views;

pub use calendar::Calendar;
pub use config::Config;
pub use models::{CompletedTask, Reminder};
pub use scheduler::{Clock, Scheduler, SystemClock};
pub use utils::Profile;
