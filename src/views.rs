//! Plain-text weekly and daily views of a calendar.

use chrono::{Datelike, Duration, NaiveDate};

use crate::calendar::Calendar;
use crate::models::Reminder;
use crate::utils::TIME_FORMAT;

/// Monday of the week containing `day`
pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_monday() as i64)
}

/// Monday through Sunday of the week containing `day`
pub fn week_days(day: NaiveDate) -> Vec<NaiveDate> {
    let start = week_start(day);
    (0..7).map(|offset| start + Duration::days(offset)).collect()
}

/// Reminders scheduled on `day`, ordered by window start
pub fn day_breakdown(calendar: &Calendar, day: NaiveDate) -> Vec<&Reminder> {
    let mut events: Vec<&Reminder> = calendar
        .reminders
        .iter()
        .filter(|r| r.scheduled_date == day)
        .collect();
    events.sort_by_key(|r| r.window_start);
    events
}

pub fn render_weekly_calendar(calendar: &Calendar, today: NaiveDate) -> String {
    let mut out = String::new();
    for day in week_days(today) {
        let titles: Vec<&str> = calendar
            .reminders
            .iter()
            .filter(|r| r.scheduled_date == day)
            .map(|r| r.title.as_str())
            .collect();
        out.push_str(&format!("{}\n", day.format("%A, %B %d, %Y")));
        out.push_str(&format!("\t {}\n\n", titles.join(", ")));
    }
    out
}

pub fn render_day_breakdown(calendar: &Calendar, day: NaiveDate) -> String {
    let mut out = String::new();
    for reminder in day_breakdown(calendar, day) {
        out.push_str(&format!("Title: {}\n", reminder.title));
        out.push_str(&format!("Start Time: {}\n", reminder.window_start.format(TIME_FORMAT)));
        out.push_str(&format!("End Time: {}\n", reminder.window_end.format(TIME_FORMAT)));
        out.push_str(&format!("Repetitions: {}\n", reminder.repetitions.join(", ")));
        out.push_str(&format!(
            "Bank Holiday Adjustment: {}\n",
            reminder.bank_holiday_adjustment
        ));
        out.push_str(&format!("Permanent Offset: {}\n\n", reminder.permanent_offset));
    }
    out
}

pub fn display_weekly_calendar(calendar: &Calendar, today: NaiveDate) {
    print!("{}", render_weekly_calendar(calendar, today));
}

pub fn display_day_breakdown(calendar: &Calendar, day: NaiveDate) {
    print!("{}", render_day_breakdown(calendar, day));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn reminder(title: &str, day: u32, start: u32, end: u32) -> Reminder {
        Reminder::new(title.to_string(), date(2023, 6, day), time(start, 0), time(end, 0))
    }

    fn sample_calendar() -> Calendar {
        let mut calendar = Calendar::new();
        calendar.add_reminder(reminder("Meeting", 7, 14, 15));
        let mut exercise = reminder("Exercise", 8, 8, 9);
        exercise.repetitions = vec![
            "Monday".to_string(),
            "Wednesday".to_string(),
            "Friday".to_string(),
        ];
        calendar.add_reminder(exercise);
        let mut bins = reminder("Bin Collection", 9, 9, 10);
        bins.bank_holiday_adjustment = true;
        bins.permanent_offset = true;
        calendar.add_reminder(bins);
        calendar
    }

    #[test]
    fn week_runs_monday_to_sunday() {
        // 2023-06-07 is a Wednesday
        let days = week_days(date(2023, 6, 7));
        assert_eq!(days.first(), Some(&date(2023, 6, 5)));
        assert_eq!(days.last(), Some(&date(2023, 6, 11)));
        assert_eq!(week_start(date(2023, 6, 5)), date(2023, 6, 5));
        assert_eq!(week_start(date(2023, 6, 11)), date(2023, 6, 5));
    }

    #[test]
    fn weekly_view_buckets_by_scheduled_date() {
        let text = render_weekly_calendar(&sample_calendar(), date(2023, 6, 7));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 21);
        assert_eq!(lines[0], "Monday, June 05, 2023");
        assert_eq!(lines[1], "\t ");
        assert_eq!(lines[6], "Wednesday, June 07, 2023");
        assert_eq!(lines[7], "\t Meeting");
        assert_eq!(lines[9], "Thursday, June 08, 2023");
        assert_eq!(lines[10], "\t Exercise");
        assert_eq!(lines[12], "Friday, June 09, 2023");
        assert_eq!(lines[13], "\t Bin Collection");
        assert_eq!(lines[19], "\t ");
    }

    #[test]
    fn weekly_view_of_another_week_is_empty() {
        let text = render_weekly_calendar(&sample_calendar(), date(2023, 6, 14));
        assert!(!text.contains("Meeting"));
        assert!(text.starts_with("Monday, June 12, 2023"));
    }

    #[test]
    fn day_breakdown_sorts_by_start() {
        let mut calendar = sample_calendar();
        calendar.add_reminder(reminder("Lunch", 7, 12, 13));
        calendar.add_reminder(Reminder::new(
            "Standup".to_string(),
            date(2023, 6, 7),
            time(9, 15),
            time(9, 30),
        ));

        let titles: Vec<&str> = day_breakdown(&calendar, date(2023, 6, 7))
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Standup", "Lunch", "Meeting"]);
    }

    #[test]
    fn day_breakdown_lists_fields() {
        let text = render_day_breakdown(&sample_calendar(), date(2023, 6, 8));
        assert_eq!(
            text,
            "Title: Exercise\n\
             Start Time: 08:00\n\
             End Time: 09:00\n\
             Repetitions: Monday, Wednesday, Friday\n\
             Bank Holiday Adjustment: false\n\
             Permanent Offset: false\n\
             \n"
        );
    }

    #[test]
    fn empty_day_renders_nothing() {
        assert_eq!(render_day_breakdown(&sample_calendar(), date(2023, 6, 10)), "");
    }
}
