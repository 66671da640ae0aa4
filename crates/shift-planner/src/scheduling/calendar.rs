use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Answers "is this date a holiday" and "what is its name."
///
/// Backed externally by a weekend rule, a public-holiday table, and an
/// admin-maintained company holiday list; the core only consumes the
/// two questions.
pub trait CalendarOracle: Send + Sync {
    fn is_holiday(&self, date: NaiveDate) -> bool;
    fn holiday_name(&self, date: NaiveDate) -> Option<String>;
}

/// Default oracle: Saturdays/Sundays plus a maintained holiday table.
///
/// The table covers both public and company holidays; admins add and
/// remove entries through the maintenance methods.
#[derive(Debug, Default)]
pub struct CompanyCalendar {
    holidays: Mutex<BTreeMap<NaiveDate, String>>,
}

impl CompanyCalendar {
    pub fn new(holidays: impl IntoIterator<Item = (NaiveDate, String)>) -> Self {
        Self {
            holidays: Mutex::new(holidays.into_iter().collect()),
        }
    }

    pub fn add_holiday(&self, date: NaiveDate, name: impl Into<String>) {
        self.holidays
            .lock()
            .expect("holiday table mutex poisoned")
            .insert(date, name.into());
    }

    /// Adds every date in the inclusive range under one name, returning
    /// how many entries were newly created.
    pub fn add_holiday_range(&self, start: NaiveDate, end: NaiveDate, name: &str) -> usize {
        let mut table = self.holidays.lock().expect("holiday table mutex poisoned");
        let mut created = 0;
        for date in date_range(start, end) {
            if table.insert(date, name.to_string()).is_none() {
                created += 1;
            }
        }
        created
    }

    pub fn remove_holiday(&self, date: NaiveDate) -> bool {
        self.holidays
            .lock()
            .expect("holiday table mutex poisoned")
            .remove(&date)
            .is_some()
    }

    pub fn holidays(&self) -> Vec<(NaiveDate, String)> {
        self.holidays
            .lock()
            .expect("holiday table mutex poisoned")
            .iter()
            .map(|(date, name)| (*date, name.clone()))
            .collect()
    }
}

impl CalendarOracle for CompanyCalendar {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        if is_weekend(date) {
            return true;
        }
        self.holidays
            .lock()
            .expect("holiday table mutex poisoned")
            .contains_key(&date)
    }

    fn holiday_name(&self, date: NaiveDate) -> Option<String> {
        match date.weekday() {
            Weekday::Sat => return Some("Saturday".to_string()),
            Weekday::Sun => return Some("Sunday".to_string()),
            _ => {}
        }
        self.holidays
            .lock()
            .expect("holiday table mutex poisoned")
            .get(&date)
            .cloned()
    }
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Every date from `start` through `end` inclusive.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(start), move |current| {
        let next = *current + Duration::days(1);
        (next <= end).then_some(next)
    })
}

pub const WEEKDAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

pub fn weekday_name(date: NaiveDate) -> &'static str {
    WEEKDAY_NAMES[date.weekday().num_days_from_monday() as usize]
}
