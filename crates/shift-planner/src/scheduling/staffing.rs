use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use super::calendar::{date_range, weekday_name, CalendarOracle};
use super::directory::{LocationDirectory, StaffDirectory};
use super::domain::{Availability, Period, StaffProfile, StaffingSettings, UserId};
use super::repository::{RepositoryError, SubmissionRepository};

/// Per-day staffing-sufficiency classification, worst first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    DriverShortage,
    Danger,
    Warning,
    Ok,
}

impl DayStatus {
    pub const fn label(self) -> &'static str {
        match self {
            DayStatus::DriverShortage => "driver_shortage",
            DayStatus::Danger => "danger",
            DayStatus::Warning => "warning",
            DayStatus::Ok => "ok",
        }
    }
}

/// Committed-availability counts behind one day's classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DaySnapshot {
    pub status: DayStatus,
    pub available_count: u32,
    pub off_count: u32,
    pub driver_count: u32,
}

/// One dashboard row; holiday dates carry the name and no snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct HeatmapDay {
    pub date: NaiveDate,
    pub weekday: &'static str,
    pub is_holiday: bool,
    pub holiday_name: Option<String>,
    #[serde(flatten)]
    pub snapshot: Option<DaySnapshot>,
}

/// The full dashboard: per-day rows plus who has not submitted yet.
#[derive(Debug, Clone, Serialize)]
pub struct Heatmap {
    pub days: Vec<HeatmapDay>,
    pub required_driver_count: u32,
    pub not_submitted: Vec<StaffProfile>,
}

/// Derives the per-day sufficiency classification from committed
/// availability plus driver-capability counts.
pub struct StaffingAnalyzer {
    submissions: Arc<dyn SubmissionRepository>,
    staff: Arc<dyn StaffDirectory>,
    locations: Arc<dyn LocationDirectory>,
    calendar: Arc<dyn CalendarOracle>,
}

impl StaffingAnalyzer {
    pub fn new(
        submissions: Arc<dyn SubmissionRepository>,
        staff: Arc<dyn StaffDirectory>,
        locations: Arc<dyn LocationDirectory>,
        calendar: Arc<dyn CalendarOracle>,
    ) -> Self {
        Self {
            submissions,
            staff,
            locations,
            calendar,
        }
    }

    /// Classify one day of the period; holidays have no status.
    ///
    /// A driver shortage overrides every threshold color, and threshold
    /// comparisons are inclusive at the boundary.
    pub fn compute_day_status(
        &self,
        period: &Period,
        date: NaiveDate,
        settings: &StaffingSettings,
    ) -> Result<Option<DaySnapshot>, RepositoryError> {
        if self.calendar.is_holiday(date) {
            return Ok(None);
        }

        let committed = self.submissions.committed_days_on(period.id, date)?;
        let mut off_count = 0u32;
        let mut working: BTreeSet<UserId> = BTreeSet::new();
        for entry in &committed {
            match entry.day.availability {
                Availability::Off => off_count += 1,
                Availability::Work => {
                    working.insert(entry.user);
                }
            }
        }

        let driver_count = working
            .iter()
            .filter(|user| {
                self.staff
                    .profile(**user)
                    .map(|profile| profile.can_drive)
                    .unwrap_or(false)
            })
            .count() as u32;
        let required = self.locations.required_driver_count();

        let status = if driver_count < required {
            DayStatus::DriverShortage
        } else if off_count >= settings.danger_threshold {
            DayStatus::Danger
        } else if off_count >= settings.warning_threshold {
            DayStatus::Warning
        } else {
            DayStatus::Ok
        };

        Ok(Some(DaySnapshot {
            status,
            available_count: working.len() as u32,
            off_count,
            driver_count,
        }))
    }

    /// Build the full dashboard for a period.
    pub fn heatmap(
        &self,
        period: &Period,
        settings: &StaffingSettings,
    ) -> Result<Heatmap, RepositoryError> {
        let mut days = Vec::new();
        for date in date_range(period.start_date, period.end_date) {
            let holiday = self.calendar.is_holiday(date);
            days.push(HeatmapDay {
                date,
                weekday: weekday_name(date),
                is_holiday: holiday,
                holiday_name: holiday.then(|| self.calendar.holiday_name(date)).flatten(),
                snapshot: self.compute_day_status(period, date, settings)?,
            });
        }

        let submitted: BTreeSet<UserId> = self
            .submissions
            .list_for_period(period.id)?
            .into_iter()
            .filter(|submission| submission.status.is_committed())
            .map(|submission| submission.user)
            .collect();
        let not_submitted = self
            .staff
            .active_profiles()
            .into_iter()
            .filter(|profile| !submitted.contains(&profile.user))
            .collect();

        Ok(Heatmap {
            days,
            required_driver_count: self.locations.required_driver_count(),
            not_submitted,
        })
    }
}
