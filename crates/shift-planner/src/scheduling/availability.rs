use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::calendar::{date_range, weekday_name, CalendarOracle};
use super::directory::StaffDirectory;
use super::domain::{
    AbsenceCategory, Actor, Availability, AvailabilityDay, Period, PeriodId, StaffProfile,
    Submission, SubmissionId, SubmissionStatus, UserId, WorkPattern,
};
use super::periods::{PeriodError, PeriodManager};
use super::repository::{RepositoryError, SubmissionRepository};

/// Error raised while building or saving an availability submission.
#[derive(Debug, thiserror::Error)]
pub enum AvailabilityError {
    #[error("submissions are closed for this period")]
    PeriodClosed,
    #[error("operation requires administrator privileges")]
    AccessDenied,
    #[error("staff profile not found")]
    ProfileNotFound,
    #[error("submission not found")]
    SubmissionNotFound,
    #[error("submission rejected: {}", violations.join("; "))]
    Rejected { violations: Vec<String> },
    #[error(transparent)]
    Period(#[from] PeriodError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// One date's entry of a typed submission request. Dates missing from the
/// request default to Work, matching the form's prefilled state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayInput {
    pub date: NaiveDate,
    pub availability: Availability,
    #[serde(default)]
    pub absence_category: Option<AbsenceCategory>,
    #[serde(default)]
    pub substitute_user: Option<UserId>,
    #[serde(default)]
    pub comment: String,
}

/// A prefilled form row for one date of the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayDefault {
    pub date: NaiveDate,
    pub weekday: &'static str,
    pub is_holiday: bool,
    pub holiday_name: Option<String>,
    pub is_fixed_weekday: bool,
    pub requires_reason: bool,
    pub availability: Availability,
    pub absence_category: Option<AbsenceCategory>,
    pub substitute_user: Option<UserId>,
    pub comment: String,
}

/// Per-submission roll-up used by the admin review screen.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionSummary {
    pub submission: Submission,
    pub work_count: usize,
    pub off_count: usize,
    pub days: Vec<AvailabilityDay>,
}

/// Builds per-day defaults from a staff work pattern and validates and
/// persists a full submission atomically.
pub struct AvailabilityEngine {
    periods: Arc<PeriodManager>,
    submissions: Arc<dyn SubmissionRepository>,
    staff: Arc<dyn StaffDirectory>,
    calendar: Arc<dyn CalendarOracle>,
}

impl AvailabilityEngine {
    pub fn new(
        periods: Arc<PeriodManager>,
        submissions: Arc<dyn SubmissionRepository>,
        staff: Arc<dyn StaffDirectory>,
        calendar: Arc<dyn CalendarOracle>,
    ) -> Self {
        Self {
            periods,
            submissions,
            staff,
            calendar,
        }
    }

    /// Fetch the existing submission for (user, period) or create a Draft
    /// one with no day rows.
    pub fn get_or_init_submission(
        &self,
        user: UserId,
        period: PeriodId,
    ) -> Result<Submission, AvailabilityError> {
        Ok(self.submissions.find_or_create(user, period)?)
    }

    /// Whether an Off entry on this date demands an absence reason.
    ///
    /// Full-time staff always justify a day off; part-time staff only on
    /// their fixed weekdays; helpers never.
    pub fn requires_reason(profile: &StaffProfile, date: NaiveDate) -> bool {
        match profile.work_pattern {
            WorkPattern::Full => true,
            WorkPattern::Part => profile.is_fixed_weekday(date),
            WorkPattern::Helper => false,
        }
    }

    fn default_availability(&self, profile: &StaffProfile, date: NaiveDate) -> Availability {
        if self.calendar.is_holiday(date) {
            return Availability::Off;
        }
        match profile.work_pattern {
            WorkPattern::Full => Availability::Work,
            WorkPattern::Part => {
                if profile.is_fixed_weekday(date) {
                    Availability::Work
                } else {
                    Availability::Off
                }
            }
            WorkPattern::Helper => Availability::Off,
        }
    }

    /// Prefilled form rows for every date of the period.
    ///
    /// Until a submission has been finalized (`submitted_at` unset), stored
    /// draft rows are discarded and pattern defaults recomputed on every
    /// open; afterwards the stored rows are rendered verbatim so a returned
    /// submission keeps the staff member's prior answers.
    pub fn build_day_defaults(
        &self,
        user: UserId,
        period: &Period,
    ) -> Result<Vec<DayDefault>, AvailabilityError> {
        let profile = self
            .staff
            .profile(user)
            .ok_or(AvailabilityError::ProfileNotFound)?;
        let submission = self.get_or_init_submission(user, period.id)?;
        let use_existing = submission.submitted_at.is_some();
        let existing: HashMap<NaiveDate, AvailabilityDay> = if use_existing {
            self.submissions
                .days(submission.id)?
                .into_iter()
                .map(|day| (day.date, day))
                .collect()
        } else {
            HashMap::new()
        };

        let mut defaults = Vec::new();
        for date in date_range(period.start_date, period.end_date) {
            let holiday = self.calendar.is_holiday(date);
            let mut row = DayDefault {
                date,
                weekday: weekday_name(date),
                is_holiday: holiday,
                holiday_name: holiday.then(|| self.calendar.holiday_name(date)).flatten(),
                is_fixed_weekday: profile.is_fixed_weekday(date),
                requires_reason: Self::requires_reason(&profile, date),
                availability: self.default_availability(&profile, date),
                absence_category: None,
                substitute_user: None,
                comment: String::new(),
            };
            if let Some(day) = existing.get(&date) {
                row.availability = day.availability;
                row.absence_category = day.absence_category;
                row.substitute_user = day.substitute_user;
                row.comment = day.comment.clone();
            }
            defaults.push(row);
        }
        Ok(defaults)
    }

    /// Validate and persist a full submission atomically.
    ///
    /// Holiday dates are forced Off regardless of submitted input; every
    /// Off entry that the pattern/weekday rule covers must carry an absence
    /// category. If any required reason is missing the full violation list
    /// comes back and no day rows are persisted; the submission itself stays
    /// a draft. A proxy submission (admin acting for another user) is
    /// flagged late unconditionally.
    pub fn validate_and_save(
        &self,
        actor: Actor,
        target_user: UserId,
        period_id: PeriodId,
        inputs: Vec<DayInput>,
        remarks: String,
        now: DateTime<Utc>,
    ) -> Result<Submission, AvailabilityError> {
        let is_proxy = actor.user_id != target_user;
        if is_proxy && !actor.is_admin {
            return Err(AvailabilityError::AccessDenied);
        }

        self.periods.auto_close_expired(now)?;
        let period = self.periods.get(period_id)?;
        if !self.periods.can_submit(&period, now, actor.is_admin) {
            return Err(AvailabilityError::PeriodClosed);
        }

        let profile = self
            .staff
            .profile(target_user)
            .ok_or(AvailabilityError::ProfileNotFound)?;
        // The draft row is created up front so a rejected post still leaves
        // a submission to reopen; day rows wait until validation passes.
        let mut submission = self.get_or_init_submission(target_user, period.id)?;
        let supplied: HashMap<NaiveDate, DayInput> = inputs
            .into_iter()
            .map(|input| (input.date, input))
            .collect();

        let mut violations = Vec::new();
        let mut normalized = Vec::new();
        for date in date_range(period.start_date, period.end_date) {
            let holiday = self.calendar.is_holiday(date);
            let input = supplied.get(&date);
            let availability = if holiday {
                Availability::Off
            } else {
                input.map_or(Availability::Work, |day| day.availability)
            };

            let (absence_category, substitute_user, comment) =
                if availability == Availability::Off && !holiday {
                    let category = input.and_then(|day| day.absence_category);
                    if Self::requires_reason(&profile, date) && category.is_none() {
                        violations.push(format!(
                            "{}/{} ({}): select an absence reason",
                            date.month(),
                            date.day(),
                            weekday_name(date)
                        ));
                    }
                    let substitute = if category == Some(AbsenceCategory::Substitute) {
                        input.and_then(|day| day.substitute_user)
                    } else {
                        None
                    };
                    (
                        category,
                        substitute,
                        input.map(|day| day.comment.clone()).unwrap_or_default(),
                    )
                } else {
                    (None, None, String::new())
                };

            normalized.push((date, availability, absence_category, substitute_user, comment));
        }

        if !violations.is_empty() {
            return Err(AvailabilityError::Rejected { violations });
        }

        for (date, availability, absence_category, substitute_user, comment) in normalized {
            self.submissions.upsert_day(AvailabilityDay {
                submission: submission.id,
                date,
                availability,
                absence_category,
                substitute_user,
                comment,
            })?;
        }

        submission.remarks = remarks;
        submission.status = SubmissionStatus::Submitted;
        submission.submitted_at = Some(now);
        if is_proxy {
            submission.submitted_by_admin = true;
            submission.is_late_submission = true;
        }
        self.submissions.update(submission.clone())?;
        Ok(submission)
    }

    /// Advance the named Submitted entries to Approved. Admin-only; rows in
    /// any other status are left untouched.
    pub fn approve(
        &self,
        actor: Actor,
        period: PeriodId,
        ids: &[SubmissionId],
    ) -> Result<usize, AvailabilityError> {
        if !actor.is_admin {
            return Err(AvailabilityError::AccessDenied);
        }
        let mut approved = 0;
        for submission in self.submissions.list_for_period(period)? {
            if ids.contains(&submission.id) && submission.status == SubmissionStatus::Submitted {
                let mut updated = submission;
                updated.status = SubmissionStatus::Approved;
                self.submissions.update(updated)?;
                approved += 1;
            }
        }
        Ok(approved)
    }

    /// Return a submission to its owner with an admin note. The day rows
    /// persist, so the resubmission form shows the prior answers.
    pub fn reject(
        &self,
        actor: Actor,
        id: SubmissionId,
        admin_note: String,
    ) -> Result<Submission, AvailabilityError> {
        if !actor.is_admin {
            return Err(AvailabilityError::AccessDenied);
        }
        let mut submission = self
            .submissions
            .fetch_by_id(id)?
            .ok_or(AvailabilityError::SubmissionNotFound)?;
        submission.status = SubmissionStatus::Returned;
        submission.admin_note = admin_note;
        self.submissions.update(submission.clone())?;
        Ok(submission)
    }

    /// Work/off roll-ups per submission for the admin review screen.
    pub fn review_summaries(
        &self,
        period: PeriodId,
    ) -> Result<Vec<SubmissionSummary>, AvailabilityError> {
        let mut summaries = Vec::new();
        for submission in self.submissions.list_for_period(period)? {
            let days = self.submissions.days(submission.id)?;
            let work_count = days
                .iter()
                .filter(|day| day.availability == Availability::Work)
                .count();
            let off_count = days.len() - work_count;
            summaries.push(SubmissionSummary {
                submission,
                work_count,
                off_count,
                days,
            });
        }
        Ok(summaries)
    }
}
