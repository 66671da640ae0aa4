use chrono::NaiveDate;

use super::domain::{
    Assignment, AvailabilityDay, LocationId, Notification, Period, PeriodDraft, PeriodId,
    PeriodStatus, StaffingSettings, Submission, SubmissionId, UserId,
};

/// Error enumeration for persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Storage for recruiting periods.
pub trait PeriodRepository: Send + Sync {
    fn insert(&self, draft: PeriodDraft) -> Result<Period, RepositoryError>;
    fn update(&self, period: Period) -> Result<(), RepositoryError>;
    fn fetch(&self, id: PeriodId) -> Result<Option<Period>, RepositoryError>;
    /// All periods, newest start date first.
    fn list(&self) -> Result<Vec<Period>, RepositoryError>;
    fn with_status(&self, statuses: &[PeriodStatus]) -> Result<Vec<Period>, RepositoryError>;
    fn delete(&self, id: PeriodId) -> Result<(), RepositoryError>;
}

/// A committed day row joined with the submitting user, as the staffing
/// analyzer consumes it.
#[derive(Debug, Clone)]
pub struct CommittedDay {
    pub user: UserId,
    pub day: AvailabilityDay,
}

/// Storage for submissions and their day rows.
///
/// All writes are upserts on the natural key ((user, period) for
/// submissions, (submission, date) for day rows); concurrent writers
/// resolve by last-write-wins rather than optimistic locking.
pub trait SubmissionRepository: Send + Sync {
    fn find_or_create(&self, user: UserId, period: PeriodId)
        -> Result<Submission, RepositoryError>;
    fn fetch(&self, user: UserId, period: PeriodId) -> Result<Option<Submission>, RepositoryError>;
    fn fetch_by_id(&self, id: SubmissionId) -> Result<Option<Submission>, RepositoryError>;
    fn update(&self, submission: Submission) -> Result<(), RepositoryError>;
    fn list_for_period(&self, period: PeriodId) -> Result<Vec<Submission>, RepositoryError>;
    fn upsert_day(&self, day: AvailabilityDay) -> Result<(), RepositoryError>;
    fn days(&self, submission: SubmissionId) -> Result<Vec<AvailabilityDay>, RepositoryError>;
    /// Day rows for one date across every committed (submitted/approved)
    /// submission in the period.
    fn committed_days_on(
        &self,
        period: PeriodId,
        date: NaiveDate,
    ) -> Result<Vec<CommittedDay>, RepositoryError>;
}

/// Storage for per-slot assignments, keyed by (date, location).
pub trait AssignmentRepository: Send + Sync {
    fn upsert(&self, assignment: Assignment) -> Result<(), RepositoryError>;
    fn remove(&self, date: NaiveDate, location: LocationId) -> Result<bool, RepositoryError>;
    fn fetch(
        &self,
        date: NaiveDate,
        location: LocationId,
    ) -> Result<Option<Assignment>, RepositoryError>;
    fn on_date(&self, date: NaiveDate) -> Result<Vec<Assignment>, RepositoryError>;
    fn in_range(&self, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<Assignment>, RepositoryError>;
}

/// Singleton settings storage guaranteeing a default-initialized row on
/// first access, never "absent."
pub trait SettingsRepository: Send + Sync {
    fn load(&self) -> Result<StaffingSettings, RepositoryError>;
    fn save(&self, settings: StaffingSettings) -> Result<(), RepositoryError>;
}

/// Append-only notification audit log.
pub trait NotificationRepository: Send + Sync {
    fn append(&self, notification: Notification) -> Result<Notification, RepositoryError>;
    fn list_for_period(&self, period: PeriodId) -> Result<Vec<Notification>, RepositoryError>;
}
