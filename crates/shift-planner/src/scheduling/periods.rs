use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::domain::{Actor, Period, PeriodDraft, PeriodId, PeriodStatus};
use super::repository::{PeriodRepository, RepositoryError};

/// Error raised by period lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum PeriodError {
    #[error("period not found")]
    NotFound,
    #[error("operation requires administrator privileges")]
    AccessDenied,
    #[error("invalid period window: {0}")]
    InvalidWindow(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Owns the period lifecycle (Open -> Review -> Fixed -> Published) and
/// submission eligibility checks.
pub struct PeriodManager {
    periods: Arc<dyn PeriodRepository>,
}

impl PeriodManager {
    pub fn new(periods: Arc<dyn PeriodRepository>) -> Self {
        Self { periods }
    }

    /// Create a new recruiting window in status Open. Admin-only.
    pub fn create(&self, actor: Actor, draft: PeriodDraft) -> Result<Period, PeriodError> {
        if !actor.is_admin {
            return Err(PeriodError::AccessDenied);
        }
        if draft.start_date > draft.end_date {
            return Err(PeriodError::InvalidWindow(format!(
                "start date {} is after end date {}",
                draft.start_date, draft.end_date
            )));
        }
        if draft.submission_open_at > draft.submission_close_at {
            return Err(PeriodError::InvalidWindow(format!(
                "submission opens {} after it closes {}",
                draft.submission_open_at, draft.submission_close_at
            )));
        }
        Ok(self.periods.insert(draft)?)
    }

    /// Sweep every Open period whose close time has passed into Review.
    ///
    /// Invoked at the start of every period-touching operation; re-running
    /// it never double-transitions, so the sweep is safe to call anywhere.
    /// Returns how many periods moved.
    pub fn auto_close_expired(&self, now: DateTime<Utc>) -> Result<usize, PeriodError> {
        let mut closed = 0;
        for mut period in self.periods.with_status(&[PeriodStatus::Open])? {
            if period.submission_close_at < now {
                period.status = PeriodStatus::Review;
                self.periods.update(period)?;
                closed += 1;
            }
        }
        Ok(closed)
    }

    /// Set an arbitrary status on a period. Admin-only.
    ///
    /// No forward-only restriction is enforced; an admin may move a period
    /// to any status, including back to Open.
    pub fn transition(
        &self,
        actor: Actor,
        id: PeriodId,
        new_status: PeriodStatus,
    ) -> Result<Period, PeriodError> {
        if !actor.is_admin {
            return Err(PeriodError::AccessDenied);
        }
        let mut period = self.periods.fetch(id)?.ok_or(PeriodError::NotFound)?;
        period.status = new_status;
        self.periods.update(period.clone())?;
        Ok(period)
    }

    pub fn get(&self, id: PeriodId) -> Result<Period, PeriodError> {
        self.periods.fetch(id)?.ok_or(PeriodError::NotFound)
    }

    /// Periods visible on the shared landing screens, sweep applied first.
    pub fn list_current(&self, now: DateTime<Utc>) -> Result<Vec<Period>, PeriodError> {
        self.auto_close_expired(now)?;
        Ok(self
            .periods
            .with_status(&[PeriodStatus::Open, PeriodStatus::Review])?)
    }

    pub fn list_all(&self, now: DateTime<Utc>) -> Result<Vec<Period>, PeriodError> {
        self.auto_close_expired(now)?;
        Ok(self.periods.list()?)
    }

    /// Whether `actor` may submit availability for this period right now.
    ///
    /// Admins may act during Open or Review (proxy corrections after the
    /// deadline); staff only while the period is Open and the clock is
    /// inside the submission window, bounds inclusive.
    pub fn can_submit(&self, period: &Period, now: DateTime<Utc>, is_admin: bool) -> bool {
        if is_admin {
            return matches!(period.status, PeriodStatus::Open | PeriodStatus::Review);
        }
        period.status == PeriodStatus::Open
            && now >= period.submission_open_at
            && now <= period.submission_close_at
    }

    /// Open periods whose close time falls within one hour of
    /// `now + days_before` days, as targeted by the scheduled reminder
    /// sweep.
    pub fn periods_needing_reminder(
        &self,
        now: DateTime<Utc>,
        days_before: i64,
    ) -> Result<Vec<Period>, PeriodError> {
        let target = now + Duration::days(days_before);
        let window = Duration::hours(1);
        Ok(self
            .periods
            .with_status(&[PeriodStatus::Open])?
            .into_iter()
            .filter(|period| {
                period.submission_close_at >= target - window
                    && period.submission_close_at <= target + window
            })
            .collect())
    }

    /// Remove a period outright. Admin-only; cascading cleanup of
    /// submissions and assignments is the storage layer's concern.
    pub fn delete(&self, actor: Actor, id: PeriodId) -> Result<(), PeriodError> {
        if !actor.is_admin {
            return Err(PeriodError::AccessDenied);
        }
        self.periods.delete(id).map_err(|err| match err {
            RepositoryError::NotFound => PeriodError::NotFound,
            other => PeriodError::Repository(other),
        })
    }
}
