//! In-memory persistence used by the service wiring, the demo, and tests.
//!
//! Every store upserts on its natural key, so concurrent writers resolve
//! by last-write-wins exactly as the persistence boundary specifies.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::NaiveDate;

use super::domain::{
    Assignment, AvailabilityDay, ExternalStaff, ExternalStaffId, Location, LocationId,
    Notification, Period, PeriodDraft, PeriodId, PeriodStatus, StaffProfile, StaffingSettings,
    Submission, SubmissionId, SubmissionStatus, UserId,
};
use super::directory::{LocationDirectory, StaffDirectory};
use super::repository::{
    AssignmentRepository, CommittedDay, NotificationRepository, PeriodRepository, RepositoryError,
    SettingsRepository, SubmissionRepository,
};

#[derive(Default)]
pub struct InMemoryPeriodRepository {
    periods: Mutex<HashMap<PeriodId, Period>>,
    sequence: AtomicU64,
}

impl PeriodRepository for InMemoryPeriodRepository {
    fn insert(&self, draft: PeriodDraft) -> Result<Period, RepositoryError> {
        let id = PeriodId(self.sequence.fetch_add(1, Ordering::Relaxed) + 1);
        let period = Period {
            id,
            start_date: draft.start_date,
            end_date: draft.end_date,
            submission_open_at: draft.submission_open_at,
            submission_close_at: draft.submission_close_at,
            status: PeriodStatus::Open,
            shared_notes: draft.shared_notes,
        };
        self.periods
            .lock()
            .expect("period mutex poisoned")
            .insert(id, period.clone());
        Ok(period)
    }

    fn update(&self, period: Period) -> Result<(), RepositoryError> {
        let mut guard = self.periods.lock().expect("period mutex poisoned");
        if !guard.contains_key(&period.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(period.id, period);
        Ok(())
    }

    fn fetch(&self, id: PeriodId) -> Result<Option<Period>, RepositoryError> {
        let guard = self.periods.lock().expect("period mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn list(&self) -> Result<Vec<Period>, RepositoryError> {
        let guard = self.periods.lock().expect("period mutex poisoned");
        let mut periods: Vec<Period> = guard.values().cloned().collect();
        periods.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(periods)
    }

    fn with_status(&self, statuses: &[PeriodStatus]) -> Result<Vec<Period>, RepositoryError> {
        let mut periods: Vec<Period> = self
            .list()?
            .into_iter()
            .filter(|period| statuses.contains(&period.status))
            .collect();
        periods.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(periods)
    }

    fn delete(&self, id: PeriodId) -> Result<(), RepositoryError> {
        let mut guard = self.periods.lock().expect("period mutex poisoned");
        guard.remove(&id).map(|_| ()).ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default)]
pub struct InMemorySubmissionRepository {
    submissions: Mutex<HashMap<(UserId, PeriodId), Submission>>,
    days: Mutex<HashMap<(SubmissionId, NaiveDate), AvailabilityDay>>,
    sequence: AtomicU64,
}

impl SubmissionRepository for InMemorySubmissionRepository {
    fn find_or_create(
        &self,
        user: UserId,
        period: PeriodId,
    ) -> Result<Submission, RepositoryError> {
        let mut guard = self.submissions.lock().expect("submission mutex poisoned");
        if let Some(existing) = guard.get(&(user, period)) {
            return Ok(existing.clone());
        }
        let submission = Submission {
            id: SubmissionId(self.sequence.fetch_add(1, Ordering::Relaxed) + 1),
            user,
            period,
            status: SubmissionStatus::Draft,
            submitted_at: None,
            remarks: String::new(),
            admin_note: String::new(),
            submitted_by_admin: false,
            is_late_submission: false,
        };
        guard.insert((user, period), submission.clone());
        Ok(submission)
    }

    fn fetch(&self, user: UserId, period: PeriodId) -> Result<Option<Submission>, RepositoryError> {
        let guard = self.submissions.lock().expect("submission mutex poisoned");
        Ok(guard.get(&(user, period)).cloned())
    }

    fn fetch_by_id(&self, id: SubmissionId) -> Result<Option<Submission>, RepositoryError> {
        let guard = self.submissions.lock().expect("submission mutex poisoned");
        Ok(guard.values().find(|sub| sub.id == id).cloned())
    }

    fn update(&self, submission: Submission) -> Result<(), RepositoryError> {
        let mut guard = self.submissions.lock().expect("submission mutex poisoned");
        let key = (submission.user, submission.period);
        if !guard.contains_key(&key) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(key, submission);
        Ok(())
    }

    fn list_for_period(&self, period: PeriodId) -> Result<Vec<Submission>, RepositoryError> {
        let guard = self.submissions.lock().expect("submission mutex poisoned");
        let mut submissions: Vec<Submission> = guard
            .values()
            .filter(|sub| sub.period == period)
            .cloned()
            .collect();
        submissions.sort_by_key(|sub| sub.user);
        Ok(submissions)
    }

    fn upsert_day(&self, day: AvailabilityDay) -> Result<(), RepositoryError> {
        let mut guard = self.days.lock().expect("day mutex poisoned");
        guard.insert((day.submission, day.date), day);
        Ok(())
    }

    fn days(&self, submission: SubmissionId) -> Result<Vec<AvailabilityDay>, RepositoryError> {
        let guard = self.days.lock().expect("day mutex poisoned");
        let mut days: Vec<AvailabilityDay> = guard
            .values()
            .filter(|day| day.submission == submission)
            .cloned()
            .collect();
        days.sort_by_key(|day| day.date);
        Ok(days)
    }

    fn committed_days_on(
        &self,
        period: PeriodId,
        date: NaiveDate,
    ) -> Result<Vec<CommittedDay>, RepositoryError> {
        let submissions = self.submissions.lock().expect("submission mutex poisoned");
        let days = self.days.lock().expect("day mutex poisoned");
        let mut committed = Vec::new();
        for sub in submissions.values() {
            if sub.period != period || !sub.status.is_committed() {
                continue;
            }
            if let Some(day) = days.get(&(sub.id, date)) {
                committed.push(CommittedDay {
                    user: sub.user,
                    day: day.clone(),
                });
            }
        }
        committed.sort_by_key(|entry| entry.user);
        Ok(committed)
    }
}

#[derive(Default)]
pub struct InMemoryAssignmentRepository {
    assignments: Mutex<HashMap<(NaiveDate, LocationId), Assignment>>,
}

impl AssignmentRepository for InMemoryAssignmentRepository {
    fn upsert(&self, assignment: Assignment) -> Result<(), RepositoryError> {
        let mut guard = self.assignments.lock().expect("assignment mutex poisoned");
        guard.insert((assignment.date, assignment.location), assignment);
        Ok(())
    }

    fn remove(&self, date: NaiveDate, location: LocationId) -> Result<bool, RepositoryError> {
        let mut guard = self.assignments.lock().expect("assignment mutex poisoned");
        Ok(guard.remove(&(date, location)).is_some())
    }

    fn fetch(
        &self,
        date: NaiveDate,
        location: LocationId,
    ) -> Result<Option<Assignment>, RepositoryError> {
        let guard = self.assignments.lock().expect("assignment mutex poisoned");
        Ok(guard.get(&(date, location)).cloned())
    }

    fn on_date(&self, date: NaiveDate) -> Result<Vec<Assignment>, RepositoryError> {
        let guard = self.assignments.lock().expect("assignment mutex poisoned");
        let mut assignments: Vec<Assignment> = guard
            .values()
            .filter(|assignment| assignment.date == date)
            .cloned()
            .collect();
        assignments.sort_by_key(|assignment| assignment.location);
        Ok(assignments)
    }

    fn in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Assignment>, RepositoryError> {
        let guard = self.assignments.lock().expect("assignment mutex poisoned");
        let mut assignments: Vec<Assignment> = guard
            .values()
            .filter(|assignment| assignment.date >= start && assignment.date <= end)
            .cloned()
            .collect();
        assignments.sort_by_key(|assignment| (assignment.date, assignment.location));
        Ok(assignments)
    }
}

#[derive(Default)]
pub struct InMemorySettingsRepository {
    settings: Mutex<Option<StaffingSettings>>,
}

impl SettingsRepository for InMemorySettingsRepository {
    fn load(&self) -> Result<StaffingSettings, RepositoryError> {
        let mut guard = self.settings.lock().expect("settings mutex poisoned");
        Ok(*guard.get_or_insert_with(StaffingSettings::default))
    }

    fn save(&self, settings: StaffingSettings) -> Result<(), RepositoryError> {
        let mut guard = self.settings.lock().expect("settings mutex poisoned");
        *guard = Some(settings);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryNotificationRepository {
    notifications: Mutex<Vec<Notification>>,
    sequence: AtomicU64,
}

impl NotificationRepository for InMemoryNotificationRepository {
    fn append(&self, mut notification: Notification) -> Result<Notification, RepositoryError> {
        notification.id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        self.notifications
            .lock()
            .expect("notification mutex poisoned")
            .push(notification.clone());
        Ok(notification)
    }

    fn list_for_period(&self, period: PeriodId) -> Result<Vec<Notification>, RepositoryError> {
        let guard = self.notifications.lock().expect("notification mutex poisoned");
        Ok(guard
            .iter()
            .filter(|notification| notification.period == period)
            .cloned()
            .collect())
    }
}

/// Roster-backed staff directory for wiring and tests.
#[derive(Default)]
pub struct InMemoryStaffDirectory {
    profiles: Mutex<Vec<StaffProfile>>,
    external: Mutex<Vec<ExternalStaff>>,
}

impl InMemoryStaffDirectory {
    pub fn new(profiles: Vec<StaffProfile>) -> Self {
        Self {
            profiles: Mutex::new(profiles),
            external: Mutex::new(Vec::new()),
        }
    }

    pub fn upsert_profile(&self, profile: StaffProfile) {
        let mut guard = self.profiles.lock().expect("profile mutex poisoned");
        match guard.iter_mut().find(|existing| existing.user == profile.user) {
            Some(existing) => *existing = profile,
            None => guard.push(profile),
        }
    }

    pub fn add_external(&self, staff: ExternalStaff) {
        self.external
            .lock()
            .expect("external staff mutex poisoned")
            .push(staff);
    }
}

impl StaffDirectory for InMemoryStaffDirectory {
    fn active_profiles(&self) -> Vec<StaffProfile> {
        self.profiles
            .lock()
            .expect("profile mutex poisoned")
            .iter()
            .filter(|profile| profile.is_active)
            .cloned()
            .collect()
    }

    fn profile(&self, user: UserId) -> Option<StaffProfile> {
        self.profiles
            .lock()
            .expect("profile mutex poisoned")
            .iter()
            .find(|profile| profile.user == user)
            .cloned()
    }

    fn external_staff(&self, id: ExternalStaffId) -> Option<ExternalStaff> {
        self.external
            .lock()
            .expect("external staff mutex poisoned")
            .iter()
            .find(|staff| staff.id == id)
            .cloned()
    }
}

/// Fixed location table for wiring and tests.
#[derive(Default)]
pub struct InMemoryLocationDirectory {
    locations: Vec<Location>,
}

impl InMemoryLocationDirectory {
    pub fn new(locations: Vec<Location>) -> Self {
        Self { locations }
    }
}

impl LocationDirectory for InMemoryLocationDirectory {
    fn locations(&self) -> Vec<Location> {
        self.locations.clone()
    }
}
