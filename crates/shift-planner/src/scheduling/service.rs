use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use super::assignment::AssignmentValidator;
use super::availability::AvailabilityEngine;
use super::calendar::CalendarOracle;
use super::directory::{LocationDirectory, StaffDirectory};
use super::domain::{
    Actor, Notification, NotificationKind, Period, PeriodDraft, PeriodId, StaffingSettings,
};
use super::export::{export_submissions_csv, ExportError};
use super::notifications::{MessageTransport, NotificationDispatcher};
use super::periods::{PeriodError, PeriodManager};
use super::repository::{
    AssignmentRepository, NotificationRepository, RepositoryError, SettingsRepository,
    SubmissionRepository,
};
use super::staffing::{Heatmap, StaffingAnalyzer};

/// Error raised by threshold settings maintenance.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("operation requires administrator privileges")]
    AccessDenied,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Composition root for the scheduling engine: one instance wires the
/// period manager, availability engine, staffing analyzer, assignment
/// validator, and notification dispatcher over shared storage.
pub struct SchedulingApp {
    pub periods: Arc<PeriodManager>,
    pub availability: Arc<AvailabilityEngine>,
    pub staffing: Arc<StaffingAnalyzer>,
    pub assignments: Arc<AssignmentValidator>,
    pub dispatcher: Arc<NotificationDispatcher>,
    submissions: Arc<dyn SubmissionRepository>,
    settings: Arc<dyn SettingsRepository>,
    staff: Arc<dyn StaffDirectory>,
}

/// External collaborators and storage handed to the composition root.
pub struct SchedulingDeps {
    pub periods: Arc<dyn super::repository::PeriodRepository>,
    pub submissions: Arc<dyn SubmissionRepository>,
    pub assignments: Arc<dyn AssignmentRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
    pub staff: Arc<dyn StaffDirectory>,
    pub locations: Arc<dyn LocationDirectory>,
    pub calendar: Arc<dyn CalendarOracle>,
    pub transport: Arc<dyn MessageTransport>,
    pub per_recipient_budget: Duration,
}

impl SchedulingApp {
    pub fn new(deps: SchedulingDeps) -> Self {
        let periods = Arc::new(PeriodManager::new(deps.periods));
        let availability = Arc::new(AvailabilityEngine::new(
            periods.clone(),
            deps.submissions.clone(),
            deps.staff.clone(),
            deps.calendar.clone(),
        ));
        let staffing = Arc::new(StaffingAnalyzer::new(
            deps.submissions.clone(),
            deps.staff.clone(),
            deps.locations.clone(),
            deps.calendar.clone(),
        ));
        let assignments = Arc::new(AssignmentValidator::new(
            deps.assignments,
            deps.submissions.clone(),
            deps.staff.clone(),
            deps.locations,
        ));
        let dispatcher = Arc::new(NotificationDispatcher::new(
            deps.submissions.clone(),
            deps.staff.clone(),
            deps.notifications,
            deps.transport,
            deps.per_recipient_budget,
        ));
        Self {
            periods,
            availability,
            staffing,
            assignments,
            dispatcher,
            submissions: deps.submissions,
            settings: deps.settings,
            staff: deps.staff,
        }
    }

    /// Create a period and announce it. A dispatch failure never rolls the
    /// period back; it is logged and the period stands.
    pub fn create_period(
        &self,
        actor: Actor,
        draft: PeriodDraft,
    ) -> Result<(Period, Option<Notification>), PeriodError> {
        let period = self.periods.create(actor, draft)?;
        let notification = match self.dispatcher.on_period_open(&period) {
            Ok(notification) => {
                info!(
                    period = period.id.0,
                    push = notification.sent_push_count,
                    email = notification.sent_email_count,
                    "period-open notification dispatched"
                );
                Some(notification)
            }
            Err(err) => {
                error!(period = period.id.0, %err, "period-open notification failed");
                None
            }
        };
        Ok((period, notification))
    }

    /// Operator-triggered reminder to everyone still unsubmitted.
    pub fn manual_reminder(
        &self,
        actor: Actor,
        period_id: PeriodId,
        now: DateTime<Utc>,
    ) -> Result<Notification, PeriodError> {
        if !actor.is_admin {
            return Err(PeriodError::AccessDenied);
        }
        self.periods.auto_close_expired(now)?;
        let period = self.periods.get(period_id)?;
        Ok(self
            .dispatcher
            .on_reminder(&period, NotificationKind::Manual)?)
    }

    /// The wall-clock-scheduled reminder sweep: every Open period closing
    /// about `days_before` days from now gets a reminder batch. Returns
    /// the audit rows in period order.
    pub fn reminder_sweep(
        &self,
        now: DateTime<Utc>,
        days_before: i64,
    ) -> Result<Vec<Notification>, PeriodError> {
        let mut sent = Vec::new();
        for period in self.periods.periods_needing_reminder(now, days_before)? {
            sent.push(self.dispatcher.on_reminder(&period, NotificationKind::Reminder)?);
        }
        Ok(sent)
    }

    /// The admin dashboard heatmap for one period, sweep applied first.
    pub fn dashboard(
        &self,
        period_id: PeriodId,
        now: DateTime<Utc>,
    ) -> Result<(Period, Heatmap), PeriodError> {
        self.periods.auto_close_expired(now)?;
        let period = self.periods.get(period_id)?;
        let settings = self.settings.load()?;
        let heatmap = self.staffing.heatmap(&period, &settings)?;
        Ok((period, heatmap))
    }

    pub fn settings(&self) -> Result<StaffingSettings, RepositoryError> {
        self.settings.load()
    }

    pub fn update_settings(
        &self,
        actor: Actor,
        settings: StaffingSettings,
    ) -> Result<StaffingSettings, SettingsError> {
        if !actor.is_admin {
            return Err(SettingsError::AccessDenied);
        }
        self.settings.save(settings)?;
        Ok(settings)
    }

    pub fn export_csv(&self, period_id: PeriodId) -> Result<String, ExportError> {
        let period = self
            .periods
            .get(period_id)
            .map_err(|_| RepositoryError::NotFound)?;
        export_submissions_csv(&period, &self.submissions, &self.staff)
    }
}
