use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, Timelike, Utc};
use tracing::warn;

use super::directory::StaffDirectory;
use super::domain::{
    Notification, NotificationKind, Period, StaffProfile, UserId,
};
use super::repository::{NotificationRepository, RepositoryError, SubmissionRepository};

/// Where a message should land; the dispatcher is channel-agnostic and
/// the transport decides how each kind is carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    Push { channel_id: String },
    Email { address: String },
}

/// Outbound delivery error, caught per recipient and never propagated.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("delivery failed: {0}")]
    Failed(String),
    #[error("delivery timed out after {0:?}")]
    TimedOut(Duration),
}

/// Outbound messaging boundary with two concrete channels behind it
/// (push-by-external-id and email-by-address). Implementations must
/// respect the per-recipient `budget` so a slow channel cannot stall the
/// whole batch unboundedly.
pub trait MessageTransport: Send + Sync {
    fn deliver(
        &self,
        recipient: &Recipient,
        title: &str,
        body: &str,
        budget: Duration,
    ) -> Result<bool, TransportError>;
}

/// Triggers and records multi-channel outbound notifications on
/// period-open and reminder events.
pub struct NotificationDispatcher {
    submissions: Arc<dyn SubmissionRepository>,
    staff: Arc<dyn StaffDirectory>,
    audit: Arc<dyn NotificationRepository>,
    transport: Arc<dyn MessageTransport>,
    per_recipient_budget: Duration,
}

impl NotificationDispatcher {
    pub fn new(
        submissions: Arc<dyn SubmissionRepository>,
        staff: Arc<dyn StaffDirectory>,
        audit: Arc<dyn NotificationRepository>,
        transport: Arc<dyn MessageTransport>,
        per_recipient_budget: Duration,
    ) -> Self {
        Self {
            submissions,
            staff,
            audit,
            transport,
            per_recipient_budget,
        }
    }

    /// Announce a newly opened period to every active, app-enabled staff
    /// profile.
    pub fn on_period_open(&self, period: &Period) -> Result<Notification, RepositoryError> {
        let title = "Shift recruiting open".to_string();
        let body = format!(
            "A new shift recruiting window has opened.\n\
             Period: {} to {}\n\
             Submission deadline: {}\n\n\
             Please submit your availability from the app.",
            format_date(period.start_date),
            format_date(period.end_date),
            format_deadline(period.submission_close_at),
        );
        let recipients = self.app_enabled_profiles();
        self.dispatch(period, NotificationKind::Open, title, body, recipients)
    }

    /// Remind staff who have not yet submitted. `kind` distinguishes the
    /// scheduled sweep (Reminder) from an operator-triggered push (Manual).
    pub fn on_reminder(
        &self,
        period: &Period,
        kind: NotificationKind,
    ) -> Result<Notification, RepositoryError> {
        let (title, opener) = match kind {
            NotificationKind::Manual => (
                "Please submit your availability".to_string(),
                "You have not submitted your availability yet.",
            ),
            _ => (
                "Reminder: submission deadline approaching".to_string(),
                "The availability submission deadline is approaching.",
            ),
        };
        let body = format!(
            "{}\n\
             Period: {} to {}\n\
             Submission deadline: {}\n\n\
             Please submit as soon as you can.",
            opener,
            format_date(period.start_date),
            format_date(period.end_date),
            format_deadline(period.submission_close_at),
        );
        let recipients = self.unsubmitted_profiles(period)?;
        self.dispatch(period, kind, title, body, recipients)
    }

    /// Active, app-enabled profiles minus those with a committed
    /// submission whose submitted_at is set for this period.
    pub fn unsubmitted_profiles(
        &self,
        period: &Period,
    ) -> Result<Vec<StaffProfile>, RepositoryError> {
        let submitted: Vec<UserId> = self
            .submissions
            .list_for_period(period.id)?
            .into_iter()
            .filter(|sub| sub.status.is_committed() && sub.submitted_at.is_some())
            .map(|sub| sub.user)
            .collect();
        Ok(self
            .app_enabled_profiles()
            .into_iter()
            .filter(|profile| !submitted.contains(&profile.user))
            .collect())
    }

    fn app_enabled_profiles(&self) -> Vec<StaffProfile> {
        self.staff
            .active_profiles()
            .into_iter()
            .filter(|profile| profile.uses_app)
            .collect()
    }

    /// Deliver to each recipient independently and append the audit row.
    ///
    /// Channel pick per profile: push when enabled with a linked channel
    /// identity, else email when enabled with an address, else a silent
    /// skip. A transport failure is logged and not counted; it never
    /// aborts the batch. The audit record is written even for an empty
    /// recipient set.
    fn dispatch(
        &self,
        period: &Period,
        kind: NotificationKind,
        title: String,
        body: String,
        recipients: Vec<StaffProfile>,
    ) -> Result<Notification, RepositoryError> {
        let mut push_count = 0u32;
        let mut email_count = 0u32;

        for profile in &recipients {
            let recipient = match channel_for(profile) {
                Some(recipient) => recipient,
                None => continue,
            };
            match self
                .transport
                .deliver(&recipient, &title, &body, self.per_recipient_budget)
            {
                Ok(true) => match recipient {
                    Recipient::Push { .. } => push_count += 1,
                    Recipient::Email { .. } => email_count += 1,
                },
                Ok(false) => {}
                Err(err) => {
                    warn!(user = profile.user.0, %err, "notification delivery failed");
                }
            }
        }

        self.audit.append(Notification {
            id: 0,
            period: period.id,
            kind,
            title,
            body,
            sent_push_count: push_count,
            sent_email_count: email_count,
            created_at: Utc::now(),
        })
    }
}

fn channel_for(profile: &StaffProfile) -> Option<Recipient> {
    if profile.notify_via_push {
        if let Some(channel_id) = profile.push_channel_id.clone().filter(|id| !id.is_empty()) {
            return Some(Recipient::Push { channel_id });
        }
    }
    if profile.notify_via_email {
        if let Some(address) = profile
            .notification_email
            .clone()
            .filter(|address| !address.is_empty())
        {
            return Some(Recipient::Email { address });
        }
    }
    None
}

fn format_date(date: chrono::NaiveDate) -> String {
    format!("{}/{}", date.month(), date.day())
}

fn format_deadline(at: DateTime<Utc>) -> String {
    format!(
        "{}/{} {:02}:{:02}",
        at.month(),
        at.day(),
        at.hour(),
        at.minute()
    )
}
