use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::scheduling::calendar::CompanyCalendar;
use crate::scheduling::domain::{
    Actor, Availability, Location, LocationId, PeriodDraft, PeriodId, PriorityTier, StaffProfile,
    SubmissionStatus, UserId, WorkPattern,
};
use crate::scheduling::memory::{
    InMemoryAssignmentRepository, InMemoryLocationDirectory, InMemoryNotificationRepository,
    InMemoryPeriodRepository, InMemorySettingsRepository, InMemoryStaffDirectory,
    InMemorySubmissionRepository,
};
use crate::scheduling::notifications::{MessageTransport, Recipient, TransportError};
use crate::scheduling::repository::SubmissionRepository;
use crate::scheduling::service::{SchedulingApp, SchedulingDeps};

/// Transport double recording every delivery; addresses registered as
/// failing return an error instead.
#[derive(Default)]
pub(super) struct RecordingTransport {
    pub(super) deliveries: Mutex<Vec<(Recipient, String)>>,
    pub(super) failing: Mutex<Vec<String>>,
}

impl RecordingTransport {
    pub(super) fn fail_for(&self, key: &str) {
        self.failing
            .lock()
            .expect("failing mutex poisoned")
            .push(key.to_string());
    }

    pub(super) fn delivered(&self) -> Vec<(Recipient, String)> {
        self.deliveries
            .lock()
            .expect("delivery mutex poisoned")
            .clone()
    }
}

impl MessageTransport for RecordingTransport {
    fn deliver(
        &self,
        recipient: &Recipient,
        title: &str,
        _body: &str,
        _budget: Duration,
    ) -> Result<bool, TransportError> {
        let key = match recipient {
            Recipient::Push { channel_id } => channel_id.clone(),
            Recipient::Email { address } => address.clone(),
        };
        if self
            .failing
            .lock()
            .expect("failing mutex poisoned")
            .contains(&key)
        {
            return Err(TransportError::Failed(format!("unreachable: {key}")));
        }
        self.deliveries
            .lock()
            .expect("delivery mutex poisoned")
            .push((recipient.clone(), title.to_string()));
        Ok(true)
    }
}

pub(super) struct Harness {
    pub(super) app: SchedulingApp,
    pub(super) staff: Arc<InMemoryStaffDirectory>,
    pub(super) calendar: Arc<CompanyCalendar>,
    pub(super) transport: Arc<RecordingTransport>,
    pub(super) notifications: Arc<InMemoryNotificationRepository>,
    pub(super) submissions: Arc<InMemorySubmissionRepository>,
}

pub(super) fn harness() -> Harness {
    harness_with_locations(default_locations())
}

pub(super) fn harness_with_locations(locations: Vec<Location>) -> Harness {
    let staff = Arc::new(InMemoryStaffDirectory::new(default_roster()));
    let calendar = Arc::new(CompanyCalendar::default());
    let transport = Arc::new(RecordingTransport::default());
    let notifications = Arc::new(InMemoryNotificationRepository::default());
    let submissions = Arc::new(InMemorySubmissionRepository::default());

    let app = SchedulingApp::new(SchedulingDeps {
        periods: Arc::new(InMemoryPeriodRepository::default()),
        submissions: submissions.clone(),
        assignments: Arc::new(InMemoryAssignmentRepository::default()),
        settings: Arc::new(InMemorySettingsRepository::default()),
        notifications: notifications.clone(),
        staff: staff.clone(),
        locations: Arc::new(InMemoryLocationDirectory::new(locations)),
        calendar: calendar.clone(),
        transport: transport.clone(),
        per_recipient_budget: Duration::from_millis(100),
    });

    Harness {
        app,
        staff,
        calendar,
        transport,
        notifications,
        submissions,
    }
}

pub(super) fn profile(user: u64, name: &str, pattern: WorkPattern) -> StaffProfile {
    StaffProfile {
        user: UserId(user),
        display_name: name.to_string(),
        is_active: true,
        work_pattern: pattern,
        can_drive: false,
        uses_app: true,
        fixed_weekdays: BTreeSet::new(),
        min_shifts_per_week: 0,
        max_shifts_per_week: 5,
        notify_via_push: false,
        push_channel_id: None,
        notify_via_email: true,
        notification_email: Some(format!("user{user}@example.com")),
    }
}

pub(super) fn default_roster() -> Vec<StaffProfile> {
    let mut driver = profile(1, "Sato Akira", WorkPattern::Full);
    driver.can_drive = true;
    driver.notify_via_push = true;
    driver.push_channel_id = Some("push-sato".to_string());

    let mut part = profile(2, "Kimura Hana", WorkPattern::Part);
    // Tue/Thu fixed shifts.
    part.fixed_weekdays = BTreeSet::from([1, 3]);

    let helper = profile(3, "Ono Jun", WorkPattern::Helper);
    let full = profile(4, "Mori Yui", WorkPattern::Full);

    vec![driver, part, helper, full]
}

pub(super) fn default_locations() -> Vec<Location> {
    vec![
        Location {
            id: LocationId(1),
            code: 10,
            name: "North Gate".to_string(),
            requires_drive: true,
            priority: PriorityTier::S,
            excluded_from_shift: false,
        },
        Location {
            id: LocationId(2),
            code: 20,
            name: "Station Front".to_string(),
            requires_drive: false,
            priority: PriorityTier::A,
            excluded_from_shift: false,
        },
        Location {
            id: LocationId(3),
            code: 30,
            name: "Warehouse".to_string(),
            requires_drive: true,
            priority: PriorityTier::B,
            excluded_from_shift: true,
        },
    ]
}

pub(super) fn admin() -> Actor {
    Actor::admin(UserId(99))
}

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).single().expect("valid timestamp")
}

/// The worked example window: 2025-02-16 through 2025-03-01, submissions
/// closing on 2025-02-20 23:59 UTC.
pub(super) fn sample_draft() -> PeriodDraft {
    PeriodDraft {
        start_date: date(2025, 2, 16),
        end_date: date(2025, 3, 1),
        submission_open_at: at(2025, 2, 10, 0, 0),
        submission_close_at: at(2025, 2, 20, 23, 59),
        shared_notes: String::new(),
    }
}

pub(super) fn sample_now() -> DateTime<Utc> {
    at(2025, 2, 17, 9, 0)
}

/// Seed a committed submission directly at the storage layer, bypassing
/// the submission window, for analyzer/assignment tests.
pub(super) fn commit_days(
    submissions: &Arc<InMemorySubmissionRepository>,
    user: u64,
    period: PeriodId,
    days: &[(NaiveDate, Availability)],
    now: DateTime<Utc>,
) {
    let mut submission = submissions
        .find_or_create(UserId(user), period)
        .expect("submission created");
    for (day_date, availability) in days {
        submissions
            .upsert_day(crate::scheduling::domain::AvailabilityDay {
                submission: submission.id,
                date: *day_date,
                availability: *availability,
                absence_category: None,
                substitute_user: None,
                comment: String::new(),
            })
            .expect("day stored");
    }
    submission.status = SubmissionStatus::Submitted;
    submission.submitted_at = Some(now);
    submissions.update(submission).expect("submission committed");
}
