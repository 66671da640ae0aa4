use std::collections::BTreeSet;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use tracing::info;

use shift_planner::scheduling::calendar::CompanyCalendar;
use shift_planner::scheduling::domain::{
    ExternalStaff, ExternalStaffId, Location, LocationId, PriorityTier, StaffProfile, UserId,
    WorkPattern,
};
use shift_planner::scheduling::memory::{
    InMemoryAssignmentRepository, InMemoryLocationDirectory, InMemoryNotificationRepository,
    InMemoryPeriodRepository, InMemorySettingsRepository, InMemoryStaffDirectory,
    InMemorySubmissionRepository,
};
use shift_planner::scheduling::notifications::{MessageTransport, Recipient, TransportError};
use shift_planner::scheduling::service::{SchedulingApp, SchedulingDeps};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Transport that writes each delivery to the log stream.
///
/// Stands in for the push and email gateways until those integrations
/// land; the dispatcher's counting and failure handling are exercised
/// exactly as they would be against the real channels.
#[derive(Default)]
pub(crate) struct LoggingTransport;

impl MessageTransport for LoggingTransport {
    fn deliver(
        &self,
        recipient: &Recipient,
        title: &str,
        _body: &str,
        _budget: Duration,
    ) -> Result<bool, TransportError> {
        match recipient {
            Recipient::Push { channel_id } => {
                info!(channel = %channel_id, %title, "push notification");
            }
            Recipient::Email { address } => {
                info!(to = %address, %title, "email notification");
            }
        }
        Ok(true)
    }
}

/// Wire the scheduling engine over in-memory storage with the seeded
/// roster and location table.
pub(crate) fn build_scheduling_app(
    transport: Arc<dyn MessageTransport>,
    per_recipient_budget: Duration,
) -> Arc<SchedulingApp> {
    let staff = Arc::new(InMemoryStaffDirectory::new(seed_roster()));
    for external in seed_external_staff() {
        staff.add_external(external);
    }

    Arc::new(SchedulingApp::new(SchedulingDeps {
        periods: Arc::new(InMemoryPeriodRepository::default()),
        submissions: Arc::new(InMemorySubmissionRepository::default()),
        assignments: Arc::new(InMemoryAssignmentRepository::default()),
        settings: Arc::new(InMemorySettingsRepository::default()),
        notifications: Arc::new(InMemoryNotificationRepository::default()),
        staff,
        locations: Arc::new(InMemoryLocationDirectory::new(seed_locations())),
        calendar: Arc::new(CompanyCalendar::default()),
        transport,
        per_recipient_budget,
    }))
}

fn profile(
    user: u64,
    name: &str,
    pattern: WorkPattern,
    can_drive: bool,
    fixed: &[u8],
) -> StaffProfile {
    StaffProfile {
        user: UserId(user),
        display_name: name.to_string(),
        is_active: true,
        work_pattern: pattern,
        can_drive,
        uses_app: true,
        fixed_weekdays: fixed.iter().copied().collect::<BTreeSet<u8>>(),
        min_shifts_per_week: 0,
        max_shifts_per_week: 5,
        notify_via_push: true,
        push_channel_id: Some(format!("channel-{user}")),
        notify_via_email: true,
        notification_email: Some(format!("staff{user}@example.com")),
    }
}

pub(crate) fn seed_roster() -> Vec<StaffProfile> {
    vec![
        profile(1, "Sato Akira", WorkPattern::Full, true, &[]),
        profile(2, "Tanaka Rin", WorkPattern::Full, true, &[]),
        profile(3, "Mori Yui", WorkPattern::Full, false, &[]),
        // Fixed shifts on Tuesday and Thursday.
        profile(4, "Kimura Hana", WorkPattern::Part, false, &[1, 3]),
        profile(5, "Ono Jun", WorkPattern::Helper, false, &[]),
    ]
}

pub(crate) fn seed_locations() -> Vec<Location> {
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
            name: "Riverside Stand".to_string(),
            requires_drive: true,
            priority: PriorityTier::B,
            excluded_from_shift: false,
        },
        Location {
            id: LocationId(4),
            code: 90,
            name: "Warehouse".to_string(),
            requires_drive: false,
            priority: PriorityTier::Unranked,
            excluded_from_shift: true,
        },
    ]
}

pub(crate) fn seed_external_staff() -> Vec<ExternalStaff> {
    vec![ExternalStaff {
        id: ExternalStaffId(1),
        name: "Agency Kato".to_string(),
        can_drive: true,
        is_active: true,
    }]
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
