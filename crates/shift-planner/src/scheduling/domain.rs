use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for staff members known to the staff directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Identifier wrapper for recruiting periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeriodId(pub u64);

/// Identifier wrapper for availability submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub u64);

/// Identifier wrapper for sales locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocationId(pub u64);

/// Identifier wrapper for external (non-directory) staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExternalStaffId(pub u64);

/// The caller identity threaded through admin-gated operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub is_admin: bool,
}

impl Actor {
    pub fn staff(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: false,
        }
    }

    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            is_admin: true,
        }
    }
}

/// Lifecycle of a recruiting window.
///
/// Open -> Review happens lazily when the close time elapses; every other
/// transition is an explicit admin action and none is structurally forbidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    Open,
    Review,
    Fixed,
    Published,
}

impl PeriodStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PeriodStatus::Open => "open",
            PeriodStatus::Review => "review",
            PeriodStatus::Fixed => "fixed",
            PeriodStatus::Published => "published",
        }
    }
}

/// A recruiting/assignment window with explicit open/close timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub id: PeriodId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub submission_open_at: DateTime<Utc>,
    pub submission_close_at: DateTime<Utc>,
    pub status: PeriodStatus,
    pub shared_notes: String,
}

/// Caller-supplied fields for period creation; the repository assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodDraft {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub submission_open_at: DateTime<Utc>,
    pub submission_close_at: DateTime<Utc>,
    #[serde(default)]
    pub shared_notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Draft,
    Submitted,
    Approved,
    Returned,
}

impl SubmissionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SubmissionStatus::Draft => "draft",
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Returned => "returned",
        }
    }

    /// Submitted and approved rows both count toward the heatmap and
    /// candidate pools.
    pub const fn is_committed(self) -> bool {
        matches!(self, SubmissionStatus::Submitted | SubmissionStatus::Approved)
    }
}

/// One staff member's complete availability answer set for a period.
/// Unique per (user, period); created lazily on first access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub user: UserId,
    pub period: PeriodId,
    pub status: SubmissionStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub remarks: String,
    pub admin_note: String,
    pub submitted_by_admin: bool,
    pub is_late_submission: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Work,
    Off,
}

impl Availability {
    pub const fn label(self) -> &'static str {
        match self {
            Availability::Work => "work",
            Availability::Off => "off",
        }
    }
}

/// Reason attached to an Off day when the work pattern demands one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsenceCategory {
    Personal,
    Sick,
    Substitute,
    Other,
}

impl AbsenceCategory {
    pub const fn label(self) -> &'static str {
        match self {
            AbsenceCategory::Personal => "personal",
            AbsenceCategory::Sick => "sick",
            AbsenceCategory::Substitute => "substitute",
            AbsenceCategory::Other => "other",
        }
    }
}

/// A single date's Work/Off entry plus reason metadata.
/// Unique per (submission, date); rewritten wholesale on each submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityDay {
    pub submission: SubmissionId,
    pub date: NaiveDate,
    pub availability: Availability,
    pub absence_category: Option<AbsenceCategory>,
    pub substitute_user: Option<UserId>,
    pub comment: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkPattern {
    Full,
    Part,
    Helper,
}

impl WorkPattern {
    pub const fn label(self) -> &'static str {
        match self {
            WorkPattern::Full => "full",
            WorkPattern::Part => "part",
            WorkPattern::Helper => "helper",
        }
    }
}

/// Directory-owned view of a staff member, read by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffProfile {
    pub user: UserId,
    pub display_name: String,
    pub is_active: bool,
    pub work_pattern: WorkPattern,
    pub can_drive: bool,
    pub uses_app: bool,
    /// Weekday indices with 0 = Monday through 6 = Sunday.
    pub fixed_weekdays: BTreeSet<u8>,
    pub min_shifts_per_week: u8,
    pub max_shifts_per_week: u8,
    pub notify_via_push: bool,
    pub push_channel_id: Option<String>,
    pub notify_via_email: bool,
    pub notification_email: Option<String>,
}

impl StaffProfile {
    pub fn is_fixed_weekday(&self, date: NaiveDate) -> bool {
        use chrono::Datelike;
        self.fixed_weekdays
            .contains(&(date.weekday().num_days_from_monday() as u8))
    }
}

/// Presentation tier for candidate assignment ordering: S > A > B > unranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    S,
    A,
    B,
    Unranked,
}

impl PriorityTier {
    pub const fn rank(self) -> u8 {
        match self {
            PriorityTier::S => 0,
            PriorityTier::A => 1,
            PriorityTier::B => 2,
            PriorityTier::Unranked => 3,
        }
    }
}

/// Directory-owned view of a sales location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub code: u32,
    pub name: String,
    pub requires_drive: bool,
    pub priority: PriorityTier,
    pub excluded_from_shift: bool,
}

/// Staff brought in from outside the directory (no submissions of their own).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalStaff {
    pub id: ExternalStaffId,
    pub name: String,
    pub can_drive: bool,
    pub is_active: bool,
}

/// Marks a slot as intentionally unmanned for a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialAssignment {
    Rest,
    Cancel,
}

impl SpecialAssignment {
    pub const fn label(self) -> &'static str {
        match self {
            SpecialAssignment::Rest => "rest",
            SpecialAssignment::Cancel => "cancel",
        }
    }
}

/// Exactly one assignee kind per slot; the enum makes the one-of constraint
/// structural rather than a storage convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Assignee {
    Staff(UserId),
    External(ExternalStaffId),
    Special(SpecialAssignment),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Draft,
    Confirmed,
}

/// The binding of one location to one assignee for one date.
/// Unique per (date, location); admin-maintained only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub date: NaiveDate,
    pub location: LocationId,
    pub assignee: Assignee,
    pub status: AssignmentStatus,
    pub admin_note: String,
}

/// Singleton heatmap thresholds; always present, admin-editable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffingSettings {
    pub ok_threshold: u32,
    pub warning_threshold: u32,
    pub danger_threshold: u32,
}

impl Default for StaffingSettings {
    fn default() -> Self {
        Self {
            ok_threshold: 2,
            warning_threshold: 4,
            danger_threshold: 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Open,
    Reminder,
    Manual,
}

impl NotificationKind {
    pub const fn label(self) -> &'static str {
        match self {
            NotificationKind::Open => "open",
            NotificationKind::Reminder => "reminder",
            NotificationKind::Manual => "manual",
        }
    }
}

/// Append-only audit record of a dispatched notification batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: u64,
    pub period: PeriodId,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    pub sent_push_count: u32,
    pub sent_email_count: u32,
    pub created_at: DateTime<Utc>,
}
