//! Shift scheduling engine.
//!
//! The period manager gates whether the availability engine may accept a
//! submission; committed availability feeds the staffing analyzer, whose
//! output guides the assignment validator; the notification dispatcher
//! consumes period and submission state to pick recipients.

pub mod assignment;
pub mod availability;
pub mod calendar;
pub mod directory;
pub mod domain;
pub mod export;
pub mod memory;
pub mod notifications;
pub mod periods;
pub mod repository;
pub mod router;
pub mod service;
pub mod staffing;

#[cfg(test)]
mod tests;

pub use assignment::{AssignmentError, AssignmentValidator};
pub use availability::{
    AvailabilityEngine, AvailabilityError, DayDefault, DayInput, SubmissionSummary,
};
pub use calendar::{date_range, weekday_name, CalendarOracle, CompanyCalendar};
pub use directory::{LocationDirectory, StaffDirectory};
pub use domain::{
    AbsenceCategory, Actor, Assignee, Assignment, AssignmentStatus, Availability, AvailabilityDay,
    ExternalStaff, ExternalStaffId, Location, LocationId, Notification, NotificationKind, Period,
    PeriodDraft, PeriodId, PeriodStatus, PriorityTier, SpecialAssignment, StaffProfile,
    StaffingSettings, Submission, SubmissionId, SubmissionStatus, UserId, WorkPattern,
};
pub use export::{export_submissions_csv, ExportError};
pub use notifications::{
    MessageTransport, NotificationDispatcher, Recipient, TransportError,
};
pub use periods::{PeriodError, PeriodManager};
pub use repository::{
    AssignmentRepository, CommittedDay, NotificationRepository, PeriodRepository, RepositoryError,
    SettingsRepository, SubmissionRepository,
};
pub use router::scheduling_router;
pub use service::{SchedulingApp, SchedulingDeps, SettingsError};
pub use staffing::{DaySnapshot, DayStatus, Heatmap, HeatmapDay, StaffingAnalyzer};
