use std::sync::Arc;

use chrono::NaiveDate;

use super::directory::{LocationDirectory, StaffDirectory};
use super::domain::{
    Actor, Assignee, Assignment, AssignmentStatus, Availability, Location, LocationId, PeriodId,
    StaffProfile,
};
use super::repository::{AssignmentRepository, RepositoryError, SubmissionRepository};

/// Error raised by per-slot assignment operations.
#[derive(Debug, thiserror::Error)]
pub enum AssignmentError {
    #[error("operation requires administrator privileges")]
    AccessDenied,
    #[error("location not found")]
    LocationNotFound,
    #[error("assignee not found")]
    AssigneeNotFound,
    #[error("{location} requires a driver but {assignee} cannot drive")]
    DriverRequired { location: String, assignee: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Enforces per-slot assignment constraints (uniqueness, driver
/// requirement) and supports assign/unassign. Assignment stays a manual
/// admin decision per slot; no solver runs here.
pub struct AssignmentValidator {
    assignments: Arc<dyn AssignmentRepository>,
    submissions: Arc<dyn SubmissionRepository>,
    staff: Arc<dyn StaffDirectory>,
    locations: Arc<dyn LocationDirectory>,
}

impl AssignmentValidator {
    pub fn new(
        assignments: Arc<dyn AssignmentRepository>,
        submissions: Arc<dyn SubmissionRepository>,
        staff: Arc<dyn StaffDirectory>,
        locations: Arc<dyn LocationDirectory>,
    ) -> Self {
        Self {
            assignments,
            submissions,
            staff,
            locations,
        }
    }

    /// Staff with committed Work availability on `date`, narrowed to
    /// drivers when the location demands one.
    pub fn list_candidates(
        &self,
        period: PeriodId,
        date: NaiveDate,
        location: LocationId,
    ) -> Result<Vec<StaffProfile>, AssignmentError> {
        let location = self
            .locations
            .location(location)
            .ok_or(AssignmentError::LocationNotFound)?;
        let committed = self.submissions.committed_days_on(period, date)?;
        let mut candidates = Vec::new();
        for entry in committed {
            if entry.day.availability != Availability::Work {
                continue;
            }
            let Some(profile) = self.staff.profile(entry.user) else {
                continue;
            };
            if location.requires_drive && !profile.can_drive {
                continue;
            }
            candidates.push(profile);
        }
        Ok(candidates)
    }

    /// Shift-eligible locations in presentation order (S > A > B >
    /// unranked, then code) with any existing assignment for `date`.
    pub fn slots_for_date(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<(Location, Option<Assignment>)>, AssignmentError> {
        let mut slots = Vec::new();
        for location in self.locations.shift_locations() {
            let existing = self.assignments.fetch(date, location.id)?;
            slots.push((location, existing));
        }
        Ok(slots)
    }

    /// Bind one assignee to one (date, location) slot. Admin-only.
    ///
    /// The write is an upsert on the natural key, so re-assigning replaces
    /// rather than duplicates. A drive-required location rejects any
    /// non-driving assignee before touching storage, leaving a prior
    /// assignment for the slot intact. Special kinds mark the slot
    /// intentionally unmanned and are always accepted.
    pub fn assign(
        &self,
        actor: Actor,
        date: NaiveDate,
        location_id: LocationId,
        assignee: Assignee,
        admin_note: String,
    ) -> Result<Assignment, AssignmentError> {
        if !actor.is_admin {
            return Err(AssignmentError::AccessDenied);
        }
        let location = self
            .locations
            .location(location_id)
            .ok_or(AssignmentError::LocationNotFound)?;

        if location.requires_drive {
            match assignee {
                Assignee::Staff(user) => {
                    let profile = self
                        .staff
                        .profile(user)
                        .ok_or(AssignmentError::AssigneeNotFound)?;
                    if !profile.can_drive {
                        return Err(AssignmentError::DriverRequired {
                            location: location.name.clone(),
                            assignee: profile.display_name,
                        });
                    }
                }
                Assignee::External(id) => {
                    let staff = self
                        .staff
                        .external_staff(id)
                        .ok_or(AssignmentError::AssigneeNotFound)?;
                    if !staff.can_drive {
                        return Err(AssignmentError::DriverRequired {
                            location: location.name.clone(),
                            assignee: staff.name,
                        });
                    }
                }
                Assignee::Special(_) => {}
            }
        }

        let assignment = Assignment {
            date,
            location: location_id,
            assignee,
            status: AssignmentStatus::Draft,
            admin_note,
        };
        self.assignments.upsert(assignment.clone())?;
        Ok(assignment)
    }

    /// Delete the assignment row if present; a vacant slot is a no-op.
    pub fn unassign(
        &self,
        actor: Actor,
        date: NaiveDate,
        location: LocationId,
    ) -> Result<bool, AssignmentError> {
        if !actor.is_admin {
            return Err(AssignmentError::AccessDenied);
        }
        Ok(self.assignments.remove(date, location)?)
    }

    pub fn assignments_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Assignment>, AssignmentError> {
        Ok(self.assignments.in_range(start, end)?)
    }
}
