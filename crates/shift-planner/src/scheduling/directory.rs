use super::domain::{
    ExternalStaff, ExternalStaffId, Location, LocationId, StaffProfile, UserId,
};

/// Read access to the staff roster and per-member profiles.
///
/// The directory is owned outside the scheduling core; the engine only
/// reads work patterns, driving capability, and notification preferences.
pub trait StaffDirectory: Send + Sync {
    fn active_profiles(&self) -> Vec<StaffProfile>;
    fn profile(&self, user: UserId) -> Option<StaffProfile>;
    fn external_staff(&self, id: ExternalStaffId) -> Option<ExternalStaff>;
}

/// Read access to sales locations and their shift attributes.
pub trait LocationDirectory: Send + Sync {
    fn locations(&self) -> Vec<Location>;

    fn location(&self, id: LocationId) -> Option<Location> {
        self.locations().into_iter().find(|loc| loc.id == id)
    }

    /// Locations participating in shift assignment, ranked by priority
    /// tier (S > A > B > unranked) then numeric code.
    fn shift_locations(&self) -> Vec<Location> {
        let mut locations: Vec<Location> = self
            .locations()
            .into_iter()
            .filter(|loc| !loc.excluded_from_shift)
            .collect();
        locations.sort_by_key(|loc| (loc.priority.rank(), loc.code));
        locations
    }

    /// How many shift-eligible locations need a driving-capable assignee.
    fn required_driver_count(&self) -> u32 {
        self.shift_locations()
            .iter()
            .filter(|loc| loc.requires_drive)
            .count() as u32
    }
}
