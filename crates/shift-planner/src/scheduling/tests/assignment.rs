use super::common::{admin, commit_days, date, harness, sample_draft, sample_now};
use crate::scheduling::assignment::AssignmentError;
use crate::scheduling::domain::{
    Actor, Assignee, Availability, ExternalStaff, ExternalStaffId, LocationId, SpecialAssignment,
    UserId,
};

#[test]
fn assign_requires_admin() {
    let h = harness();
    let result = h.app.assignments.assign(
        Actor::staff(UserId(1)),
        date(2025, 2, 21),
        LocationId(2),
        Assignee::Staff(UserId(1)),
        String::new(),
    );
    assert!(matches!(result, Err(AssignmentError::AccessDenied)));
}

#[test]
fn candidates_are_committed_workers_narrowed_to_drivers() {
    let h = harness();
    let period = h.app.periods.create(admin(), sample_draft()).unwrap();
    let day = date(2025, 2, 21);

    // User 1 drives and works; user 4 works but cannot drive; user 2 is off.
    commit_days(
        &h.submissions,
        1,
        period.id,
        &[(day, Availability::Work)],
        sample_now(),
    );
    commit_days(
        &h.submissions,
        4,
        period.id,
        &[(day, Availability::Work)],
        sample_now(),
    );
    commit_days(
        &h.submissions,
        2,
        period.id,
        &[(day, Availability::Off)],
        sample_now(),
    );

    // North Gate requires a driver.
    let drivers = h
        .app
        .assignments
        .list_candidates(period.id, day, LocationId(1))
        .unwrap();
    assert_eq!(drivers.len(), 1);
    assert_eq!(drivers[0].user, UserId(1));

    // Station Front takes any committed worker.
    let anyone = h
        .app
        .assignments
        .list_candidates(period.id, day, LocationId(2))
        .unwrap();
    let users: Vec<UserId> = anyone.iter().map(|profile| profile.user).collect();
    assert_eq!(users, vec![UserId(1), UserId(4)]);
}

#[test]
fn non_driver_is_rejected_and_the_prior_assignment_survives() {
    let h = harness();
    let day = date(2025, 2, 21);

    h.app
        .assignments
        .assign(
            admin(),
            day,
            LocationId(1),
            Assignee::Staff(UserId(1)),
            String::new(),
        )
        .unwrap();

    let result = h.app.assignments.assign(
        admin(),
        day,
        LocationId(1),
        Assignee::Staff(UserId(4)),
        String::new(),
    );
    match result {
        Err(AssignmentError::DriverRequired { location, assignee }) => {
            assert_eq!(location, "North Gate");
            assert_eq!(assignee, "Mori Yui");
        }
        other => panic!("expected driver rejection, got {other:?}"),
    }

    let slots = h.app.assignments.slots_for_date(day).unwrap();
    let (_, existing) = slots.iter().find(|(loc, _)| loc.id == LocationId(1)).unwrap();
    assert_eq!(
        existing.as_ref().unwrap().assignee,
        Assignee::Staff(UserId(1))
    );
}

#[test]
fn reassigning_a_slot_replaces_the_previous_row() {
    let h = harness();
    let day = date(2025, 2, 21);

    h.app
        .assignments
        .assign(
            admin(),
            day,
            LocationId(2),
            Assignee::Staff(UserId(4)),
            String::new(),
        )
        .unwrap();
    h.app
        .assignments
        .assign(
            admin(),
            day,
            LocationId(2),
            Assignee::Staff(UserId(2)),
            String::new(),
        )
        .unwrap();

    let assignments = h.app.assignments.assignments_in_range(day, day).unwrap();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].assignee, Assignee::Staff(UserId(2)));
}

#[test]
fn external_staff_face_the_same_driver_check() {
    let h = harness();
    h.staff.add_external(ExternalStaff {
        id: ExternalStaffId(1),
        name: "Agency Kato".to_string(),
        can_drive: false,
        is_active: true,
    });
    h.staff.add_external(ExternalStaff {
        id: ExternalStaffId(2),
        name: "Agency Abe".to_string(),
        can_drive: true,
        is_active: true,
    });
    let day = date(2025, 2, 21);

    let rejected = h.app.assignments.assign(
        admin(),
        day,
        LocationId(1),
        Assignee::External(ExternalStaffId(1)),
        String::new(),
    );
    assert!(matches!(
        rejected,
        Err(AssignmentError::DriverRequired { .. })
    ));

    h.app
        .assignments
        .assign(
            admin(),
            day,
            LocationId(1),
            Assignee::External(ExternalStaffId(2)),
            String::new(),
        )
        .unwrap();
}

#[test]
fn special_assignments_bypass_the_driver_check() {
    let h = harness();
    let day = date(2025, 2, 21);

    let assignment = h
        .app
        .assignments
        .assign(
            admin(),
            day,
            LocationId(1),
            Assignee::Special(SpecialAssignment::Rest),
            "closed for maintenance".to_string(),
        )
        .unwrap();
    assert_eq!(
        assignment.assignee,
        Assignee::Special(SpecialAssignment::Rest)
    );
}

#[test]
fn unassign_reports_whether_a_row_was_removed() {
    let h = harness();
    let day = date(2025, 2, 21);

    h.app
        .assignments
        .assign(
            admin(),
            day,
            LocationId(2),
            Assignee::Staff(UserId(4)),
            String::new(),
        )
        .unwrap();

    assert!(h.app.assignments.unassign(admin(), day, LocationId(2)).unwrap());
    assert!(!h.app.assignments.unassign(admin(), day, LocationId(2)).unwrap());
}

#[test]
fn slots_exclude_non_shift_locations_and_follow_priority_order() {
    let h = harness();
    let slots = h.app.assignments.slots_for_date(date(2025, 2, 21)).unwrap();

    let ids: Vec<LocationId> = slots.iter().map(|(loc, _)| loc.id).collect();
    // Warehouse is excluded from shifts; S-tier sorts before A-tier.
    assert_eq!(ids, vec![LocationId(1), LocationId(2)]);
}

#[test]
fn unknown_location_is_reported() {
    let h = harness();
    let result = h.app.assignments.assign(
        admin(),
        date(2025, 2, 21),
        LocationId(42),
        Assignee::Staff(UserId(1)),
        String::new(),
    );
    assert!(matches!(result, Err(AssignmentError::LocationNotFound)));
}
