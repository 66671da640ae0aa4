use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use clap::Args;

use shift_planner::error::AppError;
use shift_planner::scheduling::assignment::AssignmentError;
use shift_planner::scheduling::availability::DayInput;
use shift_planner::scheduling::domain::{
    AbsenceCategory, Actor, Assignee, Availability, ExternalStaffId, LocationId, Notification,
    PeriodDraft, UserId,
};
use shift_planner::scheduling::calendar::date_range;
use shift_planner::scheduling::notifications::{MessageTransport, Recipient, TransportError};

use crate::infra::{build_scheduling_app, parse_date};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// First day of the demo period (YYYY-MM-DD). Defaults to a week from today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) start: Option<NaiveDate>,
    /// Print the CSV export at the end of the run.
    #[arg(long)]
    pub(crate) export: bool,
}

#[derive(Args, Debug)]
pub(crate) struct RemindArgs {
    /// How many days before the submission deadline the sweep targets.
    #[arg(long, default_value_t = 3)]
    pub(crate) days: i64,
}

/// Transport that prints each delivery, so the demo shows the outbound
/// side without a tracing subscriber.
struct PrintTransport;

impl MessageTransport for PrintTransport {
    fn deliver(
        &self,
        recipient: &Recipient,
        title: &str,
        _body: &str,
        _budget: StdDuration,
    ) -> Result<bool, TransportError> {
        match recipient {
            Recipient::Push { channel_id } => println!("  push -> {channel_id}: {title}"),
            Recipient::Email { address } => println!("  email -> {address}: {title}"),
        }
        Ok(true)
    }
}

fn admin() -> Actor {
    Actor::admin(UserId(0))
}

fn print_notification(notification: &Notification) {
    println!(
        "  recorded {} notification: {} push, {} email",
        notification.kind.label(),
        notification.sent_push_count,
        notification.sent_email_count
    );
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let now = Utc::now();
    let start = args
        .start
        .unwrap_or_else(|| now.date_naive() + Duration::days(7));
    let end = start + Duration::days(13);

    let app = build_scheduling_app(Arc::new(PrintTransport), StdDuration::from_millis(3000));

    println!("Shift planning demo: {start} to {end}");
    println!("\nOpening the recruiting window");
    let (period, _) = app.create_period(
        admin(),
        PeriodDraft {
            start_date: start,
            end_date: end,
            submission_open_at: now - Duration::hours(1),
            submission_close_at: now + Duration::days(3),
            shared_notes: "Demo period".to_string(),
        },
    )?;

    let weekdays: Vec<NaiveDate> =
        date_range(period.start_date, period.end_date)
            .filter(|date| !matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
            .collect();
    let day_off = weekdays[1];

    println!("\nCollecting availability");
    // The first driver takes one weekday off with a reason.
    app.availability.validate_and_save(
        Actor::staff(UserId(1)),
        UserId(1),
        period.id,
        vec![DayInput {
            date: day_off,
            availability: Availability::Off,
            absence_category: Some(AbsenceCategory::Personal),
            substitute_user: None,
            comment: "family errand".to_string(),
        }],
        String::new(),
        now,
    )?;
    // The rest submit their pattern defaults; the helper never answers.
    for user in [2u64, 3, 4] {
        app.availability.validate_and_save(
            Actor::staff(UserId(user)),
            UserId(user),
            period.id,
            Vec::new(),
            String::new(),
            now,
        )?;
    }
    println!("  4 of 5 staff submitted");

    println!("\nStaffing dashboard");
    let (_, heatmap) = app.dashboard(period.id, now)?;
    for row in &heatmap.days {
        match (&row.snapshot, &row.holiday_name) {
            (Some(snapshot), _) => println!(
                "  {} ({}) {:>15}  working {} / off {} / drivers {}",
                row.date,
                row.weekday,
                snapshot.status.label(),
                snapshot.available_count,
                snapshot.off_count,
                snapshot.driver_count
            ),
            (None, Some(name)) => println!("  {} ({}) holiday: {}", row.date, row.weekday, name),
            (None, None) => println!("  {} ({}) holiday", row.date, row.weekday),
        }
    }
    let missing: Vec<String> = heatmap
        .not_submitted
        .iter()
        .map(|profile| profile.display_name.clone())
        .collect();
    println!("  awaiting submission: {}", missing.join(", "));

    println!("\nSending a manual reminder");
    let reminder = app.manual_reminder(admin(), period.id, now)?;
    print_notification(&reminder);

    println!("\nPlacing assignments for {}", weekdays[0]);
    let slot_date = weekdays[0];
    app.assignments.assign(
        admin(),
        slot_date,
        LocationId(1),
        Assignee::Staff(UserId(1)),
        String::new(),
    )?;
    println!("  North Gate <- Sato Akira");

    match app.assignments.assign(
        admin(),
        slot_date,
        LocationId(3),
        Assignee::Staff(UserId(3)),
        String::new(),
    ) {
        Err(AssignmentError::DriverRequired { location, assignee }) => {
            println!("  rejected: {location} needs a driver, {assignee} cannot drive");
        }
        Err(err) => return Err(err.into()),
        Ok(_) => println!("  Riverside Stand <- Mori Yui"),
    }

    app.assignments.assign(
        admin(),
        slot_date,
        LocationId(3),
        Assignee::External(ExternalStaffId(1)),
        String::new(),
    )?;
    println!("  Riverside Stand <- Agency Kato (external)");

    for (location, assignment) in app.assignments.slots_for_date(slot_date)? {
        let occupant = match assignment {
            Some(existing) => format!("{:?}", existing.assignee),
            None => "vacant".to_string(),
        };
        println!("  slot {:>2} {} -> {}", location.code, location.name, occupant);
    }

    if args.export {
        println!("\nSubmission export");
        print!("{}", app.export_csv(period.id)?);
    }

    Ok(())
}

/// Run the scheduled reminder job once against a freshly seeded store
/// with one period closing `days` days out.
pub(crate) fn run_reminder_sweep(args: RemindArgs) -> Result<(), AppError> {
    let now = Utc::now();
    let app = build_scheduling_app(Arc::new(PrintTransport), StdDuration::from_millis(3000));

    let start = now.date_naive() + Duration::days(args.days + 2);
    app.periods.create(
        admin(),
        PeriodDraft {
            start_date: start,
            end_date: start + Duration::days(13),
            submission_open_at: now - Duration::hours(1),
            submission_close_at: now + Duration::days(args.days),
            shared_notes: String::new(),
        },
    )?;

    println!(
        "Reminder sweep: deadlines {} day(s) out, within one hour",
        args.days
    );
    let sent = app.reminder_sweep(now, args.days)?;
    if sent.is_empty() {
        println!("  no periods due");
    }
    for notification in &sent {
        print_notification(notification);
    }
    Ok(())
}
