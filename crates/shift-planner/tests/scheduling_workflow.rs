//! End-to-end scenarios for the shift planning workflow.
//!
//! Scenarios run one period end to end through the public service facade and
//! the HTTP router: open a window, collect availability, read the staffing
//! dashboard, place assignments, and export the result.

mod common {
    use std::collections::BTreeSet;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    use shift_planner::scheduling::calendar::CompanyCalendar;
    use shift_planner::scheduling::domain::{
        Actor, Location, LocationId, PeriodDraft, PriorityTier, StaffProfile, UserId, WorkPattern,
    };
    use shift_planner::scheduling::memory::{
        InMemoryAssignmentRepository, InMemoryLocationDirectory, InMemoryNotificationRepository,
        InMemoryPeriodRepository, InMemorySettingsRepository, InMemoryStaffDirectory,
        InMemorySubmissionRepository,
    };
    use shift_planner::scheduling::notifications::{MessageTransport, Recipient, TransportError};
    use shift_planner::scheduling::service::{SchedulingApp, SchedulingDeps};

    /// Transport double that records deliveries and always succeeds.
    #[derive(Default)]
    pub(super) struct RecordingTransport {
        deliveries: Mutex<Vec<Recipient>>,
    }

    impl RecordingTransport {
        pub(super) fn delivery_count(&self) -> usize {
            self.deliveries
                .lock()
                .expect("delivery mutex poisoned")
                .len()
        }
    }

    impl MessageTransport for RecordingTransport {
        fn deliver(
            &self,
            recipient: &Recipient,
            _title: &str,
            _body: &str,
            _budget: Duration,
        ) -> Result<bool, TransportError> {
            self.deliveries
                .lock()
                .expect("delivery mutex poisoned")
                .push(recipient.clone());
            Ok(true)
        }
    }

    pub(super) fn build_app() -> (Arc<SchedulingApp>, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::default());
        let app = SchedulingApp::new(SchedulingDeps {
            periods: Arc::new(InMemoryPeriodRepository::default()),
            submissions: Arc::new(InMemorySubmissionRepository::default()),
            assignments: Arc::new(InMemoryAssignmentRepository::default()),
            settings: Arc::new(InMemorySettingsRepository::default()),
            notifications: Arc::new(InMemoryNotificationRepository::default()),
            staff: Arc::new(InMemoryStaffDirectory::new(roster())),
            locations: Arc::new(InMemoryLocationDirectory::new(locations())),
            calendar: Arc::new(CompanyCalendar::default()),
            transport: transport.clone(),
            per_recipient_budget: Duration::from_millis(100),
        });
        (Arc::new(app), transport)
    }

    fn roster() -> Vec<StaffProfile> {
        let driver = StaffProfile {
            user: UserId(1),
            display_name: "Sato Akira".to_string(),
            is_active: true,
            work_pattern: WorkPattern::Full,
            can_drive: true,
            uses_app: true,
            fixed_weekdays: BTreeSet::new(),
            min_shifts_per_week: 0,
            max_shifts_per_week: 5,
            notify_via_push: true,
            push_channel_id: Some("push-sato".to_string()),
            notify_via_email: true,
            notification_email: Some("sato@example.com".to_string()),
        };
        let mut clerk = driver.clone();
        clerk.user = UserId(2);
        clerk.display_name = "Mori Yui".to_string();
        clerk.can_drive = false;
        clerk.notify_via_push = false;
        clerk.push_channel_id = None;
        clerk.notification_email = Some("mori@example.com".to_string());
        vec![driver, clerk]
    }

    fn locations() -> Vec<Location> {
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
        ]
    }

    pub(super) fn admin() -> Actor {
        Actor::admin(UserId(99))
    }

    pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    pub(super) fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0)
            .single()
            .expect("valid timestamp")
    }

    /// Two weeks starting Sunday 2025-02-16, submissions closing on the
    /// evening of Thursday 2025-02-20.
    pub(super) fn draft() -> PeriodDraft {
        PeriodDraft {
            start_date: date(2025, 2, 16),
            end_date: date(2025, 3, 1),
            submission_open_at: at(2025, 2, 10, 0, 0),
            submission_close_at: at(2025, 2, 20, 23, 59),
            shared_notes: "Spring campaign".to_string(),
        }
    }

    pub(super) fn during_window() -> DateTime<Utc> {
        at(2025, 2, 17, 9, 0)
    }
}

mod workflow {
    use super::common::{admin, at, build_app, date, draft, during_window};
    use shift_planner::scheduling::availability::DayInput;
    use shift_planner::scheduling::domain::{
        AbsenceCategory, Actor, Assignee, Availability, LocationId, PeriodStatus,
        SubmissionStatus, UserId,
    };
    use shift_planner::scheduling::staffing::DayStatus;

    #[test]
    fn one_period_from_open_to_export() {
        let (app, transport) = build_app();

        // Opening the window announces it to both app users.
        let (period, notification) = app.create_period(admin(), draft()).unwrap();
        let notification = notification.expect("announcement dispatched");
        assert_eq!(period.status, PeriodStatus::Open);
        assert_eq!(
            notification.sent_push_count + notification.sent_email_count,
            2
        );
        assert_eq!(transport.delivery_count(), 2);

        // The driver takes Friday the 21st off and works the rest.
        let submission = app
            .availability
            .validate_and_save(
                Actor::staff(UserId(1)),
                UserId(1),
                period.id,
                vec![DayInput {
                    date: date(2025, 2, 21),
                    availability: Availability::Off,
                    absence_category: Some(AbsenceCategory::Personal),
                    substitute_user: None,
                    comment: "family visit".to_string(),
                }],
                String::new(),
                during_window(),
            )
            .unwrap();
        assert_eq!(submission.status, SubmissionStatus::Submitted);

        // The dashboard flags the 21st: the only driver is off.
        let (_, heatmap) = app.dashboard(period.id, during_window()).unwrap();
        let friday = heatmap
            .days
            .iter()
            .find(|row| row.date == date(2025, 2, 21))
            .unwrap();
        assert_eq!(
            friday.snapshot.unwrap().status,
            DayStatus::DriverShortage
        );

        // Monday the 17th has its driver and nobody off.
        let monday = heatmap
            .days
            .iter()
            .find(|row| row.date == date(2025, 2, 17))
            .unwrap();
        let snapshot = monday.snapshot.unwrap();
        assert_eq!(snapshot.status, DayStatus::Ok);
        assert_eq!(snapshot.driver_count, 1);

        // The clerk never submitted and shows up as missing.
        assert_eq!(heatmap.not_submitted.len(), 1);
        assert_eq!(heatmap.not_submitted[0].user, UserId(2));

        // Assign the driver to the drive-required slot on a working day.
        let assignment = app
            .assignments
            .assign(
                admin(),
                date(2025, 2, 17),
                LocationId(1),
                Assignee::Staff(UserId(1)),
                String::new(),
            )
            .unwrap();
        assert_eq!(assignment.assignee, Assignee::Staff(UserId(1)));

        // Export carries the driver's row with the Friday comment.
        let csv = app.export_csv(period.id).unwrap();
        assert!(csv.starts_with("name,02/16,comment"));
        assert!(csv.contains("Sato Akira"));
        assert!(csv.contains("family visit"));
    }

    #[test]
    fn missed_deadline_falls_back_to_admin_proxy() {
        let (app, _) = build_app();
        let (period, _) = app.create_period(admin(), draft()).unwrap();

        // The clerk tries the morning after the deadline.
        let after_close = at(2025, 2, 21, 8, 0);
        let late = app.availability.validate_and_save(
            Actor::staff(UserId(2)),
            UserId(2),
            period.id,
            Vec::new(),
            String::new(),
            after_close,
        );
        assert!(late.is_err());

        // The attempt swept the period into review.
        assert_eq!(
            app.periods.get(period.id).unwrap().status,
            PeriodStatus::Review
        );

        // An admin files the answers on the clerk's behalf, flagged late.
        let proxied = app
            .availability
            .validate_and_save(
                admin(),
                UserId(2),
                period.id,
                Vec::new(),
                "phoned in".to_string(),
                after_close,
            )
            .unwrap();
        assert!(proxied.submitted_by_admin);
        assert!(proxied.is_late_submission);

        // Approval closes the loop.
        let approved = app
            .availability
            .approve(admin(), period.id, &[proxied.id])
            .unwrap();
        assert_eq!(approved, 1);
    }
}

mod routing {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::{Datelike, Duration, Utc};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::common::build_app;
    use shift_planner::scheduling::router::scheduling_router;

    /// A window that is open around the real clock, since the HTTP layer
    /// stamps requests with `Utc::now()`.
    fn live_draft() -> Value {
        let today = Utc::now().date_naive();
        json!({
            "start_date": today + Duration::days(7),
            "end_date": today + Duration::days(20),
            "submission_open_at": Utc::now() - Duration::hours(1),
            "submission_close_at": Utc::now() + Duration::days(3),
        })
    }

    fn admin_actor() -> Value {
        json!({ "user_id": 99, "is_admin": true })
    }

    async fn post_json(router: &axum::Router, uri: &str, payload: Value) -> (StatusCode, Value) {
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(payload.to_string()))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    #[tokio::test]
    async fn post_periods_creates_and_announces() {
        let (app, transport) = build_app();
        let router = scheduling_router(app);

        let mut payload = live_draft();
        payload["actor"] = admin_actor();
        let (status, body) = post_json(&router, "/api/v1/periods", payload).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            body.pointer("/period/status").and_then(Value::as_str),
            Some("open")
        );
        assert!(body.pointer("/notification/id").is_some());
        assert_eq!(transport.delivery_count(), 2);
    }

    #[tokio::test]
    async fn post_periods_rejects_non_admin() {
        let (app, _) = build_app();
        let router = scheduling_router(app);

        let mut payload = live_draft();
        payload["actor"] = json!({ "user_id": 2, "is_admin": false });
        let (status, body) = post_json(&router, "/api/v1/periods", payload).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.get("error").is_some());
    }

    #[tokio::test]
    async fn submission_round_trip_over_http() {
        let (app, _) = build_app();
        let router = scheduling_router(app);

        let mut payload = live_draft();
        payload["actor"] = admin_actor();
        let (_, created) = post_json(&router, "/api/v1/periods", payload).await;
        let period_id = created
            .pointer("/period/id")
            .and_then(Value::as_u64)
            .expect("period id");

        // The driver submits with every day at its default.
        let (status, submission) = post_json(
            &router,
            &format!("/api/v1/periods/{period_id}/submissions"),
            json!({
                "actor": { "user_id": 1, "is_admin": false },
                "user": 1,
                "days": [],
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            submission.get("status").and_then(Value::as_str),
            Some("submitted")
        );

        // A day off without a reason comes back as a violation list.
        let first_weekday = {
            let start = created
                .pointer("/period/start_date")
                .and_then(Value::as_str)
                .expect("start date")
                .to_string();
            let mut day: chrono::NaiveDate = start.parse().expect("date");
            while matches!(
                day.weekday(),
                chrono::Weekday::Sat | chrono::Weekday::Sun
            ) {
                day = day + Duration::days(1);
            }
            day
        };
        let (status, rejection) = post_json(
            &router,
            &format!("/api/v1/periods/{period_id}/submissions"),
            json!({
                "actor": { "user_id": 2, "is_admin": false },
                "user": 2,
                "days": [{ "date": first_weekday, "availability": "off" }],
            }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(rejection
            .get("violations")
            .and_then(Value::as_array)
            .is_some_and(|violations| !violations.is_empty()));
    }

    #[tokio::test]
    async fn dashboard_returns_heatmap_rows() {
        let (app, _) = build_app();
        let router = scheduling_router(app);

        let mut payload = live_draft();
        payload["actor"] = admin_actor();
        let (_, created) = post_json(&router, "/api/v1/periods", payload).await;
        let period_id = created
            .pointer("/period/id")
            .and_then(Value::as_u64)
            .expect("period id");

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(format!("/api/v1/periods/{period_id}/dashboard"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json");
        let days = body
            .pointer("/heatmap/days")
            .and_then(Value::as_array)
            .expect("rows");
        assert_eq!(days.len(), 14);
    }

    #[tokio::test]
    async fn driver_constraint_surfaces_as_conflict() {
        let (app, _) = build_app();
        let router = scheduling_router(app);

        let (status, body) = post_json(&router, "/api/v1/periods", {
            let mut payload = live_draft();
            payload["actor"] = admin_actor();
            payload
        })
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let start = body
            .pointer("/period/start_date")
            .and_then(Value::as_str)
            .expect("start date")
            .to_string();

        // PUT an assignee who cannot drive into the drive-required slot.
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/v1/assignments")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({
                            "actor": { "user_id": 99, "is_admin": true },
                            "date": start,
                            "location": 1,
                            "assignee": { "staff": 2 },
                        })
                        .to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn settings_update_requires_admin() {
        let (app, _) = build_app();
        let router = scheduling_router(app);

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/v1/settings")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({
                            "actor": { "user_id": 2, "is_admin": false },
                            "ok_threshold": 1,
                            "warning_threshold": 3,
                            "danger_threshold": 5,
                        })
                        .to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
