#[cfg(test)]
mod tests {
    use crate::logic::{
        self, CreateAppointmentRequest, SchedulingError, StatsQuery, UpdateAppointmentRequest,
    };
    use bookify_common::models::{
        AppointmentStatus, Employee, PaymentStatus, Service, ServiceCategory, TimeOfDay,
        WeeklyHours,
    };
    use bookify_common::{Actor, Role};
    use bookify_config::BookingConfig;
    use bookify_db::{MemoryStore, Repositories, ServiceRepository, EmployeeRepository};
    use chrono::{NaiveDate, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn service(id: &str, price: i64) -> Service {
        Service {
            id: id.to_string(),
            name: format!("service {id}"),
            description: "test service".to_string(),
            duration_minutes: 30,
            price,
            category: ServiceCategory::Haircut,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn employee(id: &str, services: &[&str]) -> Employee {
        Employee {
            id: id.to_string(),
            name: id.to_string(),
            email: format!("{id}@example.com"),
            phone: "555-0100".to_string(),
            specialization: "stylist".to_string(),
            service_ids: services.iter().map(|s| s.to_string()).collect(),
            working_hours: WeeklyHours::default(),
            is_active: true,
            hire_date: date(2023, 1, 1),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn booking() -> BookingConfig {
        BookingConfig::default()
    }

    fn client_actor(id: &str) -> Actor {
        Actor::new(id, Role::Client)
    }

    fn admin() -> Actor {
        Actor::new("boss", Role::Admin)
    }

    fn create_request(
        service_id: &str,
        employee_id: Option<&str>,
        d: NaiveDate,
        t: TimeOfDay,
    ) -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            service_id: service_id.to_string(),
            employee_id: employee_id.map(str::to_string),
            date: d,
            time: t,
            notes: None,
        }
    }

    /// Memory-backed repositories with one haircut service and the named
    /// employees, all qualified for it.
    async fn fixture(employees: &[&str]) -> Repositories {
        let store = MemoryStore::new();
        store.insert_service(service("s1", 2500)).await.unwrap();
        for id in employees {
            store
                .insert_employee(employee(id, &["s1"]))
                .await
                .unwrap();
        }
        Repositories::from_store(store)
    }

    #[tokio::test]
    async fn slot_is_available_until_booked() {
        let repos = fixture(&["juan"]).await;
        let d = date(2024, 1, 15);
        let t = time("10:00");

        assert!(
            logic::check_availability(repos.appointments.as_ref(), "juan", d, t, None)
                .await
                .unwrap()
        );

        logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c1"),
            create_request("s1", Some("juan"), d, t),
        )
        .await
        .unwrap();

        assert!(
            !logic::check_availability(repos.appointments.as_ref(), "juan", d, t, None)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn booking_a_taken_slot_is_a_conflict_and_a_nearby_one_succeeds() {
        // The "Juan" example: confirmed 10:00 blocks 10:00, 10:30 is free.
        let repos = fixture(&["juan"]).await;
        let d = date(2024, 1, 15);

        let first = logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c1"),
            create_request("s1", Some("juan"), d, time("10:00")),
        )
        .await
        .unwrap();
        logic::update_appointment(
            &repos,
            &booking(),
            &admin(),
            &first.id,
            UpdateAppointmentRequest {
                status: Some(AppointmentStatus::Confirmed),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let err = logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c2"),
            create_request("s1", Some("juan"), d, time("10:00")),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SchedulingError::Conflict(_)));

        let later = logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c2"),
            create_request("s1", Some("juan"), d, time("10:30")),
        )
        .await
        .unwrap();
        assert_eq!(later.status, AppointmentStatus::Pending);
    }

    #[tokio::test]
    async fn auto_selection_skips_booked_employees() {
        let repos = fixture(&["ana", "berta"]).await;
        let d = date(2024, 1, 15);
        let t = time("10:00");

        // Occupy ana.
        logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c1"),
            create_request("s1", Some("ana"), d, t),
        )
        .await
        .unwrap();

        let picked = logic::select_employee(
            repos.employees.as_ref(),
            repos.appointments.as_ref(),
            "s1",
            d,
            t,
        )
        .await
        .unwrap()
        .expect("berta should be free");
        assert_eq!(picked.id, "berta");

        // And create without an explicit employee lands on berta too.
        let appointment = logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c2"),
            create_request("s1", None, d, t),
        )
        .await
        .unwrap();
        assert_eq!(appointment.employee_id.as_deref(), Some("berta"));
    }

    #[tokio::test]
    async fn auto_selection_prefers_creation_order() {
        let repos = fixture(&["ana", "berta"]).await;
        let appointment = logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c1"),
            create_request("s1", None, date(2024, 1, 15), time("10:00")),
        )
        .await
        .unwrap();
        assert_eq!(appointment.employee_id.as_deref(), Some("ana"));
    }

    #[tokio::test]
    async fn create_fails_when_no_candidate_exists() {
        let repos = fixture(&["ana"]).await;
        let d = date(2024, 1, 15);
        let t = time("10:00");
        logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c1"),
            create_request("s1", Some("ana"), d, t),
        )
        .await
        .unwrap();

        // Sole qualified employee is booked: nothing to auto-select.
        let err = logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c2"),
            create_request("s1", None, d, t),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SchedulingError::NotFound(_)));
    }

    #[tokio::test]
    async fn create_validates_service_and_qualification() {
        let repos = fixture(&["ana"]).await;
        let d = date(2024, 1, 15);
        let t = time("10:00");

        let err = logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c1"),
            create_request("missing", Some("ana"), d, t),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SchedulingError::NotFound(_)));

        // Second service ana is not qualified for.
        repos
            .services
            .insert_service(service("s2", 4000))
            .await
            .unwrap();
        let err = logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c1"),
            create_request("s2", Some("ana"), d, t),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SchedulingError::Validation(_)));
    }

    #[tokio::test]
    async fn create_snapshots_price_and_starts_pending() {
        let repos = fixture(&["ana"]).await;
        let appointment = logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c1"),
            create_request("s1", Some("ana"), date(2024, 1, 15), time("10:00")),
        )
        .await
        .unwrap();
        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert_eq!(appointment.total_price, 2500);
        assert_eq!(appointment.payment_status, PaymentStatus::Pending);
        assert_eq!(appointment.client_id, "c1");
        assert_eq!(appointment.created_by, Role::Client);
    }

    #[tokio::test]
    async fn notes_length_is_bounded() {
        let repos = fixture(&["ana"]).await;
        let mut request =
            create_request("s1", Some("ana"), date(2024, 1, 15), time("10:00"));
        request.notes = Some("x".repeat(501));
        let err = logic::create_appointment(&repos, &booking(), &client_actor("c1"), request)
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::Validation(_)));
    }

    #[tokio::test]
    async fn rescheduling_to_own_slot_succeeds() {
        let repos = fixture(&["ana"]).await;
        let d = date(2024, 1, 15);
        let t = time("10:00");
        let appointment = logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c1"),
            create_request("s1", Some("ana"), d, t),
        )
        .await
        .unwrap();

        // Same employee, same date, same time: own appointment must not
        // conflict with itself.
        let updated = logic::update_appointment(
            &repos,
            &booking(),
            &client_actor("c1"),
            &appointment.id,
            UpdateAppointmentRequest {
                date: Some(d),
                time: Some(t),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.date, d);
        assert_eq!(updated.time, t);
    }

    #[tokio::test]
    async fn rescheduling_onto_someone_else_is_a_conflict() {
        let repos = fixture(&["ana"]).await;
        let d = date(2024, 1, 15);
        logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c1"),
            create_request("s1", Some("ana"), d, time("10:00")),
        )
        .await
        .unwrap();
        let second = logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c2"),
            create_request("s1", Some("ana"), d, time("11:00")),
        )
        .await
        .unwrap();

        let err = logic::update_appointment(
            &repos,
            &booking(),
            &client_actor("c2"),
            &second.id,
            UpdateAppointmentRequest {
                time: Some(time("10:00")),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SchedulingError::Conflict(_)));
    }

    #[tokio::test]
    async fn clients_cannot_touch_other_peoples_appointments() {
        let repos = fixture(&["ana"]).await;
        let appointment = logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c1"),
            create_request("s1", Some("ana"), date(2024, 1, 15), time("10:00")),
        )
        .await
        .unwrap();

        let err = logic::cancel_appointment(&repos, &client_actor("c2"), &appointment.id)
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::Forbidden(_)));

        let err = logic::get_appointment(&repos, &client_actor("c2"), &appointment.id)
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::Forbidden(_)));

        // Admin can.
        logic::cancel_appointment(&repos, &admin(), &appointment.id)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cancel_is_a_status_change() {
        let repos = fixture(&["ana"]).await;
        let appointment = logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c1"),
            create_request("s1", Some("ana"), date(2024, 1, 15), time("10:00")),
        )
        .await
        .unwrap();

        let cancelled = logic::cancel_appointment(&repos, &client_actor("c1"), &appointment.id)
            .await
            .unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

        // Still fetchable, never deleted.
        let fetched = logic::get_appointment(&repos, &client_actor("c1"), &appointment.id)
            .await
            .unwrap();
        assert_eq!(fetched.status, AppointmentStatus::Cancelled);
    }

    #[tokio::test]
    async fn completed_appointments_are_frozen() {
        let repos = fixture(&["ana"]).await;
        let appointment = logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c1"),
            create_request("s1", Some("ana"), date(2024, 1, 15), time("10:00")),
        )
        .await
        .unwrap();

        // pending -> confirmed -> completed
        logic::update_appointment(
            &repos,
            &booking(),
            &admin(),
            &appointment.id,
            UpdateAppointmentRequest {
                status: Some(AppointmentStatus::Confirmed),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        logic::update_appointment(
            &repos,
            &booking(),
            &admin(),
            &appointment.id,
            UpdateAppointmentRequest {
                status: Some(AppointmentStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let err = logic::cancel_appointment(&repos, &admin(), &appointment.id)
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidState(_)));

        let err = logic::update_appointment(
            &repos,
            &booking(),
            &admin(),
            &appointment.id,
            UpdateAppointmentRequest {
                time: Some(time("11:00")),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidState(_)));
    }

    #[tokio::test]
    async fn pending_cannot_jump_straight_to_completed() {
        let repos = fixture(&["ana"]).await;
        let appointment = logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c1"),
            create_request("s1", Some("ana"), date(2024, 1, 15), time("10:00")),
        )
        .await
        .unwrap();

        let err = logic::update_appointment(
            &repos,
            &booking(),
            &admin(),
            &appointment.id,
            UpdateAppointmentRequest {
                status: Some(AppointmentStatus::Completed),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidState(_)));
    }

    #[tokio::test]
    async fn no_show_stays_reschedulable_but_not_revivable() {
        let repos = fixture(&["ana"]).await;
        let appointment = logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c1"),
            create_request("s1", Some("ana"), date(2024, 1, 15), time("10:00")),
        )
        .await
        .unwrap();
        logic::update_appointment(
            &repos,
            &booking(),
            &admin(),
            &appointment.id,
            UpdateAppointmentRequest {
                status: Some(AppointmentStatus::NoShow),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        // Date/time edits still go through...
        let moved = logic::update_appointment(
            &repos,
            &booking(),
            &admin(),
            &appointment.id,
            UpdateAppointmentRequest {
                time: Some(time("12:00")),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(moved.time, time("12:00"));

        // ...but there is no legal status transition out of no-show.
        let err = logic::update_appointment(
            &repos,
            &booking(),
            &admin(),
            &appointment.id,
            UpdateAppointmentRequest {
                status: Some(AppointmentStatus::Confirmed),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, SchedulingError::InvalidState(_)));
    }

    #[tokio::test]
    async fn cancelled_slot_can_be_rebooked() {
        let repos = fixture(&["ana"]).await;
        let d = date(2024, 1, 15);
        let t = time("10:00");
        let appointment = logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c1"),
            create_request("s1", Some("ana"), d, t),
        )
        .await
        .unwrap();
        logic::cancel_appointment(&repos, &client_actor("c1"), &appointment.id)
            .await
            .unwrap();

        logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c2"),
            create_request("s1", Some("ana"), d, t),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn listing_scopes_clients_to_their_own() {
        let repos = fixture(&["ana", "berta"]).await;
        let d = date(2024, 1, 15);
        logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c1"),
            create_request("s1", Some("ana"), d, time("10:00")),
        )
        .await
        .unwrap();
        logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c2"),
            create_request("s1", Some("ana"), d, time("11:00")),
        )
        .await
        .unwrap();

        let mine = logic::list_appointments(&repos, &client_actor("c1"), Default::default())
            .await
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].client_id, "c1");

        // Even an explicit filter for someone else collapses to own.
        let sneaky = logic::list_appointments(
            &repos,
            &client_actor("c1"),
            crate::logic::ListAppointmentsQuery {
                client_id: Some("c2".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(sneaky.len(), 1);
        assert_eq!(sneaky[0].client_id, "c1");

        let all = logic::list_appointments(&repos, &admin(), Default::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn stats_are_admin_only() {
        let repos = fixture(&["ana"]).await;
        logic::create_appointment(
            &repos,
            &booking(),
            &client_actor("c1"),
            create_request("s1", Some("ana"), date(2024, 1, 15), time("10:00")),
        )
        .await
        .unwrap();

        let err = logic::appointment_stats(&repos, &client_actor("c1"), StatsQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::Forbidden(_)));

        let stats = logic::appointment_stats(&repos, &admin(), StatsQuery::default())
            .await
            .unwrap();
        assert_eq!(stats.status_stats.len(), 1);
        assert_eq!(stats.status_stats[0].status, AppointmentStatus::Pending);
        assert_eq!(stats.status_stats[0].revenue, 2500);
        assert_eq!(stats.service_stats[0].service_id, "s1");
    }
}
