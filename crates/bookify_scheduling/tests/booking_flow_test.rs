use bookify_common::models::{
    AppointmentStatus, Employee, Service, ServiceCategory, TimeOfDay, WeeklyHours,
};
use bookify_common::{Actor, Role};
use bookify_config::BookingConfig;
use bookify_db::{EmployeeRepository, MemoryStore, Repositories, ServiceRepository};
use bookify_scheduling::logic::{
    self, CreateAppointmentRequest, SchedulingError, UpdateAppointmentRequest,
};
use chrono::{NaiveDate, Utc};

async fn seeded_repositories() -> Repositories {
    let store = MemoryStore::new();
    let now = Utc::now();
    store
        .insert_service(Service {
            id: "haircut".to_string(),
            name: "Haircut".to_string(),
            description: "Classic cut".to_string(),
            duration_minutes: 30,
            price: 2500,
            category: ServiceCategory::Haircut,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();
    store
        .insert_employee(Employee {
            id: "juan".to_string(),
            name: "Juan".to_string(),
            email: "juan@example.com".to_string(),
            phone: "555-0100".to_string(),
            specialization: "stylist".to_string(),
            service_ids: vec!["haircut".to_string()],
            working_hours: WeeklyHours::default(),
            is_active: true,
            hire_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();
    Repositories::from_store(store)
}

fn booking_request(t: &str) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        service_id: "haircut".to_string(),
        employee_id: Some("juan".to_string()),
        date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        time: t.parse::<TimeOfDay>().unwrap(),
        notes: None,
    }
}

#[tokio::test]
async fn full_booking_lifecycle() {
    let repos = seeded_repositories().await;
    let booking = BookingConfig::default();
    let client = Actor::new("c1", Role::Client);
    let admin = Actor::new("boss", Role::Admin);
    let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    let time = "10:00".parse::<TimeOfDay>().unwrap();

    // The slot starts out free.
    assert!(
        logic::check_availability(repos.appointments.as_ref(), "juan", date, time, None)
            .await
            .unwrap()
    );

    // Book it.
    let appointment = logic::create_appointment(&repos, &booking, &client, booking_request("10:00"))
        .await
        .unwrap();
    assert_eq!(appointment.status, AppointmentStatus::Pending);

    // Now it is taken.
    assert!(
        !logic::check_availability(repos.appointments.as_ref(), "juan", date, time, None)
            .await
            .unwrap()
    );

    // Confirm, complete, and verify the record is frozen afterwards.
    logic::update_appointment(
        &repos,
        &booking,
        &admin,
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
        &booking,
        &admin,
        &appointment.id,
        UpdateAppointmentRequest {
            status: Some(AppointmentStatus::Completed),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let err = logic::cancel_appointment(&repos, &admin, &appointment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, SchedulingError::InvalidState(_)));

    // A completed appointment keeps the slot free for new bookings.
    assert!(
        logic::check_availability(repos.appointments.as_ref(), "juan", date, time, None)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn racing_bookings_for_one_slot_yield_one_winner() {
    let repos = seeded_repositories().await;
    let booking = BookingConfig::default();
    let first_client = Actor::new("c1", Role::Client);
    let second_client = Actor::new("c2", Role::Client);

    // Both requests target the same slot concurrently. Whoever loses the
    // store-level race must see a conflict, never a second booking.
    let (first, second) = tokio::join!(
        logic::create_appointment(&repos, &booking, &first_client, booking_request("10:00")),
        logic::create_appointment(&repos, &booking, &second_client, booking_request("10:00")),
    );

    let winners = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1, "exactly one booking may win the slot");

    let loser = if first.is_err() { first } else { second };
    assert!(matches!(loser.unwrap_err(), SchedulingError::Conflict(_)));

    let all = logic::list_appointments(
        &repos,
        &Actor::new("boss", Role::Admin),
        Default::default(),
    )
    .await
    .unwrap();
    assert_eq!(all.len(), 1);
}
