#[cfg(test)]
mod tests {
    use crate::logic::{
        self, AssignServicesRequest, CatalogError, CreateEmployeeRequest, CreateServiceRequest,
        ListEmployeesQuery, ListServicesQuery, UpdateServiceRequest,
    };
    use bookify_common::models::ServiceCategory;
    use bookify_common::{Actor, Role};
    use bookify_db::{MemoryStore, Repositories};
    use chrono::{Datelike, NaiveDate, Weekday};

    fn admin() -> Actor {
        Actor::new("boss", Role::Admin)
    }

    fn client() -> Actor {
        Actor::new("c1", Role::Client)
    }

    fn repositories() -> Repositories {
        Repositories::from_store(MemoryStore::new())
    }

    fn service_request(name: &str) -> CreateServiceRequest {
        CreateServiceRequest {
            name: name.to_string(),
            description: "test".to_string(),
            duration_minutes: 30,
            price: 2500,
            category: ServiceCategory::Haircut,
        }
    }

    fn employee_request(name: &str, service_ids: &[&str]) -> CreateEmployeeRequest {
        CreateEmployeeRequest {
            name: name.to_string(),
            email: format!("{name}@example.com"),
            phone: "555-0100".to_string(),
            specialization: "stylist".to_string(),
            service_ids: service_ids.iter().map(|s| s.to_string()).collect(),
            working_hours: None,
            hire_date: None,
        }
    }

    #[tokio::test]
    async fn service_crud_round_trip() {
        let repos = repositories();

        let created = logic::create_service(&repos, &admin(), service_request("Haircut"))
            .await
            .unwrap();
        assert!(created.is_active);
        assert_eq!(created.price, 2500);

        let fetched = logic::get_service(&repos, &created.id).await.unwrap();
        assert_eq!(fetched.name, "Haircut");

        let updated = logic::update_service(
            &repos,
            &admin(),
            &created.id,
            UpdateServiceRequest {
                price: Some(3000),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.price, 3000);
    }

    #[tokio::test]
    async fn mutations_are_admin_only() {
        let repos = repositories();

        let err = logic::create_service(&repos, &client(), service_request("Haircut"))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Forbidden(_)));

        let created = logic::create_service(&repos, &admin(), service_request("Haircut"))
            .await
            .unwrap();
        let err = logic::deactivate_service(&repos, &client(), &created.id)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Forbidden(_)));
    }

    #[tokio::test]
    async fn service_validation_bounds() {
        let repos = repositories();

        let mut request = service_request("Haircut");
        request.duration_minutes = 10;
        let err = logic::create_service(&repos, &admin(), request)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));

        let mut request = service_request("Haircut");
        request.duration_minutes = 481;
        assert!(logic::create_service(&repos, &admin(), request)
            .await
            .is_err());

        let mut request = service_request("Haircut");
        request.price = -1;
        assert!(logic::create_service(&repos, &admin(), request)
            .await
            .is_err());

        let mut request = service_request("");
        request.name = "  ".to_string();
        assert!(logic::create_service(&repos, &admin(), request)
            .await
            .is_err());

        let request = service_request(&"x".repeat(101));
        assert!(logic::create_service(&repos, &admin(), request)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn deactivation_is_soft() {
        let repos = repositories();
        let created = logic::create_service(&repos, &admin(), service_request("Haircut"))
            .await
            .unwrap();

        logic::deactivate_service(&repos, &admin(), &created.id)
            .await
            .unwrap();

        // Still fetchable, just inactive.
        let fetched = logic::get_service(&repos, &created.id).await.unwrap();
        assert!(!fetched.is_active);

        let active_only = logic::list_services(
            &repos,
            ListServicesQuery {
                is_active: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(active_only.is_empty());
    }

    #[tokio::test]
    async fn categories_are_distinct() {
        let repos = repositories();
        logic::create_service(&repos, &admin(), service_request("Cut A"))
            .await
            .unwrap();
        logic::create_service(&repos, &admin(), service_request("Cut B"))
            .await
            .unwrap();
        let mut massage = service_request("Massage");
        massage.category = ServiceCategory::Massage;
        logic::create_service(&repos, &admin(), massage)
            .await
            .unwrap();

        let categories = logic::list_categories(&repos).await.unwrap();
        assert_eq!(
            categories,
            vec![ServiceCategory::Haircut, ServiceCategory::Massage]
        );
    }

    #[tokio::test]
    async fn employee_service_refs_must_exist() {
        let repos = repositories();

        let err = logic::create_employee(&repos, &admin(), employee_request("ana", &["ghost"]))
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));

        let service = logic::create_service(&repos, &admin(), service_request("Haircut"))
            .await
            .unwrap();
        let employee =
            logic::create_employee(&repos, &admin(), employee_request("ana", &[&service.id]))
                .await
                .unwrap();
        assert!(employee.is_qualified_for(&service.id));
    }

    #[tokio::test]
    async fn assign_services_replaces_the_set() {
        let repos = repositories();
        let first = logic::create_service(&repos, &admin(), service_request("Haircut"))
            .await
            .unwrap();
        let second = logic::create_service(&repos, &admin(), service_request("Coloring"))
            .await
            .unwrap();
        let employee =
            logic::create_employee(&repos, &admin(), employee_request("ana", &[&first.id]))
                .await
                .unwrap();

        let updated = logic::assign_services(
            &repos,
            &admin(),
            &employee.id,
            AssignServicesRequest {
                service_ids: vec![second.id.clone()],
            },
        )
        .await
        .unwrap();
        assert!(!updated.is_qualified_for(&first.id));
        assert!(updated.is_qualified_for(&second.id));

        let err = logic::assign_services(
            &repos,
            &admin(),
            &employee.id,
            AssignServicesRequest {
                service_ids: vec!["ghost".to_string()],
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[tokio::test]
    async fn employee_listing_filters() {
        let repos = repositories();
        let service = logic::create_service(&repos, &admin(), service_request("Haircut"))
            .await
            .unwrap();
        logic::create_employee(&repos, &admin(), employee_request("ana", &[&service.id]))
            .await
            .unwrap();
        let berta = logic::create_employee(&repos, &admin(), employee_request("berta", &[]))
            .await
            .unwrap();
        logic::deactivate_employee(&repos, &admin(), &berta.id)
            .await
            .unwrap();

        let active = logic::list_employees(
            &repos,
            ListEmployeesQuery {
                is_active: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "ana");

        let qualified = logic::list_employees(
            &repos,
            ListEmployeesQuery {
                service_id: Some(service.id.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(qualified.len(), 1);
        assert_eq!(qualified[0].name, "ana");
    }

    #[tokio::test]
    async fn day_availability_follows_working_hours() {
        let repos = repositories();
        let employee = logic::create_employee(&repos, &admin(), employee_request("ana", &[]))
            .await
            .unwrap();

        // 2024-01-15 is a Monday: default hours 09:00-18:00, 18 slots.
        let monday = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(monday.weekday(), Weekday::Mon);
        let availability = logic::day_availability(&repos, &employee.id, monday)
            .await
            .unwrap();
        assert!(availability.is_working);
        assert_eq!(availability.available_slots.len(), 18);
        assert_eq!(availability.available_slots[0].to_string(), "09:00");
        assert_eq!(availability.available_slots[17].to_string(), "17:30");

        // Sunday is off by default.
        let sunday = NaiveDate::from_ymd_opt(2024, 1, 14).unwrap();
        let availability = logic::day_availability(&repos, &employee.id, sunday)
            .await
            .unwrap();
        assert!(!availability.is_working);
        assert!(availability.available_slots.is_empty());
    }
}
