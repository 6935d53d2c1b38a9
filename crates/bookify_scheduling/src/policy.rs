// --- File: crates/bookify_scheduling/src/policy.rs ---
//! The authorization policy for scheduling operations.
//!
//! Every operation goes through these two functions instead of sprinkling
//! role checks across handlers: admins may act on any appointment, clients
//! only on their own.

use crate::logic::SchedulingError;
use bookify_common::models::Appointment;
use bookify_common::Actor;

/// Allow or deny an actor acting on a specific appointment.
pub fn authorize(actor: &Actor, appointment: &Appointment) -> Result<(), SchedulingError> {
    if actor.is_admin() || appointment.client_id == actor.id {
        Ok(())
    } else {
        Err(SchedulingError::Forbidden(format!(
            "actor {} may not act on appointment {}",
            actor.id, appointment.id
        )))
    }
}

/// Allow only admins through.
pub fn require_admin(actor: &Actor) -> Result<(), SchedulingError> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(SchedulingError::Forbidden(format!(
            "actor {} is not an admin",
            actor.id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookify_common::models::{AppointmentStatus, PaymentStatus, TimeOfDay};
    use bookify_common::Role;
    use chrono::{NaiveDate, Utc};

    fn appointment_for(client_id: &str) -> Appointment {
        Appointment {
            id: "a1".to_string(),
            client_id: client_id.to_string(),
            service_id: "s1".to_string(),
            employee_id: Some("e1".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            time: "10:00".parse::<TimeOfDay>().unwrap(),
            status: AppointmentStatus::Pending,
            notes: None,
            total_price: 2500,
            payment_status: PaymentStatus::Pending,
            created_by: Role::Client,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn owner_and_admin_are_allowed() {
        let appointment = appointment_for("c1");
        assert!(authorize(&Actor::new("c1", Role::Client), &appointment).is_ok());
        assert!(authorize(&Actor::new("boss", Role::Admin), &appointment).is_ok());
    }

    #[test]
    fn other_clients_are_denied() {
        let appointment = appointment_for("c1");
        let err = authorize(&Actor::new("c2", Role::Client), &appointment).unwrap_err();
        assert!(matches!(err, SchedulingError::Forbidden(_)));
    }

    #[test]
    fn require_admin_rejects_clients() {
        assert!(require_admin(&Actor::new("boss", Role::Admin)).is_ok());
        assert!(matches!(
            require_admin(&Actor::new("c1", Role::Client)),
            Err(SchedulingError::Forbidden(_))
        ));
    }
}
