// --- File: crates/bookify_common/src/models.rs ---
//! Domain models shared across the workspace.
//!
//! Two representation choices carry scheduling invariants:
//!
//! * Appointment dates are [`chrono::NaiveDate`] — date-only by construction,
//!   so two stored values for the same calendar day always compare equal and
//!   no time-of-day component can drift into the slot comparison.
//! * Times of day are [`TimeOfDay`], a newtype over [`chrono::NaiveTime`]
//!   parsed as hour-and-minute only (non-padded input like `9:30` is accepted)
//!   and always formatted zero-padded, so `9:30` and `09:30` are the same slot.

use crate::auth::Role;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// --- Time of day ---

#[derive(Debug, Error)]
#[error("invalid time format (expected HH:MM): {0}")]
pub struct ParseTimeOfDayError(String);

/// A wall-clock time with minute granularity, the time half of a slot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseTimeOfDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s, "%H:%M")
            .map(Self)
            .map_err(|_| ParseTimeOfDayError(s.to_string()))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ParseTimeOfDayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

// --- Appointment ---

/// Appointment lifecycle status.
///
/// `completed` and `cancelled` are terminal: no field of the appointment may
/// change afterwards. `no-show` has no outgoing status transitions but its
/// date/time/employee stay editable (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "no-show",
        }
    }

    /// Whether an appointment in this status occupies its slot.
    ///
    /// Only pending and confirmed appointments count against the
    /// (employee, date, time) uniqueness invariant.
    pub fn blocks_slot(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Pending | AppointmentStatus::Confirmed
        )
    }

    /// Whether any further mutation of the appointment is blocked.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled
        )
    }

    /// Legal status transitions:
    /// pending -> confirmed -> completed, and pending|confirmed may move to
    /// cancelled or no-show. Staying in place is always allowed.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        if *self == next {
            return true;
        }
        match self {
            AppointmentStatus::Pending => matches!(
                next,
                AppointmentStatus::Confirmed
                    | AppointmentStatus::Cancelled
                    | AppointmentStatus::NoShow
            ),
            AppointmentStatus::Confirmed => matches!(
                next,
                AppointmentStatus::Completed
                    | AppointmentStatus::Cancelled
                    | AppointmentStatus::NoShow
            ),
            AppointmentStatus::Completed
            | AppointmentStatus::Cancelled
            | AppointmentStatus::NoShow => false,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown appointment status: {0}")]
pub struct ParseStatusError(String);

impl FromStr for AppointmentStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AppointmentStatus::Pending),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "no-show" => Ok(AppointmentStatus::NoShow),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// Payment progress for an appointment. Payment processing itself happens
/// elsewhere; this is bookkeeping only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "refunded" => Ok(PaymentStatus::Refunded),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// A booked appointment. Owns its price snapshot and status; holds
/// non-owning references (ids) to client, service and employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub client_id: String,
    pub service_id: String,
    /// None until auto-assignment picks one.
    pub employee_id: Option<String>,
    pub date: NaiveDate,
    pub time: TimeOfDay,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    /// Copied from the service at creation, in cents. Immutable thereafter.
    pub total_price: i64,
    pub payment_status: PaymentStatus,
    pub created_by: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Service ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceCategory {
    Haircut,
    Coloring,
    Treatment,
    Manicure,
    Pedicure,
    Massage,
    Facial,
    Waxing,
    #[default]
    Other,
}

impl ServiceCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::Haircut => "haircut",
            ServiceCategory::Coloring => "coloring",
            ServiceCategory::Treatment => "treatment",
            ServiceCategory::Manicure => "manicure",
            ServiceCategory::Pedicure => "pedicure",
            ServiceCategory::Massage => "massage",
            ServiceCategory::Facial => "facial",
            ServiceCategory::Waxing => "waxing",
            ServiceCategory::Other => "other",
        }
    }
}

#[derive(Debug, Error)]
#[error("unknown service category: {0}")]
pub struct ParseCategoryError(String);

impl FromStr for ServiceCategory {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "haircut" => Ok(ServiceCategory::Haircut),
            "coloring" => Ok(ServiceCategory::Coloring),
            "treatment" => Ok(ServiceCategory::Treatment),
            "manicure" => Ok(ServiceCategory::Manicure),
            "pedicure" => Ok(ServiceCategory::Pedicure),
            "massage" => Ok(ServiceCategory::Massage),
            "facial" => Ok(ServiceCategory::Facial),
            "waxing" => Ok(ServiceCategory::Waxing),
            "other" => Ok(ServiceCategory::Other),
            other => Err(ParseCategoryError(other.to_string())),
        }
    }
}

/// A bookable service offered by the business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub description: String,
    /// 15 to 480 minutes, validated at the boundary.
    pub duration_minutes: u32,
    /// In cents, never negative.
    pub price: i64,
    pub category: ServiceCategory,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Employee ---

/// One day of an employee's weekly schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayHours {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub is_working: bool,
}

/// Weekly working-hours table, one entry per weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyHours {
    pub monday: DayHours,
    pub tuesday: DayHours,
    pub wednesday: DayHours,
    pub thursday: DayHours,
    pub friday: DayHours,
    pub saturday: DayHours,
    pub sunday: DayHours,
}

impl WeeklyHours {
    pub fn for_weekday(&self, weekday: Weekday) -> &DayHours {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }
}

fn hm(hour: u32, minute: u32) -> TimeOfDay {
    TimeOfDay::new(hour, minute).expect("static time is valid")
}

impl Default for WeeklyHours {
    fn default() -> Self {
        let weekday = DayHours {
            start: hm(9, 0),
            end: hm(18, 0),
            is_working: true,
        };
        Self {
            monday: weekday,
            tuesday: weekday,
            wednesday: weekday,
            thursday: weekday,
            friday: weekday,
            saturday: DayHours {
                start: hm(9, 0),
                end: hm(15, 0),
                is_working: true,
            },
            sunday: DayHours {
                start: hm(10, 0),
                end: hm(14, 0),
                is_working: false,
            },
        }
    }
}

/// A staff member who performs services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialization: String,
    /// Services this employee is qualified to perform.
    pub service_ids: Vec<String>,
    pub working_hours: WeeklyHours,
    pub is_active: bool,
    pub hire_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn is_qualified_for(&self, service_id: &str) -> bool {
        self.service_ids.iter().any(|id| id == service_id)
    }
}

// --- Client ---

/// A registered client. `appointment_history` is append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub appointment_history: Vec<String>,
    pub created_at: DateTime<Utc>,
}
