use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timefmt;

/// A scheduled medical visit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    /// Visit date and time, epoch ms.
    pub datetime: i64,
    pub specialty: String,
    pub doctor: String,
    /// Clinic/hospital name.
    pub place: String,
    pub address: Option<String>,
    pub reason: Option<String>,
    /// Fasting or other special preparation needed.
    pub prep_required: bool,
    pub prep_notes: Option<String>,
    pub notes: Option<String>,
}

/// Fields for creating an appointment through the patient factory.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAppointment {
    pub datetime: i64,
    pub specialty: String,
    pub doctor: String,
    pub place: String,
    pub address: Option<String>,
    pub reason: Option<String>,
    pub prep_required: bool,
    pub prep_notes: Option<String>,
    pub notes: Option<String>,
}

impl Appointment {
    /// Short line for lists.
    pub fn short_description(&self) -> String {
        format!("{} - Dr. {}", self.specialty, self.doctor)
    }

    /// Place plus address when one is recorded.
    pub fn full_location(&self) -> String {
        match &self.address {
            Some(addr) => format!("{}, {}", self.place, addr),
            None => self.place.clone(),
        }
    }

    pub fn is_today(&self, now_ms: i64) -> bool {
        timefmt::same_local_day(self.datetime, now_ms)
    }

    pub fn is_past(&self, now_ms: i64) -> bool {
        self.datetime < now_ms
    }

    /// Days until the visit, rounded up; negative once it has passed.
    pub fn days_until(&self, now_ms: i64) -> i64 {
        timefmt::days_until(self.datetime, now_ms)
    }
}
