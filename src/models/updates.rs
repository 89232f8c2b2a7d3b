use serde::Deserialize;
use uuid::Uuid;

use super::schedule::WeekDays;

/// Partial-update payloads: only `Some` fields are written.
/// Clearing an optional column to NULL goes through the full-row
/// `update_*` functions instead.

#[derive(Debug, Default, Clone, Deserialize)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub surname_p: Option<String>,
    pub surname_m: Option<String>,
    pub birth_date: Option<i64>,
    pub phone: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct CatalogUpdate {
    pub commercial_name: Option<String>,
    pub active_ingredient: Option<String>,
    pub presentation: Option<String>,
    pub unit: Option<String>,
    pub concentration: Option<String>,
    pub instructions: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct PrescriptionUpdate {
    pub catalog_id: Option<Uuid>,
    pub dose_qty: Option<f64>,
    pub dose_unit: Option<String>,
    pub frequency: Option<String>,
    pub start_date: Option<i64>,
    pub end_date: Option<i64>,
    pub active: Option<bool>,
    pub instructions: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ScheduleUpdate {
    pub minute_of_day: Option<u16>,
    pub days_of_week: Option<WeekDays>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct AppointmentUpdate {
    pub datetime: Option<i64>,
    pub specialty: Option<String>,
    pub doctor: Option<String>,
    pub place: Option<String>,
    pub address: Option<String>,
    pub reason: Option<String>,
    pub prep_required: Option<bool>,
    pub prep_notes: Option<String>,
    pub notes: Option<String>,
}
