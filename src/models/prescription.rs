use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A medication regimen: what a patient takes, at which dose, over
/// which period. Intake times live in the owned schedules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prescription {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub catalog_id: Uuid,
    pub dose_qty: f64,
    /// "tablet", "spoonful", "ml", ...
    pub dose_unit: String,
    /// Free text, e.g. "every 8 hours".
    pub frequency: String,
    /// Epoch ms.
    pub start_date: i64,
    /// Epoch ms; `None` means open-ended.
    pub end_date: Option<i64>,
    pub active: bool,
    pub instructions: Option<String>,
}

/// Fields for creating a prescription through the patient factory.
/// The active flag always starts true.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPrescription {
    pub catalog_id: Uuid,
    pub dose_qty: f64,
    pub dose_unit: String,
    pub frequency: String,
    pub start_date: i64,
    pub end_date: Option<i64>,
    pub instructions: Option<String>,
}

impl Prescription {
    pub fn dose_description(&self) -> String {
        format!("{} {}", self.dose_qty, self.dose_unit)
    }

    pub fn has_end_date(&self) -> bool {
        self.end_date.is_some()
    }

    /// Past the end date? Open-ended prescriptions never expire.
    /// Independent of the active flag.
    pub fn is_expired(&self, now_ms: i64) -> bool {
        match self.end_date {
            Some(end) => now_ms > end,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rx(end_date: Option<i64>) -> Prescription {
        Prescription {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            catalog_id: Uuid::new_v4(),
            dose_qty: 0.5,
            dose_unit: "tablet".into(),
            frequency: "every 12 hours".into(),
            start_date: 1_000,
            end_date,
            active: true,
            instructions: None,
        }
    }

    #[test]
    fn dose_description_formats_quantity() {
        assert_eq!(rx(None).dose_description(), "0.5 tablet");
        let mut p = rx(None);
        p.dose_qty = 2.0;
        assert_eq!(p.dose_description(), "2 tablet");
    }

    #[test]
    fn expiry_only_with_end_date() {
        assert!(!rx(None).is_expired(i64::MAX));
        assert!(rx(Some(5_000)).is_expired(5_001));
        assert!(!rx(Some(5_000)).is_expired(5_000));
    }
}
