//! Resolution of reminders into displayable detail, following the
//! ownership chain back to the records the alert is about.

use rusqlite::Connection;

use crate::db::repository::{get_appointment, get_catalog_entry, get_prescription, get_schedule};
use crate::db::DatabaseError;
use crate::models::{Reminder, ReminderParent};
use crate::timefmt;

/// What a reminder is about, resolved for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ReminderDetails {
    Medication {
        /// 12-hour schedule time, e.g. "8:00 AM".
        scheduled_time: String,
        medicine: String,
        dose: String,
        instructions: Option<String>,
    },
    Appointment {
        specialty: String,
        doctor: String,
        location: String,
        datetime_text: String,
        prep_required: bool,
        prep_notes: Option<String>,
    },
}

/// Follow a reminder back to its parent records.
///
/// A missing schedule, prescription or appointment yields `Ok(None)`
/// (the reminder is orphaned, not an error). A missing catalog entry
/// degrades to an "Unknown medication" label instead, since the
/// schedule still tells the user when to take something.
pub fn resolve_reminder_details(
    conn: &Connection,
    reminder: &Reminder,
) -> Result<Option<ReminderDetails>, DatabaseError> {
    match reminder.parent {
        ReminderParent::Schedule(schedule_id) => {
            let Some(schedule) = get_schedule(conn, &schedule_id)? else {
                return Ok(None);
            };
            let Some(rx) = get_prescription(conn, &schedule.prescription_id)? else {
                return Ok(None);
            };

            let (medicine, catalog_instructions) = match get_catalog_entry(conn, &rx.catalog_id)? {
                Some(entry) => (entry.display_name(), entry.instructions),
                None => {
                    tracing::warn!(
                        prescription = %rx.id,
                        catalog = %rx.catalog_id,
                        "prescription references a missing catalog entry"
                    );
                    ("Unknown medication".to_string(), None)
                }
            };

            Ok(Some(ReminderDetails::Medication {
                scheduled_time: schedule.formatted_time_12h(),
                medicine,
                dose: rx.dose_description(),
                instructions: rx.instructions.or(catalog_instructions),
            }))
        }
        ReminderParent::Appointment(appointment_id) => {
            let Some(appt) = get_appointment(conn, &appointment_id)? else {
                return Ok(None);
            };

            Ok(Some(ReminderDetails::Appointment {
                specialty: appt.specialty.clone(),
                doctor: appt.doctor.clone(),
                location: appt.full_location(),
                datetime_text: timefmt::format_local_datetime(appt.datetime)
                    .unwrap_or_else(|| "unknown time".to_string()),
                prep_required: appt.prep_required,
                prep_notes: appt.prep_notes,
            }))
        }
    }
}

/// One-line title for a notification.
pub fn reminder_title(details: Option<&ReminderDetails>) -> String {
    match details {
        Some(ReminderDetails::Medication { medicine, .. }) => format!("Take {medicine}"),
        Some(ReminderDetails::Appointment { specialty, .. }) => {
            format!("Appointment: {specialty}")
        }
        None => "Reminder".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::*;
    use uuid::Uuid;

    fn seed(conn: &Connection) -> (Patient, CatalogEntry, Prescription, Schedule) {
        let patient = Patient {
            id: Uuid::new_v4(),
            name: "Ana".into(),
            surname_p: "García".into(),
            surname_m: None,
            birth_date: 500_000_000_000,
            phone: None,
        };
        insert_patient(conn, &patient).unwrap();
        let entry = CatalogEntry {
            id: Uuid::new_v4(),
            commercial_name: "Tempra".into(),
            active_ingredient: "Paracetamol".into(),
            presentation: "tablet".into(),
            unit: "mg".into(),
            concentration: "500mg".into(),
            instructions: Some("Take with food".into()),
        };
        insert_catalog_entry(conn, &entry).unwrap();
        let rx = Prescription {
            id: Uuid::new_v4(),
            patient_id: patient.id,
            catalog_id: entry.id,
            dose_qty: 1.0,
            dose_unit: "tablet".into(),
            frequency: "every 8 hours".into(),
            start_date: 1_700_000_000_000,
            end_date: None,
            active: true,
            instructions: None,
        };
        insert_prescription(conn, &rx).unwrap();
        let schedule = add_schedule(conn, &rx.id, 480, WeekDays::All).unwrap();
        (patient, entry, rx, schedule)
    }

    #[test]
    fn medication_details_follow_the_chain() {
        let conn = open_memory_database().unwrap();
        let (patient, _, _, schedule) = seed(&conn);
        let reminder = create_schedule_reminder(&conn, &schedule, &patient.id, 10_000).unwrap();

        let details = resolve_reminder_details(&conn, &reminder).unwrap().unwrap();
        assert_eq!(
            details,
            ReminderDetails::Medication {
                scheduled_time: "8:00 AM".into(),
                medicine: "Tempra - 500mg".into(),
                dose: "1 tablet".into(),
                instructions: Some("Take with food".into()),
            }
        );
        assert_eq!(reminder_title(Some(&details)), "Take Tempra - 500mg");
    }

    #[test]
    fn prescription_instructions_win_over_catalog() {
        let conn = open_memory_database().unwrap();
        let (patient, _, rx, schedule) = seed(&conn);
        update_prescription_fields(
            &conn,
            &rx.id,
            &PrescriptionUpdate {
                instructions: Some("Half dose at night".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let reminder = create_schedule_reminder(&conn, &schedule, &patient.id, 10_000).unwrap();

        let details = resolve_reminder_details(&conn, &reminder).unwrap().unwrap();
        match details {
            ReminderDetails::Medication { instructions, .. } => {
                assert_eq!(instructions.as_deref(), Some("Half dose at night"));
            }
            other => panic!("expected medication details, got {other:?}"),
        }
    }

    #[test]
    fn appointment_details_include_location() {
        let conn = open_memory_database().unwrap();
        let (patient, _, _, _) = seed(&conn);
        let appt = Appointment {
            id: Uuid::new_v4(),
            patient_id: patient.id,
            datetime: 1_700_000_000_000,
            specialty: "Cardiology".into(),
            doctor: "Ruiz".into(),
            place: "General Hospital".into(),
            address: Some("12 Main St".into()),
            reason: None,
            prep_required: true,
            prep_notes: Some("Fasting 8 hours".into()),
            notes: None,
        };
        insert_appointment(&conn, &appt).unwrap();
        let reminder = create_appointment_reminder(&conn, &appt, 30).unwrap();

        let details = resolve_reminder_details(&conn, &reminder).unwrap().unwrap();
        match &details {
            ReminderDetails::Appointment {
                specialty,
                location,
                prep_required,
                prep_notes,
                ..
            } => {
                assert_eq!(specialty, "Cardiology");
                assert_eq!(location, "General Hospital, 12 Main St");
                assert!(prep_required);
                assert_eq!(prep_notes.as_deref(), Some("Fasting 8 hours"));
            }
            other => panic!("expected appointment details, got {other:?}"),
        }
        assert_eq!(reminder_title(Some(&details)), "Appointment: Cardiology");
    }

    #[test]
    fn orphaned_reminder_resolves_to_none() {
        let conn = open_memory_database().unwrap();
        seed(&conn);

        let orphan = Reminder {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            parent: ReminderParent::Schedule(Uuid::new_v4()),
            alert_datetime: 10_000,
            status: ReminderStatus::Pending,
            completed_at: None,
            notes: None,
        };
        assert!(resolve_reminder_details(&conn, &orphan).unwrap().is_none());
        assert_eq!(reminder_title(None), "Reminder");
    }

    #[test]
    fn missing_catalog_degrades_to_unknown_medication() {
        let conn = open_memory_database().unwrap();
        let (patient, entry, _, schedule) = seed(&conn);
        let reminder = create_schedule_reminder(&conn, &schedule, &patient.id, 10_000).unwrap();

        // Simulate a corrupt store: drop the catalog row under the
        // prescription's feet.
        conn.pragma_update(None, "foreign_keys", false).unwrap();
        conn.execute(
            "DELETE FROM catalog WHERE id = ?1",
            rusqlite::params![entry.id.to_string()],
        )
        .unwrap();
        conn.pragma_update(None, "foreign_keys", true).unwrap();

        let details = resolve_reminder_details(&conn, &reminder).unwrap().unwrap();
        match details {
            ReminderDetails::Medication { medicine, dose, .. } => {
                assert_eq!(medicine, "Unknown medication");
                assert_eq!(dose, "1 tablet");
            }
            other => panic!("expected medication details, got {other:?}"),
        }
    }
}
