use rusqlite::{params, Connection};
use uuid::Uuid;

use super::parse_uuid;
use super::appointment::get_appointments_by_patient;
use super::prescription::{get_prescriptions_by_patient, insert_prescription};
use super::reminder::get_reminders_by_patient;
use super::schedule::get_schedules_by_prescription;
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, name, surname_p, surname_m, birth_date, phone)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            patient.id.to_string(),
            patient.name,
            patient.surname_p,
            patient.surname_m,
            patient.birth_date,
            patient.phone,
        ],
    )?;
    Ok(())
}

pub fn get_patient(conn: &Connection, id: &Uuid) -> Result<Option<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, surname_p, surname_m, birth_date, phone FROM patients WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], patient_row);

    match result {
        Ok(row) => Ok(Some(patient_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_patients(conn: &Connection) -> Result<Vec<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, surname_p, surname_m, birth_date, phone
         FROM patients ORDER BY name ASC, surname_p ASC",
    )?;

    let rows = stmt.query_map([], patient_row)?;
    let mut patients = Vec::new();
    for row in rows {
        patients.push(patient_from_row(row?)?);
    }
    Ok(patients)
}

/// Full-row update.
pub fn update_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE patients SET name = ?2, surname_p = ?3, surname_m = ?4, birth_date = ?5,
         phone = ?6
         WHERE id = ?1",
        params![
            patient.id.to_string(),
            patient.name,
            patient.surname_p,
            patient.surname_m,
            patient.birth_date,
            patient.phone,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "patient".into(),
            id: patient.id.to_string(),
        });
    }
    Ok(())
}

/// Partial update: only provided fields change.
pub fn update_patient_fields(
    conn: &Connection,
    id: &Uuid,
    update: &PatientUpdate,
) -> Result<Patient, DatabaseError> {
    let mut patient = get_patient(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "patient".into(),
        id: id.to_string(),
    })?;

    if let Some(name) = &update.name {
        patient.name = name.clone();
    }
    if let Some(surname_p) = &update.surname_p {
        patient.surname_p = surname_p.clone();
    }
    if let Some(surname_m) = &update.surname_m {
        patient.surname_m = Some(surname_m.clone());
    }
    if let Some(birth_date) = update.birth_date {
        patient.birth_date = birth_date;
    }
    if let Some(phone) = &update.phone {
        patient.phone = Some(phone.clone());
    }

    update_patient(conn, &patient)?;
    Ok(patient)
}

/// Factory: create a prescription owned by this patient. New
/// prescriptions always start active.
pub fn add_prescription(
    conn: &Connection,
    patient_id: &Uuid,
    new: &NewPrescription,
) -> Result<Prescription, DatabaseError> {
    let rx = Prescription {
        id: Uuid::new_v4(),
        patient_id: *patient_id,
        catalog_id: new.catalog_id,
        dose_qty: new.dose_qty,
        dose_unit: new.dose_unit.clone(),
        frequency: new.frequency.clone(),
        start_date: new.start_date,
        end_date: new.end_date,
        active: true,
        instructions: new.instructions.clone(),
    };
    insert_prescription(conn, &rx)?;
    Ok(rx)
}

/// Factory: create an appointment owned by this patient.
pub fn add_appointment(
    conn: &Connection,
    patient_id: &Uuid,
    new: &NewAppointment,
) -> Result<Appointment, DatabaseError> {
    let appt = Appointment {
        id: Uuid::new_v4(),
        patient_id: *patient_id,
        datetime: new.datetime,
        specialty: new.specialty.clone(),
        doctor: new.doctor.clone(),
        place: new.place.clone(),
        address: new.address.clone(),
        reason: new.reason.clone(),
        prep_required: new.prep_required,
        prep_notes: new.prep_notes.clone(),
        notes: new.notes.clone(),
    };
    super::appointment::insert_appointment(conn, &appt)?;
    Ok(appt)
}

/// Delete the patient and everything hanging off them: reminders,
/// schedules, prescriptions, appointments. Dependents are fetched up
/// front; all destroys run in one transaction, children before parents.
pub fn delete_patient_cascade(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    if get_patient(conn, id)?.is_none() {
        return Err(DatabaseError::NotFound {
            entity_type: "patient".into(),
            id: id.to_string(),
        });
    }

    let prescriptions = get_prescriptions_by_patient(conn, id)?;
    let appointments = get_appointments_by_patient(conn, id)?;
    let reminders = get_reminders_by_patient(conn, id)?;
    let mut schedules = Vec::new();
    for rx in &prescriptions {
        schedules.extend(get_schedules_by_prescription(conn, &rx.id)?);
    }

    tracing::info!(
        patient = %id,
        prescriptions = prescriptions.len(),
        schedules = schedules.len(),
        appointments = appointments.len(),
        reminders = reminders.len(),
        "deleting patient cascade"
    );

    let tx = conn.unchecked_transaction()?;
    for reminder in &reminders {
        tx.execute(
            "DELETE FROM reminders WHERE id = ?1",
            params![reminder.id.to_string()],
        )?;
    }
    for schedule in &schedules {
        tx.execute(
            "DELETE FROM schedules WHERE id = ?1",
            params![schedule.id.to_string()],
        )?;
    }
    for rx in &prescriptions {
        tx.execute(
            "DELETE FROM prescriptions WHERE id = ?1",
            params![rx.id.to_string()],
        )?;
    }
    for appt in &appointments {
        tx.execute(
            "DELETE FROM appointments WHERE id = ?1",
            params![appt.id.to_string()],
        )?;
    }
    tx.execute("DELETE FROM patients WHERE id = ?1", params![id.to_string()])?;
    tx.commit()?;
    Ok(())
}

// Internal row type for Patient mapping
struct PatientRow {
    id: String,
    name: String,
    surname_p: String,
    surname_m: Option<String>,
    birth_date: i64,
    phone: Option<String>,
}

fn patient_row(row: &rusqlite::Row<'_>) -> Result<PatientRow, rusqlite::Error> {
    Ok(PatientRow {
        id: row.get(0)?,
        name: row.get(1)?,
        surname_p: row.get(2)?,
        surname_m: row.get(3)?,
        birth_date: row.get(4)?,
        phone: row.get(5)?,
    })
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    Ok(Patient {
        id: parse_uuid(&row.id)?,
        name: row.name,
        surname_p: row.surname_p,
        surname_m: row.surname_m,
        birth_date: row.birth_date,
        phone: row.phone,
    })
}
