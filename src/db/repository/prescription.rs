use rusqlite::{params, Connection};
use uuid::Uuid;

use super::parse_uuid;
use super::schedule::{get_schedules_by_prescription, insert_schedule};
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_prescription(conn: &Connection, rx: &Prescription) -> Result<(), DatabaseError> {
    validate_date_range(rx.start_date, rx.end_date)?;
    conn.execute(
        "INSERT INTO prescriptions (id, patient_id, catalog_id, dose_qty, dose_unit,
         frequency, start_date, end_date, active, instructions)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            rx.id.to_string(),
            rx.patient_id.to_string(),
            rx.catalog_id.to_string(),
            rx.dose_qty,
            rx.dose_unit,
            rx.frequency,
            rx.start_date,
            rx.end_date,
            rx.active as i32,
            rx.instructions,
        ],
    )?;
    Ok(())
}

pub fn get_prescription(conn: &Connection, id: &Uuid) -> Result<Option<Prescription>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, catalog_id, dose_qty, dose_unit, frequency,
         start_date, end_date, active, instructions
         FROM prescriptions WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], prescription_row);

    match result {
        Ok(row) => Ok(Some(prescription_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_prescriptions_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Prescription>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, catalog_id, dose_qty, dose_unit, frequency,
         start_date, end_date, active, instructions
         FROM prescriptions WHERE patient_id = ?1",
    )?;

    let rows = stmt.query_map(params![patient_id.to_string()], prescription_row)?;
    collect_prescriptions(rows)
}

pub fn get_active_prescriptions_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Prescription>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, catalog_id, dose_qty, dose_unit, frequency,
         start_date, end_date, active, instructions
         FROM prescriptions WHERE patient_id = ?1 AND active = 1",
    )?;

    let rows = stmt.query_map(params![patient_id.to_string()], prescription_row)?;
    collect_prescriptions(rows)
}

/// Full-row update.
pub fn update_prescription(conn: &Connection, rx: &Prescription) -> Result<(), DatabaseError> {
    validate_date_range(rx.start_date, rx.end_date)?;
    let changed = conn.execute(
        "UPDATE prescriptions SET catalog_id = ?2, dose_qty = ?3, dose_unit = ?4,
         frequency = ?5, start_date = ?6, end_date = ?7, active = ?8, instructions = ?9
         WHERE id = ?1",
        params![
            rx.id.to_string(),
            rx.catalog_id.to_string(),
            rx.dose_qty,
            rx.dose_unit,
            rx.frequency,
            rx.start_date,
            rx.end_date,
            rx.active as i32,
            rx.instructions,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "prescription".into(),
            id: rx.id.to_string(),
        });
    }
    Ok(())
}

/// Partial update: only provided fields change. The merged date range
/// is re-validated.
pub fn update_prescription_fields(
    conn: &Connection,
    id: &Uuid,
    update: &PrescriptionUpdate,
) -> Result<Prescription, DatabaseError> {
    let mut rx = get_prescription(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "prescription".into(),
        id: id.to_string(),
    })?;

    if let Some(catalog_id) = update.catalog_id {
        rx.catalog_id = catalog_id;
    }
    if let Some(dose_qty) = update.dose_qty {
        rx.dose_qty = dose_qty;
    }
    if let Some(dose_unit) = &update.dose_unit {
        rx.dose_unit = dose_unit.clone();
    }
    if let Some(frequency) = &update.frequency {
        rx.frequency = frequency.clone();
    }
    if let Some(start_date) = update.start_date {
        rx.start_date = start_date;
    }
    if let Some(end_date) = update.end_date {
        rx.end_date = Some(end_date);
    }
    if let Some(active) = update.active {
        rx.active = active;
    }
    if let Some(instructions) = &update.instructions {
        rx.instructions = Some(instructions.clone());
    }

    update_prescription(conn, &rx)?;
    Ok(rx)
}

/// Flip the active flag; returns the new value.
pub fn toggle_prescription_active(conn: &Connection, id: &Uuid) -> Result<bool, DatabaseError> {
    let rx = get_prescription(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "prescription".into(),
        id: id.to_string(),
    })?;
    let new_active = !rx.active;
    conn.execute(
        "UPDATE prescriptions SET active = ?2 WHERE id = ?1",
        params![id.to_string(), new_active as i32],
    )?;
    Ok(new_active)
}

/// Factory: create a schedule owned by this prescription.
pub fn add_schedule(
    conn: &Connection,
    prescription_id: &Uuid,
    minute_of_day: u16,
    days_of_week: WeekDays,
) -> Result<Schedule, DatabaseError> {
    let schedule = Schedule {
        id: Uuid::new_v4(),
        prescription_id: *prescription_id,
        minute_of_day,
        days_of_week,
    };
    insert_schedule(conn, &schedule)?;
    Ok(schedule)
}

/// Delete the prescription, its schedules, and every reminder those
/// schedules own. Dependents are fetched up front; all destroys run in
/// one transaction.
pub fn delete_prescription_cascade(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    if get_prescription(conn, id)?.is_none() {
        return Err(DatabaseError::NotFound {
            entity_type: "prescription".into(),
            id: id.to_string(),
        });
    }

    let schedules = get_schedules_by_prescription(conn, id)?;
    let mut reminders = Vec::new();
    for schedule in &schedules {
        reminders.extend(super::reminder::get_reminders_by_schedule(conn, &schedule.id)?);
    }

    tracing::debug!(
        prescription = %id,
        schedules = schedules.len(),
        reminders = reminders.len(),
        "deleting prescription cascade"
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
    tx.execute(
        "DELETE FROM prescriptions WHERE id = ?1",
        params![id.to_string()],
    )?;
    tx.commit()?;
    Ok(())
}

fn validate_date_range(start_date: i64, end_date: Option<i64>) -> Result<(), DatabaseError> {
    if let Some(end) = end_date {
        if end < start_date {
            return Err(DatabaseError::ConstraintViolation(
                "end_date precedes start_date".into(),
            ));
        }
    }
    Ok(())
}

// Internal row type for Prescription mapping
struct PrescriptionRow {
    id: String,
    patient_id: String,
    catalog_id: String,
    dose_qty: f64,
    dose_unit: String,
    frequency: String,
    start_date: i64,
    end_date: Option<i64>,
    active: i32,
    instructions: Option<String>,
}

fn prescription_row(row: &rusqlite::Row<'_>) -> Result<PrescriptionRow, rusqlite::Error> {
    Ok(PrescriptionRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        catalog_id: row.get(2)?,
        dose_qty: row.get(3)?,
        dose_unit: row.get(4)?,
        frequency: row.get(5)?,
        start_date: row.get(6)?,
        end_date: row.get(7)?,
        active: row.get(8)?,
        instructions: row.get(9)?,
    })
}

fn prescription_from_row(row: PrescriptionRow) -> Result<Prescription, DatabaseError> {
    Ok(Prescription {
        id: parse_uuid(&row.id)?,
        patient_id: parse_uuid(&row.patient_id)?,
        catalog_id: parse_uuid(&row.catalog_id)?,
        dose_qty: row.dose_qty,
        dose_unit: row.dose_unit,
        frequency: row.frequency,
        start_date: row.start_date,
        end_date: row.end_date,
        active: row.active != 0,
        instructions: row.instructions,
    })
}

fn collect_prescriptions(
    rows: impl Iterator<Item = Result<PrescriptionRow, rusqlite::Error>>,
) -> Result<Vec<Prescription>, DatabaseError> {
    let mut prescriptions = Vec::new();
    for row in rows {
        prescriptions.push(prescription_from_row(row?)?);
    }
    Ok(prescriptions)
}
