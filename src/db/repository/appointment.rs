use rusqlite::{params, Connection};
use uuid::Uuid;

use super::parse_uuid;
use super::reminder::{get_reminders_by_appointment, insert_reminder};
use crate::clock::MINUTE_MS;
use crate::db::DatabaseError;
use crate::models::*;
use crate::timefmt;

/// Default single-reminder lead time.
pub const DEFAULT_REMINDER_LEAD_MINUTES: i64 = 60;

/// Default staggered lead times: 1 day, 2 hours, 30 minutes before.
pub const DEFAULT_REMINDER_OFFSETS: [i64; 3] = [1440, 120, 30];

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, patient_id, datetime, specialty, doctor, place,
         address, reason, prep_required, prep_notes, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            appt.id.to_string(),
            appt.patient_id.to_string(),
            appt.datetime,
            appt.specialty,
            appt.doctor,
            appt.place,
            appt.address,
            appt.reason,
            appt.prep_required as i32,
            appt.prep_notes,
            appt.notes,
        ],
    )?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: &Uuid) -> Result<Option<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, datetime, specialty, doctor, place, address, reason,
         prep_required, prep_notes, notes
         FROM appointments WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], appointment_row);

    match result {
        Ok(row) => Ok(Some(appointment_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_appointments_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, datetime, specialty, doctor, place, address, reason,
         prep_required, prep_notes, notes
         FROM appointments WHERE patient_id = ?1 ORDER BY datetime ASC",
    )?;

    let rows = stmt.query_map(params![patient_id.to_string()], appointment_row)?;
    collect_appointments(rows)
}

/// Future appointments only, soonest first.
pub fn get_upcoming_appointments_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
    now_ms: i64,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, datetime, specialty, doctor, place, address, reason,
         prep_required, prep_notes, notes
         FROM appointments WHERE patient_id = ?1 AND datetime >= ?2 ORDER BY datetime ASC",
    )?;

    let rows = stmt.query_map(params![patient_id.to_string(), now_ms], appointment_row)?;
    collect_appointments(rows)
}

/// Full-row update.
pub fn update_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments SET datetime = ?2, specialty = ?3, doctor = ?4, place = ?5,
         address = ?6, reason = ?7, prep_required = ?8, prep_notes = ?9, notes = ?10
         WHERE id = ?1",
        params![
            appt.id.to_string(),
            appt.datetime,
            appt.specialty,
            appt.doctor,
            appt.place,
            appt.address,
            appt.reason,
            appt.prep_required as i32,
            appt.prep_notes,
            appt.notes,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "appointment".into(),
            id: appt.id.to_string(),
        });
    }
    Ok(())
}

/// Partial update: only provided fields change.
pub fn update_appointment_fields(
    conn: &Connection,
    id: &Uuid,
    update: &AppointmentUpdate,
) -> Result<Appointment, DatabaseError> {
    let mut appt = get_appointment(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "appointment".into(),
        id: id.to_string(),
    })?;

    if let Some(datetime) = update.datetime {
        appt.datetime = datetime;
    }
    if let Some(specialty) = &update.specialty {
        appt.specialty = specialty.clone();
    }
    if let Some(doctor) = &update.doctor {
        appt.doctor = doctor.clone();
    }
    if let Some(place) = &update.place {
        appt.place = place.clone();
    }
    if let Some(address) = &update.address {
        appt.address = Some(address.clone());
    }
    if let Some(reason) = &update.reason {
        appt.reason = Some(reason.clone());
    }
    if let Some(prep_required) = update.prep_required {
        appt.prep_required = prep_required;
    }
    if let Some(prep_notes) = &update.prep_notes {
        appt.prep_notes = Some(prep_notes.clone());
    }
    if let Some(notes) = &update.notes {
        appt.notes = Some(notes.clone());
    }

    update_appointment(conn, &appt)?;
    Ok(appt)
}

/// One pending reminder `minutes_before` the visit. No future check:
/// a caller may deliberately create an already-due reminder.
pub fn create_appointment_reminder(
    conn: &Connection,
    appt: &Appointment,
    minutes_before: i64,
) -> Result<Reminder, DatabaseError> {
    let reminder = Reminder {
        id: Uuid::new_v4(),
        patient_id: appt.patient_id,
        parent: ReminderParent::Appointment(appt.id),
        alert_datetime: appt.datetime - minutes_before * MINUTE_MS,
        status: ReminderStatus::Pending,
        completed_at: None,
        notes: None,
    };
    insert_reminder(conn, &reminder)?;
    Ok(reminder)
}

/// Staggered pending reminders before the visit, e.g. 1 day, 2 hours
/// and 30 minutes ahead. Offsets whose alert instant is not strictly in
/// the future are skipped; survivors are inserted in one transaction and
/// each carries a note naming its lead time. Returns the number created.
pub fn create_multiple_reminders(
    conn: &Connection,
    appt: &Appointment,
    offsets_minutes: &[i64],
    now_ms: i64,
) -> Result<usize, DatabaseError> {
    let mut pending = Vec::new();
    for &minutes_before in offsets_minutes {
        let alert_ms = appt.datetime - minutes_before * MINUTE_MS;
        if alert_ms <= now_ms {
            continue;
        }
        pending.push(Reminder {
            id: Uuid::new_v4(),
            patient_id: appt.patient_id,
            parent: ReminderParent::Appointment(appt.id),
            alert_datetime: alert_ms,
            status: ReminderStatus::Pending,
            completed_at: None,
            notes: Some(format!("Reminder: {}", timefmt::lead_time_note(minutes_before))),
        });
    }

    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.unchecked_transaction()?;
    for reminder in &pending {
        insert_reminder(&tx, reminder)?;
    }
    tx.commit()?;

    tracing::info!(
        appointment = %appt.id,
        created = pending.len(),
        "created staggered appointment reminders"
    );
    Ok(pending.len())
}

/// Delete the appointment together with every reminder referencing it,
/// as one transaction.
pub fn delete_appointment_cascade(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    if get_appointment(conn, id)?.is_none() {
        return Err(DatabaseError::NotFound {
            entity_type: "appointment".into(),
            id: id.to_string(),
        });
    }

    let reminders = get_reminders_by_appointment(conn, id)?;
    tracing::debug!(appointment = %id, reminders = reminders.len(), "deleting appointment cascade");

    let tx = conn.unchecked_transaction()?;
    for reminder in &reminders {
        tx.execute(
            "DELETE FROM reminders WHERE id = ?1",
            params![reminder.id.to_string()],
        )?;
    }
    tx.execute(
        "DELETE FROM appointments WHERE id = ?1",
        params![id.to_string()],
    )?;
    tx.commit()?;
    Ok(())
}

// Internal row type for Appointment mapping
struct AppointmentRow {
    id: String,
    patient_id: String,
    datetime: i64,
    specialty: String,
    doctor: String,
    place: String,
    address: Option<String>,
    reason: Option<String>,
    prep_required: i32,
    prep_notes: Option<String>,
    notes: Option<String>,
}

fn appointment_row(row: &rusqlite::Row<'_>) -> Result<AppointmentRow, rusqlite::Error> {
    Ok(AppointmentRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        datetime: row.get(2)?,
        specialty: row.get(3)?,
        doctor: row.get(4)?,
        place: row.get(5)?,
        address: row.get(6)?,
        reason: row.get(7)?,
        prep_required: row.get(8)?,
        prep_notes: row.get(9)?,
        notes: row.get(10)?,
    })
}

fn appointment_from_row(row: AppointmentRow) -> Result<Appointment, DatabaseError> {
    Ok(Appointment {
        id: parse_uuid(&row.id)?,
        patient_id: parse_uuid(&row.patient_id)?,
        datetime: row.datetime,
        specialty: row.specialty,
        doctor: row.doctor,
        place: row.place,
        address: row.address,
        reason: row.reason,
        prep_required: row.prep_required != 0,
        prep_notes: row.prep_notes,
        notes: row.notes,
    })
}

fn collect_appointments(
    rows: impl Iterator<Item = Result<AppointmentRow, rusqlite::Error>>,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(appointment_from_row(row?)?);
    }
    Ok(appointments)
}
