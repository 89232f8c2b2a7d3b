use std::str::FromStr;

use rusqlite::{params, Connection, ToSql};
use uuid::Uuid;

use super::parse_uuid;
use crate::clock::MINUTE_MS;
use crate::db::DatabaseError;
use crate::models::*;

/// Default postponement when the user hits "snooze".
pub const DEFAULT_POSTPONE_MINUTES: i64 = 15;

pub fn insert_reminder(conn: &Connection, reminder: &Reminder) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO reminders (id, patient_id, task_type, schedule_id, appointment_id,
         alert_datetime, status, completed_at, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            reminder.id.to_string(),
            reminder.patient_id.to_string(),
            reminder.parent.kind().as_str(),
            reminder.parent.schedule_id().map(|id| id.to_string()),
            reminder.parent.appointment_id().map(|id| id.to_string()),
            reminder.alert_datetime,
            reminder.status.as_str(),
            reminder.completed_at,
            reminder.notes,
        ],
    )?;
    Ok(())
}

pub fn get_reminder(conn: &Connection, id: &Uuid) -> Result<Option<Reminder>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, task_type, schedule_id, appointment_id,
         alert_datetime, status, completed_at, notes
         FROM reminders WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], reminder_row);

    match result {
        Ok(row) => Ok(Some(reminder_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_reminders_by_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Reminder>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, task_type, schedule_id, appointment_id,
         alert_datetime, status, completed_at, notes
         FROM reminders WHERE patient_id = ?1 ORDER BY alert_datetime ASC",
    )?;

    let rows = stmt.query_map(params![patient_id.to_string()], reminder_row)?;
    collect_reminders(rows)
}

pub fn get_reminders_by_schedule(
    conn: &Connection,
    schedule_id: &Uuid,
) -> Result<Vec<Reminder>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, task_type, schedule_id, appointment_id,
         alert_datetime, status, completed_at, notes
         FROM reminders WHERE schedule_id = ?1 ORDER BY alert_datetime ASC",
    )?;

    let rows = stmt.query_map(params![schedule_id.to_string()], reminder_row)?;
    collect_reminders(rows)
}

pub fn get_pending_reminders_by_schedule(
    conn: &Connection,
    schedule_id: &Uuid,
) -> Result<Vec<Reminder>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, task_type, schedule_id, appointment_id,
         alert_datetime, status, completed_at, notes
         FROM reminders WHERE schedule_id = ?1 AND status = 'pending'
         ORDER BY alert_datetime ASC",
    )?;

    let rows = stmt.query_map(params![schedule_id.to_string()], reminder_row)?;
    collect_reminders(rows)
}

pub fn get_reminders_by_appointment(
    conn: &Connection,
    appointment_id: &Uuid,
) -> Result<Vec<Reminder>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, task_type, schedule_id, appointment_id,
         alert_datetime, status, completed_at, notes
         FROM reminders WHERE appointment_id = ?1 ORDER BY alert_datetime ASC",
    )?;

    let rows = stmt.query_map(params![appointment_id.to_string()], reminder_row)?;
    collect_reminders(rows)
}

/// Patient-scoped reminder listing with optional status/kind/due filters.
pub fn list_reminders(
    conn: &Connection,
    patient_id: &Uuid,
    filter: &ReminderFilter,
) -> Result<Vec<Reminder>, DatabaseError> {
    let mut sql = String::from(
        "SELECT id, patient_id, task_type, schedule_id, appointment_id,
         alert_datetime, status, completed_at, notes
         FROM reminders WHERE patient_id = ?1",
    );
    let mut args: Vec<Box<dyn ToSql>> = vec![Box::new(patient_id.to_string())];

    if let Some(status) = filter.status {
        args.push(Box::new(status.as_str().to_string()));
        sql.push_str(&format!(" AND status = ?{}", args.len()));
    }
    if let Some(kind) = filter.kind {
        args.push(Box::new(kind.as_str().to_string()));
        sql.push_str(&format!(" AND task_type = ?{}", args.len()));
    }
    if let Some(due_before) = filter.due_before {
        args.push(Box::new(due_before));
        sql.push_str(&format!(" AND alert_datetime < ?{}", args.len()));
    }
    sql.push_str(" ORDER BY alert_datetime ASC");

    let mut stmt = conn.prepare(&sql)?;
    let refs: Vec<&dyn ToSql> = args.iter().map(|a| a.as_ref()).collect();
    let rows = stmt.query_map(refs.as_slice(), reminder_row)?;
    collect_reminders(rows)
}

/// Status → completed, completion time refreshed on every call (repeat
/// completion is allowed and re-stamps the time). Notes overwritten only
/// when provided.
pub fn mark_reminder_completed(
    conn: &Connection,
    id: &Uuid,
    now_ms: i64,
    notes: Option<&str>,
) -> Result<(), DatabaseError> {
    let changed = match notes {
        Some(notes) => conn.execute(
            "UPDATE reminders SET status = 'completed', completed_at = ?2, notes = ?3
             WHERE id = ?1",
            params![id.to_string(), now_ms, notes],
        )?,
        None => conn.execute(
            "UPDATE reminders SET status = 'completed', completed_at = ?2 WHERE id = ?1",
            params![id.to_string(), now_ms],
        )?,
    };
    require_found(changed, id)
}

/// Status → skipped; the reason, when given, lands in the notes.
pub fn mark_reminder_skipped(
    conn: &Connection,
    id: &Uuid,
    now_ms: i64,
    reason: Option<&str>,
) -> Result<(), DatabaseError> {
    let changed = match reason {
        Some(reason) => conn.execute(
            "UPDATE reminders SET status = 'skipped', completed_at = ?2, notes = ?3
             WHERE id = ?1",
            params![id.to_string(), now_ms, reason],
        )?,
        None => conn.execute(
            "UPDATE reminders SET status = 'skipped', completed_at = ?2 WHERE id = ?1",
            params![id.to_string(), now_ms],
        )?,
    };
    require_found(changed, id)
}

/// Push the alert to `now + minutes`, discarding the original alert
/// time, and record the postponement in the notes.
pub fn postpone_reminder(
    conn: &Connection,
    id: &Uuid,
    now_ms: i64,
    minutes: i64,
) -> Result<(), DatabaseError> {
    let new_alert = now_ms + minutes * MINUTE_MS;
    let changed = conn.execute(
        "UPDATE reminders SET status = 'postponed', alert_datetime = ?2, notes = ?3
         WHERE id = ?1",
        params![
            id.to_string(),
            new_alert,
            format!("Postponed {minutes} minutes"),
        ],
    )?;
    require_found(changed, id)
}

/// Back to pending, clearing the completion time. Valid from any status.
pub fn reactivate_reminder(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE reminders SET status = 'pending', completed_at = NULL WHERE id = ?1",
        params![id.to_string()],
    )?;
    require_found(changed, id)
}

/// Unconditional overwrite of the alert time; past instants are accepted.
pub fn update_reminder_alert(
    conn: &Connection,
    id: &Uuid,
    alert_ms: i64,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE reminders SET alert_datetime = ?2 WHERE id = ?1",
        params![id.to_string(), alert_ms],
    )?;
    require_found(changed, id)
}

pub fn delete_reminder(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "DELETE FROM reminders WHERE id = ?1",
        params![id.to_string()],
    )?;
    require_found(changed, id)
}

fn require_found(changed: usize, id: &Uuid) -> Result<(), DatabaseError> {
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "reminder".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

// Internal row type for Reminder mapping
struct ReminderRow {
    id: String,
    patient_id: String,
    task_type: String,
    schedule_id: Option<String>,
    appointment_id: Option<String>,
    alert_datetime: i64,
    status: String,
    completed_at: Option<i64>,
    notes: Option<String>,
}

fn reminder_row(row: &rusqlite::Row<'_>) -> Result<ReminderRow, rusqlite::Error> {
    Ok(ReminderRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        task_type: row.get(2)?,
        schedule_id: row.get(3)?,
        appointment_id: row.get(4)?,
        alert_datetime: row.get(5)?,
        status: row.get(6)?,
        completed_at: row.get(7)?,
        notes: row.get(8)?,
    })
}

fn reminder_from_row(row: ReminderRow) -> Result<Reminder, DatabaseError> {
    let kind = TaskKind::from_str(&row.task_type)?;
    let parent = match kind {
        TaskKind::Medication => match (&row.schedule_id, &row.appointment_id) {
            (Some(schedule_id), None) => ReminderParent::Schedule(parse_uuid(schedule_id)?),
            _ => {
                return Err(DatabaseError::ConstraintViolation(
                    "medication reminder must reference exactly one schedule".into(),
                ))
            }
        },
        TaskKind::Appointment => match (&row.schedule_id, &row.appointment_id) {
            (None, Some(appointment_id)) => {
                ReminderParent::Appointment(parse_uuid(appointment_id)?)
            }
            _ => {
                return Err(DatabaseError::ConstraintViolation(
                    "appointment reminder must reference exactly one appointment".into(),
                ))
            }
        },
    };

    Ok(Reminder {
        id: parse_uuid(&row.id)?,
        patient_id: parse_uuid(&row.patient_id)?,
        parent,
        alert_datetime: row.alert_datetime,
        status: ReminderStatus::from_str(&row.status)?,
        completed_at: row.completed_at,
        notes: row.notes,
    })
}

fn collect_reminders(
    rows: impl Iterator<Item = Result<ReminderRow, rusqlite::Error>>,
) -> Result<Vec<Reminder>, DatabaseError> {
    let mut reminders = Vec::new();
    for row in rows {
        reminders.push(reminder_from_row(row?)?);
    }
    Ok(reminders)
}
