use rusqlite::{params, Connection};
use uuid::Uuid;

use super::parse_uuid;
use super::reminder::{get_reminders_by_schedule, insert_reminder};
use crate::clock::MINUTE_MS;
use crate::db::DatabaseError;
use crate::models::*;
use crate::timefmt;

pub fn insert_schedule(conn: &Connection, schedule: &Schedule) -> Result<(), DatabaseError> {
    validate_schedule(schedule.minute_of_day, &schedule.days_of_week)?;
    conn.execute(
        "INSERT INTO schedules (id, prescription_id, minute_of_day, days_of_week)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            schedule.id.to_string(),
            schedule.prescription_id.to_string(),
            schedule.minute_of_day,
            schedule.days_of_week.to_storage(),
        ],
    )?;
    Ok(())
}

pub fn get_schedule(conn: &Connection, id: &Uuid) -> Result<Option<Schedule>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, prescription_id, minute_of_day, days_of_week FROM schedules WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], schedule_row);

    match result {
        Ok(row) => Ok(Some(schedule_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_schedules_by_prescription(
    conn: &Connection,
    prescription_id: &Uuid,
) -> Result<Vec<Schedule>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, prescription_id, minute_of_day, days_of_week
         FROM schedules WHERE prescription_id = ?1 ORDER BY minute_of_day ASC",
    )?;

    let rows = stmt.query_map(params![prescription_id.to_string()], schedule_row)?;
    let mut schedules = Vec::new();
    for row in rows {
        schedules.push(schedule_from_row(row?)?);
    }
    Ok(schedules)
}

/// Partial update: only provided fields change.
pub fn update_schedule(
    conn: &Connection,
    id: &Uuid,
    update: &ScheduleUpdate,
) -> Result<Schedule, DatabaseError> {
    let mut schedule = get_schedule(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "schedule".into(),
        id: id.to_string(),
    })?;

    if let Some(minute_of_day) = update.minute_of_day {
        schedule.minute_of_day = minute_of_day;
    }
    if let Some(days_of_week) = &update.days_of_week {
        schedule.days_of_week = days_of_week.clone();
    }
    validate_schedule(schedule.minute_of_day, &schedule.days_of_week)?;

    conn.execute(
        "UPDATE schedules SET minute_of_day = ?2, days_of_week = ?3 WHERE id = ?1",
        params![
            id.to_string(),
            schedule.minute_of_day,
            schedule.days_of_week.to_storage(),
        ],
    )?;
    Ok(schedule)
}

/// Create one pending medication reminder for this schedule.
pub fn create_schedule_reminder(
    conn: &Connection,
    schedule: &Schedule,
    patient_id: &Uuid,
    alert_ms: i64,
) -> Result<Reminder, DatabaseError> {
    let reminder = Reminder {
        id: Uuid::new_v4(),
        patient_id: *patient_id,
        parent: ReminderParent::Schedule(schedule.id),
        alert_datetime: alert_ms,
        status: ReminderStatus::Pending,
        completed_at: None,
        notes: None,
    };
    insert_reminder(conn, &reminder)?;
    Ok(reminder)
}

/// Generate pending reminders for the next `days` calendar days.
///
/// Walks each day starting at the beginning of the current (local) day;
/// days outside the schedule's weekday set and alert instants not
/// strictly in the future are skipped. Survivors are inserted in one
/// transaction. Returns the number created.
///
/// There is no dedup guard: calling this twice over an overlapping
/// window duplicates reminders.
pub fn generate_weekly_reminders(
    conn: &Connection,
    schedule: &Schedule,
    patient_id: &Uuid,
    days: u32,
    now_ms: i64,
) -> Result<usize, DatabaseError> {
    let mut alerts = Vec::new();
    for offset in 0..u64::from(days) {
        let Some(day_start) = timefmt::local_day_start_ms(now_ms, offset) else {
            continue;
        };
        let Some(weekday) = timefmt::local_weekday(day_start) else {
            continue;
        };
        if !schedule.days_of_week.contains(weekday) {
            continue;
        }

        let alert_ms = day_start + i64::from(schedule.minute_of_day) * MINUTE_MS;
        if alert_ms <= now_ms {
            continue;
        }
        alerts.push(alert_ms);
    }

    if alerts.is_empty() {
        return Ok(0);
    }

    let tx = conn.unchecked_transaction()?;
    for alert_ms in &alerts {
        insert_reminder(
            &tx,
            &Reminder {
                id: Uuid::new_v4(),
                patient_id: *patient_id,
                parent: ReminderParent::Schedule(schedule.id),
                alert_datetime: *alert_ms,
                status: ReminderStatus::Pending,
                completed_at: None,
                notes: None,
            },
        )?;
    }
    tx.commit()?;

    tracing::info!(
        schedule = %schedule.id,
        created = alerts.len(),
        "generated weekly reminders"
    );
    Ok(alerts.len())
}

/// Delete the schedule together with every reminder referencing it,
/// as one transaction.
pub fn delete_schedule_cascade(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    if get_schedule(conn, id)?.is_none() {
        return Err(DatabaseError::NotFound {
            entity_type: "schedule".into(),
            id: id.to_string(),
        });
    }

    let reminders = get_reminders_by_schedule(conn, id)?;
    tracing::debug!(schedule = %id, reminders = reminders.len(), "deleting schedule cascade");

    let tx = conn.unchecked_transaction()?;
    for reminder in &reminders {
        tx.execute(
            "DELETE FROM reminders WHERE id = ?1",
            params![reminder.id.to_string()],
        )?;
    }
    tx.execute("DELETE FROM schedules WHERE id = ?1", params![id.to_string()])?;
    tx.commit()?;
    Ok(())
}

fn validate_schedule(minute_of_day: u16, days_of_week: &WeekDays) -> Result<(), DatabaseError> {
    if minute_of_day > 1439 {
        return Err(DatabaseError::ConstraintViolation(format!(
            "minute_of_day {minute_of_day} outside 0..=1439"
        )));
    }
    if days_of_week.is_empty() {
        return Err(DatabaseError::ConstraintViolation(
            "days_of_week set is empty".into(),
        ));
    }
    Ok(())
}

// Internal row type for Schedule mapping
struct ScheduleRow {
    id: String,
    prescription_id: String,
    minute_of_day: i64,
    days_of_week: String,
}

fn schedule_row(row: &rusqlite::Row<'_>) -> Result<ScheduleRow, rusqlite::Error> {
    Ok(ScheduleRow {
        id: row.get(0)?,
        prescription_id: row.get(1)?,
        minute_of_day: row.get(2)?,
        days_of_week: row.get(3)?,
    })
}

fn schedule_from_row(row: ScheduleRow) -> Result<Schedule, DatabaseError> {
    let minute_of_day = u16::try_from(row.minute_of_day).map_err(|_| {
        DatabaseError::ConstraintViolation(format!(
            "minute_of_day {} outside 0..=1439",
            row.minute_of_day
        ))
    })?;
    Ok(Schedule {
        id: parse_uuid(&row.id)?,
        prescription_id: parse_uuid(&row.prescription_id)?,
        minute_of_day,
        days_of_week: WeekDays::parse(&row.days_of_week),
    })
}
