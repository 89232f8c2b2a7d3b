use rusqlite::{params, Connection};
use uuid::Uuid;

use super::parse_uuid;
use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_catalog_entry(conn: &Connection, entry: &CatalogEntry) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO catalog (id, commercial_name, active_ingredient, presentation,
         unit, concentration, instructions)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            entry.id.to_string(),
            entry.commercial_name,
            entry.active_ingredient,
            entry.presentation,
            entry.unit,
            entry.concentration,
            entry.instructions,
        ],
    )?;
    Ok(())
}

pub fn get_catalog_entry(conn: &Connection, id: &Uuid) -> Result<Option<CatalogEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, commercial_name, active_ingredient, presentation, unit, concentration,
         instructions
         FROM catalog WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], catalog_row);

    match result {
        Ok(row) => Ok(Some(catalog_from_row(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_catalog_entries(conn: &Connection) -> Result<Vec<CatalogEntry>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, commercial_name, active_ingredient, presentation, unit, concentration,
         instructions
         FROM catalog ORDER BY commercial_name ASC",
    )?;

    let rows = stmt.query_map([], catalog_row)?;
    let mut entries = Vec::new();
    for row in rows {
        entries.push(catalog_from_row(row?)?);
    }
    Ok(entries)
}

/// Full-row update.
pub fn update_catalog_entry(conn: &Connection, entry: &CatalogEntry) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE catalog SET commercial_name = ?2, active_ingredient = ?3, presentation = ?4,
         unit = ?5, concentration = ?6, instructions = ?7
         WHERE id = ?1",
        params![
            entry.id.to_string(),
            entry.commercial_name,
            entry.active_ingredient,
            entry.presentation,
            entry.unit,
            entry.concentration,
            entry.instructions,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "catalog_entry".into(),
            id: entry.id.to_string(),
        });
    }
    Ok(())
}

/// Partial update: only provided fields change.
pub fn update_catalog_entry_fields(
    conn: &Connection,
    id: &Uuid,
    update: &CatalogUpdate,
) -> Result<CatalogEntry, DatabaseError> {
    let mut entry = get_catalog_entry(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "catalog_entry".into(),
        id: id.to_string(),
    })?;

    if let Some(commercial_name) = &update.commercial_name {
        entry.commercial_name = commercial_name.clone();
    }
    if let Some(active_ingredient) = &update.active_ingredient {
        entry.active_ingredient = active_ingredient.clone();
    }
    if let Some(presentation) = &update.presentation {
        entry.presentation = presentation.clone();
    }
    if let Some(unit) = &update.unit {
        entry.unit = unit.clone();
    }
    if let Some(concentration) = &update.concentration {
        entry.concentration = concentration.clone();
    }
    if let Some(instructions) = &update.instructions {
        entry.instructions = Some(instructions.clone());
    }

    update_catalog_entry(conn, &entry)?;
    Ok(entry)
}

pub fn count_referencing_prescriptions(conn: &Connection, id: &Uuid) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM prescriptions WHERE catalog_id = ?1",
        params![id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Delete the entry unless a prescription still references it; the
/// conflict error carries the blocking count so callers can show it.
pub fn delete_catalog_entry_if_unused(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    if get_catalog_entry(conn, id)?.is_none() {
        return Err(DatabaseError::NotFound {
            entity_type: "catalog_entry".into(),
            id: id.to_string(),
        });
    }

    let references = count_referencing_prescriptions(conn, id)?;
    if references > 0 {
        return Err(DatabaseError::UsageConflict { references });
    }

    conn.execute("DELETE FROM catalog WHERE id = ?1", params![id.to_string()])?;
    Ok(())
}

// Internal row type for CatalogEntry mapping
struct CatalogRow {
    id: String,
    commercial_name: String,
    active_ingredient: String,
    presentation: String,
    unit: String,
    concentration: String,
    instructions: Option<String>,
}

fn catalog_row(row: &rusqlite::Row<'_>) -> Result<CatalogRow, rusqlite::Error> {
    Ok(CatalogRow {
        id: row.get(0)?,
        commercial_name: row.get(1)?,
        active_ingredient: row.get(2)?,
        presentation: row.get(3)?,
        unit: row.get(4)?,
        concentration: row.get(5)?,
        instructions: row.get(6)?,
    })
}

fn catalog_from_row(row: CatalogRow) -> Result<CatalogEntry, DatabaseError> {
    Ok(CatalogEntry {
        id: parse_uuid(&row.id)?,
        commercial_name: row.commercial_name,
        active_ingredient: row.active_ingredient,
        presentation: row.presentation,
        unit: row.unit,
        concentration: row.concentration,
        instructions: row.instructions,
    })
}
