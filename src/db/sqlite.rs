use std::path::Path;

use rusqlite::Connection;
use tracing;

use super::DatabaseError;

/// Open a SQLite connection to the given path and run migrations
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(path)?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Open an in-memory database (for testing)
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    let conn = Connection::open_in_memory()?;
    configure_pragmas(&conn)?;
    run_migrations(&conn)?;
    Ok(conn)
}

fn configure_pragmas(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(
        "PRAGMA journal_mode=DELETE;
         PRAGMA foreign_keys=ON;",
    )?;
    Ok(())
}

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = get_current_version(conn);

    let migrations: Vec<(i64, &str)> = vec![(
        1,
        include_str!("../../resources/migrations/001_initial.sql"),
    )];

    for (version, sql) in migrations {
        if version > current_version {
            tracing::info!("Running migration v{version}");
            conn.execute_batch(sql).map_err(|e| DatabaseError::MigrationFailed {
                version,
                reason: e.to_string(),
            })?;
        }
    }

    Ok(())
}

/// Get the current schema version (0 if no schema exists yet)
fn get_current_version(conn: &Connection) -> i64 {
    conn.query_row(
        "SELECT MAX(version) FROM schema_version",
        [],
        |row| row.get::<_, i64>(0),
    )
    .unwrap_or(0)
}

/// Count tables in the database (for verification)
pub fn count_tables(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_initializes_all_tables() {
        let conn = open_memory_database().unwrap();
        // 6 entity tables + schema_version
        let count = count_tables(&conn).unwrap();
        assert_eq!(count, 7, "Expected 7 tables, got {count}");
    }

    #[test]
    fn schema_version_is_current() {
        let conn = open_memory_database().unwrap();
        let version: i64 = conn
            .query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn migration_idempotent() {
        let conn = open_memory_database().unwrap();
        // Run migrations again — should not error
        let result = run_migrations(&conn);
        assert!(result.is_ok());
    }

    #[test]
    fn foreign_keys_enabled() {
        let conn = open_memory_database().unwrap();
        let fk: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn database_opens_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recordamed.db");
        let conn = open_database(&path).unwrap();
        assert_eq!(count_tables(&conn).unwrap(), 7);

        // Re-open — should be idempotent
        let conn2 = open_database(&path).unwrap();
        assert_eq!(count_tables(&conn2).unwrap(), 7);
    }

    #[test]
    fn reminder_exclusivity_check_rejects_double_parent() {
        let conn = open_memory_database().unwrap();
        conn.execute(
            "INSERT INTO patients (id, name, surname_p, birth_date) VALUES ('p1', 'A', 'B', 0)",
            [],
        )
        .unwrap();

        // Neither parent set
        let r = conn.execute(
            "INSERT INTO reminders (id, patient_id, task_type, alert_datetime, status)
             VALUES ('r1', 'p1', 'medication', 0, 'pending')",
            [],
        );
        assert!(r.is_err());
    }

    #[test]
    fn minute_of_day_check_constraint() {
        let conn = open_memory_database().unwrap();
        conn.execute_batch(
            "INSERT INTO patients (id, name, surname_p, birth_date) VALUES ('p1', 'A', 'B', 0);
             INSERT INTO catalog (id, commercial_name, active_ingredient, presentation, unit, concentration)
             VALUES ('c1', 'X', 'Y', 'Tablets', 'mg', '500mg');
             INSERT INTO prescriptions (id, patient_id, catalog_id, dose_qty, dose_unit, frequency, start_date, active)
             VALUES ('rx1', 'p1', 'c1', 1, 'tablet', 'daily', 0, 1);",
        )
        .unwrap();

        let bad = conn.execute(
            "INSERT INTO schedules (id, prescription_id, minute_of_day, days_of_week)
             VALUES ('s1', 'rx1', 1440, 'all')",
            [],
        );
        assert!(bad.is_err());

        let ok = conn.execute(
            "INSERT INTO schedules (id, prescription_id, minute_of_day, days_of_week)
             VALUES ('s1', 'rx1', 1439, 'all')",
            [],
        );
        assert!(ok.is_ok());
    }
}
