//! Repository functions over an open SQLite connection.
//!
//! Every function takes `&Connection` and returns `DatabaseError` on
//! failure. Cascading deletes fetch their dependents first and then run
//! all destroys inside a single transaction, children before parents.

pub mod appointment;
pub mod catalog;
pub mod patient;
pub mod prescription;
pub mod reminder;
pub mod schedule;

pub use appointment::*;
pub use catalog::*;
pub use patient::*;
pub use prescription::*;
pub use reminder::*;
pub use schedule::*;

use uuid::Uuid;

use crate::db::DatabaseError;

pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(s)
        .map_err(|_| DatabaseError::ConstraintViolation(format!("malformed uuid: {s}")))
}
