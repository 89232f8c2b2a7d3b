//! RecordaMed local datastore.
//!
//! Offline-first persistence layer for a medication and appointment
//! reminder app: entity models, SQLite-backed repositories, and the
//! polymorphic reminder table that alerts on either a medication
//! schedule or an appointment.
//!
//! This crate owns the schema and all create/update/delete operations;
//! notification delivery, sync, and UI live above it.

pub mod clock;
pub mod config;
pub mod db;
pub mod models;
pub mod reminders;
pub mod timefmt;
