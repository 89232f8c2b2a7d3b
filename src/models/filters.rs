use super::enums::{ReminderStatus, TaskKind};

/// Filter parameters for patient-scoped reminder queries.
#[derive(Debug, Default, Clone)]
pub struct ReminderFilter {
    pub status: Option<ReminderStatus>,
    pub kind: Option<TaskKind>,
    /// Only reminders alerting strictly before this instant (epoch ms).
    pub due_before: Option<i64>,
}
