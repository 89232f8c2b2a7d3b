use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{ReminderStatus, TaskKind};
use crate::timefmt;

/// The owning side of a reminder: exactly one of a medication schedule
/// or an appointment. The discriminator and foreign-key columns are
/// derived from this at write time, so a reminder can never reference
/// both parents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderParent {
    Schedule(Uuid),
    Appointment(Uuid),
}

impl ReminderParent {
    pub fn kind(&self) -> TaskKind {
        match self {
            ReminderParent::Schedule(_) => TaskKind::Medication,
            ReminderParent::Appointment(_) => TaskKind::Appointment,
        }
    }

    pub fn schedule_id(&self) -> Option<Uuid> {
        match self {
            ReminderParent::Schedule(id) => Some(*id),
            ReminderParent::Appointment(_) => None,
        }
    }

    pub fn appointment_id(&self) -> Option<Uuid> {
        match self {
            ReminderParent::Schedule(_) => None,
            ReminderParent::Appointment(id) => Some(*id),
        }
    }
}

/// A single alert instance, tied to a schedule or an appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub parent: ReminderParent,
    /// When to alert, epoch ms.
    pub alert_datetime: i64,
    pub status: ReminderStatus,
    /// When it was completed or skipped, epoch ms.
    pub completed_at: Option<i64>,
    pub notes: Option<String>,
}

impl Reminder {
    pub fn is_medication(&self) -> bool {
        self.parent.kind() == TaskKind::Medication
    }

    pub fn is_appointment(&self) -> bool {
        self.parent.kind() == TaskKind::Appointment
    }

    pub fn is_pending(&self) -> bool {
        self.status == ReminderStatus::Pending
    }

    /// Alert time already passed while still pending.
    pub fn is_overdue(&self, now_ms: i64) -> bool {
        self.alert_datetime < now_ms && self.is_pending()
    }

    /// Human text for the time left until the alert.
    pub fn time_remaining_text(&self, now_ms: i64) -> String {
        timefmt::time_remaining_text(self.alert_datetime, now_ms)
    }

    /// Presentation hint by kind.
    pub fn suggested_icon(&self) -> &'static str {
        match self.parent.kind() {
            TaskKind::Medication => "💊",
            TaskKind::Appointment => "🏥",
        }
    }

    /// Presentation hint by status.
    pub fn status_color(&self) -> &'static str {
        match self.status {
            ReminderStatus::Pending => "#FFA500",
            ReminderStatus::Completed => "#4CAF50",
            ReminderStatus::Skipped => "#9E9E9E",
            ReminderStatus::Postponed => "#2196F3",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MINUTE_MS;

    fn reminder(parent: ReminderParent, status: ReminderStatus) -> Reminder {
        Reminder {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            parent,
            alert_datetime: 1_000_000,
            status,
            completed_at: None,
            notes: None,
        }
    }

    #[test]
    fn parent_exclusivity() {
        let sid = Uuid::new_v4();
        let med = ReminderParent::Schedule(sid);
        assert_eq!(med.kind(), TaskKind::Medication);
        assert_eq!(med.schedule_id(), Some(sid));
        assert_eq!(med.appointment_id(), None);

        let aid = Uuid::new_v4();
        let appt = ReminderParent::Appointment(aid);
        assert_eq!(appt.kind(), TaskKind::Appointment);
        assert_eq!(appt.schedule_id(), None);
        assert_eq!(appt.appointment_id(), Some(aid));
    }

    #[test]
    fn overdue_requires_pending() {
        let r = reminder(
            ReminderParent::Schedule(Uuid::new_v4()),
            ReminderStatus::Pending,
        );
        assert!(r.is_overdue(r.alert_datetime + 1));
        assert!(!r.is_overdue(r.alert_datetime));

        let done = reminder(
            ReminderParent::Schedule(Uuid::new_v4()),
            ReminderStatus::Completed,
        );
        assert!(!done.is_overdue(done.alert_datetime + MINUTE_MS));
    }

    #[test]
    fn presentation_hints() {
        let med = reminder(
            ReminderParent::Schedule(Uuid::new_v4()),
            ReminderStatus::Pending,
        );
        assert_eq!(med.suggested_icon(), "💊");
        assert_eq!(med.status_color(), "#FFA500");

        let appt = reminder(
            ReminderParent::Appointment(Uuid::new_v4()),
            ReminderStatus::Postponed,
        );
        assert_eq!(appt.suggested_icon(), "🏥");
        assert_eq!(appt.status_color(), "#2196F3");
    }
}
