use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timefmt;

/// Days-of-week set for a schedule.
///
/// Stored as the literal `"all"` or as a JSON array of weekday numbers
/// (0 = Sunday .. 6 = Saturday). Unparseable stored values degrade to an
/// empty set instead of failing the read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WeekDays {
    All,
    Days(Vec<u8>),
}

impl WeekDays {
    pub fn parse(raw: &str) -> Self {
        if raw == "all" {
            return WeekDays::All;
        }
        match serde_json::from_str::<Vec<u8>>(raw) {
            Ok(days) => WeekDays::Days(days),
            Err(_) => WeekDays::Days(Vec::new()),
        }
    }

    pub fn to_storage(&self) -> String {
        match self {
            WeekDays::All => "all".to_string(),
            WeekDays::Days(days) => {
                serde_json::to_string(days).unwrap_or_else(|_| "[]".to_string())
            }
        }
    }

    pub fn expanded(&self) -> Vec<u8> {
        match self {
            WeekDays::All => (0..=6).collect(),
            WeekDays::Days(days) => days.clone(),
        }
    }

    pub fn contains(&self, weekday: u8) -> bool {
        match self {
            WeekDays::All => weekday <= 6,
            WeekDays::Days(days) => days.contains(&weekday),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            WeekDays::All => false,
            WeekDays::Days(days) => days.is_empty(),
        }
    }
}

impl From<String> for WeekDays {
    fn from(raw: String) -> Self {
        WeekDays::parse(&raw)
    }
}

impl From<WeekDays> for String {
    fn from(days: WeekDays) -> Self {
        days.to_storage()
    }
}

/// When a prescribed medication is taken: a time of day plus the
/// weekdays it applies to. A prescription can have several (8am, 2pm, 8pm).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Uuid,
    pub prescription_id: Uuid,
    /// Minutes from midnight, 0–1439.
    pub minute_of_day: u16,
    pub days_of_week: WeekDays,
}

impl Schedule {
    /// Zero-padded `HH:MM`.
    pub fn formatted_time(&self) -> String {
        timefmt::format_minute_of_day(self.minute_of_day)
    }

    /// 12-hour `H:MM AM/PM`.
    pub fn formatted_time_12h(&self) -> String {
        timefmt::format_minute_of_day_12h(self.minute_of_day)
    }

    pub fn is_active_on(&self, weekday: u8) -> bool {
        self.days_of_week.contains(weekday)
    }

    /// Does the schedule fire on the local calendar day containing `now_ms`?
    pub fn is_active_today(&self, now_ms: i64) -> bool {
        timefmt::local_weekday(now_ms)
            .map(|wd| self.is_active_on(wd))
            .unwrap_or(false)
    }
}
