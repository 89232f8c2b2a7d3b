use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::timefmt;

/// The person medications and appointments are tracked for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub surname_p: String,
    pub surname_m: Option<String>,
    /// Birth date as epoch ms.
    pub birth_date: i64,
    pub phone: Option<String>,
}

impl Patient {
    /// "Name SurnameP SurnameM", maternal surname omitted when absent.
    pub fn full_name(&self) -> String {
        match &self.surname_m {
            Some(m) => format!("{} {} {}", self.name, self.surname_p, m),
            None => format!("{} {}", self.name, self.surname_p),
        }
    }

    /// Age in whole years at `now_ms`.
    pub fn age(&self, now_ms: i64) -> Option<i32> {
        timefmt::age_years(self.birth_date, now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn patient(surname_m: Option<&str>) -> Patient {
        Patient {
            id: Uuid::new_v4(),
            name: "Ana".into(),
            surname_p: "García".into(),
            surname_m: surname_m.map(Into::into),
            birth_date: Local
                .with_ymd_and_hms(1985, 4, 20, 0, 0, 0)
                .single()
                .unwrap()
                .timestamp_millis(),
            phone: None,
        }
    }

    #[test]
    fn full_name_with_and_without_maternal() {
        assert_eq!(patient(Some("López")).full_name(), "Ana García López");
        assert_eq!(patient(None).full_name(), "Ana García");
    }

    #[test]
    fn age_at_reference_time() {
        let now = Local
            .with_ymd_and_hms(2024, 4, 19, 12, 0, 0)
            .single()
            .unwrap()
            .timestamp_millis();
        assert_eq!(patient(None).age(now), Some(38));
    }
}
