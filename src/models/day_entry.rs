use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One user's record for one calendar day: the calorie goal and/or a body
/// weight entry.
///
/// `date` is the instant of local midnight for the day the entry belongs
/// to. The identifier follows `{uid}-{YYYY-MM-DD}-{createdAtMillis}`; the
/// timestamp suffix means concurrent creates for the same day can leave
/// more than one live entry, and lookups resolve to the first id. Creates
/// sharing a millisecond mint the same id and the later one wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayEntry {
    pub id: String,
    pub date: DateTime<Utc>,
    pub goal_calories: Option<i64>,
    pub weight: Option<f64>,
    pub uid: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted: bool,
}

impl fmt::Display for DayEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format("%Y-%m-%d"))?;
        match self.goal_calories {
            Some(goal) => write!(f, "  goal: {} kcal", goal)?,
            None => write!(f, "  goal: -")?,
        }
        match self.weight {
            Some(weight) => write!(f, "  weight: {} kg", weight),
            None => write!(f, "  weight: -"),
        }
    }
}
