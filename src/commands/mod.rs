mod config_cmd;
mod day;
mod food;
mod goal;
mod history;
mod meal;
mod user;
mod weight;

pub use config_cmd::ConfigCommand;
pub use day::{DayCommand, DayRepos};
pub use food::FoodCommand;
pub use goal::GoalCommand;
pub use history::{HistoryCommand, HistoryRepos};
pub use meal::MealCommand;
pub use user::UserCommand;
pub use weight::WeightCommand;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};

/// Parses a `YYYY-MM-DD` argument as midday local time; midday keeps the
/// chosen day stable however the windows shift around it.
pub(crate) fn parse_date_arg(s: &str) -> Result<DateTime<Local>, String> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", s))?;
    let noon = date.and_hms_opt(12, 0, 0).expect("noon is a valid time");
    Local
        .from_local_datetime(&noon)
        .earliest()
        .ok_or_else(|| format!("Date '{}' cannot be resolved in the local time zone", s))
}

/// Parses an instant argument: RFC3339, or `YYYY-MM-DD HH:MM` read as
/// local time.
pub(crate) fn parse_instant_arg(s: &str) -> Result<DateTime<Local>, String> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(s) {
        return Ok(instant.with_timezone(&Local));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M") {
        if let Some(instant) = Local.from_local_datetime(&naive).earliest() {
            return Ok(instant);
        }
    }
    Err(format!(
        "Invalid time '{}'. Use RFC3339 or YYYY-MM-DD HH:MM.",
        s
    ))
}

/// Optional `--date` argument, defaulting to now.
pub(crate) fn resolve_date(date: Option<&str>) -> Result<DateTime<Local>, String> {
    match date {
        Some(s) => parse_date_arg(s),
        None => Ok(Local::now()),
    }
}
