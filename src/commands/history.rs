use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use clap::{Args, Subcommand};

use crate::config::Config;
use crate::dates;
use crate::db::{DayRepository, MealRepository};
use crate::models::DayEntry;

use super::resolve_date;

#[derive(Args)]
pub struct HistoryCommand {
    #[command(subcommand)]
    pub command: HistorySubcommand,
}

#[derive(Subcommand)]
pub enum HistorySubcommand {
    /// Goals, weights and eaten calories for the ISO week containing a day
    Week {
        /// Day (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },
    /// Goals and weights for the calendar month containing a day
    Month {
        /// Day (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },
}

pub struct HistoryRepos<'a> {
    pub days: &'a DayRepository,
    pub meals: &'a MealRepository,
}

impl HistoryCommand {
    pub async fn run(
        &self,
        repos: HistoryRepos<'_>,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            HistorySubcommand::Week { date } => {
                let date = resolve_date(date.as_deref())?;
                let uid = &config.user_id;
                let entries = repos.days.find_by_week(&date, uid).await?;
                let meals = repos.meals.find_by_week(&date, uid).await?;

                println!(
                    "Week of {}",
                    dates::iso_week_start(&date).format("%Y-%m-%d")
                );
                println!("{}", "-".repeat(30));

                if entries.is_empty() && meals.is_empty() {
                    println!("No entries found for this week.");
                    return Ok(());
                }

                // Meals can land on days without a goal or weight entry, so
                // the rows are keyed by day rather than by entry.
                let mut rows: BTreeMap<NaiveDate, (Option<DayEntry>, f64)> = BTreeMap::new();
                for entry in entries {
                    let day = entry.date.with_timezone(&Local).date_naive();
                    let slot = rows.entry(day).or_insert((None, 0.0));
                    if slot.0.is_none() {
                        slot.0 = Some(entry);
                    }
                }
                for meal in &meals {
                    let day = meal.eaten_at.with_timezone(&Local).date_naive();
                    rows.entry(day).or_insert((None, 0.0)).1 += meal.totals().calories;
                }

                for (day, (entry, calories)) in &rows {
                    println!(
                        "{}  goal: {:>9}  weight: {:>8}  eaten: {:.0} kcal",
                        day,
                        goal_cell(entry.as_ref()),
                        weight_cell(entry.as_ref()),
                        calories
                    );
                }
                Ok(())
            }
            HistorySubcommand::Month { date } => {
                let date = resolve_date(date.as_deref())?;
                let entries = repos.days.find_by_month(&date, &config.user_id).await?;

                println!("{}", date.format("%B %Y"));
                println!("{}", "-".repeat(30));

                if entries.is_empty() {
                    println!("No entries found for this month.");
                    return Ok(());
                }

                for entry in &entries {
                    println!(
                        "{}  goal: {:>9}  weight: {:>8}",
                        entry.date.with_timezone(&Local).format("%Y-%m-%d"),
                        goal_cell(Some(entry)),
                        weight_cell(Some(entry))
                    );
                }
                Ok(())
            }
        }
    }
}

fn goal_cell(entry: Option<&DayEntry>) -> String {
    match entry.and_then(|entry| entry.goal_calories) {
        Some(goal) => format!("{} kcal", goal),
        None => "-".to_string(),
    }
}

fn weight_cell(entry: Option<&DayEntry>) -> String {
    match entry.and_then(|entry| entry.weight) {
        Some(weight) => format!("{} kg", weight),
        None => "-".to_string(),
    }
}
