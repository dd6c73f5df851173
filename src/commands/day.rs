use chrono::{DateTime, Local};
use clap::{Args, Subcommand};

use crate::config::Config;
use crate::db::{DayRepository, MealRepository};
use crate::models::{DayEntry, FoodItem, MacroTotals, MealEntry};

use super::resolve_date;

#[derive(Args)]
pub struct DayCommand {
    #[command(subcommand)]
    pub command: DaySubcommand,
}

#[derive(Subcommand)]
pub enum DaySubcommand {
    /// Show the goal, weight and meals for a day
    Show {
        /// Day (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },
    /// Follow a day live, reprinting on every change until Ctrl-C
    ///
    /// The change feed is in-process: only writes made by this process
    /// trigger a reprint, not edits from another mealtrack instance.
    Watch {
        /// Day (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },
}

pub struct DayRepos<'a> {
    pub days: &'a DayRepository,
    pub meals: &'a MealRepository,
}

impl DayCommand {
    pub async fn run(
        &self,
        repos: DayRepos<'_>,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            DaySubcommand::Show { date } => self.show(date.as_deref(), &repos, config).await,
            DaySubcommand::Watch { date } => self.watch(date.as_deref(), &repos, config).await,
        }
    }

    async fn show(
        &self,
        date: Option<&str>,
        repos: &DayRepos<'_>,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let date = resolve_date(date)?;
        let entry = repos.days.find_document(&date, &config.user_id).await?;
        let meals = repos.meals.find_by_date(&date, &config.user_id).await?;

        print_header(&date);
        print_day(entry.as_ref(), &meals);
        Ok(())
    }

    async fn watch(
        &self,
        date: Option<&str>,
        repos: &DayRepos<'_>,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let date = resolve_date(date)?;
        let mut day_listener = repos.days.watch_document(&date, &config.user_id).await?;
        let mut meal_listener = repos.meals.watch_by_date(&date, &config.user_id).await?;

        print_header(&date);
        print_day(day_listener.current().as_ref(), &meal_listener.current());
        println!();
        println!("Watching for changes. Press Ctrl-C to stop.");

        loop {
            tokio::select! {
                changed = day_listener.changed() => {
                    if !changed {
                        break;
                    }
                }
                changed = meal_listener.changed() => {
                    if !changed {
                        break;
                    }
                }
                result = tokio::signal::ctrl_c() => {
                    result?;
                    break;
                }
            }

            println!();
            print_header(&date);
            print_day(day_listener.current().as_ref(), &meal_listener.current());
        }

        day_listener.unsubscribe();
        meal_listener.unsubscribe();
        Ok(())
    }
}

fn print_header(date: &DateTime<Local>) {
    println!("{}", date.format("%A, %B %-d %Y"));
    println!("{}", "-".repeat(30));
}

fn print_day(entry: Option<&DayEntry>, meals: &[MealEntry]) {
    match entry {
        Some(entry) => {
            match entry.goal_calories {
                Some(goal) => println!("Goal: {} kcal", goal),
                None => println!("Goal: -"),
            }
            match entry.weight {
                Some(weight) => println!("Weight: {} kg", weight),
                None => println!("Weight: -"),
            }
        }
        None => println!("No goal or weight set."),
    }

    if meals.is_empty() {
        println!("No meals logged.");
        return;
    }

    println!();
    for meal in meals {
        println!("{}", meal);
    }

    let foods: Vec<FoodItem> = meals.iter().flat_map(|meal| meal.foods.clone()).collect();
    let totals = MacroTotals::of(&foods);
    println!();
    println!("Day total: {}", totals);
    if let Some(goal) = entry.and_then(|entry| entry.goal_calories) {
        println!("Remaining: {:.0} kcal", goal as f64 - totals.calories);
    }
}
