use chrono::Local;
use clap::{Args, Subcommand};

use crate::config::Config;
use crate::db::MealRepository;
use crate::models::FoodItem;

use super::{parse_instant_arg, resolve_date};

#[derive(Args)]
pub struct MealCommand {
    #[command(subcommand)]
    pub command: MealSubcommand,
}

#[derive(Subcommand)]
pub enum MealSubcommand {
    /// Log a meal
    Log {
        /// Food as name:portion:calories:protein:carbs:fat (repeatable)
        #[arg(long = "food", value_name = "FOOD")]
        foods: Vec<String>,

        /// Meal name; stored as "Untitled" when left empty
        #[arg(long, short, default_value = "")]
        name: String,

        /// When the meal was eaten (RFC3339 or "YYYY-MM-DD HH:MM"), defaults to now
        #[arg(long)]
        eaten_at: Option<String>,
    },
    /// Replace a logged meal's foods, name and time
    Update {
        /// Meal entry id
        id: String,

        /// Food as name:portion:calories:protein:carbs:fat (repeatable)
        #[arg(long = "food", value_name = "FOOD")]
        foods: Vec<String>,

        /// Meal name; stored as "Untitled" when left empty
        #[arg(long, short, default_value = "")]
        name: String,

        /// When the meal was eaten (RFC3339 or "YYYY-MM-DD HH:MM"), defaults to now
        #[arg(long)]
        eaten_at: Option<String>,
    },
    /// Delete a logged meal
    Delete {
        /// Meal entry id
        id: String,
    },
    /// List meals for a day, a week, or an arbitrary range
    List {
        /// Day (YYYY-MM-DD), defaults to today
        #[arg(long, short, conflicts_with_all = ["from", "to"])]
        date: Option<String>,

        /// List the whole ISO week containing the day
        #[arg(long, conflicts_with_all = ["from", "to"])]
        week: bool,

        /// Range start (RFC3339 or "YYYY-MM-DD HH:MM"), inclusive
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// Range end (RFC3339 or "YYYY-MM-DD HH:MM"), inclusive
        #[arg(long, requires = "from")]
        to: Option<String>,
    },
}

impl MealCommand {
    pub async fn run(
        &self,
        meals: &MealRepository,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            MealSubcommand::Log {
                foods,
                name,
                eaten_at,
            } => {
                let eaten = match eaten_at {
                    Some(s) => parse_instant_arg(s)?,
                    None => Local::now(),
                };
                let foods = parse_food_specs(foods)?;
                let created = meals.create(&foods, name, &config.user_id, &eaten).await?;

                println!(
                    "Logged '{}' at {}",
                    created.name,
                    created
                        .eaten_at
                        .with_timezone(&Local)
                        .format("%Y-%m-%d %H:%M")
                );
                println!("Entry ID: {}", created.id);
                Ok(())
            }
            MealSubcommand::Update {
                id,
                foods,
                name,
                eaten_at,
            } => {
                let eaten = match eaten_at {
                    Some(s) => parse_instant_arg(s)?,
                    None => Local::now(),
                };
                let foods = parse_food_specs(foods)?;
                meals
                    .update(&foods, name, &config.user_id, &eaten, id)
                    .await?;

                println!("Updated meal {}", id);
                Ok(())
            }
            MealSubcommand::Delete { id } => {
                meals.delete(id).await?;
                println!("Deleted meal {}", id);
                Ok(())
            }
            MealSubcommand::List {
                date,
                week,
                from,
                to,
            } => {
                let found = if let (Some(from), Some(to)) = (from, to) {
                    let start = parse_instant_arg(from)?;
                    let end = parse_instant_arg(to)?;
                    meals.find_by_range(&start, &end, &config.user_id).await?
                } else {
                    let date = resolve_date(date.as_deref())?;
                    if *week {
                        meals.find_by_week(&date, &config.user_id).await?
                    } else {
                        meals.find_by_date(&date, &config.user_id).await?
                    }
                };

                if found.is_empty() {
                    println!("No meals found.");
                    return Ok(());
                }

                for meal in &found {
                    println!("{}", meal);
                    println!("  ID: {}", meal.id);
                    println!();
                }
                println!("Total: {} meal(s)", found.len());
                Ok(())
            }
        }
    }
}

fn parse_food_specs(specs: &[String]) -> Result<Vec<FoodItem>, String> {
    specs.iter().map(|spec| parse_food_spec(spec)).collect()
}

fn parse_food_spec(spec: &str) -> Result<FoodItem, String> {
    let parts: Vec<&str> = spec.split(':').collect();
    if parts.len() != 6 {
        return Err(format!(
            "Invalid food '{}'. Use name:portion:calories:protein:carbs:fat.",
            spec
        ));
    }

    let number = |value: &str, field: &str| -> Result<f64, String> {
        value
            .trim()
            .parse()
            .map_err(|_| format!("Invalid {} '{}' in food '{}'", field, value.trim(), spec))
    };

    Ok(FoodItem::new(
        parts[0].trim(),
        parts[1].trim(),
        number(parts[2], "calories")?,
        number(parts[3], "protein")?,
        number(parts[4], "carbs")?,
        number(parts[5], "fat")?,
    ))
}
