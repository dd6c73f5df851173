use clap::{Args, Subcommand};

use crate::config::Config;
use crate::db::DayRepository;

use super::resolve_date;

#[derive(Args)]
pub struct GoalCommand {
    #[command(subcommand)]
    pub command: GoalSubcommand,
}

#[derive(Subcommand)]
pub enum GoalSubcommand {
    /// Set the calorie goal for a day
    Set {
        /// Goal in kcal
        calories: i64,

        /// Day (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },
}

impl GoalCommand {
    pub async fn run(
        &self,
        days: &DayRepository,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            GoalSubcommand::Set { calories, date } => {
                let date = resolve_date(date.as_deref())?;
                let uid = &config.user_id;

                // Reuse the day's entry when one exists so the weight on it
                // survives the goal change.
                match days.find_document(&date, uid).await? {
                    Some(existing) => {
                        days.update_goal(&date, *calories, uid, &existing.id).await?;
                    }
                    None => {
                        days.create_goal(&date, *calories, uid).await?;
                    }
                }

                let entry = days
                    .find_document(&date, uid)
                    .await?
                    .ok_or("day entry missing after write")?;
                println!("{}", entry);
                println!("Entry ID: {}", entry.id);
                Ok(())
            }
        }
    }
}
