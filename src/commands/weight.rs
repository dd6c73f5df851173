use clap::{Args, Subcommand};

use crate::config::Config;
use crate::db::DayRepository;

use super::resolve_date;

#[derive(Args)]
pub struct WeightCommand {
    #[command(subcommand)]
    pub command: WeightSubcommand,
}

#[derive(Subcommand)]
pub enum WeightSubcommand {
    /// Record body weight for a day
    Set {
        /// Weight in kilograms
        kilograms: f64,

        /// Day (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,
    },
}

impl WeightCommand {
    pub async fn run(
        &self,
        days: &DayRepository,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            WeightSubcommand::Set { kilograms, date } => {
                let date = resolve_date(date.as_deref())?;
                let uid = &config.user_id;

                // Reuse the day's entry when one exists so the goal on it
                // survives the weight change.
                match days.find_document(&date, uid).await? {
                    Some(existing) => {
                        days.update_weight(&date, *kilograms, uid, &existing.id)
                            .await?;
                    }
                    None => {
                        days.create_weight(&date, *kilograms, uid).await?;
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
