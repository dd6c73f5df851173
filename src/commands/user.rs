use clap::{Args, Subcommand};

use crate::auth;
use crate::config::Config;
use crate::db::UserRepository;

#[derive(Args)]
pub struct UserCommand {
    #[command(subcommand)]
    pub command: UserSubcommand,
}

#[derive(Subcommand)]
pub enum UserSubcommand {
    /// Validate sign-up details and store the account record
    Register {
        /// Account email
        email: String,

        /// Account password
        #[arg(long)]
        password: String,

        /// Password confirmation, defaults to the password itself
        #[arg(long)]
        confirm: Option<String>,
    },
}

impl UserCommand {
    pub async fn run(
        &self,
        users: &UserRepository,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            UserSubcommand::Register {
                email,
                password,
                confirm,
            } => {
                let confirmation = confirm.as_deref().unwrap_or(password);
                let problems = auth::check_user_details(email, password, confirmation);
                if !problems.is_empty() {
                    for problem in &problems {
                        eprintln!("  - {}", problem);
                    }
                    return Err("Registration details are invalid.".into());
                }

                let user = users.save(&config.user_id, email).await?;
                println!("Registered {} as '{}'", user.email, user.uid);
                Ok(())
            }
        }
    }
}
