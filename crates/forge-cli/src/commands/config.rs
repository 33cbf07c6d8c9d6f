use clap::Subcommand;

use forge_core::storage::Config;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the full configuration
    Show,
    /// Set the local user id
    SetUser {
        user_id: String,
    },
    /// Set the bearer token for authenticated endpoints
    SetToken {
        token: String,
    },
    /// Set remote endpoint URLs
    SetEndpoints {
        /// Time authority URL
        #[arg(long)]
        time_authority: Option<String>,
        /// Day-check URL
        #[arg(long)]
        day_check: Option<String>,
    },
    /// Replace the floor action list
    SetFloor {
        /// Action texts, in order
        actions: Vec<String>,
    },
    /// Reset to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::SetUser { user_id } => {
            let mut config = Config::load()?;
            config.user_id = user_id;
            config.save()?;
            println!("ok");
        }
        ConfigAction::SetToken { token } => {
            let mut config = Config::load()?;
            config.endpoints.bearer_token = token;
            config.save()?;
            println!("ok");
        }
        ConfigAction::SetEndpoints {
            time_authority,
            day_check,
        } => {
            let mut config = Config::load()?;
            if let Some(url) = time_authority {
                config.endpoints.time_authority_url = url;
            }
            if let Some(url) = day_check {
                config.endpoints.day_check_url = url;
            }
            config.save()?;
            println!("ok");
        }
        ConfigAction::SetFloor { actions } => {
            let mut config = Config::load()?;
            config.floor.actions = actions;
            config.save()?;
            println!("ok");
        }
        ConfigAction::Reset => {
            let config = Config::default();
            config.save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
