use clap::Subcommand;

use forge_core::remote::DayCheckClient;
use forge_core::storage::Config;

#[derive(Subcommand)]
pub enum DaycheckAction {
    /// Run the day-timer check. Idempotent; the server creates today's
    /// window and any missed-day record for yesterday.
    Run,
}

pub fn run(action: DaycheckAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        DaycheckAction::Run => {
            let config = Config::load()?;
            let client = DayCheckClient::new(
                &config.endpoints.day_check_url,
                config.endpoints.bearer_token.clone(),
            )?;
            let runtime = tokio::runtime::Runtime::new()?;
            let response = runtime.block_on(client.check())?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }
    Ok(())
}
