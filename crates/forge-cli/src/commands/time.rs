use clap::Subcommand;
use forge_core::storage::Config;
use forge_core::time::TimeState;
use forge_core::epoch;

use super::fetch_canonical_time;

#[derive(Subcommand)]
pub enum TimeAction {
    /// Canonical time from the authority endpoint
    Now,
    /// Local projection from this machine's clock (display only;
    /// day-number decisions always use the authority)
    Local,
    /// The fixed epoch constants
    Epoch,
}

pub fn run(action: TimeAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimeAction::Now => {
            let config = Config::load()?;
            let state = fetch_canonical_time(&config)?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        TimeAction::Local => {
            let state = TimeState::at(chrono::Utc::now());
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        TimeAction::Epoch => {
            let json = serde_json::json!({
                "systemStart": epoch::system_start(),
                "systemEnd": epoch::system_end(),
                "totalDays": epoch::TOTAL_DAYS,
                "punishmentThreshold": epoch::PUNISHMENT_THRESHOLD,
                "rewardThreshold": epoch::REWARD_THRESHOLD,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }
    Ok(())
}
