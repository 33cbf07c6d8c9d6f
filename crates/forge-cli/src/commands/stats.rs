use clap::Subcommand;

use forge_core::stats;
use forge_core::storage::{Config, Database};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Aggregate history statistics
    Summary,
    /// Stored check-in records, oldest first
    History {
        /// Only the most recent N records
        #[arg(long)]
        limit: Option<usize>,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let records = db.list_check_ins(&config.user_id)?;

    match action {
        StatsAction::Summary => {
            let stats = stats::compute(&records);
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::History { limit } => {
            let start = limit
                .map(|n| records.len().saturating_sub(n))
                .unwrap_or(0);
            println!("{}", serde_json::to_string_pretty(&records[start..])?);
        }
    }
    Ok(())
}
