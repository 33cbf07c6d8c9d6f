use clap::Subcommand;
use uuid::Uuid;

use forge_core::punishment::Commitment;
use forge_core::storage::{Config, Database};

#[derive(Subcommand)]
pub enum PunishmentAction {
    /// Unresolved punishments, oldest first
    List,
    /// Show one punishment
    Show {
        id: Uuid,
    },
    /// Acknowledge a revealed punishment (moves it to proof-pending)
    Ack {
        id: Uuid,
    },
    /// Submit proof and resolve. Irreversible.
    Resolve {
        id: Uuid,
        /// Required reflection on the failure
        #[arg(long)]
        feeling: String,
        /// Commit to not repeating it (yes/no)
        #[arg(long)]
        commitment: String,
    },
}

pub fn run(action: PunishmentAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;

    match action {
        PunishmentAction::List => {
            let open = db.unresolved_punishments(&config.user_id)?;
            println!("{}", serde_json::to_string_pretty(&open)?);
        }
        PunishmentAction::Show { id } => match db.get_punishment(id)? {
            Some(punishment) => println!("{}", serde_json::to_string_pretty(&punishment)?),
            None => {
                eprintln!("no punishment with id {id}");
                std::process::exit(1);
            }
        },
        PunishmentAction::Ack { id } => {
            let punishment = db.acknowledge_punishment(id)?;
            println!("{}", serde_json::to_string_pretty(&punishment)?);
        }
        PunishmentAction::Resolve {
            id,
            feeling,
            commitment,
        } => {
            let commitment = Commitment::parse(&commitment)?;
            let (resolved, _event) =
                forge_core::checkin::resolve_proof(&db, id, &feeling, commitment, chrono::Utc::now())?;
            println!("{}", serde_json::to_string_pretty(&resolved)?);
        }
    }
    Ok(())
}
