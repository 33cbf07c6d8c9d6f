use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

mod commands;

#[derive(Parser)]
#[command(name = "forge-cli", version, about = "Forge CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Canonical time and projection
    Time {
        #[command(subcommand)]
        action: commands::time::TimeAction,
    },
    /// Daily check-in: preview, submit, status
    Checkin {
        #[command(subcommand)]
        action: commands::checkin::CheckinAction,
    },
    /// Punishment workflow
    Punishment {
        #[command(subcommand)]
        action: commands::punishment::PunishmentAction,
    },
    /// History statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Day-timer check against the server
    Daycheck {
        #[command(subcommand)]
        action: commands::daycheck::DaycheckAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Time { action } => commands::time::run(action),
        Commands::Checkin { action } => commands::checkin::run(action),
        Commands::Punishment { action } => commands::punishment::run(action),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Daycheck { action } => commands::daycheck::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "forge-cli", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
