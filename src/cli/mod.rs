//! Command-line entry point for maintenance tasks.

mod commands;
pub mod error;
mod utils;


use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::paths::get_db_path;

#[derive(Parser)]
#[command(name = "conveyor")]
#[command(author, version, about = "Content conveyor maintenance CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Report how scripts line up with the users that own them
    CheckScriptUser {
        /// Database file path (defaults to the XDG data directory)
        #[arg(long, env = "CONVEYOR_DB")]
        db: Option<PathBuf>,
        /// Only report on this script
        #[arg(long)]
        script_id: Option<String>,
    },
}

pub async fn run() -> miette::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::CheckScriptUser { db, script_id }) => {
            let db_path = db.unwrap_or_else(get_db_path);
            let output =
                commands::check::check_script_user_command(&db_path, script_id.as_deref()).await?;
            println!("{}", output);
        }
        None => {
            // Show help when no command provided
            let _ = Cli::parse_from(["conveyor", "--help"]);
        }
    }

    Ok(())
}
