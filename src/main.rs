//! competency-chat: CLI client for a remote competency-assessment chat service.
//!
//! Modes:
//! - interactive chat loop (default)
//! - single message with `-p`
//! - `login` / `logout` / `config` / `completions` subcommands

mod cli;
mod core;
mod run;

use clap::{CommandFactory, Parser};
use dotenv::dotenv;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv().ok();

    let args = cli::Args::parse();
    run::init_logger(&args);

    // Subcommands that need no API configuration
    if let Some(command) = &args.command {
        match command {
            cli::Commands::Login { id } => {
                core::session::store_session(id)?;
                println!("Session stored for {}", id.trim());
            }
            cli::Commands::Logout => {
                core::session::clear_session()?;
                println!("Session cleared");
            }
            cli::Commands::Config => run::print_config(),
            cli::Commands::Completions { shell } => {
                let mut cmd = cli::Args::command();
                let name = cmd.get_name().to_string();
                cli::generate(*shell, &mut cmd, name, &mut std::io::stdout());
            }
        }
        return Ok(());
    }

    // Load configuration (print user-friendly message; exit uses Display not Debug)
    let config = core::config::load().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if args.prompt.is_some() {
        run::run_single_message(&args, &config).await?;
        return Ok(());
    }

    run::run_interactive(&args, &config).await
}
