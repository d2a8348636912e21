//! CLI definitions: argument parsing, subcommands, and help text.

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

pub use clap_complete::generate;

const AFTER_HELP: &str = "\
EXAMPLES:
  competency-chat                   Start an interactive chat session
  competency-chat -p \"hello\"        Send a single message, print the reply
  competency-chat -p -              Read the message from stdin
  competency-chat login tm-1234     Store your user id for future sessions
  competency-chat logout            Forget the stored user id
  competency-chat config            Show endpoint, token status and session
  competency-chat completions bash  Generate bash completions
";

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    version,
    about = "Chat client for the competency-assessment service",
    after_help = AFTER_HELP
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Send a single message then exit (without the interactive loop)
    #[arg(
        short = 'p',
        long,
        help = "Send one message and print the reply (use '-' to read from stdin)"
    )]
    pub prompt: Option<String>,

    /// Override the user id for this invocation
    #[arg(short = 'u', long, help = "User id (overrides the stored session)")]
    pub user: Option<String>,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store a user id as the current session
    Login {
        /// Opaque user id handed out for the assessment
        id: String,
    },
    /// Clear the stored session
    Logout,
    /// Show endpoint, token status, and session state
    Config,
    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        #[arg(value_parser = clap::value_parser!(Shell))]
        shell: Shell,
    },
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }
}
