mod commands;
mod google;
mod oauth;
mod session;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use calmeet_core::paths::AppPaths;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "calmeet")]
#[command(about = "Open the Google Meet link of your next calendar event")]
struct Cli {
    /// Directory holding credentials.json and token.toml
    #[arg(long, global = true, env = "CALMEET_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the next meeting across all calendars and open its Meet link (default)
    Join {
        /// Print the link instead of opening it
        #[arg(long)]
        no_open: bool,
    },
    /// Sign in with Google and save a new token
    Auth,
    /// List the calendars that are searched for meetings
    Calendars,
    /// Delete the saved token
    Logout,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let paths = AppPaths::resolve(cli.config_dir)?;

    match cli.command.unwrap_or(Commands::Join { no_open: false }) {
        Commands::Join { no_open } => commands::join::run(&paths, !no_open).await,
        Commands::Auth => commands::auth::run(&paths).await,
        Commands::Calendars => commands::calendars::run(&paths).await,
        Commands::Logout => commands::logout::run(&paths),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("warn,calmeet=debug,calmeet_core=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_join() {
        let cli = Cli::try_parse_from(["calmeet"]).unwrap();

        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn join_accepts_no_open_and_global_flags() {
        let cli =
            Cli::try_parse_from(["calmeet", "join", "--no-open", "--config-dir", "/tmp/cm", "-v"])
                .unwrap();

        assert!(matches!(cli.command, Some(Commands::Join { no_open: true })));
        assert_eq!(cli.config_dir, Some(PathBuf::from("/tmp/cm")));
        assert!(cli.verbose);
    }
}
