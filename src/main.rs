use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use thesis::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional policy file
    #[arg(short, long, global = true)]
    policy_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for thesis::AppCommand {
    fn from(cmd: Commands) -> thesis::AppCommand {
        match cmd {
            Commands::Analyze { ticker, output } => thesis::AppCommand::Analyze { ticker, output },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default policy file
    Setup,
    /// Analyze a ticker and print the investment memo
    Analyze {
        /// Ticker to analyze; defaults to the policy's ticker
        ticker: Option<String>,

        /// Write the memo to this file as well
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => thesis::cli::setup::setup(),
        Some(cmd) => thesis::run_command(cmd.into(), cli.policy_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
