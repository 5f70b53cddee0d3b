pub mod cli;
pub mod core;
pub mod providers;

use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::core::policy::Policy;
use crate::providers::yahoo_finance::YahooIndicatorProvider;

pub enum AppCommand {
    Analyze {
        ticker: Option<String>,
        output: Option<PathBuf>,
    },
}

pub async fn run_command(command: AppCommand, policy_path: Option<&str>) -> Result<()> {
    info!("Thesis starting...");

    let policy = match policy_path {
        Some(path) => Policy::load_from_path(path)?,
        None => Policy::load()?,
    };
    debug!("Loaded policy: {policy:#?}");

    let base_url = policy
        .providers
        .yahoo
        .as_ref()
        .map_or("https://query1.finance.yahoo.com", |p| &p.base_url);
    let provider = YahooIndicatorProvider::new(base_url);

    match command {
        AppCommand::Analyze { ticker, output } => {
            cli::analyze::run(&policy, &provider, ticker.as_deref(), output.as_deref()).await
        }
    }
}
