//! getstarted - walk through the basic lifecycle of a document database account

use anyhow::Context;
use clap::Parser;
use cosmos_getstarted::client::AccountClient;
use cosmos_getstarted::config::Config;
use cosmos_getstarted::{demo, logging};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "getstarted")]
#[command(about = "Create a database and container, insert sample families, query them and clean up", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./getstarted.toml, then the user config dir)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Account endpoint; overrides ACCOUNT_HOST
    #[arg(long, value_name = "URL")]
    host: Option<String>,

    /// Account master key; overrides ACCOUNT_KEY
    #[arg(long, value_name = "KEY")]
    key: Option<String>,

    /// More log output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.account.host = host.clone();
        }
        if let Some(key) = &self.key {
            config.account.key = key.clone();
        }
        for _ in 0..self.verbose {
            config.logging.level = config.logging.level.more_verbose();
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::discover(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply(&mut config);
    logging::init(&config.logging);
    log::debug!("Effective configuration: {:?}", config);

    let stdout = io::stdout();
    let mut stderr = io::stderr();
    let outcome = demo::launch(&config, AccountClient::new, &mut stdout.lock(), &mut stderr).await;
    log::debug!("Walkthrough finished: {:?}", outcome);
    Ok(())
}
