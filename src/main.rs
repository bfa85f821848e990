use crate::config::cli::Command;
use crate::config::Config;
use crate::error::Result;
use crate::infrastructure::FileSystemStore;
use crate::services::update::UpdateService;
use std::sync::Arc;
use tracing::{info, Level};

mod config;
mod domain;
mod error;
mod infrastructure;
mod services;

fn init_tracing(level: &str) {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::new()?;
    init_tracing(&config.args.log_level);
    config.ensure_directories()?;

    let store = Arc::new(FileSystemStore::new(&config.args.data_dir));
    let command = config.args.command.unwrap_or(Command::All);

    UpdateService::new(&config, store)?.run(command).await?;

    info!("Update completed successfully!");
    Ok(())
}
