use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to scraper configuration file
    #[arg(long, default_value = "scraper_config.json")]
    pub config_file: PathBuf,

    /// Directory to store output data
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Override the page ceiling for the listings search
    #[arg(long)]
    pub max_pages: Option<u32>,

    /// Keep the previous listings file when pagination aborts midway
    #[arg(long)]
    pub keep_previous_on_failure: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Harvest real-estate listings across result pages
    Listings,
    /// Harvest the Gateway events calendar
    Events,
    /// Harvest movie showtimes
    Movies,
    /// Run every scraper
    All,
}
