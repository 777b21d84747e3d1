mod calc;
mod cmd;
mod data;
mod ui;

use clap::{Parser, Subcommand};
use data::{EventClient, Settings};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dotcal", about = "month-view event calendar")]
struct Cli {
    /// Base URL of the calendar server; overrides the config file
    #[arg(long)]
    server: Option<String>,

    /// Path to an optional YAML config file
    #[arg(long, default_value = "./dotcal.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the event counts for one month and exit
    Events {
        year: i32,
        /// 1-based month
        month: u32,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load_from(&cli.config)?;
    let server_url = cli.server.unwrap_or(settings.server_url);
    let client = EventClient::new(&server_url);

    match cli.command {
        None => cmd::root::run(client),
        Some(Commands::Events { year, month }) => cmd::events::run(&client, year, month),
    }
}
