//! Rota CLI Application
//!
//! Command-line interface for the rota resource planner.

mod args;
mod cli;
mod db;
mod host;
mod renderer;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use host::SqliteHost;
use log::info;
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        config,
        no_color,
        command,
    } = Args::parse();

    let renderer = TerminalRenderer::new(!no_color);

    if let Some(Grid(args)) = &command {
        return cli::print_grid(args, &renderer);
    }

    let host = SqliteHost::open(database_file)
        .await
        .context("Failed to initialize database")?;

    info!("Rota started with database {}", host.db_path().display());

    let cli = Cli::new(host, config, renderer);
    match command {
        Some(View(args)) => cli.set_view(&args).await,
        Some(Resource { command }) => cli.handle_resource_command(command).await,
        Some(Entry { command }) => cli.handle_entry_command(command).await,
        Some(Show) | Some(Grid(_)) | None => cli.show().await,
    }
}
