use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{EntryCommands, GridArgs, ResourceCommands, ViewArgs};

/// Resource planner for the terminal
///
/// Rota lays out resources against the days of a month, one entry per
/// resource and day. Changes made through the CLI are applied to the loaded
/// planner incrementally and the resulting table is printed.
#[derive(Parser)]
#[command(version, about, name = "rota")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/rota/rota.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Path to the planner configuration file. Defaults to
    /// $XDG_CONFIG_HOME/rota/planner.json when present
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the Rota CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Print the day grid of a month
    #[command(alias = "g")]
    Grid(GridArgs),
    /// Select the month the planner shows
    #[command(alias = "v")]
    View(ViewArgs),
    /// Manage resources
    #[command(alias = "r")]
    Resource {
        #[command(subcommand)]
        command: ResourceCommands,
    },
    /// Manage entries
    #[command(alias = "e")]
    Entry {
        #[command(subcommand)]
        command: EntryCommands,
    },
    /// Show the planner (default)
    #[command(alias = "s")]
    Show,
}
