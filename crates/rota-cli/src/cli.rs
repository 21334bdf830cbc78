//! Command handlers for the Rota CLI
//!
//! Every planner command works against a freshly loaded planner:
//!
//! ```text
//! load planner → change the database → host notifies watchers
//!              → planner reloads the touched rows → print the table
//! ```
//!
//! Mutations go through [`SqliteHost`], which notifies the watches armed by
//! the load. Draining the notice queue afterwards runs the same scoped
//! reloads a long-running planner would.

use std::{fmt::Write, path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use jiff::{civil::Date, Zoned};
use log::debug;
use rota_core::{
    build_month, calendar::target_month_range, DayDescriptor, GridOptions, Messages,
    MonthCalendar, PlannerBuilder, PlannerController, PlannerTable,
};

use crate::{host::SqliteHost, renderer::TerminalRenderer};

/// Print the day grid of a month
#[derive(Args)]
pub struct GridArgs {
    /// Year, e.g. 2024
    pub year: i32,
    /// Month number, 1 to 12
    #[arg(value_parser = clap::value_parser!(i32).range(1..=12))]
    pub month: i32,
    /// Only show the days of the month instead of whole weeks
    #[arg(long)]
    pub partial_weeks: bool,
}

impl From<&GridArgs> for GridOptions {
    fn from(val: &GridArgs) -> Self {
        GridOptions {
            full_weeks: !val.partial_weeks,
        }
    }
}

/// Select the month the planner shows
#[derive(Args)]
pub struct ViewArgs {
    /// Year, e.g. 2024
    pub year: i64,
    /// Month number, 1 to 12
    #[arg(value_parser = clap::value_parser!(i64).range(1..=12))]
    pub month: i64,
}

/// Add a new resource
#[derive(Args)]
pub struct AddResourceArgs {
    /// Display name of the resource
    pub name: String,
}

/// Identify a resource or entry by its numeric ID
#[derive(Args)]
pub struct IdArgs {
    /// Numeric ID as shown by the list and add commands
    pub id: i64,
}

#[derive(Subcommand)]
pub enum ResourceCommands {
    /// Add a resource
    #[command(alias = "a")]
    Add(AddResourceArgs),
    /// List all resources with their IDs
    #[command(aliases = ["l", "ls"])]
    List,
    /// Remove a resource and its entries
    #[command(aliases = ["d", "rm"])]
    Remove(IdArgs),
}

/// Schedule an entry for a resource
#[derive(Args)]
pub struct AddEntryArgs {
    /// ID of the resource the entry belongs to
    pub resource_id: i64,
    /// Day of the entry (YYYY-MM-DD)
    pub date: Date,
    /// Text shown in the planner cell
    pub title: String,
}

/// Reassign an entry to another resource
#[derive(Args)]
pub struct MoveEntryArgs {
    /// ID of the entry to move
    pub id: i64,
    /// ID of the resource that takes over the entry
    pub resource_id: i64,
}

#[derive(Subcommand)]
pub enum EntryCommands {
    /// Add an entry
    #[command(alias = "a")]
    Add(AddEntryArgs),
    /// Move an entry to another resource
    #[command(alias = "m")]
    Move(MoveEntryArgs),
    /// Remove an entry
    #[command(aliases = ["d", "rm"])]
    Remove(IdArgs),
}

/// Heading for a day grid, e.g. "February 2024".
fn month_title(days: &[DayDescriptor]) -> String {
    match target_month_range(days) {
        Some(range) => range.start.strftime("%B %Y").to_string(),
        None => "Rota".to_string(),
    }
}

/// Prints the day grid for a month. Needs no database.
pub fn print_grid(args: &GridArgs, renderer: &TerminalRenderer) -> Result<()> {
    let today = Zoned::now().date();
    let days = build_month(args.month, args.year, args.into(), today);
    let output = format!("# {}\n\n{}", month_title(&days), MonthCalendar(&days));
    renderer.render(&output)
}

/// CLI command handler bound to a database
pub struct Cli {
    host: Arc<SqliteHost>,
    config_path: Option<PathBuf>,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(host: SqliteHost, config_path: Option<PathBuf>, renderer: TerminalRenderer) -> Self {
        Self {
            host: Arc::new(host),
            config_path,
            renderer,
        }
    }

    /// Builds the planner and loads it for the viewed month.
    async fn load_planner(&self) -> Result<PlannerController<SqliteHost>> {
        let mut planner = PlannerBuilder::new(Arc::clone(&self.host))
            .with_config_path(self.config_path.as_ref())
            .build()
            .context("Failed to initialize planner")?;

        let view = self
            .host
            .current_view(planner.today())
            .await
            .context("Failed to read the viewed month")?;
        planner.load(Some(view)).await;
        Ok(planner)
    }

    /// Handles queued change notices with scoped reloads.
    async fn apply_notices(&self, planner: &mut PlannerController<SqliteHost>) {
        let handled = planner.process_pending().await;
        debug!("apply_notices: handled {handled} change notice(s)");
    }

    fn print_planner(&self, planner: &PlannerController<SqliteHost>, status: Option<&str>) -> Result<()> {
        let mut output = format!("# {}\n", month_title(planner.days()));
        if let Some(status) = status {
            writeln!(output, "\n{status}")?;
        }
        if !planner.messages().is_empty() {
            write!(output, "\n{}", Messages(planner.messages()))?;
        }
        write!(output, "\n{}", PlannerTable::new(planner.days(), planner.rows()))?;

        self.renderer.render(&output)
    }

    pub async fn show(&self) -> Result<()> {
        let planner = self.load_planner().await?;
        self.print_planner(&planner, None)
    }

    pub async fn set_view(&self, args: &ViewArgs) -> Result<()> {
        let mut planner = self.load_planner().await?;
        self.host
            .set_view(args.year, args.month)
            .await
            .context("Failed to set the viewed month")?;
        self.apply_notices(&mut planner).await;
        self.print_planner(&planner, None)
    }

    pub async fn handle_resource_command(&self, command: ResourceCommands) -> Result<()> {
        match command {
            ResourceCommands::Add(args) => self.add_resource(args).await,
            ResourceCommands::List => self.list_resources().await,
            ResourceCommands::Remove(args) => self.remove_resource(&args).await,
        }
    }

    async fn add_resource(&self, args: AddResourceArgs) -> Result<()> {
        let mut planner = self.load_planner().await?;
        let resource = self
            .host
            .add_resource(args.name)
            .await
            .context("Failed to add resource")?;
        // Nothing watches a resource that was not part of the last load
        planner.reload().await;

        let status = format!("Created resource {}: {}", resource.id, resource.name);
        self.print_planner(&planner, Some(&status))
    }

    async fn list_resources(&self) -> Result<()> {
        let resources = self
            .host
            .list_resources()
            .await
            .context("Failed to list resources")?;

        if resources.is_empty() {
            return self.renderer.render("No resources found.\n");
        }
        let mut output = String::from("# Resources\n\n");
        for resource in resources {
            writeln!(output, "- {}: {}", resource.id, resource.name)?;
        }
        self.renderer.render(&output)
    }

    async fn remove_resource(&self, args: &IdArgs) -> Result<()> {
        let mut planner = self.load_planner().await?;
        self.host
            .remove_resource(args.id)
            .await
            .with_context(|| format!("Failed to remove resource {}", args.id))?;
        self.apply_notices(&mut planner).await;

        let status = format!("Removed resource {}", args.id);
        self.print_planner(&planner, Some(&status))
    }

    pub async fn handle_entry_command(&self, command: EntryCommands) -> Result<()> {
        match command {
            EntryCommands::Add(args) => self.add_entry(args).await,
            EntryCommands::Move(args) => self.move_entry(&args).await,
            EntryCommands::Remove(args) => self.remove_entry(&args).await,
        }
    }

    async fn add_entry(&self, args: AddEntryArgs) -> Result<()> {
        let mut planner = self.load_planner().await?;
        let entry = self
            .host
            .add_entry(args.resource_id, args.date, args.title)
            .await
            .context("Failed to add entry")?;
        self.apply_notices(&mut planner).await;

        let status = format!("Created entry {}", entry.id);
        self.print_planner(&planner, Some(&status))
    }

    async fn move_entry(&self, args: &MoveEntryArgs) -> Result<()> {
        let mut planner = self.load_planner().await?;
        self.host
            .move_entry(args.id, args.resource_id)
            .await
            .with_context(|| format!("Failed to move entry {}", args.id))?;
        self.apply_notices(&mut planner).await;

        let status = format!("Moved entry {} to resource {}", args.id, args.resource_id);
        self.print_planner(&planner, Some(&status))
    }

    async fn remove_entry(&self, args: &IdArgs) -> Result<()> {
        let mut planner = self.load_planner().await?;
        self.host
            .remove_entry(args.id)
            .await
            .with_context(|| format!("Failed to remove entry {}", args.id))?;
        self.apply_notices(&mut planner).await;

        let status = format!("Removed entry {}", args.id);
        self.print_planner(&planner, Some(&status))
    }
}
