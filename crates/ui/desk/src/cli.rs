// src/cli.rs
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use portal::{CategoryId, ExportFormat};

use crate::core::state::PageId;

#[derive(Parser, Debug)]
#[command(name = "desk", version, about = "Volunteer Hub terminal desk")]
pub struct Cli {
    /// Portal base URL (overrides `portal.base_url` from the config file)
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Run interactive TUI
    Run {
        #[command(subcommand)]
        mode: Option<RunMode>,
    },
    /// Export opportunities without the TUI
    Export(ExportArgs),
    /// Health probe (scripts/monitoring)
    Health,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Opportunities,
    Export,
    Signup,
    NewOpportunity,
}

impl From<RunMode> for PageId {
    fn from(mode: RunMode) -> Self {
        match mode {
            RunMode::Opportunities => PageId::Opportunities,
            RunMode::Export => PageId::Export,
            RunMode::Signup => PageId::Signup,
            RunMode::NewOpportunity => PageId::NewOpportunity,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    #[arg(long, default_value_t = ExportFormat::Csv)]
    pub format: ExportFormat,
    /// First date to include (YYYY-MM-DD)
    #[arg(long = "from", value_name = "DATE")]
    pub date_from: Option<NaiveDate>,
    /// Last date to include (YYYY-MM-DD)
    #[arg(long = "to", value_name = "DATE")]
    pub date_to: Option<NaiveDate>,
    /// Category id, repeatable
    #[arg(long = "category", value_name = "ID")]
    pub categories: Vec<CategoryId>,
    #[arg(long)]
    pub filename: Option<String>,
    /// Target directory (defaults to the configured download dir)
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,
}
