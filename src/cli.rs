//! CLI mode implementation
//!
//! Provides the command-line interface for the proposal archive client

use crate::config::Overrides;
use crate::error::{validate_date_filter, AppError};
use crate::model::{SearchFilters, SearchType};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Status values the backend accepts as a filter
const STATUS_VALUES: [&str; 5] = ["pending", "passed", "rejected", "withdrawn", "under_review"];

/// akta-search CLI
#[derive(Parser, Debug)]
#[command(name = "akta-search")]
#[command(about = "Search the AKTA political proposal archive", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Base URL of the archive API
    #[arg(long, global = true, env = "AKTA_API_BASE")]
    pub api_base: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "AKTA_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Path to a JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output (no short flag to avoid conflicts)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Disable coloured output
    #[arg(long, global = true)]
    pub no_color: bool,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            api_base: self.api_base.clone(),
            timeout_secs: self.timeout,
            no_color: self.no_color,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a single search and print the results
    Search(SearchArgs),
    /// List proposals similar to a given one
    Similar(SimilarArgs),
    /// Interactive search session (default when no command is given)
    Interactive(InteractiveArgs),
}

/// Search command arguments
#[derive(Args, Clone, Debug)]
pub struct SearchArgs {
    /// Search terms
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Search type (defaults to the configured type, normally hybrid)
    #[arg(short = 't', long = "type", value_enum)]
    pub search_type: Option<SearchType>,

    /// Only proposals with this status
    #[arg(long, value_parser = STATUS_VALUES)]
    pub status: Option<String>,

    /// Submitted on or after this date (YYYY-MM-DD)
    #[arg(long = "from")]
    pub date_from: Option<String>,

    /// Submitted on or before this date (YYYY-MM-DD)
    #[arg(long = "to")]
    pub date_to: Option<String>,

    /// Only proposals carrying this tag (repeatable)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Category substring
    #[arg(long)]
    pub category: Option<String>,

    /// Submitting organization substring
    #[arg(long = "organization")]
    pub organization: Option<String>,

    /// Print the raw response as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    /// Query words joined back into a single string
    pub fn query_text(&self) -> String {
        self.query.join(" ")
    }

    /// Validated filters for the request
    pub fn filters(&self) -> Result<SearchFilters, AppError> {
        for date in [&self.date_from, &self.date_to].into_iter().flatten() {
            validate_date_filter(date)?;
        }

        Ok(SearchFilters {
            status: self.status.clone(),
            date_from: self.date_from.clone(),
            date_to: self.date_to.clone(),
            tags: self.tags.clone(),
            category: self.category.clone(),
            submitting_organization: self.organization.clone(),
        })
    }
}

/// Similar command arguments
#[derive(Args, Clone, Debug)]
pub struct SimilarArgs {
    /// Proposal id
    pub id: String,

    /// Maximum number of results (default 5, max 20)
    #[arg(short = 'l', long)]
    pub limit: Option<u32>,

    /// Print the raw response as JSON
    #[arg(long)]
    pub json: bool,
}

/// Interactive session arguments
#[derive(Args, Clone, Debug, Default)]
pub struct InteractiveArgs {
    /// Initial search type
    #[arg(short = 't', long = "type", value_enum)]
    pub search_type: Option<SearchType>,
}
