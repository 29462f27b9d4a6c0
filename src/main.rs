//! akta-search: command-line client for the AKTA proposal archive
//!
//! Modes:
//! - `search` - one-shot search, results printed to stdout
//! - `similar` - proposals similar to a given id
//! - `interactive` (default) - line-driven search session on stdin

mod cli;
mod client;
mod config;
mod error;
mod http;
mod interactive;
mod model;
mod render;
mod session;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, InteractiveArgs};
use client::{SearchBackend, SearchClient, DEFAULT_SIMILAR_LIMIT};
use config::Config;
use error::AppError;
use render::RenderOptions;
use session::SearchSession;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity flags; RUST_LOG wins when set
    let log_level = log_level(&cli);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with_writer(std::io::stderr) // Log to stderr to keep stdout clean
        .init();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    };
    debug!("Using API base {}", config.api_base);

    let result = match cli.command {
        Some(Commands::Search(args)) => execute_search_cli(args, config).await,
        Some(Commands::Similar(args)) => execute_similar_cli(args, config).await,
        Some(Commands::Interactive(args)) => execute_interactive(args, config).await,
        None => execute_interactive(InteractiveArgs::default(), config).await,
    };

    // Handle result and exit with appropriate code
    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            Ok(())
        }
        Err(e) => {
            debug!(code = e.error_code(), "Command failed");
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

fn log_level(cli: &Cli) -> &'static str {
    if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    }
}

fn load_config(cli: &Cli) -> Result<Config, AppError> {
    let file = config::load_file_config(cli.config.as_deref())
        .map_err(|e| AppError::Config(format!("{:#}", e)))?;
    Config::resolve(file, cli.overrides())
}

/// Execute search command in CLI mode
async fn execute_search_cli(args: cli::SearchArgs, config: Config) -> Result<String, AppError> {
    let render = RenderOptions { color: config.color };
    let search_type = args.search_type.unwrap_or(config.default_search_type);
    let client = SearchClient::new(config)?;

    let mut session = SearchSession::new(search_type);
    session.set_query(args.query_text());
    session.set_filters(args.filters()?);

    let failure = session.submit(&client).await.err();

    let state = session.state();
    let output = if args.json {
        serde_json::to_string_pretty(state)?
    } else {
        render::render_state(state, render)
    };

    match failure {
        // JSON consumers still get the state document, with the error inside it
        Some(err) if args.json => {
            println!("{}", output);
            std::process::exit(err.exit_code());
        }
        Some(err) => Err(err),
        None => Ok(output),
    }
}

/// Execute similar command in CLI mode
async fn execute_similar_cli(args: cli::SimilarArgs, config: Config) -> Result<String, AppError> {
    let render = RenderOptions { color: config.color };
    let client = SearchClient::new(config)?;

    let limit = args.limit.unwrap_or(DEFAULT_SIMILAR_LIMIT);
    let proposals = client.similar(&args.id, limit).await?;
    info!("Found {} similar proposals for {}", proposals.len(), args.id);

    if args.json {
        return Ok(serde_json::to_string_pretty(&proposals)?);
    }

    if proposals.is_empty() {
        Ok(format!("No similar proposals found for {}", args.id))
    } else {
        Ok(render::render_proposals(&proposals, render))
    }
}

/// Run the interactive session on stdin/stdout
async fn execute_interactive(args: InteractiveArgs, config: Config) -> Result<String, AppError> {
    let render = RenderOptions { color: config.color };
    let search_type = args.search_type.unwrap_or(config.default_search_type);
    let client = Arc::new(SearchClient::new(config)?);

    let mut session = interactive::InteractiveSession::new(client, search_type, render);
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    session.run(stdin, &mut stdout).await?;

    Ok(String::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_flags() {
        assert_eq!(log_level(&Cli::try_parse_from(["akta-search"]).unwrap()), "info");
        assert_eq!(log_level(&Cli::try_parse_from(["akta-search", "-v"]).unwrap()), "debug");
        assert_eq!(log_level(&Cli::try_parse_from(["akta-search", "--quiet"]).unwrap()), "error");
    }
}
