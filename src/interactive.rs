//! Interactive search session over stdin/stdout
//!
//! Each input line is either a `:command` or a query to submit. Requests run
//! on spawned tasks and report back through a channel, so the loop keeps
//! reading input while a search is in flight. Only the newest search is
//! rendered; older completions are dropped by the session.

use crate::client::{SearchBackend, DEFAULT_SIMILAR_LIMIT};
use crate::error::AppError;
use crate::model::{Proposal, SearchResponse, SearchType};
use crate::render::{render_proposals, render_state, RenderOptions};
use crate::session::{Dispatch, SearchSession};
use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info};

const HELP: &str = "\
Type a query and press Enter to search. An empty line clears the results.
Commands:
  :type <hybrid|semantic|fulltext>  change the search type
  :similar <id>                     proposals similar to <id>
  :status                           show the current session state
  :clear                            clear query and results
  :help                             show this help
  :quit                             leave the session";

/// Network work finished on a spawned task
#[derive(Debug)]
enum Completion {
    Search {
        seq: u64,
        outcome: Result<SearchResponse, AppError>,
    },
    Similar {
        id: String,
        outcome: Result<Vec<Proposal>, AppError>,
    },
}

enum Control {
    Continue,
    Quit,
}

/// Line-driven front end for a [`SearchSession`]
pub struct InteractiveSession<B: SearchBackend> {
    session: SearchSession,
    backend: Arc<B>,
    render: RenderOptions,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl<B: SearchBackend> InteractiveSession<B> {
    pub fn new(backend: Arc<B>, search_type: SearchType, render: RenderOptions) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session: SearchSession::new(search_type),
            backend,
            render,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Drive the session until `:quit`, or until input ends and every
    /// outstanding request has reported back.
    pub async fn run<R, W>(&mut self, input: R, output: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!("Interactive session started ({})", self.session.search_type());
        let mut lines = input.lines();
        let mut input_open = true;

        loop {
            if !input_open && self.in_flight == 0 {
                break;
            }

            tokio::select! {
                line = lines.next_line(), if input_open => {
                    match line? {
                        Some(line) => {
                            let (control, text) = self.handle_line(&line);
                            emit(output, &text).await?;
                            if let Control::Quit = control {
                                break;
                            }
                        }
                        None => {
                            debug!("Input closed with {} request(s) in flight", self.in_flight);
                            input_open = false;
                        }
                    }
                }
                Some(done) = self.rx.recv(), if self.in_flight > 0 => {
                    self.in_flight -= 1;
                    let text = self.handle_completion(done);
                    emit(output, &text).await?;
                }
            }
        }

        info!("Interactive session finished");
        Ok(())
    }

    fn handle_line(&mut self, line: &str) -> (Control, String) {
        let trimmed = line.trim();

        let Some(command) = trimmed.strip_prefix(':') else {
            self.session.set_query(line);
            return (Control::Continue, self.submit());
        };

        let (name, arg) = match command.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (command, ""),
        };

        let text = match name {
            "q" | "quit" | "exit" => return (Control::Quit, String::new()),
            "help" | "h" => HELP.to_string(),
            "clear" => {
                self.session.set_query("");
                self.submit()
            }
            "type" => match arg.parse::<SearchType>() {
                Ok(search_type) => {
                    self.session.set_search_type(search_type);
                    format!("Search type: {}", search_type)
                }
                Err(e) => format!("Error: {}", e),
            },
            "similar" => {
                if arg.is_empty() {
                    "Usage: :similar <id>".to_string()
                } else {
                    self.spawn_similar(arg.to_string());
                    format!("Looking up proposals similar to {}...", arg)
                }
            }
            "status" => format!(
                "Status: {}  Type: {}  Query: \"{}\"",
                self.session.status(),
                self.session.search_type(),
                self.session.query()
            ),
            other => format!("Unknown command ':{}'. Type :help for commands.", other),
        };

        (Control::Continue, text)
    }

    fn submit(&mut self) -> String {
        match self.session.begin() {
            Dispatch::Cleared => render_state(self.session.state(), self.render),
            Dispatch::Send(ticket) => {
                let backend = Arc::clone(&self.backend);
                let tx = self.tx.clone();
                self.in_flight += 1;
                tokio::spawn(async move {
                    let outcome = backend.search(&ticket.request).await;
                    let _ = tx.send(Completion::Search {
                        seq: ticket.seq,
                        outcome,
                    });
                });
                render_state(self.session.state(), self.render)
            }
        }
    }

    fn spawn_similar(&mut self, id: String) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let outcome = backend.similar(&id, DEFAULT_SIMILAR_LIMIT).await;
            let _ = tx.send(Completion::Similar { id, outcome });
        });
    }

    fn handle_completion(&mut self, done: Completion) -> String {
        match done {
            Completion::Search { seq, outcome } => {
                if self.session.complete(seq, outcome) {
                    render_state(self.session.state(), self.render)
                } else {
                    String::new()
                }
            }
            Completion::Similar { id, outcome } => match outcome {
                Ok(proposals) if proposals.is_empty() => {
                    format!("No similar proposals found for {}", id)
                }
                Ok(proposals) => format!(
                    "Similar to {}:\n\n{}",
                    id,
                    render_proposals(&proposals, self.render)
                ),
                Err(e) => format!("Error: {}", e),
            },
        }
    }
}

async fn emit<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::SearchClient;
    use crate::config::Config;
    use httpmock::prelude::*;
    use serde_json::json;

    fn plain() -> RenderOptions {
        RenderOptions { color: false }
    }

    fn session_for(base: &str) -> InteractiveSession<SearchClient> {
        let client = SearchClient::new(Config::with_api_base(base).unwrap()).unwrap();
        InteractiveSession::new(Arc::new(client), SearchType::Hybrid, plain())
    }

    async fn run_lines(session: &mut InteractiveSession<SearchClient>, input: &str) -> String {
        let mut output: Vec<u8> = Vec::new();
        session.run(input.as_bytes(), &mut output).await.unwrap();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test]
    async fn test_query_line_renders_results() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/search")
                    .query_param("q", "tax reform")
                    .query_param("type", "hybrid");
                then.status(200).json_body(json!({
                    "results": [{ "id": 1, "title": "Tax Reform Act", "status": "pending", "submitted_date": "2023-05-01" }],
                    "total": 1
                }));
            })
            .await;

        let mut session = session_for(&server.url("/api/v1"));
        let out = run_lines(&mut session, "tax reform\n").await;

        mock.assert_async().await;
        assert!(out.contains("Searching..."));
        assert!(out.contains("Found 1 proposal"));
        assert!(out.contains("Tax Reform Act [pending]"));
        assert!(out.contains("Date: 01.05.2023"));
        assert!(!out.contains("Relevance"));
    }

    #[tokio::test]
    async fn test_blank_line_sends_nothing() {
        let mut session = session_for("http://127.0.0.1:9/api/v1");
        let out = run_lines(&mut session, "   \n").await;
        assert!(!out.contains("Searching..."));
        assert!(!out.contains("Error"));
        assert!(session.session.state().results.is_empty());
    }

    #[tokio::test]
    async fn test_type_command_changes_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/search")
                    .query_param("type", "fulltext");
                then.status(200).json_body(json!({ "results": [], "total": 0 }));
            })
            .await;

        let mut session = session_for(&server.url("/api/v1"));
        let out = run_lines(&mut session, ":type fulltext\nklima\n").await;

        mock.assert_async().await;
        assert!(out.contains("Search type: fulltext"));
        assert!(out.contains("No proposals found for \"klima\""));
    }

    #[tokio::test]
    async fn test_server_error_shows_only_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/v1/search");
                then.status(500);
            })
            .await;

        let mut session = session_for(&server.url("/api/v1"));
        let out = run_lines(&mut session, "tax reform\n").await;

        assert!(out.contains("Error: Search failed: Internal Server Error"));
        assert!(!out.contains("No proposals found"));
    }

    #[tokio::test]
    async fn test_similar_command() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/v1/search/similar/abc")
                    .query_param("limit", "5");
                then.status(200).json_body(json!([
                    { "id": "def", "title": "Verwandter Antrag", "status": "passed", "relevance_score": 0.8 }
                ]));
            })
            .await;

        let mut session = session_for(&server.url("/api/v1"));
        let out = run_lines(&mut session, ":similar abc\n").await;

        assert!(out.contains("Similar to abc:"));
        assert!(out.contains("Verwandter Antrag [passed]"));
        assert!(out.contains("Relevance: 80.0%"));
    }

    #[tokio::test]
    async fn test_quit_stops_reading() {
        let mut session = session_for("http://127.0.0.1:9/api/v1");
        let out = run_lines(&mut session, ":quit\ntax reform\n").await;
        assert!(!out.contains("Searching..."));
    }

    #[tokio::test]
    async fn test_bad_commands_are_reported() {
        let mut session = session_for("http://127.0.0.1:9/api/v1");
        let out = run_lines(&mut session, ":type keyword\n:frobnicate\n:similar\n").await;
        assert!(out.contains("Error: Invalid input: Unknown search type 'keyword'"));
        assert!(out.contains("Unknown command ':frobnicate'"));
        assert!(out.contains("Usage: :similar <id>"));
        assert_eq!(session.session.search_type(), SearchType::Hybrid);
    }
}
