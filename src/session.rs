//! Search session state
//!
//! `SearchSession` owns the observable state of one search interaction:
//! the query being edited, the selected search type, and the outcome of
//! the most recent submit. Submits are split into [`SearchSession::begin`]
//! and [`SearchSession::complete`] so that a caller can run the request
//! elsewhere (e.g. a spawned task) and feed the result back. Every dispatch
//! gets a sequence number; only the newest one is allowed to touch state.

use crate::client::SearchBackend;
use crate::error::AppError;
use crate::model::{Proposal, SearchFilters, SearchRequest, SearchResponse, SearchType};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Where the interaction currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Idle,
    Loading,
    Success,
    Error,
}

impl fmt::Display for SearchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SearchStatus::Idle => "idle",
            SearchStatus::Loading => "loading",
            SearchStatus::Success => "success",
            SearchStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Everything a renderer needs to draw the current view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchState {
    pub query: String,
    pub results: Vec<Proposal>,
    pub total: u64,
    pub loading: bool,
    pub error: Option<String>,
    pub search_type: SearchType,
}

impl SearchState {
    fn new(search_type: SearchType) -> Self {
        Self {
            query: String::new(),
            results: Vec::new(),
            total: 0,
            loading: false,
            error: None,
            search_type,
        }
    }
}

/// Handle for one dispatched request
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub seq: u64,
    pub request: SearchRequest,
}

/// Result of [`SearchSession::begin`]
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Query was blank; state has been reset and nothing needs sending
    Cleared,
    /// Send this request and hand the outcome to [`SearchSession::complete`]
    Send(Ticket),
}

/// Query state manager for a single user session
#[derive(Debug)]
pub struct SearchSession {
    state: SearchState,
    filters: SearchFilters,
    completed: bool,
    next_seq: u64,
    latest: Option<u64>,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new(SearchType::default())
    }
}

impl SearchSession {
    pub fn new(search_type: SearchType) -> Self {
        Self {
            state: SearchState::new(search_type),
            filters: SearchFilters::default(),
            completed: false,
            next_seq: 0,
            latest: None,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn query(&self) -> &str {
        &self.state.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.state.query = query.into();
    }

    pub fn search_type(&self) -> SearchType {
        self.state.search_type
    }

    pub fn set_search_type(&mut self, search_type: SearchType) {
        self.state.search_type = search_type;
    }

    pub fn set_filters(&mut self, filters: SearchFilters) {
        self.filters = filters;
    }

    pub fn status(&self) -> SearchStatus {
        if self.state.loading {
            SearchStatus::Loading
        } else if self.state.error.is_some() {
            SearchStatus::Error
        } else if self.completed {
            SearchStatus::Success
        } else {
            SearchStatus::Idle
        }
    }

    /// Start a submit of the current query.
    ///
    /// A blank query resets results without a request. Otherwise loading is
    /// raised, the previous error is cleared, and a fresh ticket supersedes
    /// any request still in flight.
    pub fn begin(&mut self) -> Dispatch {
        if self.state.query.trim().is_empty() {
            self.state.results.clear();
            self.state.total = 0;
            self.state.error = None;
            self.state.loading = false;
            self.completed = false;
            self.latest = None;
            debug!("Blank query, results cleared");
            return Dispatch::Cleared;
        }

        self.next_seq += 1;
        let seq = self.next_seq;
        self.latest = Some(seq);
        self.state.loading = true;
        self.state.error = None;

        let request = SearchRequest::new(self.state.query.clone(), self.state.search_type)
            .with_filters(self.filters.clone());
        info!("Searching '{}' ({}) as request #{}", request.query, request.search_type, seq);

        Dispatch::Send(Ticket { seq, request })
    }

    /// Apply the outcome of a dispatched request.
    ///
    /// Returns `false` (and leaves state untouched) when a newer request has
    /// been dispatched since, or the query was cleared in between.
    pub fn complete(&mut self, seq: u64, outcome: Result<SearchResponse, AppError>) -> bool {
        if self.latest != Some(seq) {
            debug!("Discarding stale response for request #{}", seq);
            return false;
        }

        match outcome {
            Ok(response) => {
                self.state.results = response.results;
                self.state.total = response.total;
                self.state.error = None;
            }
            Err(err) => {
                info!("Request #{} failed: {}", seq, err);
                self.state.error = Some(err.message());
                self.state.results.clear();
                self.state.total = 0;
            }
        }

        self.state.loading = false;
        self.completed = true;
        self.latest = None;
        true
    }

    /// Submit the current query and wait for it in place.
    ///
    /// A failure is recorded in the state and also returned to the caller.
    pub async fn submit<B: SearchBackend>(&mut self, backend: &B) -> Result<&SearchState, AppError> {
        if let Dispatch::Send(ticket) = self.begin() {
            let outcome = backend.search(&ticket.request).await;
            let failure = outcome.as_ref().err().cloned();
            self.complete(ticket.seq, outcome);
            if let Some(err) = failure {
                return Err(err);
            }
        }
        Ok(&self.state)
    }
}
