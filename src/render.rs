//! Plain-text rendering of search state
//!
//! Every function here is pure: state in, text out. Colour is applied only
//! when the caller asks for it, so the same output can be asserted in tests.

use crate::model::{Proposal, ProposalStatus};
use crate::session::SearchState;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use colored::{Color, Colorize};

/// Badge colour for a proposal status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    Green,
    Red,
    Orange,
    Blue,
    Gray,
}

impl StatusColor {
    fn terminal(&self) -> Color {
        match self {
            StatusColor::Green => Color::Green,
            StatusColor::Red => Color::Red,
            StatusColor::Orange => Color::TrueColor { r: 255, g: 165, b: 0 },
            StatusColor::Blue => Color::Blue,
            StatusColor::Gray => Color::BrightBlack,
        }
    }
}

/// Map a status to its badge colour; anything unknown is gray
pub fn status_color(status: Option<&ProposalStatus>) -> StatusColor {
    match status {
        Some(ProposalStatus::Passed) => StatusColor::Green,
        Some(ProposalStatus::Rejected) => StatusColor::Red,
        Some(ProposalStatus::Withdrawn) => StatusColor::Orange,
        Some(ProposalStatus::Pending) => StatusColor::Blue,
        Some(ProposalStatus::Other(_)) | None => StatusColor::Gray,
    }
}

/// Format a backend date as `DD.MM.YYYY`, or `N/A` when absent.
///
/// Accepts plain dates, RFC 3339 timestamps and naive ISO timestamps.
/// Anything else is returned unchanged.
pub fn format_date(date: Option<&str>) -> String {
    let raw = match date.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return "N/A".to_string(),
    };

    parse_date(raw)
        .map(|d| d.format("%d.%m.%Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|ts| ts.date())
}

/// `Relevance: 12.3%` when a score is present, including zero
pub fn relevance_line(score: Option<f64>) -> Option<String> {
    score.map(|s| format!("Relevance: {:.1}%", s * 100.0))
}

/// `Found 1 proposal` / `Found 3 proposals`
pub fn results_info(total: u64) -> Option<String> {
    match total {
        0 => None,
        1 => Some("Found 1 proposal".to_string()),
        n => Some(format!("Found {} proposals", n)),
    }
}

/// Title line with the proposal number prefixed when known
pub fn title_line(proposal: &Proposal) -> String {
    match proposal.proposal_number.as_deref() {
        Some(number) if !number.is_empty() => format!("{}: {}", number, proposal.title),
        _ => proposal.title.clone(),
    }
}

/// Rendering options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub color: bool,
}

fn badge(proposal: &Proposal, opts: RenderOptions) -> String {
    let label = proposal
        .status
        .as_ref()
        .map(|s| s.as_str().to_string())
        .unwrap_or_default();
    let text = format!("[{}]", label);
    if opts.color {
        text.color(status_color(proposal.status.as_ref()).terminal()).bold().to_string()
    } else {
        text
    }
}

/// Render one result card
pub fn render_proposal(proposal: &Proposal, opts: RenderOptions) -> String {
    let mut lines = vec![format!("{} {}", title_line(proposal), badge(proposal, opts))];

    if let Some(summary) = proposal.summary.as_deref().filter(|s| !s.is_empty()) {
        lines.push(format!("  {}", summary));
    }

    let mut meta = format!("  Date: {}", format_date(proposal.submitted_date.as_deref()));
    if let Some(tags) = proposal.tags.as_ref().filter(|t| !t.is_empty()) {
        meta.push_str(&format!("  Tags: {}", tags.join(", ")));
    }
    lines.push(meta);

    if let Some(relevance) = relevance_line(proposal.relevance_score) {
        lines.push(format!("  {}", relevance));
    }

    lines.join("\n")
}

/// Render a list of proposals separated by blank lines
pub fn render_proposals(proposals: &[Proposal], opts: RenderOptions) -> String {
    proposals
        .iter()
        .map(|p| render_proposal(p, opts))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render the whole view for the current session state
pub fn render_state(state: &SearchState, opts: RenderOptions) -> String {
    let mut blocks: Vec<String> = Vec::new();

    if state.loading {
        blocks.push("Searching...".to_string());
    }

    if let Some(error) = &state.error {
        let line = format!("Error: {}", error);
        blocks.push(if opts.color { line.red().to_string() } else { line });
    }

    if let Some(info) = results_info(state.total) {
        blocks.push(info);
    }

    if !state.results.is_empty() {
        blocks.push(render_proposals(&state.results, opts));
    }

    if state.results.is_empty() && !state.query.trim().is_empty() && !state.loading && state.error.is_none() {
        blocks.push(format!("No proposals found for \"{}\"", state.query));
    }

    blocks.join("\n\n")
}
