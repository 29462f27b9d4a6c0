//! Wire types for the proposal archive search API
//!
//! Everything here is read-only data owned by the backend. Decoding is
//! lenient: missing collections and counters fall back to empty/zero.

use crate::error::AppError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Page size sent with every search request
pub const SEARCH_LIMIT: u32 = 20;

/// Retrieval mode understood by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Hybrid,
    Semantic,
    Fulltext,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Hybrid => "hybrid",
            SearchType::Semantic => "semantic",
            SearchType::Fulltext => "fulltext",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hybrid" => Ok(SearchType::Hybrid),
            "semantic" => Ok(SearchType::Semantic),
            "fulltext" => Ok(SearchType::Fulltext),
            other => Err(AppError::InvalidInput(format!(
                "Unknown search type '{}', expected hybrid, semantic or fulltext",
                other
            ))),
        }
    }
}

/// Proposal status as reported by the backend.
///
/// The set is open: anything unrecognised (e.g. `under_review`) is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProposalStatus {
    Passed,
    Rejected,
    Withdrawn,
    Pending,
    Other(String),
}

impl ProposalStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ProposalStatus::Passed => "passed",
            ProposalStatus::Rejected => "rejected",
            ProposalStatus::Withdrawn => "withdrawn",
            ProposalStatus::Pending => "pending",
            ProposalStatus::Other(s) => s,
        }
    }
}

impl From<&str> for ProposalStatus {
    fn from(s: &str) -> Self {
        match s {
            "passed" => ProposalStatus::Passed,
            "rejected" => ProposalStatus::Rejected,
            "withdrawn" => ProposalStatus::Withdrawn,
            "pending" => ProposalStatus::Pending,
            other => ProposalStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ProposalStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProposalStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ProposalStatus::from(raw.as_str()))
    }
}

/// Proposal identifier; the backend uses UUIDs but numeric ids are accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProposalId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProposalId::Number(n) => write!(f, "{}", n),
            ProposalId::Text(s) => f.write_str(s),
        }
    }
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal_number: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProposalStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Absent and zero are different things here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
}

/// Body of `GET /search`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<Proposal>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub search_type: Option<SearchType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    /// Backend execution time in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub took: Option<f64>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Optional narrowing filters; only populated fields are sent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    pub status: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub submitting_organization: Option<String>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        *self == SearchFilters::default()
    }
}

/// A fully-specified search to send to the backend
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub search_type: SearchType,
    pub limit: u32,
    pub filters: SearchFilters,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, search_type: SearchType) -> Self {
        Self {
            query: query.into(),
            search_type,
            limit: SEARCH_LIMIT,
            filters: SearchFilters::default(),
        }
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Query string pairs in the order the backend documents them
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", self.query.clone()),
            ("type", self.search_type.as_str().to_string()),
            ("limit", self.limit.to_string()),
        ];

        let f = &self.filters;
        if let Some(status) = &f.status {
            params.push(("status", status.clone()));
        }
        if let Some(from) = &f.date_from {
            params.push(("date_from", from.clone()));
        }
        if let Some(to) = &f.date_to {
            params.push(("date_to", to.clone()));
        }
        for tag in &f.tags {
            params.push(("tags", tag.clone()));
        }
        if let Some(category) = &f.category {
            params.push(("category", category.clone()));
        }
        if let Some(org) = &f.submitting_organization {
            params.push(("submitting_organization", org.clone()));
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_type_parse() {
        assert_eq!("hybrid".parse::<SearchType>().unwrap(), SearchType::Hybrid);
        assert_eq!(" Semantic ".parse::<SearchType>().unwrap(), SearchType::Semantic);
        assert_eq!("fulltext".parse::<SearchType>().unwrap(), SearchType::Fulltext);
        assert!("keyword".parse::<SearchType>().is_err());
    }

    #[test]
    fn test_response_missing_fields_default() {
        let resp: SearchResponse = serde_json::from_value(json!({})).unwrap();
        assert!(resp.results.is_empty());
        assert_eq!(resp.total, 0);

        let resp: SearchResponse = serde_json::from_value(json!({ "total": 7 })).unwrap();
        assert!(resp.results.is_empty());
        assert_eq!(resp.total, 7);

        let resp: SearchResponse =
            serde_json::from_value(json!({ "results": null, "total": null })).unwrap();
        assert!(resp.results.is_empty());
        assert_eq!(resp.total, 0);
    }

    #[test]
    fn test_proposal_decoding() {
        let p: Proposal = serde_json::from_value(json!({
            "id": "8c2f0c8e-2d7a-4b8e-9d2e-1f0a6c7b5e11",
            "title": "Klimaschutz jetzt",
            "proposal_number": "A12",
            "status": "under_review",
            "tags": ["klima"],
            "relevance_score": 0.0
        }))
        .unwrap();

        assert_eq!(p.id, ProposalId::Text("8c2f0c8e-2d7a-4b8e-9d2e-1f0a6c7b5e11".into()));
        assert_eq!(p.status, Some(ProposalStatus::Other("under_review".into())));
        assert_eq!(p.relevance_score, Some(0.0));
        assert_eq!(p.summary, None);
        assert_eq!(p.submitted_date, None);
    }

    #[test]
    fn test_numeric_id_and_known_status() {
        let p: Proposal =
            serde_json::from_value(json!({ "id": 1, "title": "Tax Reform Act", "status": "pending" }))
                .unwrap();
        assert_eq!(p.id, ProposalId::Number(1));
        assert_eq!(p.status, Some(ProposalStatus::Pending));
        assert_eq!(p.relevance_score, None);
    }

    #[test]
    fn test_query_pairs_only_include_set_filters() {
        let req = SearchRequest::new("tax reform", SearchType::Hybrid);
        let keys: Vec<_> = req.query_pairs().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["q", "type", "limit"]);

        let req = req.with_filters(SearchFilters {
            status: Some("passed".into()),
            tags: vec!["klima".into(), "energie".into()],
            ..Default::default()
        });
        let pairs = req.query_pairs();
        assert!(pairs.contains(&("limit", "20".to_string())));
        assert!(pairs.contains(&("status", "passed".to_string())));
        assert_eq!(pairs.iter().filter(|(k, _)| *k == "tags").count(), 2);
    }
}
