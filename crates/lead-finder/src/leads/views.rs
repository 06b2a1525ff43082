use super::classify::{HygieneTier, SentimentTier};
use super::controller::SearchState;
use super::domain::Lead;
use super::store::SearchResults;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A lead as rendered: the canonical record plus classifier labels derived
/// at render time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadView<'a> {
    #[serde(flatten)]
    pub lead: &'a Lead,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment_tier: Option<SentimentTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hygiene_tier: Option<HygieneTier>,
}

impl<'a> LeadView<'a> {
    pub fn new(lead: &'a Lead) -> Self {
        Self {
            lead,
            sentiment_tier: lead.sentiment_tier(),
            hygiene_tier: lead.hygiene_tier(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultsView<'a> {
    pub search_term: &'a str,
    pub fetched_at: DateTime<Utc>,
    pub lead_count: usize,
    pub leads: Vec<LeadView<'a>>,
}

impl<'a> ResultsView<'a> {
    pub fn new(results: &'a SearchResults) -> Self {
        Self {
            search_term: results.search_term(),
            fetched_at: results.fetched_at(),
            lead_count: results.leads().len(),
            leads: results.leads().iter().map(LeadView::new).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView<'a> {
    pub state: &'a SearchState,
    pub results: Option<ResultsView<'a>>,
}
