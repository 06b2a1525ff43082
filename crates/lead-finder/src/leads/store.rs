use super::domain::Lead;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// The leads produced by one successful search, together with the search
/// term that identifies them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResults {
    search_term: String,
    leads: Vec<Lead>,
    fetched_at: DateTime<Utc>,
}

impl SearchResults {
    pub fn new(search_term: impl Into<String>, leads: Vec<Lead>) -> Self {
        Self {
            search_term: search_term.into(),
            leads,
            fetched_at: Utc::now(),
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn leads(&self) -> &[Lead] {
        &self.leads
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

/// Holds at most one result set. Readers receive shared snapshots, so a
/// replacement never exposes a partially updated sequence.
#[derive(Debug, Default)]
pub struct ResultsStore {
    current: Option<Arc<SearchResults>>,
}

impl ResultsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, search_term: impl Into<String>, leads: Vec<Lead>) -> Arc<SearchResults> {
        let results = Arc::new(SearchResults::new(search_term, leads));
        self.current = Some(Arc::clone(&results));
        results
    }

    pub fn snapshot(&self) -> Option<Arc<SearchResults>> {
        self.current.clone()
    }

    pub fn search_term(&self) -> Option<&str> {
        self.current.as_deref().map(SearchResults::search_term)
    }

    pub fn len(&self) -> usize {
        self.current.as_deref().map_or(0, |results| results.leads().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
