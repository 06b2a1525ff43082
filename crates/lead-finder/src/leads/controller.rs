use super::normalizer::normalize_all;
use super::parser::{ParseError, RawLead};
use super::source::LeadSource;
use super::store::{ResultsStore, SearchResults};
use serde::Serialize;
use std::sync::Arc;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

pub const VALIDATION_MESSAGE: &str = "Please enter a location";
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch lead data. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("location is required")]
    Validation,
    #[error("lead search request failed: {detail}")]
    Network { status: Option<u16>, detail: String },
    #[error("lead search response was malformed: {0}")]
    Parse(#[from] ParseError),
    #[error("lead search was cancelled by a newer request")]
    Cancelled,
}

impl SearchError {
    pub fn kind(&self) -> SearchErrorKind {
        match self {
            SearchError::Validation => SearchErrorKind::Validation,
            SearchError::Network { .. } | SearchError::Cancelled => SearchErrorKind::Network,
            SearchError::Parse(_) => SearchErrorKind::Parse,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SearchErrorKind {
    #[serde(rename = "validation_error")]
    Validation,
    #[serde(rename = "network_error")]
    Network,
    #[serde(rename = "parse_error")]
    Parse,
}

impl SearchErrorKind {
    /// User-facing message. Network and parse failures share one message.
    pub const fn message(self) -> &'static str {
        match self {
            Self::Validation => VALIDATION_MESSAGE,
            Self::Network | Self::Parse => FETCH_FAILED_MESSAGE,
        }
    }
}

/// Monotonically increasing identifier of an issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchState {
    Idle,
    /// Transient: [`SearchController::begin`] enters and leaves it within one
    /// call while holding `&mut self`, so it is never observed.
    Validating,
    Loading {
        token: RequestToken,
        location: String,
    },
    Success {
        location: String,
        lead_count: usize,
    },
    Error {
        kind: SearchErrorKind,
        message: String,
    },
}

impl SearchState {
    fn failed(kind: SearchErrorKind) -> Self {
        Self::Error {
            kind,
            message: kind.message().to_string(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }
}

/// Issued by [`SearchController::begin`]; hands the outcome of one request
/// back to [`SearchController::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    token: RequestToken,
    location: String,
}

impl SearchTicket {
    pub fn token(&self) -> RequestToken {
        self.token
    }

    pub fn location(&self) -> &str {
        &self.location
    }
}

/// A request running on the runtime. Dropping it does not cancel the request.
#[derive(Debug)]
pub struct PendingSearch {
    ticket: SearchTicket,
    handle: JoinHandle<Result<Vec<RawLead>, SearchError>>,
}

impl PendingSearch {
    pub fn ticket(&self) -> &SearchTicket {
        &self.ticket
    }

    pub async fn outcome(self) -> (SearchTicket, Result<Vec<RawLead>, SearchError>) {
        let outcome = match self.handle.await {
            Ok(outcome) => outcome,
            Err(err) if err.is_cancelled() => Err(SearchError::Cancelled),
            Err(err) => Err(SearchError::Network {
                status: None,
                detail: format!("search task failed: {err}"),
            }),
        };
        (self.ticket, outcome)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Applied,
    /// A newer request was issued after this one; its outcome was dropped.
    Stale,
}

/// Owns the search lifecycle and the results it produces.
///
/// `Idle -> Validating -> Loading -> Success | Error`, re-entered on every
/// submission. Each request carries a [`RequestToken`]; only the outcome of
/// the latest issued token is ever applied, so a slow response can never
/// overwrite newer results. Failed searches keep the previous results.
pub struct SearchController<S> {
    source: Arc<S>,
    state: SearchState,
    store: ResultsStore,
    latest: u64,
    awaiting: Option<RequestToken>,
    in_flight: Option<AbortHandle>,
}

impl<S: LeadSource> SearchController<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            state: SearchState::Idle,
            store: ResultsStore::new(),
            latest: 0,
            awaiting: None,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn store(&self) -> &ResultsStore {
        &self.store
    }

    pub fn results(&self) -> Option<Arc<SearchResults>> {
        self.store.snapshot()
    }

    /// Validates the location and issues a new token. A blank location moves
    /// to `Error` without touching the request in flight or the results.
    pub fn begin(&mut self, location: &str) -> Result<SearchTicket, SearchError> {
        self.state = SearchState::Validating;

        let location = location.trim();
        if location.is_empty() {
            debug!("rejecting blank location");
            self.state = SearchState::failed(SearchErrorKind::Validation);
            return Err(SearchError::Validation);
        }

        if let Some(previous) = self.in_flight.take() {
            debug!("cancelling superseded search");
            previous.abort();
        }

        self.latest += 1;
        let ticket = SearchTicket {
            token: RequestToken(self.latest),
            location: location.to_string(),
        };
        self.awaiting = Some(ticket.token);
        self.state = SearchState::Loading {
            token: ticket.token,
            location: ticket.location.clone(),
        };
        info!(location = %ticket.location, token = self.latest, "lead search started");
        Ok(ticket)
    }

    /// Issues the request on the runtime and returns without waiting for it.
    pub fn dispatch(&mut self, location: &str) -> Result<PendingSearch, SearchError> {
        let ticket = self.begin(location)?;
        let source = Arc::clone(&self.source);
        let query = ticket.location.clone();
        let handle = tokio::spawn(async move { source.search(&query).await });
        self.in_flight = Some(handle.abort_handle());
        Ok(PendingSearch { ticket, handle })
    }

    pub fn resolve(
        &mut self,
        ticket: SearchTicket,
        outcome: Result<Vec<RawLead>, SearchError>,
    ) -> Resolution {
        if self.awaiting != Some(ticket.token) {
            debug!(
                token = ticket.token.0,
                latest = self.latest,
                location = %ticket.location,
                "discarding stale search outcome"
            );
            return Resolution::Stale;
        }
        self.awaiting = None;
        self.in_flight = None;

        match outcome {
            Ok(records) => {
                let leads = normalize_all(&records);
                let lead_count = leads.len();
                self.store.replace(ticket.location.clone(), leads);
                info!(location = %ticket.location, lead_count, "lead search succeeded");
                self.state = SearchState::Success {
                    location: ticket.location,
                    lead_count,
                };
            }
            Err(err) => {
                warn!(location = %ticket.location, error = %err, "lead search failed");
                self.state = SearchState::failed(err.kind());
            }
        }
        Resolution::Applied
    }

    /// Runs one search to completion.
    pub async fn submit(&mut self, location: &str) -> &SearchState {
        let Ok(ticket) = self.begin(location) else {
            return &self.state;
        };

        let source = Arc::clone(&self.source);
        let outcome = source.search(ticket.location()).await;
        self.resolve(ticket, outcome);
        &self.state
    }

    /// Clears a finished search's banner; results stay in place.
    pub fn dismiss(&mut self) {
        if matches!(
            self.state,
            SearchState::Success { .. } | SearchState::Error { .. }
        ) {
            self.state = SearchState::Idle;
        }
    }

    /// Cancels any request in flight and discards all results.
    pub fn teardown(&mut self) {
        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }
        self.awaiting = None;
        self.store.clear();
        self.state = SearchState::Idle;
    }
}

impl<S> Drop for SearchController<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
