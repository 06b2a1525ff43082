use super::controller::{Resolution, SearchController, SearchState};
use super::export::{CsvExporter, ExportError, ExportOutcome, ExportProfile};
use super::source::LeadSource;
use super::store::SearchResults;
use super::views::{ResultsView, SessionView};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

/// One search session shared between request handlers.
///
/// The controller lock is taken only for the synchronous dispatch and
/// resolve steps, never across the network await, so overlapping searches
/// are arbitrated by request tokens. Outcomes are applied by a task of their
/// own and land even if the caller stops waiting.
pub struct LeadSession<S> {
    controller: Arc<Mutex<SearchController<S>>>,
    exporter: CsvExporter,
}

#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub state: SearchState,
    pub results: Option<Arc<SearchResults>>,
}

impl SessionSnapshot {
    fn capture<S: LeadSource>(controller: &SearchController<S>) -> Self {
        Self {
            state: controller.state().clone(),
            results: controller.results(),
        }
    }

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            state: &self.state,
            results: self.results.as_deref().map(ResultsView::new),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchReport {
    pub resolution: Resolution,
    pub snapshot: SessionSnapshot,
}

impl<S: LeadSource> LeadSession<S> {
    pub fn new(source: Arc<S>, exporter: CsvExporter) -> Self {
        Self {
            controller: Arc::new(Mutex::new(SearchController::new(source))),
            exporter,
        }
    }

    pub async fn search(&self, location: &str) -> SearchReport {
        let dispatched = lock(&self.controller).dispatch(location);
        let pending = match dispatched {
            Ok(pending) => pending,
            Err(_) => {
                return SearchReport {
                    resolution: Resolution::Applied,
                    snapshot: self.snapshot(),
                }
            }
        };

        let controller = Arc::clone(&self.controller);
        let applied = tokio::spawn(async move {
            let (ticket, outcome) = pending.outcome().await;
            let mut guard = lock(&controller);
            let resolution = guard.resolve(ticket, outcome);
            SearchReport {
                resolution,
                snapshot: SessionSnapshot::capture(&guard),
            }
        });

        match applied.await {
            Ok(report) => report,
            Err(err) => {
                warn!(error = %err, "search resolution task failed");
                SearchReport {
                    resolution: Resolution::Stale,
                    snapshot: self.snapshot(),
                }
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(&lock(&self.controller))
    }

    pub fn dismiss(&self) -> SessionSnapshot {
        let mut guard = lock(&self.controller);
        guard.dismiss();
        SessionSnapshot::capture(&guard)
    }

    /// Exports the current results, optionally with a different column
    /// profile than the session default.
    pub fn export(&self, profile: Option<ExportProfile>) -> Result<ExportOutcome, ExportError> {
        let results = lock(&self.controller).results();
        let Some(results) = results else {
            return Ok(ExportOutcome::Skipped);
        };

        match profile {
            Some(profile) => CsvExporter::new(profile, self.exporter.quoting()).export(&results),
            None => self.exporter.export(&results),
        }
    }
}

fn lock<S>(controller: &Mutex<SearchController<S>>) -> MutexGuard<'_, SearchController<S>> {
    controller
        .lock()
        .expect("search controller mutex poisoned")
}
