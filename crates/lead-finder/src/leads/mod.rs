//! Lead search pipeline: boundary parsing, normalization, classification,
//! result storage, the search lifecycle, and CSV export.

pub mod artifact;
pub mod classify;
pub mod controller;
pub mod domain;
pub mod export;
pub mod normalizer;
pub mod parser;
pub mod router;
pub mod session;
pub mod source;
pub mod store;
pub mod views;

#[cfg(test)]
mod tests;

pub use artifact::{artifact_filename, ArtifactError, ArtifactSink, CsvArtifact, DirectorySink};
pub use classify::{HygieneTier, SentimentTier};
pub use controller::{
    PendingSearch, RequestToken, Resolution, SearchController, SearchError, SearchErrorKind,
    SearchState, SearchTicket, FETCH_FAILED_MESSAGE, VALIDATION_MESSAGE,
};
pub use domain::{
    CompanyInfo, FacebookInfo, HygieneRating, HygieneScores, Lead, Officer, RecentReview,
    ReviewStats, Scalar,
};
pub use export::{CsvExporter, ExportError, ExportOutcome, ExportProfile, LeadColumn, QuoteMode};
pub use normalizer::{normalize, normalize_all};
pub use parser::{parse_response, parse_value, ParseError, RawLead};
pub use router::{lead_router, ExportQuery, SearchRequest};
pub use session::{LeadSession, SearchReport, SessionSnapshot};
pub use source::{encode_location, HttpLeadSource, LeadSource};
pub use store::{ResultsStore, SearchResults};
pub use views::{LeadView, ResultsView, SessionView};
