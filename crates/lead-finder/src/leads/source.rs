use super::controller::SearchError;
use super::parser::{parse_response, RawLead};
use crate::config::SearchConfig;
use std::future::Future;
use tracing::{debug, warn};

const SEARCH_PATH: &str = "/api/restaurants";

/// The external lead-search collaborator.
///
/// One call per search, keyed by the location. Implementations report
/// non-2xx statuses and transport failures as [`SearchError::Network`] and
/// malformed bodies as [`SearchError::Parse`].
pub trait LeadSource: Send + Sync + 'static {
    fn search(
        &self,
        location: &str,
    ) -> impl Future<Output = Result<Vec<RawLead>, SearchError>> + Send;
}

/// Percent-encodes a location for use as a query value.
pub fn encode_location(location: &str) -> String {
    urlencoding::encode(location).into_owned()
}

/// [`LeadSource`] backed by the lead-search HTTP API.
#[derive(Debug, Clone)]
pub struct HttpLeadSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpLeadSource {
    /// No request timeout is configured; a request that never resolves keeps
    /// the search in progress until it is superseded.
    pub fn new(base_url: impl Into<String>) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| SearchError::Network {
                status: None,
                detail: format!("failed to build HTTP client: {err}"),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        Self::new(config.base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_url(&self, location: &str) -> String {
        format!(
            "{}{}?location={}",
            self.base_url,
            SEARCH_PATH,
            encode_location(location)
        )
    }
}

impl LeadSource for HttpLeadSource {
    async fn search(&self, location: &str) -> Result<Vec<RawLead>, SearchError> {
        let url = self.search_url(location);
        debug!(%url, "requesting leads");

        let response = self.client.get(&url).send().await.map_err(|err| {
            warn!(error = %err, "lead search transport failure");
            SearchError::Network {
                status: None,
                detail: err.to_string(),
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %body, "lead search returned an error status");
            return Err(SearchError::Network {
                status: Some(status.as_u16()),
                detail: format!("search API returned {status}"),
            });
        }

        let body = response.bytes().await.map_err(|err| SearchError::Network {
            status: Some(status.as_u16()),
            detail: format!("failed to read response body: {err}"),
        })?;

        let records = parse_response(&body)?;
        debug!(count = records.len(), "lead search response parsed");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_locations_like_a_uri_component() {
        assert_eq!(encode_location("Boston"), "Boston");
        assert_eq!(
            encode_location("St. Albans & Harpenden"),
            "St.%20Albans%20%26%20Harpenden"
        );
        assert_eq!(encode_location("Café/Bar?"), "Caf%C3%A9%2FBar%3F");
    }

    #[test]
    fn search_url_joins_base_path_and_query() {
        let source = HttpLeadSource::new("http://localhost:8000/").expect("client builds");
        assert_eq!(source.base_url(), "http://localhost:8000");
        assert_eq!(
            source.search_url("Romford"),
            "http://localhost:8000/api/restaurants?location=Romford"
        );
    }
}
