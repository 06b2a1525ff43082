use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::response::Response;
use serde_json::{json, Value};

use crate::leads::controller::SearchError;
use crate::leads::parser::{parse_value, RawLead};
use crate::leads::source::LeadSource;
use crate::leads::{CsvExporter, LeadSession};

/// One scripted reply from [`ScriptedSource`].
pub(super) enum Script {
    Leads(Value),
    /// Replies with the body after the delay.
    Delayed(Duration, Value),
    Status(u16),
    /// Never resolves; only cancellation ends it.
    Hang,
}

/// Lead source that replays scripted replies in call order and records every
/// location it was asked for.
pub(super) struct ScriptedSource {
    replies: Mutex<VecDeque<Script>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub(super) fn new(replies: impl IntoIterator<Item = Script>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    fn next(&self, location: &str) -> Script {
        self.calls
            .lock()
            .expect("calls mutex poisoned")
            .push(location.to_string());
        self.replies
            .lock()
            .expect("replies mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| Script::Leads(json!([])))
    }
}

impl LeadSource for ScriptedSource {
    async fn search(&self, location: &str) -> Result<Vec<RawLead>, SearchError> {
        match self.next(location) {
            Script::Leads(body) => Ok(parse_value(body)?),
            Script::Delayed(delay, body) => {
                tokio::time::sleep(delay).await;
                Ok(parse_value(body)?)
            }
            Script::Status(status) => Err(SearchError::Network {
                status: Some(status),
                detail: format!("lead search API returned {status}"),
            }),
            Script::Hang => std::future::pending().await,
        }
    }
}

pub(super) fn boston_body() -> Value {
    json!([
        { "name": "A", "address": "1 Main St" },
        { "name": "B", "address": "2 Oak St" }
    ])
}

pub(super) fn enriched_body() -> Value {
    json!([
        {
            "name": "Spice Route",
            "address": "12 High St",
            "email": "hello@spice.example",
            "cuisineType": "Indian",
            "priceLevel": 2,
            "rating": 4.5,
            "totalReviews": 212,
            "reviewStats": { "averageSentiment": 0.6 },
            "hygieneRating": { "rating": "5" }
        }
    ])
}

pub(super) fn session_with(
    replies: impl IntoIterator<Item = Script>,
) -> (Arc<LeadSession<ScriptedSource>>, Arc<ScriptedSource>) {
    let source = Arc::new(ScriptedSource::new(replies));
    let session = Arc::new(LeadSession::new(source.clone(), CsvExporter::default()));
    (session, source)
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    serde_json::from_slice(&read_body(response).await).expect("json payload")
}
