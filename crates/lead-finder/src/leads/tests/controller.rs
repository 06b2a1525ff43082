use super::common::*;
use std::sync::Arc;

use crate::leads::controller::{
    Resolution, SearchController, SearchError, SearchErrorKind, SearchState, FETCH_FAILED_MESSAGE,
    VALIDATION_MESSAGE,
};
use crate::leads::{CsvExporter, ExportOutcome};

fn controller_with(
    replies: impl IntoIterator<Item = Script>,
) -> (SearchController<ScriptedSource>, Arc<ScriptedSource>) {
    let source = Arc::new(ScriptedSource::new(replies));
    (SearchController::new(source.clone()), source)
}

#[tokio::test]
async fn blank_location_fails_validation_without_calling_the_source() {
    let (mut controller, source) = controller_with([]);

    let state = controller.submit("   ").await.clone();

    assert_eq!(
        state,
        SearchState::Error {
            kind: SearchErrorKind::Validation,
            message: VALIDATION_MESSAGE.to_string(),
        }
    );
    assert!(source.calls().is_empty());
    assert!(controller.results().is_none());
}

#[tokio::test]
async fn boston_search_stores_leads_and_exports_nine_columns() {
    let (mut controller, source) = controller_with([Script::Leads(boston_body())]);

    let state = controller.submit("  Boston ").await.clone();

    assert_eq!(
        state,
        SearchState::Success {
            location: "Boston".to_string(),
            lead_count: 2,
        }
    );
    assert_eq!(source.calls(), vec!["Boston".to_string()]);

    let results = controller.results().expect("results stored");
    assert_eq!(results.search_term(), "Boston");
    assert_eq!(results.leads().len(), 2);
    assert!(results.leads().iter().all(|lead| lead.email.is_none()
        && lead.rating.is_none()
        && lead.review_stats.is_none()));

    let ExportOutcome::Ready(artifact) = CsvExporter::default()
        .export(&results)
        .expect("export succeeds")
    else {
        panic!("expected an artifact");
    };
    assert_eq!(artifact.filename, "restaurants-Boston.csv");

    let text = String::from_utf8(artifact.bytes).expect("utf-8 csv");
    let lines: Vec<&str> = text.split('\n').collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[1],
        "\"A\",\"\",\"\",\"\",\"1 Main St\",\"\",\"\",\"\",\"\""
    );
    assert_eq!(lines[2].matches('"').count(), 18);
}

#[tokio::test]
async fn upstream_failure_keeps_previous_results() {
    let (mut controller, _source) =
        controller_with([Script::Leads(boston_body()), Script::Status(503)]);

    controller.submit("Boston").await;
    let before = controller.results().expect("first search stored");

    let state = controller.submit("Leeds").await.clone();

    assert_eq!(
        state,
        SearchState::Error {
            kind: SearchErrorKind::Network,
            message: FETCH_FAILED_MESSAGE.to_string(),
        }
    );
    let after = controller.results().expect("results preserved");
    assert!(Arc::ptr_eq(&before, &after));
    assert_eq!(after.search_term(), "Boston");
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let (mut controller, _source) =
        controller_with([Script::Leads(serde_json::json!({ "error": "nope" }))]);

    let state = controller.submit("Boston").await.clone();

    assert!(matches!(
        state,
        SearchState::Error {
            kind: SearchErrorKind::Parse,
            ..
        }
    ));
    assert!(controller.results().is_none());
}

#[tokio::test]
async fn outcome_of_a_superseded_request_is_discarded() {
    let (mut controller, _source) = controller_with([]);

    let first = controller.begin("Boston").expect("valid location");
    let second = controller.begin("Leeds").expect("valid location");
    assert!(second.token() > first.token());

    let late = crate::leads::parse_value(boston_body()).expect("valid body");
    let fresh = crate::leads::parse_value(enriched_body()).expect("valid body");

    assert_eq!(controller.resolve(second, Ok(fresh)), Resolution::Applied);
    assert_eq!(controller.resolve(first, Ok(late)), Resolution::Stale);

    let results = controller.results().expect("results stored");
    assert_eq!(results.search_term(), "Leeds");
    assert_eq!(results.leads()[0].name, "Spice Route");
}

#[tokio::test]
async fn stale_failure_does_not_clobber_success() {
    let (mut controller, _source) = controller_with([]);

    let first = controller.begin("Boston").expect("valid location");
    let second = controller.begin("Leeds").expect("valid location");
    let records = crate::leads::parse_value(boston_body()).expect("valid body");
    controller.resolve(second, Ok(records));

    let resolution = controller.resolve(
        first,
        Err(SearchError::Network {
            status: Some(500),
            detail: "late failure".to_string(),
        }),
    );

    assert_eq!(resolution, Resolution::Stale);
    assert!(matches!(controller.state(), SearchState::Success { .. }));
}

#[tokio::test]
async fn resubmitting_cancels_the_request_in_flight() {
    let (mut controller, source) = controller_with([Script::Hang, Script::Leads(boston_body())]);

    let first = controller.dispatch("Boston").expect("dispatched");
    while source.calls().is_empty() {
        tokio::task::yield_now().await;
    }
    let second = controller.dispatch("Cambridge").expect("dispatched");
    assert!(controller.state().is_loading());

    let (first_ticket, first_outcome) = first.outcome().await;
    assert!(matches!(first_outcome, Err(SearchError::Cancelled)));
    assert_eq!(
        controller.resolve(first_ticket, first_outcome),
        Resolution::Stale
    );
    assert!(controller.state().is_loading());

    let (second_ticket, second_outcome) = second.outcome().await;
    assert_eq!(
        controller.resolve(second_ticket, second_outcome),
        Resolution::Applied
    );
    assert_eq!(
        controller.state(),
        &SearchState::Success {
            location: "Cambridge".to_string(),
            lead_count: 2,
        }
    );
    assert_eq!(source.calls().last().map(String::as_str), Some("Cambridge"));
}

#[tokio::test]
async fn invalid_resubmission_leaves_the_request_in_flight() {
    let (mut controller, _source) = controller_with([Script::Leads(boston_body())]);

    let pending = controller.dispatch("Boston").expect("dispatched");
    assert!(controller.dispatch("").is_err());

    let (ticket, outcome) = pending.outcome().await;
    assert!(outcome.is_ok());
    assert_eq!(controller.resolve(ticket, outcome), Resolution::Applied);
    assert_eq!(controller.store().len(), 2);
}

#[tokio::test]
async fn resolving_the_same_ticket_twice_is_stale() {
    let (mut controller, _source) = controller_with([]);

    let ticket = controller.begin("Boston").expect("valid location");
    let records = crate::leads::parse_value(boston_body()).expect("valid body");
    assert_eq!(
        controller.resolve(ticket.clone(), Ok(records)),
        Resolution::Applied
    );
    assert_eq!(controller.resolve(ticket, Ok(Vec::new())), Resolution::Stale);
    assert_eq!(controller.store().len(), 2);
}

#[tokio::test]
async fn dismiss_clears_the_banner_but_keeps_results() {
    let (mut controller, _source) =
        controller_with([Script::Leads(boston_body()), Script::Status(500)]);

    controller.submit("Boston").await;
    controller.submit("Boston").await;
    assert!(matches!(controller.state(), SearchState::Error { .. }));

    controller.dismiss();

    assert_eq!(controller.state(), &SearchState::Idle);
    assert_eq!(controller.store().len(), 2);
}

#[tokio::test]
async fn teardown_discards_results_and_late_outcomes() {
    let (mut controller, _source) = controller_with([Script::Leads(boston_body())]);

    controller.submit("Boston").await;
    let ticket = controller.begin("Leeds").expect("valid location");

    controller.teardown();
    assert_eq!(controller.state(), &SearchState::Idle);
    assert!(controller.results().is_none());

    let records = crate::leads::parse_value(boston_body()).expect("valid body");
    assert_eq!(controller.resolve(ticket, Ok(records)), Resolution::Stale);
    assert!(controller.results().is_none());
}

#[tokio::test]
async fn validating_is_never_left_visible() {
    let (mut controller, _source) = controller_with([Script::Leads(boston_body())]);

    assert!(controller.begin("").is_err());
    assert_ne!(controller.state(), &SearchState::Validating);

    let ticket = controller.begin("Boston").expect("valid location");
    assert_eq!(
        controller.state(),
        &SearchState::Loading {
            token: ticket.token(),
            location: "Boston".to_string(),
        }
    );
}
