use crate::infra::parse_profile;
use clap::Args;
use lead_finder::config::AppConfig;
use lead_finder::error::AppError;
use lead_finder::leads::{
    ArtifactSink, CsvExporter, DirectorySink, ExportOutcome, ExportProfile, HttpLeadSource,
    LeadView, QuoteMode, ResultsView, SearchController, SearchResults, SearchState, SessionView,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct SearchArgs {
    /// Location to search, e.g. a town or postcode
    pub(crate) location: String,
    /// Write the results to a CSV file
    #[arg(long)]
    pub(crate) export: bool,
    /// Directory for the CSV file (defaults to LEADS_EXPORT_DIR)
    #[arg(long)]
    pub(crate) out_dir: Option<PathBuf>,
    /// Column profile: contact, standard or extended
    #[arg(long, value_parser = parse_profile)]
    pub(crate) profile: Option<ExportProfile>,
    /// Wrap fields in quotes without escaping embedded quotes
    #[arg(long)]
    pub(crate) legacy_quoting: bool,
    /// Print the session state and results as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_search(config: AppConfig, args: SearchArgs) -> Result<(), AppError> {
    let source = Arc::new(HttpLeadSource::from_config(&config.search)?);
    let mut controller = SearchController::new(source);

    let state = controller.submit(&args.location).await.clone();
    let results = controller.results();

    if args.json {
        let view = SessionView {
            state: &state,
            results: results.as_deref().map(ResultsView::new),
        };
        match serde_json::to_string_pretty(&view) {
            Ok(json) => println!("{json}"),
            Err(err) => eprintln!("JSON output unavailable: {err}"),
        }
    }

    if let SearchState::Error { kind, message } = state {
        if !args.json {
            eprintln!("{message}");
        }
        return Err(AppError::SearchFailed { kind, message });
    }

    let Some(results) = results else {
        return Ok(());
    };
    if !args.json {
        render_results(&results);
    }

    if args.export {
        let quoting = if args.legacy_quoting {
            QuoteMode::Legacy
        } else {
            config.export.quoting
        };
        let exporter = CsvExporter::new(args.profile.unwrap_or(config.export.profile), quoting);
        let out_dir = args.out_dir.unwrap_or(config.export.output_dir);
        export_results(&exporter, &DirectorySink::new(out_dir), &results)?;
    }

    Ok(())
}

pub(crate) fn render_results(results: &SearchResults) {
    println!(
        "{} leads for '{}' (fetched {})",
        results.leads().len(),
        results.search_term(),
        results.fetched_at().format("%Y-%m-%d %H:%M UTC")
    );

    for lead in results.leads() {
        let view = LeadView::new(lead);
        println!("- {}", lead.name);
        if !lead.address.is_empty() {
            println!("  {}", lead.address);
        }

        let contact: Vec<&str> = [&lead.phone, &lead.email, &lead.website]
            .into_iter()
            .filter_map(|value| value.as_deref())
            .collect();
        if !contact.is_empty() {
            println!("  {}", contact.join(" | "));
        }

        if let Some(rating) = lead.rating {
            let reviews = lead
                .total_reviews
                .map(|count| format!(" ({count} reviews)"))
                .unwrap_or_default();
            println!("  Rating {rating:.1}{reviews}");
        }
        if let Some(tier) = view.sentiment_tier {
            println!("  Sentiment: {}", tier.label());
        }
        if let Some(tier) = view.hygiene_tier {
            println!("  Hygiene: {}", tier.label());
        }
    }
}

/// Writes the export through the sink and reports where it went. Returns
/// `None` when there was nothing to export.
pub(crate) fn export_results(
    exporter: &CsvExporter,
    sink: &impl ArtifactSink,
    results: &SearchResults,
) -> Result<Option<PathBuf>, AppError> {
    match exporter.export(results)? {
        ExportOutcome::Ready(artifact) => {
            let path = sink.deliver(&artifact)?;
            println!(
                "Exported {} leads to {}",
                results.leads().len(),
                path.display()
            );
            Ok(Some(path))
        }
        ExportOutcome::Skipped => {
            println!("No leads to export");
            Ok(None)
        }
    }
}
