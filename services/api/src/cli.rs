use crate::search::{run_search, SearchArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use lead_finder::config::AppConfig;
use lead_finder::error::AppError;
use lead_finder::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "lead-finder",
    about = "Search a location for restaurant leads and export them as CSV",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run one lead search and print or export the results
    Search(SearchArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    let config = prepare()?;
    match command {
        Command::Serve(args) => server::run(config, args).await,
        Command::Search(args) => run_search(config, args).await,
    }
}

/// Loads configuration and installs logging ahead of any subcommand.
pub(crate) fn prepare() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_finder::leads::{ExportProfile, SearchErrorKind};
    use std::path::PathBuf;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["lead-finder"]).expect("parses");
        assert!(cli.command.is_none());

        let cli = Cli::try_parse_from(["lead-finder", "serve", "--port", "8080"]).expect("parses");
        let Some(Command::Serve(args)) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.port, Some(8080));
        assert!(args.host.is_none());
    }

    #[test]
    fn search_accepts_export_options() {
        let cli = Cli::try_parse_from([
            "lead-finder",
            "search",
            "St Albans",
            "--export",
            "--out-dir",
            "exports",
            "--profile",
            "extended",
            "--legacy-quoting",
        ])
        .expect("parses");
        let Some(Command::Search(args)) = cli.command else {
            panic!("expected search");
        };
        assert_eq!(args.location, "St Albans");
        assert!(args.export);
        assert_eq!(args.out_dir, Some(PathBuf::from("exports")));
        assert_eq!(args.profile, Some(ExportProfile::Extended));
        assert!(args.legacy_quoting);
        assert!(!args.json);
    }

    #[test]
    fn search_rejects_unknown_profiles() {
        let parsed = Cli::try_parse_from(["lead-finder", "search", "Leeds", "--profile", "wide"]);
        assert!(parsed.is_err());
    }

    #[tokio::test]
    async fn search_runs_with_logging_installed() {
        std::env::set_var("LEADS_API_BASE_URL", "http://127.0.0.1:9");
        let config = prepare().expect("config and telemetry initialise");
        std::env::remove_var("LEADS_API_BASE_URL");
        assert!(tracing::dispatcher::has_been_set());

        let args = SearchArgs {
            location: "Boston".to_string(),
            export: false,
            out_dir: None,
            profile: None,
            legacy_quoting: false,
            json: true,
        };
        let err = run_search(config, args)
            .await
            .expect_err("nothing listens on the search API port");

        assert!(matches!(
            err,
            AppError::SearchFailed {
                kind: SearchErrorKind::Network,
                ..
            }
        ));
    }
}
