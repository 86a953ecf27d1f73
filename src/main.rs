//! SPA router command line.
//!
//! Loads a route table from TOML and lets you inspect it or drive a
//! navigation session against the configured history mode.
//!
//! ```text
//! spa-router routes
//! spa-router resolve /users
//! spa-router session /users / back forward replace:/users
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;
use url::Url;

use spa_router::config::{self, HistoryMode, RouterConfig};
use spa_router::history::{AddressMode, HistoryAdapter, MemoryHistory, PopEvent, UrlHistory};
use spa_router::navigation::{NavigationOutcome, Navigator};
use spa_router::observability::logging::init_logging;
use spa_router::routing::{PathMatcher, Resolution, RouteTable};
use spa_router::NavigationError;

#[derive(Parser)]
#[command(name = "spa-router")]
#[command(about = "Inspect and exercise a single-page application route table", long_about = None)]
struct Cli {
    /// Router configuration file
    #[arg(short, long, default_value = "router.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List routes in precedence order
    Routes,
    /// Resolve a path without navigating
    Resolve { path: String },
    /// Run a navigation session: a path pushes, `replace:<path>` replaces,
    /// `back` and `forward` traverse history
    Session {
        #[arg(required = true)]
        steps: Vec<String>,
    },
}

#[derive(Debug)]
enum Step {
    Push(String),
    Replace(String),
    Traverse(isize),
}

impl Step {
    fn parse(raw: &str) -> Self {
        match raw {
            "back" => Step::Traverse(-1),
            "forward" => Step::Traverse(1),
            _ => match raw.strip_prefix("replace:") {
                Some(path) => Step::Replace(path.to_string()),
                None => Step::Push(raw.to_string()),
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = config::load_config(&cli.config)?;
    init_logging(&config.observability);

    tracing::info!(
        config = %cli.config.display(),
        routes = config.routes.len(),
        history = ?config.history.mode,
        strict_trailing_slash = config.navigation.strict_trailing_slash,
        "Configuration loaded"
    );

    let table = Arc::new(config::build_route_table(&config)?);

    match cli.command {
        Commands::Routes => {
            for definition in table.iter() {
                println!(
                    "{:<16} {:<24} {}",
                    definition.id(),
                    definition.pattern(),
                    definition.view()
                );
            }
        }
        Commands::Resolve { path } => {
            let matcher = PathMatcher::new(table, config.navigation.strict_trailing_slash);
            match matcher.resolve(&path) {
                Resolution::Matched(route) => println!("{}", serde_json::to_string_pretty(&route)?),
                Resolution::NoMatch => println!("{}", json!({ "path": path, "match": null })),
            }
        }
        Commands::Session { steps } => run_session(&config, table, &steps).await?,
    }

    Ok(())
}

async fn run_session(
    config: &RouterConfig,
    table: Arc<RouteTable<String>>,
    steps: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let address = match config.history.mode {
        HistoryMode::Memory => None,
        HistoryMode::Browser => Some(AddressMode::Browser),
        HistoryMode::Hash => Some(AddressMode::Hash),
    }
    .map(|mode| -> Result<Arc<UrlHistory>, Box<dyn std::error::Error>> {
        let base = Url::parse(&config.history.base)?;
        Ok(Arc::new(UrlHistory::new(base, mode)?))
    })
    .transpose()?;

    let history: Arc<dyn HistoryAdapter> = match &address {
        Some(url_history) => url_history.clone() as Arc<dyn HistoryAdapter>,
        None => Arc::new(MemoryHistory::new()) as Arc<dyn HistoryAdapter>,
    };

    let navigator = Navigator::builder(table)
        .config(config.navigation.clone())
        .history(history.clone())
        .build();

    for raw in steps {
        let result = match Step::parse(raw) {
            Step::Push(path) => navigator.push(&path).await,
            Step::Replace(path) => navigator.replace(&path).await,
            Step::Traverse(delta) => traverse(&navigator, history.as_ref(), delta).await,
        };

        let location = address.as_ref().map(|h| h.location().to_string());
        let line = match result {
            Ok(outcome) => json!({
                "step": raw,
                "outcome": outcome.label(),
                "route": outcome.route().map(|r| r.as_ref()),
                "view": outcome.route().and_then(|r| navigator.view(r)),
                "location": location,
            }),
            Err(e) => json!({
                "step": raw,
                "outcome": "error",
                "error": e.to_string(),
                "location": location,
            }),
        };
        println!("{line}");
    }

    Ok(())
}

async fn traverse(
    navigator: &Navigator<String>,
    history: &dyn HistoryAdapter,
    delta: isize,
) -> Result<NavigationOutcome, NavigationError> {
    history.go(delta, false).await?;
    let entry = history
        .current()
        .ok_or(spa_router::error::HistoryError::OutOfRange { index: 0, delta })?;
    navigator.handle_pop(PopEvent { entry, delta }).await
}
