use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::http::Method;
use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use pathway::config::{build_router, load_config};
use pathway::controller::ControllerRegistry;
use pathway::routing::{Router, Selection};
use pathway::Request;

#[derive(Parser)]
#[command(name = "pathway-cli")]
#[command(about = "Inspect a pathway route table", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the compiled route table
    Routes {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show which route would handle a request
    Check {
        #[arg(short, long)]
        config: PathBuf,
        /// HTTP method, e.g. GET
        method: String,
        /// Request path, optionally with a query string
        path: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Routes { config } => {
            let router = load_router(&config)?;
            print_json(&serde_json::to_value(router.summaries())?)?;
        }
        Commands::Check { config, method, path } => {
            let router = load_router(&config)?;
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())?;
            let request = Request::try_new(method, &path)?;
            print_json(&describe(&router.select(&request), &request))?;
        }
    }

    Ok(())
}

fn load_router(path: &Path) -> Result<Router, Box<dyn std::error::Error>> {
    let config = load_config(path)?;
    let controllers = ControllerRegistry::with_builtins(&config.services)?;
    Ok(build_router(&config.routes, Arc::new(controllers))?)
}

fn describe(selection: &Selection<'_>, request: &Request) -> Value {
    let outcome = match selection {
        Selection::Matched { .. } => "matched",
        Selection::Fallback { .. } => "fallback",
        Selection::Unmatched => "unmatched",
    };
    json!({
        "method": request.method().as_str(),
        "path": request.path(),
        "outcome": outcome,
        "route": selection.route().map(|r| r.summary()),
        "params": selection.params(),
    })
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
