//! Demo CLI: extract parameters from a natural-language query, dispatch to
//! the configured catalogs, and print the normalized results as JSON.
//!
//! ```bash
//! geodex "soil moisture over California last month" --source all --max-results 5
//! ```

use std::str::FromStr;

use anyhow::{bail, Context};
use tracing_subscriber::EnvFilter;

use geodex_core::{defaults, SourceSelector};
use geodex_dispatch::QueryDispatcher;
use geodex_extract::SpatiotemporalExtractor;

struct Args {
    query: String,
    source: SourceSelector,
    max_results: usize,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut query = None;
    let mut source = SourceSelector::All;
    let mut max_results = defaults::RESULTS_PER_SOURCE;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--source" => {
                let value = args.next().context("--source requires a value")?;
                source = SourceSelector::from_str(&value)?;
            }
            "--max-results" => {
                let value = args.next().context("--max-results requires a value")?;
                max_results = value.parse().context("--max-results must be a number")?;
            }
            "-h" | "--help" => {
                eprintln!("usage: geodex <query> [--source nasa|stac|maap|esa|all] [--max-results N]");
                std::process::exit(0);
            }
            other if query.is_none() => query = Some(other.to_string()),
            other => bail!("unexpected argument: {other}"),
        }
    }

    Ok(Args {
        query: query.context("a natural-language query is required")?,
        source,
        max_results,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = parse_args()?;

    let extractor = SpatiotemporalExtractor::from_env();
    let params = extractor.extract_parameters(&args.query).await;
    eprintln!("{}", serde_json::to_string_pretty(&params)?);

    let dispatcher = QueryDispatcher::from_env();
    let results = dispatcher
        .dispatch_collection_query(&params, None, &[], args.max_results, args.source)
        .await?;

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
