use anyhow::{Context, Result};
use clap::Parser;
use client::{ApiClient, ClientConfig, MAX_TOP_N, MIN_TOP_N};
use eval::{load_test_set, EvalResults, Evaluator};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Measure Recall@N and MRR of the section search API on a gold query set.
#[derive(Parser, Debug)]
#[command(name = "run_eval", version)]
struct Args {
    /// JSON array of {query, correct_section_path?, correct_chunk_ids?}
    #[arg(long, value_name = "PATH")]
    queries: PathBuf,

    /// Cutoff for Recall@N
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u32).range(MIN_TOP_N as i64..=MAX_TOP_N as i64))]
    top_n: u32,

    /// Where to write per-query details
    #[arg(long, default_value = "eval_results.json", value_name = "PATH")]
    out: PathBuf,

    /// API origin; overrides SECTION_FINDER_API_URL
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = ClientConfig::from_env();
    if let Some(url) = args.api_url {
        config = config.with_base_url(url);
    }
    let api = ApiClient::new(&config).context("Failed to create API client")?;

    let test_set = load_test_set(&args.queries)?;
    println!("Test set: {} queries\n", test_set.len());

    let results = Evaluator::new(api).run(&test_set, args.top_n).await?;
    print_results(&results);

    let json = serde_json::to_string_pretty(&results)?;
    std::fs::write(&args.out, json)
        .with_context(|| format!("Failed to write {}", args.out.display()))?;
    println!("\nDetails written to {}", args.out.display());

    Ok(())
}

fn print_results(results: &EvalResults) {
    println!("Recall@{}: {:.3}", results.top_n, results.recall_at_n);
    println!("MRR: {:.3}", results.mrr);
    println!("N queries: {}", results.n_queries);
    println!("Avg Latency: {:.0} ms", results.avg_latency_ms);
    println!("P50 Latency: {:.0} ms", results.p50_latency_ms);
    println!("P95 Latency: {:.0} ms", results.p95_latency_ms);

    let misses: Vec<&str> = results
        .details
        .iter()
        .filter(|d| d.found_rank.is_none())
        .map(|d| d.query.as_str())
        .collect();
    if !misses.is_empty() {
        println!("\nMissed:");
        for query in misses {
            println!("  {}", query);
        }
    }
}
