mod interactive;
mod view;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{ApiClient, ClientConfig, MAX_TOP_N, MIN_TOP_N};
use session::{ContextProvider, Lifecycle, PaperDirectory, QueryController, SearchForm};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Find relevant sections of biomedical papers and read them in context.
#[derive(Parser, Debug)]
#[command(name = "section-finder", version)]
struct Cli {
    /// API origin; overrides SECTION_FINDER_API_URL
    #[arg(long, value_name = "URL", global = true)]
    api_url: Option<String>,

    /// Logging level used when RUST_LOG is unset
    #[arg(long, default_value = "warn", value_name = "LEVEL", global = true)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List papers available for filtering
    Papers {
        #[arg(long)]
        json: bool,
    },
    /// Search paper sections
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// Restrict to one paper
        #[arg(long, short = 'p', value_name = "PAPER_ID")]
        paper: Option<String>,

        /// Number of results (1-20)
        #[arg(long, short = 'n', value_parser = clap::value_parser!(u32).range(MIN_TOP_N as i64..=MAX_TOP_N as i64))]
        top_n: Option<u32>,

        /// Disable server-side query expansion
        #[arg(long)]
        no_expansion: bool,

        #[arg(long)]
        json: bool,
    },
    /// Show the passages around a chunk
    Context {
        chunk_id: String,

        #[arg(long)]
        json: bool,
    },
    /// Show one paper and its chunk outline
    Paper {
        paper_id: String,

        #[arg(long)]
        json: bool,
    },
    /// Interactive search session
    Interactive {
        /// Disable server-side query expansion
        #[arg(long)]
        no_expansion: bool,
    },
}

fn setup_logging(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level, cli.log_json);

    let mut config = ClientConfig::from_env();
    if let Some(url) = cli.api_url {
        config = config.with_base_url(url);
    }
    let api = Arc::new(ApiClient::new(&config).context("Failed to create API client")?);
    info!(base_url = %api.base_url(), "using section search API");

    match cli.command {
        Command::Papers { json } => {
            let directory = PaperDirectory::new(api);
            directory.activate().await;
            if let Some(e) = directory.error() {
                anyhow::bail!(e);
            }
            let papers = directory.papers();
            if json {
                println!("{}", serde_json::to_string_pretty(&papers)?);
            } else {
                print!("{}", view::render_filter_options(&view::filter_options(&papers, None)));
            }
        }
        Command::Search {
            query,
            paper,
            top_n,
            no_expansion,
            json,
        } => {
            let form = SearchForm {
                query: query.join(" "),
                paper_id: paper.unwrap_or_default(),
                top_n: top_n.unwrap_or(config.default_top_n),
            };
            let params = form.submit()?;

            let controller = QueryController::new(api)
                .with_query_expansion(config.use_query_expansion && !no_expansion);
            controller.search(params).await;

            match controller.state() {
                Lifecycle::Success(response) if json => {
                    println!("{}", serde_json::to_string_pretty(&response)?);
                }
                Lifecycle::Failure(e) => anyhow::bail!(e),
                state => print!("{}", view::render_query_state(&state)),
            }
        }
        Command::Context { chunk_id, json } => {
            let provider = ContextProvider::new(api);
            provider.select(Some(chunk_id)).await;

            let state = provider.state();
            match &state.context {
                Lifecycle::Success(context) if json => {
                    println!("{}", serde_json::to_string_pretty(context)?);
                }
                Lifecycle::Failure(e) => anyhow::bail!(e.clone()),
                _ => print!("{}", view::render_context_state(&state)),
            }
        }
        Command::Paper { paper_id, json } => {
            let paper = api.get_paper(&paper_id).await?;
            let chunks = api.paper_chunks(&paper_id).await?;
            if json {
                let value = serde_json::json!({ "paper": paper, "chunks": chunks });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                print!("{}", view::render_paper(&paper));
                print!("{}", view::render_outline(&chunks));
            }
        }
        Command::Interactive { no_expansion } => {
            let session = interactive::Session::new(
                api,
                config.default_top_n,
                config.use_query_expansion && !no_expansion,
            );
            interactive::run(session).await?;
        }
    }

    Ok(())
}
