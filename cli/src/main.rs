//! Linkfeat CLI: compute link-prediction similarity features
//!
//! Reads a YAML pipeline configuration, connects to the configured graph
//! backend and runs the enrichment or one of the inspection commands.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use linkfeat::{
    connect_graph, EnrichmentDriver, JsonDocumentStore, PipelineConfig, RunContext, RunSummary,
};
use linkfeat_sdk::GraphClient;
use linkfeat_text::rank_tfidf_terms;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "linkfeat", version, about = "Link-prediction similarity features")]
struct Cli {
    /// Pipeline configuration file
    #[arg(long, short, default_value = "linkfeat.yaml", global = true, env = "LINKFEAT_CONFIG")]
    config: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Clone, clap::ValueEnum)]
enum Strategy {
    Tfidf,
    Community,
}

#[derive(Subcommand)]
enum Commands {
    /// Enrich every configured split
    Enrich {
        /// Override the document store root
        #[arg(long)]
        input_dir: Option<PathBuf>,

        /// Override how many splits run at once
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Show the vocabulary a split or community top-k would use
    Vocabulary {
        /// Vocabulary kind
        #[arg(long, default_value = "tfidf")]
        strategy: Strategy,

        /// Split name (tfidf only; defaults to the first split)
        #[arg(long)]
        split: Option<String>,

        /// Terms shown (tfidf) or tags kept per community (community)
        #[arg(long)]
        top_terms: Option<usize>,
    },
    /// List communities, or show the community of one document
    Communities {
        #[arg(long)]
        document: Option<String>,
    },
    /// Check that the graph backend answers
    Ping,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// `Ok(false)` when the command completed but reported failures
async fn run(cli: Cli) -> anyhow::Result<bool> {
    let mut config = PipelineConfig::from_path(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    tracing::debug!(config = %cli.config.display(), splits = config.splits.len(), "configuration loaded");

    match cli.command {
        Commands::Enrich {
            input_dir,
            concurrency,
        } => {
            if let Some(dir) = input_dir {
                config.input_dir = dir;
            }
            if let Some(n) = concurrency {
                config.concurrency = n;
            }
            config.validate()?;

            let driver = build_driver(config).await?;
            let summary = driver.run().await?;
            print_summary(&summary, &cli.format)?;
            Ok(summary.is_success())
        }
        Commands::Vocabulary {
            strategy: Strategy::Tfidf,
            split,
            top_terms,
        } => {
            let driver = build_driver(config).await?;
            run_tfidf_vocabulary(&driver, split.as_deref(), top_terms, &cli.format).await?;
            Ok(true)
        }
        Commands::Vocabulary {
            strategy: Strategy::Community,
            top_terms,
            ..
        } => {
            let k = match top_terms.or_else(|| config.top_terms.first().copied()) {
                Some(k) if k > 0 => k,
                _ => bail!("--top-terms must be positive"),
            };
            let graph = connect_graph(&config.resolved_graph()).await?;
            run_community_vocabulary(graph.as_ref(), k, &cli.format).await?;
            Ok(true)
        }
        Commands::Communities { document } => {
            let graph = connect_graph(&config.resolved_graph()).await?;
            run_communities(graph.as_ref(), document.as_deref(), &cli.format).await?;
            Ok(true)
        }
        Commands::Ping => {
            let graph = connect_graph(&config.resolved_graph()).await?;
            graph.ping().await?;
            println!("OK");
            Ok(true)
        }
    }
}

async fn build_driver(config: PipelineConfig) -> anyhow::Result<EnrichmentDriver> {
    let graph = connect_graph(&config.resolved_graph()).await?;
    let documents = JsonDocumentStore::open(&config.input_dir)
        .with_context(|| format!("opening document store {}", config.input_dir.display()))?;
    Ok(EnrichmentDriver::new(config, graph, Arc::new(documents))?)
}

fn print_summary(summary: &RunSummary, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(summary)?);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["split", "status", "documents", "tfidf terms", "train", "test", "detail"]);

            for report in &summary.succeeded {
                table.add_row(vec![
                    report.split.clone(),
                    "ok".to_string(),
                    report.corpus_documents.to_string(),
                    report.tfidf_terms.to_string(),
                    report.train_rows.to_string(),
                    report.test_rows.to_string(),
                    report.train_output.display().to_string(),
                ]);
            }
            for failure in &summary.failed {
                table.add_row(vec![
                    failure.split.clone(),
                    "failed".to_string(),
                    String::new(),
                    String::new(),
                    String::new(),
                    String::new(),
                    failure.error.clone(),
                ]);
            }

            println!("{}", table);
            println!(
                "{} succeeded, {} failed",
                summary.succeeded.len(),
                summary.failed.len()
            );
        }
    }
    Ok(())
}

async fn run_tfidf_vocabulary(
    driver: &EnrichmentDriver,
    split: Option<&str>,
    limit: Option<usize>,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let config = driver.config();
    let selected = match split {
        Some(name) => config.splits.iter().find(|s| s.display_name() == name),
        None => config.splits.first(),
    };
    let Some(selected) = selected else {
        bail!("no split named {}", split.unwrap_or("<first>"));
    };

    let corpus = driver.split_corpus(selected).await?;
    let ranked = rank_tfidf_terms(corpus.texts(), driver.tokenizer(), config.tfidf_ranking)?;
    let limit = limit.unwrap_or(config.tfidf_max_features);
    let ranked = &ranked[..limit.min(ranked.len())];

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(ranked)?);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["rank", "term", "score"]);
            for (i, ts) in ranked.iter().enumerate() {
                table.add_row(vec![(i + 1).to_string(), ts.term.clone(), format!("{:.4}", ts.score)]);
            }
            println!("{}", table);
            println!(
                "{} term(s) from {} document(s) of split {}",
                ranked.len(),
                corpus.len(),
                selected.display_name()
            );
        }
    }
    Ok(())
}

async fn run_community_vocabulary(
    graph: &dyn GraphClient,
    top_terms: usize,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    let ctx = RunContext::load(graph, &[top_terms]).await?;
    let Some(vocabulary) = ctx.community_vocabulary(top_terms) else {
        bail!("no vocabulary for top {}", top_terms);
    };

    let rows: Vec<(i64, Vec<&str>)> = vocabulary
        .per_community
        .iter()
        .map(|(community, terms)| {
            let mut terms: Vec<&str> = terms.iter().map(String::as_str).collect();
            terms.sort_unstable();
            (*community, terms)
        })
        .collect();

    match format {
        OutputFormat::Json => {
            let json: serde_json::Map<String, serde_json::Value> = rows
                .iter()
                .map(|(c, terms)| (c.to_string(), serde_json::json!(terms)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["community", "tags"]);
            for (community, terms) in &rows {
                table.add_row(vec![community.to_string(), terms.join(" ")]);
            }
            println!("{}", table);
            println!(
                "{} distinct tag(s) across {} communities",
                vocabulary.union.len(),
                rows.len()
            );
        }
    }
    Ok(())
}

async fn run_communities(
    graph: &dyn GraphClient,
    document: Option<&str>,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    if let Some(key) = document {
        let communities = graph.document_communities().await?;
        let Some(community) = communities.get(key) else {
            bail!("document {} has no community", key);
        };
        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "document": key, "community": community }));
            }
            OutputFormat::Table => println!("{}", community),
        }
        return Ok(());
    }

    let listing = graph.community_documents().await?;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        OutputFormat::Table => {
            if listing.is_empty() {
                println!("(no communities)");
                return Ok(());
            }
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["community", "documents"]);
            for entry in &listing {
                table.add_row(vec![entry.community.to_string(), entry.documents.len().to_string()]);
            }
            println!("{}", table);
            println!("{} communities", listing.len());
        }
    }
    Ok(())
}
