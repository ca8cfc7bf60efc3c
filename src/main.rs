//! docent: retrieval-augmented question answering over documents, code
//! repositories, and live web search.

mod config;

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use docent_engine::graph::{QueryGraph, QueryOutcome};
use docent_engine::search::GoogleSearch;
use docent_engine::types::{ModelChoice, QueryRequest, QueryResponse};
use docent_index::indexer::{Indexer, IndexerConfig};
use docent_index::qdrant::QdrantStore;
use docent_index::{Retriever, VectorStore};
use docent_llm::Message;
use docent_llm::openai::OpenAiProvider;

use config::Config;

#[derive(Parser)]
#[command(name = "docent", version, about)]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "docent.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask a single question.
    Ask {
        question: String,
        /// Chat model to use (gpt-4.1-nano or gpt-4o-mini).
        #[arg(long)]
        model: Option<String>,
        /// Print the retrieved segments backing the answer.
        #[arg(long)]
        show_sources: bool,
    },
    /// Interactive session; history is kept in memory for its duration.
    Chat {
        #[arg(long)]
        model: Option<String>,
    },
    /// Index a PDF, DOCX, or HTML file under a file identifier.
    Index {
        path: PathBuf,
        #[arg(long)]
        id: i64,
    },
    /// Clone a repository and index its Python sources.
    IndexRepo {
        url: String,
        #[arg(long)]
        id: i64,
    },
    /// Delete every indexed segment for a file identifier.
    Delete {
        #[arg(long)]
        id: i64,
    },
}

fn parse_model(raw: Option<&str>) -> anyhow::Result<Option<ModelChoice>> {
    match raw {
        None => Ok(None),
        Some("gpt-4.1-nano") => Ok(Some(ModelChoice::Gpt41Nano)),
        Some("gpt-4o-mini") => Ok(Some(ModelChoice::Gpt4oMini)),
        Some(other) => anyhow::bail!("unknown model: {other}"),
    }
}

fn build_provider(config: &Config, model: Option<ModelChoice>) -> anyhow::Result<OpenAiProvider> {
    let api_key = std::env::var(&config.llm.api_key_env)
        .with_context(|| format!("{} not set", config.llm.api_key_env))?;
    let model_name = model.map_or_else(|| config.llm.model.clone(), |m| m.as_str().to_owned());

    Ok(OpenAiProvider::new(
        api_key,
        config.llm.base_url.clone(),
        model_name,
        config.llm.max_tokens,
        Some(config.llm.embedding_model.clone()),
    ))
}

fn build_store(config: &Config) -> anyhow::Result<Arc<dyn VectorStore>> {
    let store = QdrantStore::new(&config.store.qdrant_url)
        .with_context(|| format!("failed to connect to {}", config.store.qdrant_url))?;
    Ok(Arc::new(store))
}

fn build_indexer(config: &Config, model: Option<ModelChoice>) -> anyhow::Result<Indexer<OpenAiProvider>> {
    let provider = Arc::new(build_provider(config, model)?);
    let store = build_store(config)?;
    let indexer_config = IndexerConfig {
        collection: config.store.collection.clone(),
        max_file_size: config.ingest.max_file_size,
        clone_workdir: config
            .ingest
            .clone_workdir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("docent-repos")),
        ..IndexerConfig::default()
    };
    Ok(Indexer::new(store, provider, indexer_config))
}

fn build_graph(
    config: &Config,
    model: Option<ModelChoice>,
) -> anyhow::Result<QueryGraph<OpenAiProvider, GoogleSearch>> {
    let provider = Arc::new(build_provider(config, model)?);
    let store = build_store(config)?;
    let retriever = Retriever::new(
        Arc::clone(&provider),
        store,
        config.store.collection.clone(),
    );

    let search_key = std::env::var(&config.search.api_key_env)
        .with_context(|| format!("{} not set", config.search.api_key_env))?;
    let engine_id = std::env::var(&config.search.engine_id_env)
        .with_context(|| format!("{} not set", config.search.engine_id_env))?;
    let search = Arc::new(GoogleSearch::new(search_key, engine_id));

    Ok(QueryGraph::new(provider, retriever, search))
}

fn print_outcome(outcome: &QueryOutcome, show_sources: bool) {
    println!("{}", outcome.answer);
    println!("[source: {}]", outcome.source);
    if show_sources && !outcome.sources.is_empty() {
        println!("\nRetrieved segments:");
        for segment in &outcome.sources {
            println!("  {} (score {:.3})", segment.source, segment.score);
        }
    }
}

async fn run_chat(
    graph: &QueryGraph<OpenAiProvider, GoogleSearch>,
) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut history: Vec<Message> = Vec::new();

    println!("docent v{} (empty line to exit)", env!("CARGO_PKG_VERSION"));
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            break;
        }

        match graph.run(question, &history).await {
            Ok(outcome) => {
                print_outcome(&outcome, false);
                history.push(Message::user(question));
                history.push(Message::assistant(outcome.answer));
            }
            Err(e) => eprintln!("query failed: {e}"),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Command::Ask {
            question,
            model,
            show_sources,
        } => {
            let model = parse_model(model.as_deref())?;
            let graph = build_graph(&config, model)?;
            let request = QueryRequest {
                question,
                session_id: None,
                model,
            };
            let outcome = graph.run(&request.question, &[]).await?;
            let response = QueryResponse::new(&request, outcome.answer.clone(), outcome.source);
            print_outcome(&outcome, show_sources);
            tracing::debug!(session_id = %response.session_id, "query answered");
        }
        Command::Chat { model } => {
            let model = parse_model(model.as_deref())?;
            let graph = build_graph(&config, model)?;
            run_chat(&graph).await?;
        }
        Command::Index { path, id } => {
            let indexer = build_indexer(&config, None)?;
            if indexer.index_file(&path, id).await {
                println!("indexed {} as file {id}", path.display());
            } else {
                anyhow::bail!("failed to index {}", path.display());
            }
        }
        Command::IndexRepo { url, id } => {
            let indexer = build_indexer(&config, None)?;
            if indexer.index_repository(&url, id).await {
                println!("indexed {url} as file {id}");
            } else {
                anyhow::bail!("failed to index {url}");
            }
        }
        Command::Delete { id } => {
            let indexer = build_indexer(&config, None)?;
            if indexer.delete(id).await {
                println!("deleted segments for file {id}");
            } else {
                anyhow::bail!("failed to delete segments for file {id}");
            }
        }
    }

    Ok(())
}
