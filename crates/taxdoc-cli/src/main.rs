mod cli;

use std::sync::Arc;

use clap::Parser;
use cli::{Cli, Command};
use taxdoc_core::{Config, TEMPERATURE, TOP_K, build_prompt, format_context};
use taxdoc_gemini::GeminiClient;
use taxdoc_rag::{Embedder, IndexStore, RagError, ingest_directory, retrieve};
use taxdoc_server::AppState;

type CliError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Ingest {
            data_dir,
            index_dir,
        } => ingest(data_dir, index_dir).await,
        Command::Serve { host, port } => serve(&host, port).await,
        Command::Query { question } => query(&question).await,
    }
}

async fn ingest(
    data_dir: Option<std::path::PathBuf>,
    index_dir: Option<std::path::PathBuf>,
) -> Result<(), CliError> {
    let mut config = Config::from_env();
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    if let Some(dir) = index_dir {
        config.index_dir = dir;
    }

    let Some(api_key) = config.api_key else {
        println!("Error: GOOGLE_API_KEY not set. Please add your key.");
        return Ok(());
    };

    std::fs::create_dir_all(&config.data_dir)?;
    let embedder = Embedder::new(GeminiClient::new(api_key));
    let index_path = config.index_dir.to_string_lossy();

    match ingest_directory(&index_path, &config.data_dir, embedder).await {
        Ok(stats) => {
            println!(
                "Successfully indexed {} chunks from {} PDF files in {}",
                stats.chunks,
                stats.files,
                config.index_dir.display()
            );
            Ok(())
        }
        // Reported, non-fatal conditions: no index change, exit success.
        Err(RagError::NoDocuments) => {
            println!(
                "No PDF files found in '{}'. Please add your PDF files.",
                config.data_dir.display()
            );
            Ok(())
        }
        Err(RagError::EmptyExtraction) => {
            println!("Documents loaded but no text could be extracted. Check PDF content.");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn serve(host: &str, port: u16) -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let state = Arc::new(AppState::new(Config::from_env()));
    if state.client.is_none() {
        tracing::warn!("GOOGLE_API_KEY not set; every query will return HTTP 500");
    }
    taxdoc_server::serve(state, host, port).await
}

/// One-shot local run of the full retrieval chain, for testing an index.
async fn query(question: &str) -> Result<(), CliError> {
    let config = Config::from_env();
    let Some(api_key) = config.api_key else {
        println!("Error: GOOGLE_API_KEY not set. Please add your key.");
        return Ok(());
    };

    let client = GeminiClient::new(api_key);
    let index_path = config.index_dir.to_string_lossy();
    let store = IndexStore::open(&index_path, Embedder::new(client.clone())).await?;

    let chunks = retrieve(&store, question, TOP_K).await?;
    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    let prompt = build_prompt(&format_context(&texts), question);
    let answer = client.generate(&prompt, TEMPERATURE).await?;

    println!("{answer}");
    Ok(())
}
