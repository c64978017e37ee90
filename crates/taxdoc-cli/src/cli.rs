use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "taxdoc", about = "RAG service over HMRC tax guidance PDFs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build (or rebuild) the vector index from a directory of PDFs
    Ingest {
        /// Directory containing source PDFs (default: data, or TAXDOC_DATA_DIR)
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Directory for the vector index (default: index, or TAXDOC_INDEX_DIR)
        #[arg(long)]
        index_dir: Option<PathBuf>,
    },
    /// Serve the query endpoint over HTTP
    Serve {
        /// Address to bind
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to bind
        #[arg(long, short = 'p', default_value = "8080")]
        port: u16,
    },
    /// Ask a single question against the index and print the answer
    Query {
        /// The question to answer
        question: String,
    },
}
