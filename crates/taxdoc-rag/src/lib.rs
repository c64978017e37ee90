pub mod error;
pub mod ingest;
pub mod query;
pub mod schema;
pub mod store;

mod embed;

pub use embed::Embedder;
pub use error::RagError;
pub use ingest::{ChunkRecord, IngestStats, ingest_directory, list_pdf_files, replace_chunks};
pub use query::{RetrievedChunk, chunk_count, retrieve};
pub use store::IndexStore;
