#[derive(thiserror::Error, Debug)]
pub enum RagError {
    #[error("LanceDB error: {0}")]
    LanceDb(#[from] lancedb::Error),
    #[error("Embedding error: {0}")]
    Embed(String),
    #[error("Arrow error: {0}")]
    Arrow(String),
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("no PDF files found in the data directory")]
    NoDocuments,
    #[error("documents loaded but no text could be extracted")]
    EmptyExtraction,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
