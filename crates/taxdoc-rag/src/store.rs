use arrow_array::RecordBatchIterator;
use lancedb::{Connection, Table};

use crate::embed::Embedder;
use crate::error::RagError;
use crate::schema::{CHUNKS_TABLE, chunks_schema};

pub struct IndexStore {
    pub(crate) db: Connection,
    pub(crate) embedder: Embedder,
}

impl IndexStore {
    /// Open (or create) the vector index at the given path.
    /// Creates an empty chunks table if none exists yet.
    pub async fn open(path: &str, embedder: Embedder) -> Result<Self, RagError> {
        let db = lancedb::connect(path).execute().await?;
        ensure_chunks_table(&db).await?;
        Ok(Self { db, embedder })
    }

    /// Test-only: open against a temporary directory with a fake embedder.
    #[cfg(test)]
    pub(crate) async fn open_for_test(path: &str) -> Result<Self, RagError> {
        Self::open(path, Embedder::fake()).await
    }

    pub async fn chunks_table(&self) -> Result<Table, RagError> {
        self.db
            .open_table(CHUNKS_TABLE)
            .execute()
            .await
            .map_err(Into::into)
    }

    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>, RagError> {
        self.embedder.embed_query(query).await
    }

    pub async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        self.embedder.embed_documents(texts).await
    }
}

/// Open the chunks table if it exists, or create it empty with the schema.
async fn ensure_chunks_table(db: &Connection) -> Result<Table, RagError> {
    match db.open_table(CHUNKS_TABLE).execute().await {
        Ok(table) => Ok(table),
        Err(_) => {
            let reader = RecordBatchIterator::new(
                std::iter::empty::<Result<arrow_array::RecordBatch, arrow_schema::ArrowError>>(),
                chunks_schema(),
            );
            db.create_table(CHUNKS_TABLE, Box::new(reader))
                .execute()
                .await
                .map_err(Into::into)
        }
    }
}
