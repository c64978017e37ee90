use arrow_array::{Array, Float32Array, RecordBatch, StringArray, UInt16Array};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};

use crate::error::RagError;
use crate::store::IndexStore;

/// A chunk returned by nearest-neighbor retrieval, with its distance score.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RetrievedChunk {
    pub chunk_id: String,
    pub source_file: String,
    pub chunk_idx: u16,
    pub text: String,
    pub score: f32,
}

fn col_str(batch: &RecordBatch, name: &str, row: usize) -> String {
    let col = batch.column_by_name(name).expect("column exists");
    let arr = col
        .as_any()
        .downcast_ref::<StringArray>()
        .expect("StringArray");
    if arr.is_null(row) {
        String::new()
    } else {
        arr.value(row).to_string()
    }
}

fn col_u16(batch: &RecordBatch, name: &str, row: usize) -> u16 {
    let col = batch.column_by_name(name).expect("column exists");
    let arr = col
        .as_any()
        .downcast_ref::<UInt16Array>()
        .expect("UInt16Array");
    arr.value(row)
}

fn col_f32(batch: &RecordBatch, name: &str, row: usize) -> f32 {
    let col = batch.column_by_name(name).expect("column exists");
    let arr = col
        .as_any()
        .downcast_ref::<Float32Array>()
        .expect("Float32Array");
    arr.value(row)
}

/// Retrieve the top-`limit` chunks nearest to the query by embedding distance.
pub async fn retrieve(
    store: &IndexStore,
    query: &str,
    limit: usize,
) -> Result<Vec<RetrievedChunk>, RagError> {
    let embedding = store.embed_query(query).await?;
    let table = store.chunks_table().await?;

    let batches = table
        .query()
        .nearest_to(embedding.as_slice())?
        .limit(limit)
        .execute()
        .await?
        .try_collect::<Vec<_>>()
        .await
        .map_err(RagError::LanceDb)?;

    let mut results = Vec::new();
    for batch in &batches {
        let has_distance = batch.column_by_name("_distance").is_some();
        for row in 0..batch.num_rows() {
            results.push(RetrievedChunk {
                chunk_id: col_str(batch, "chunk_id", row),
                source_file: col_str(batch, "source_file", row),
                chunk_idx: col_u16(batch, "chunk_idx", row),
                text: col_str(batch, "text", row),
                score: if has_distance {
                    col_f32(batch, "_distance", row)
                } else {
                    0.0
                },
            });
        }
    }
    Ok(results)
}

/// Number of records currently in the index.
pub async fn chunk_count(store: &IndexStore) -> Result<usize, RagError> {
    let table = store.chunks_table().await?;
    table.count_rows(None).await.map_err(Into::into)
}
