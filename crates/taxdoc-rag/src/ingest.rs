use arrow_array::{
    FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray, UInt16Array,
};
use arrow_schema::ArrowError;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::embed::Embedder;
use crate::error::RagError;
use crate::schema::{CHUNKS_TABLE, EMBED_DIM, chunks_schema};
use crate::store::IndexStore;

/// Character budget per chunk. Oversized paragraphs are split at this bound.
pub const CHUNK_SIZE: usize = 1000;

#[derive(Debug)]
pub struct IngestStats {
    pub files: usize,
    pub chunks: usize,
}

#[derive(Debug)]
pub struct ChunkRecord {
    pub chunk_id: String,
    pub source_file: String,
    pub chunk_idx: u16,
    pub text: String,
}

/// List `.pdf` files directly under a directory, sorted by name.
pub fn list_pdf_files(dir: &Path) -> Result<Vec<PathBuf>, RagError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if path.is_file() && is_pdf {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Split extracted text into chunks: accumulate paragraphs up to `max_chars`,
/// breaking paragraphs longer than the budget at char boundaries.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for paragraph in text.split("\n\n") {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }
        let paragraph_len = paragraph.chars().count();
        if paragraph_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = paragraph.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }
        // +2 for the paragraph separator
        if !current.is_empty() && current.chars().count() + paragraph_len + 2 > max_chars {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push_str("\n\n");
        }
        current.push_str(paragraph);
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Extract text from one PDF and split it into chunk records.
pub fn load_chunks(path: &Path) -> Result<Vec<ChunkRecord>, RagError> {
    let source_file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let text = pdf_extract::extract_text(path).map_err(|e| RagError::Pdf(e.to_string()))?;
    records_from_chunks(&source_file, split_text(&text, CHUNK_SIZE))
}

fn records_from_chunks(
    source_file: &str,
    chunks: Vec<String>,
) -> Result<Vec<ChunkRecord>, RagError> {
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let chunk_idx = u16::try_from(i).map_err(|_| {
                RagError::Pdf(format!(
                    "{source_file}: more than {} chunks in one file",
                    u16::MAX
                ))
            })?;
            Ok(ChunkRecord {
                chunk_id: format!("{source_file}/{i}"),
                source_file: source_file.to_string(),
                chunk_idx,
                text,
            })
        })
        .collect()
}

/// Embed chunk records and replace the whole chunks table with them.
/// Prior index content is dropped; there are no delta updates.
pub async fn replace_chunks(
    store: &IndexStore,
    records: Vec<ChunkRecord>,
) -> Result<usize, RagError> {
    let texts: Vec<String> = records.iter().map(|r| r.text.clone()).collect();
    let embeddings = store.embed_documents(&texts).await?;

    let batch = build_chunks_batch(&records, &embeddings)?;
    let reader = RecordBatchIterator::new(vec![Ok(batch)], chunks_schema());

    // Full replace: drop any existing table before recreating it.
    let _ = store.db.drop_table(CHUNKS_TABLE, &[]).await;
    store
        .db
        .create_table(CHUNKS_TABLE, Box::new(reader))
        .execute()
        .await?;
    Ok(records.len())
}

/// Build the index from every PDF under `data_dir`, fully replacing any prior
/// content at `index_path`. Fails without touching the index when the
/// directory has no PDFs or no text could be extracted.
pub async fn ingest_directory(
    index_path: &str,
    data_dir: &Path,
    embedder: Embedder,
) -> Result<IngestStats, RagError> {
    let pdf_files = list_pdf_files(data_dir)?;
    if pdf_files.is_empty() {
        return Err(RagError::NoDocuments);
    }

    eprintln!("Loading {} PDF documents...", pdf_files.len());
    let mut records = Vec::new();
    for path in &pdf_files {
        let mut file_records = load_chunks(path)?;
        eprintln!(
            "  [{}] extracted {} chunks",
            path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
            file_records.len()
        );
        records.append(&mut file_records);
    }
    if records.is_empty() {
        return Err(RagError::EmptyExtraction);
    }
    eprintln!("Total document chunks: {}", records.len());

    let store = IndexStore::open(index_path, embedder).await?;
    eprintln!("Embedding {} chunks...", records.len());
    let chunks = replace_chunks(&store, records).await?;

    Ok(IngestStats {
        files: pdf_files.len(),
        chunks,
    })
}

fn build_vector_array(embeddings: &[Vec<f32>]) -> Result<FixedSizeListArray, RagError> {
    let flat: Vec<f32> = embeddings.iter().flat_map(|v| v.iter().copied()).collect();
    let flat_array = Arc::new(Float32Array::from(flat));
    let field = Arc::new(arrow_schema::Field::new(
        "item",
        arrow_schema::DataType::Float32,
        true,
    ));
    // Fails instead of panicking when the embedding API returns vectors of a
    // width other than EMBED_DIM.
    FixedSizeListArray::try_new(field, EMBED_DIM, flat_array, None)
        .map_err(|e| RagError::Arrow(e.to_string()))
}

fn build_chunks_batch(
    records: &[ChunkRecord],
    embeddings: &[Vec<f32>],
) -> Result<RecordBatch, RagError> {
    let chunk_ids: Vec<&str> = records.iter().map(|r| r.chunk_id.as_str()).collect();
    let source_files: Vec<&str> = records.iter().map(|r| r.source_file.as_str()).collect();
    let vectors = build_vector_array(embeddings)?;
    let chunk_idxs: Vec<u16> = records.iter().map(|r| r.chunk_idx).collect();
    let texts: Vec<&str> = records.iter().map(|r| r.text.as_str()).collect();

    RecordBatch::try_new(
        chunks_schema(),
        vec![
            Arc::new(StringArray::from(chunk_ids)),
            Arc::new(StringArray::from(source_files)),
            Arc::new(vectors),
            Arc::new(UInt16Array::from(chunk_idxs)),
            Arc::new(StringArray::from(texts)),
        ],
    )
    .map_err(|e: ArrowError| RagError::Arrow(e.to_string()))
}
