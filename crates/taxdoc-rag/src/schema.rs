use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

/// Output width of text-embedding-004.
pub const EMBED_DIM: i32 = 768;

pub const CHUNKS_TABLE: &str = "chunks";

fn vector_field() -> Field {
    Field::new(
        "vector",
        DataType::FixedSizeList(
            Arc::new(Field::new("item", DataType::Float32, true)),
            EMBED_DIM,
        ),
        false,
    )
}

pub fn chunks_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("chunk_id", DataType::Utf8, false),
        Field::new("source_file", DataType::Utf8, false),
        vector_field(),
        Field::new("chunk_idx", DataType::UInt16, false),
        Field::new("text", DataType::Utf8, false),
    ]))
}
