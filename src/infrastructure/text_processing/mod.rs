mod paragraph_chunker;

pub use paragraph_chunker::{DEFAULT_CHUNK_MAX_CHARS, ParagraphChunker, chunk_content};
