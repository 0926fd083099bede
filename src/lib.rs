//! `chunkwise`: a semantic code chunker. Parses source files across ten
//! languages into a flat symbol tree, then enriches, merges, splits, and
//! gap-fills the result into size-balanced `Chunk`s suitable for an
//! embedding/retrieval pipeline.

pub mod chunker;
pub mod config;
pub mod error;
pub mod model;
pub mod parsers;
pub mod registry;
pub mod util;
pub mod walker;

pub use chunker::{chunk_file, chunk_file_with_parse_result, parse_file};
pub use config::ChunkConfig;
pub use error::{ChunkError, Result};
pub use model::{Chunk, ParseResult, Symbol, SymbolKind};
pub use registry::{is_supported, supported_extensions};
