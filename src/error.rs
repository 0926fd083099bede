use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChunkError>;

/// Errors the chunker can raise. Recoverable syntax errors inside an
/// otherwise-parseable file are *not* represented here — they are
/// non-fatal and collected into `ParseResult::parse_errors` instead
/// (see `model::ParseError`).
#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("unsupported file extension: {0:?}")]
    UnsupportedExtension(String),

    #[error("failed to bind grammar for language {language}")]
    ParseInitFailure { language: String },

    #[error("grammar returned no parse tree for language {language}")]
    ParseFailure { language: String },

    #[error("configuration error: {0}")]
    Config(String),
}
