//! The chunking pipeline driver (§5, §6): parse → enrich → merge → split →
//! (primary op only) fill gaps → merge → split.

pub mod enrich;
pub mod gapfill;

use std::path::Path;

use crate::config::ChunkConfig;
use crate::error::{ChunkError, Result};
use crate::model::{Chunk, ParseResult};
use crate::parsers::{css::CssParser, go::GoParser, html::HtmlParser, js_ts::JsTsParser, json::JsonParser, markdown::MarkdownParser, python::PythonParser, sql::SqlParser, vue::VueParser, LanguageParser};
use crate::registry::{self, LanguageId};

fn extension_of(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_ascii_lowercase())
}

fn parser_for(language: LanguageId) -> Box<dyn LanguageParser> {
    match language {
        LanguageId::Go => Box::new(GoParser),
        LanguageId::Python => Box::new(PythonParser),
        LanguageId::TypeScript => Box::new(JsTsParser::typescript()),
        LanguageId::JavaScript => Box::new(JsTsParser::javascript()),
        LanguageId::Html => Box::new(HtmlParser),
        LanguageId::Css => Box::new(CssParser),
        LanguageId::Vue => Box::new(VueParser),
        LanguageId::Markdown => Box::new(MarkdownParser),
        LanguageId::Sql => Box::new(SqlParser),
        LanguageId::Json => Box::new(JsonParser),
    }
}

/// Parse `source` (whose path determines the language via its extension)
/// into a `ParseResult`, without chunking.
pub fn parse_file(path: &Path, source: &str) -> Result<ParseResult> {
    let ext = extension_of(path).ok_or_else(|| ChunkError::UnsupportedExtension(String::new()))?;
    let language = registry::lookup(&ext).ok_or_else(|| ChunkError::UnsupportedExtension(ext.clone()))?;

    let parser = parser_for(language);
    let output = parser.extract(source)?;

    let mut metadata = std::collections::HashMap::new();
    if let Some(package) = output.package {
        metadata.insert("package".to_string(), package);
    }

    Ok(ParseResult {
        file_path: path.to_string_lossy().into_owned(),
        language: language.name().to_string(),
        symbols: output.symbols,
        imports: output.imports,
        parse_errors: output.parse_errors,
        metadata,
    })
}

/// Primary operation (§6.1): parse, enrich, and fill gaps so the returned
/// chunks fully cover `source`.
pub fn chunk_file(path: &Path, source: &str, config: &ChunkConfig) -> Result<Vec<Chunk>> {
    let (chunks, _parse) = chunk_file_inner(path, source, config, true)?;
    Ok(chunks)
}

/// Secondary operation (§6.2): same as `chunk_file` but returns the raw
/// `ParseResult` alongside the chunks, and skips the gap filler's second
/// merge/split pass.
pub fn chunk_file_with_parse_result(path: &Path, source: &str, config: &ChunkConfig) -> Result<(Vec<Chunk>, ParseResult)> {
    chunk_file_inner(path, source, config, false)
}

fn chunk_file_inner(path: &Path, source: &str, config: &ChunkConfig, second_pass: bool) -> Result<(Vec<Chunk>, ParseResult)> {
    let parse = parse_file(path, source)?;

    let chunks = enrich::build_chunks(&parse, config);
    let chunks = enrich::merge_pass(chunks, config);
    let chunks = enrich::split_pass(chunks, config);

    let chunks = gapfill::fill_gaps(source, &parse.file_path, &parse.language, chunks, config);

    let chunks = if second_pass {
        let chunks = enrich::merge_pass(chunks, config);
        enrich::split_pass(chunks, config)
    } else {
        chunks
    };

    Ok((chunks, parse))
}
