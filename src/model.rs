//! The data model shared by every stage of the pipeline: `Symbol` (raw parser
//! output), `ParseResult` (per-file parser output), and `Chunk` (enriched,
//! size-balanced pipeline output).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Tagged kind of a raw extracted symbol.
///
/// A tagged enum is preferred here over a bare string tag so that callers
/// pattern-match exhaustively instead of comparing against magic strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Function,
    Method,
    Class,
    Struct,
    Interface,
    Variable,
    Constant,
    Import,
    Comment,
    Module,
    Namespace,
    Enum,
    TypeAlias,
    Element,
    Script,
    Style,
    Rule,
    Media,
    Keyframes,
    Heading,
    CodeBlock,
    Link,
    SqlStatement,
    /// Synthetic: material filled in by the gap filler with no parsed symbol.
    Text,
    /// Synthetic: whole-file fallback chunk when no symbols survive enrichment.
    File,
    /// Synthetic: a chunk formed by merging two or more symbol chunks.
    Group,
}

impl SymbolKind {
    /// Container kinds that, per §4.3, are suppressed from chunking when
    /// their byte range strictly encloses another symbol's.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            SymbolKind::Element
                | SymbolKind::Script
                | SymbolKind::Style
                | SymbolKind::Rule
                | SymbolKind::Media
                | SymbolKind::Keyframes
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

/// A raw item extracted from a parse tree, in source (pre-order) order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// 1-indexed, inclusive.
    pub start_line: u32,
    /// 1-indexed, inclusive.
    pub end_line: u32,
    /// 0-indexed, inclusive.
    pub start_byte: u32,
    /// 0-indexed, exclusive.
    pub end_byte: u32,
    pub source: String,
    /// Language-specific: parameter list, heading level, CSS selector,
    /// JSON value literal, SQL statement text.
    pub signature: Option<String>,
    /// Name of the logical parent symbol, or empty if top-level. A name
    /// reference, not an ownership link — resolved by lookup when needed.
    pub parent: String,
    pub visibility: Visibility,
    pub doc_string: Option<String>,
}

impl Symbol {
    pub fn byte_range(&self) -> std::ops::Range<u32> {
        self.start_byte..self.end_byte
    }

    /// True if `self`'s byte range strictly encloses `other`'s (used by the
    /// container-with-children suppression rule in §4.3).
    pub fn strictly_encloses(&self, other: &Symbol) -> bool {
        self.start_byte <= other.start_byte
            && self.end_byte >= other.end_byte
            && (self.start_byte, self.end_byte) != (other.start_byte, other.end_byte)
    }
}

/// A single parse error recovered from the tree (one per `ERROR` node).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseError {
    pub line: u32,
    pub column: u32,
    pub message: String,
}

/// Per-file output of a language parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
    pub file_path: String,
    pub language: String,
    pub symbols: Vec<Symbol>,
    pub imports: Vec<String>,
    pub parse_errors: Vec<ParseError>,
    pub metadata: HashMap<String, String>,
}

/// A `{name, kind}` pair recorded for every symbol folded into a chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolRef {
    pub name: String,
    pub kind: SymbolKind,
}

/// An enriched, size-balanced output unit of the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Rendered metadata header + doc string + source.
    pub content: String,
    /// Raw substring of the file for this chunk (before rendering).
    pub source_code: String,

    pub file_path: String,
    pub start_line: u32,
    pub end_line: u32,
    /// 0 means "unknown" (invalidated by a split, or extended by gap-fill
    /// comment attachment on the side that isn't recomputed).
    pub start_byte: u32,
    pub end_byte: u32,

    pub language: String,
    pub symbol_name: String,
    pub symbol_kind: SymbolKind,
    pub parent: String,
    pub signature: Option<String>,
    pub visibility: Visibility,
    /// All symbols folded into this chunk, in input order. Length 0 for
    /// gap-filled `text`/`file` chunks that never had a source symbol length
    /// 1 for a chunk built from a single symbol, >1 once merged.
    pub symbols: Vec<SymbolRef>,

    pub package_name: Option<String>,
    pub imports: Vec<String>,
    pub doc_string: Option<String>,

    pub token_count: u32,
    pub is_collapsed: bool,
}

impl Chunk {
    pub fn line_count(&self) -> u32 {
        self.end_line - self.start_line + 1
    }
}
