//! Language parsers: each walks a concrete syntax tree and emits a flat,
//! pre-order `Symbol` list plus an `import` list (§4.2).

pub mod css;
pub mod go;
pub mod html;
pub mod json;
pub mod js_ts;
pub mod markdown;
pub mod python;
pub mod sql;
pub mod vue;

use tree_sitter::Node;

use crate::error::Result;
use crate::model::{ParseError, Symbol};

/// Capability every language parser exposes (§4.2). `extract` owns tree
/// construction and teardown for the call — the returned lists are fully
/// detached from the tree, which is dropped before `extract` returns. A
/// grammar that fails to bind or a tree-sitter parse that returns no tree
/// is a fatal `ChunkError` (§7), not an empty `ParseOutput`.
pub trait LanguageParser {
    fn language_name(&self) -> &'static str;
    fn extract(&self, source: &str) -> Result<ParseOutput>;
}

#[derive(Debug, Default)]
pub struct ParseOutput {
    pub symbols: Vec<Symbol>,
    pub imports: Vec<String>,
    pub parse_errors: Vec<ParseError>,
    pub package: Option<String>,
}

/// UTF-8 text of `node` within `source`. Tree-sitter byte ranges are always
/// valid UTF-8 boundaries for well-formed input.
pub fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    &source[node.byte_range()]
}

pub fn start_line(node: Node) -> u32 {
    node.start_position().row as u32 + 1
}

pub fn end_line(node: Node) -> u32 {
    node.end_position().row as u32 + 1
}

/// Walk the whole tree collecting one `ParseError` per `ERROR`-kind node
/// (§7: `ParseErrors` is non-fatal and recorded per `ERROR` node).
pub fn collect_parse_errors(root: Node) -> Vec<ParseError> {
    let mut errors = Vec::new();
    let mut cursor = root.walk();
    collect_parse_errors_rec(root, &mut cursor, &mut errors);
    errors
}

fn collect_parse_errors_rec(node: Node, cursor: &mut tree_sitter::TreeCursor, errors: &mut Vec<ParseError>) {
    if node.is_error() {
        let pos = node.start_position();
        errors.push(ParseError {
            line: pos.row as u32 + 1,
            column: pos.column as u32,
            message: format!("syntax error near {:?}", node.kind()),
        });
    }
    if cursor.goto_first_child() {
        loop {
            collect_parse_errors_rec(cursor.node(), cursor, errors);
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }
}

/// First child of `node` whose kind is one of `kinds`.
pub fn first_child_of_kind<'a>(node: &Node<'a>, kinds: &[&str]) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| kinds.contains(&c.kind()))
}
