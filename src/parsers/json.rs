//! JSON parser (§4.2.9).
//!
//! Every `pair` is recorded as a `constant` symbol. Nested pairs get a
//! non-empty `parent`, so the enricher's local-declarations filter (drop
//! `variable`/`constant` symbols with a non-empty `parent`) naturally limits
//! surfaced chunks to top-level keys without any JSON-specific filtering.

use tree_sitter::{Node, Parser};

use crate::error::ChunkError;
use crate::model::{Symbol, SymbolKind, Visibility};
use crate::parsers::{collect_parse_errors, end_line, node_text, start_line, LanguageParser, ParseOutput};
use crate::registry::{self, LanguageId};

pub struct JsonParser;

impl LanguageParser for JsonParser {
    fn language_name(&self) -> &'static str {
        "json"
    }

    fn extract(&self, source: &str) -> crate::error::Result<ParseOutput> {
        let mut out = ParseOutput::default();
        let language = registry::grammar_for(LanguageId::Json, false)
            .ok_or_else(|| ChunkError::ParseInitFailure { language: self.language_name().to_string() })?;
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|_| ChunkError::ParseInitFailure { language: self.language_name().to_string() })?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ChunkError::ParseFailure { language: self.language_name().to_string() })?;

        out.parse_errors = collect_parse_errors(tree.root_node());
        walk(tree.root_node(), source, "", &mut out.symbols);
        Ok(out)
    }
}

fn walk(node: Node, source: &str, parent: &str, symbols: &mut Vec<Symbol>) {
    match node.kind() {
        "pair" => {
            if let Some(sym) = pair_symbol(node, source, parent) {
                let name = sym.name.clone();
                symbols.push(sym);
                if let Some(value) = node.child_by_field_name("value") {
                    walk(value, source, &name, symbols);
                }
            }
        }
        _ => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                walk(child, source, parent, symbols);
            }
        }
    }
}

fn pair_symbol(node: Node, source: &str, parent: &str) -> Option<Symbol> {
    let key_node = node.child_by_field_name("key")?;
    let key_raw = node_text(key_node, source);
    let name = key_raw.trim_matches('"').to_string();
    let value = node.child_by_field_name("value")?;
    Some(Symbol {
        name,
        kind: SymbolKind::Constant,
        start_line: start_line(node),
        end_line: end_line(node),
        start_byte: node.start_byte() as u32,
        end_byte: node.end_byte() as u32,
        source: node_text(node, source).to_string(),
        signature: Some(node_text(value, source).to_string()),
        parent: parent.to_string(),
        visibility: Visibility::Public,
        doc_string: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = include_str!("../../testdata/json/config.json");

    #[test]
    fn top_level_keys_have_empty_parent() {
        let out = JsonParser.extract(CONFIG).unwrap();
        let name = out.symbols.iter().find(|s| s.name == "name").unwrap();
        assert_eq!(name.parent, "");
        assert_eq!(name.kind, SymbolKind::Constant);
    }

    #[test]
    fn nested_keys_inherit_enclosing_key_as_parent() {
        let out = JsonParser.extract(CONFIG).unwrap();
        let port = out.symbols.iter().find(|s| s.name == "port").unwrap();
        assert_eq!(port.parent, "server");
    }

    #[test]
    fn signature_is_verbatim_value_text() {
        let out = JsonParser.extract(CONFIG).unwrap();
        let port = out.symbols.iter().find(|s| s.name == "port").unwrap();
        assert_eq!(port.signature.as_deref(), Some("8080"));
    }
}
