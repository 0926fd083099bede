//! CSS parser (§4.2.5).

use tree_sitter::{Node, Parser};

use crate::error::ChunkError;
use crate::model::{Symbol, SymbolKind, Visibility};
use crate::parsers::{collect_parse_errors, end_line, first_child_of_kind, node_text, start_line, LanguageParser, ParseOutput};
use crate::registry::{self, LanguageId};

pub struct CssParser;

impl LanguageParser for CssParser {
    fn language_name(&self) -> &'static str {
        "css"
    }

    fn extract(&self, source: &str) -> crate::error::Result<ParseOutput> {
        let mut out = ParseOutput::default();
        let language = registry::grammar_for(LanguageId::Css, false)
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
        out.imports = extract_imports(tree.root_node(), source);
        Ok(out)
    }
}

fn walk(node: Node, source: &str, parent: &str, symbols: &mut Vec<Symbol>) {
    match node.kind() {
        "rule_set" => {
            if let Some(sym) = container_symbol(node, source, parent, SymbolKind::Rule) {
                let name = sym.name.clone();
                symbols.push(sym);
                if let Some(block) = first_child_of_kind(&node, &["block"]) {
                    let mut cursor = block.walk();
                    for child in block.children(&mut cursor) {
                        walk(child, source, &name, symbols);
                    }
                }
            }
        }
        "media_statement" => {
            if let Some(sym) = container_symbol(node, source, parent, SymbolKind::Media) {
                let name = sym.name.clone();
                symbols.push(sym);
                if let Some(block) = first_child_of_kind(&node, &["block"]) {
                    let mut cursor = block.walk();
                    for child in block.children(&mut cursor) {
                        walk(child, source, &name, symbols);
                    }
                }
            }
        }
        "keyframes_statement" => {
            if let Some(sym) = container_symbol(node, source, parent, SymbolKind::Keyframes) {
                symbols.push(sym);
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

/// `name` is everything between the node's start and its `block` child's
/// start, trimmed: selectors verbatim for a rule, `@media <query>` for a
/// media statement, `@keyframes <identifier>` for keyframes.
fn container_symbol(node: Node, source: &str, parent: &str, kind: SymbolKind) -> Option<Symbol> {
    let block = first_child_of_kind(&node, &["block"]);
    let name_end = block.map(|b| b.start_byte()).unwrap_or(node.end_byte());
    let name = source[node.start_byte()..name_end].trim().to_string();
    if name.is_empty() {
        return None;
    }
    Some(Symbol {
        name,
        kind,
        start_line: start_line(node),
        end_line: end_line(node),
        start_byte: node.start_byte() as u32,
        end_byte: node.end_byte() as u32,
        source: node_text(node, source).to_string(),
        signature: None,
        parent: parent.to_string(),
        visibility: Visibility::Public,
        doc_string: None,
    })
}

fn extract_imports(root: Node, source: &str) -> Vec<String> {
    let mut imports = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.kind() == "import_statement" {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                match child.kind() {
                    "string_value" => {
                        imports.push(node_text(child, source).trim_matches(|c| c == '"' || c == '\'').to_string());
                    }
                    "call_expression" => {
                        let text = node_text(child, source);
                        if let Some(inner) = text.strip_prefix("url(").and_then(|s| s.strip_suffix(')')) {
                            imports.push(inner.trim_matches(|c| c == '"' || c == '\'').to_string());
                        }
                    }
                    _ => {}
                }
            }
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            stack.push(child);
        }
    }
    imports
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = include_str!("../../testdata/css/theme.css");

    #[test]
    fn rule_name_is_verbatim_selector() {
        let out = CssParser.extract(STYLES).unwrap();
        assert!(out.symbols.iter().any(|s| s.name == ".button" && s.kind == SymbolKind::Rule));
    }

    #[test]
    fn media_and_keyframes_are_extracted() {
        let out = CssParser.extract(STYLES).unwrap();
        assert!(out.symbols.iter().any(|s| s.kind == SymbolKind::Media && s.name.starts_with("@media")));
        assert!(out.symbols.iter().any(|s| s.kind == SymbolKind::Keyframes && s.name.contains("spin")));
    }

    #[test]
    fn nested_rule_inside_media_gets_parent() {
        let out = CssParser.extract(STYLES).unwrap();
        let media = out.symbols.iter().find(|s| s.kind == SymbolKind::Media).unwrap();
        let nested = out.symbols.iter().find(|s| s.name == ".button" && s.parent == media.name);
        assert!(nested.is_some());
    }

    #[test]
    fn import_urls_are_unwrapped() {
        let out = CssParser.extract(STYLES).unwrap();
        assert!(out.imports.iter().any(|i| i == "reset.css"));
    }
}
