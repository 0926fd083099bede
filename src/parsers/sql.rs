//! SQL parser (§4.2.8). Grammars vary in how finely they split statement
//! kinds (`create_table` vs. a generic `create` node wrapped in `statement`),
//! so verb lookup covers both the expanded and shorthand forms.

use tree_sitter::{Node, Parser};

use crate::error::ChunkError;
use crate::model::{Symbol, SymbolKind, Visibility};
use crate::parsers::{collect_parse_errors, end_line, first_child_of_kind, node_text, start_line, LanguageParser, ParseOutput};
use crate::registry::{self, LanguageId};

pub struct SqlParser;

impl LanguageParser for SqlParser {
    fn language_name(&self) -> &'static str {
        "sql"
    }

    fn extract(&self, source: &str) -> crate::error::Result<ParseOutput> {
        let mut out = ParseOutput::default();
        let language = registry::grammar_for(LanguageId::Sql, false)
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
        "statement" => {
            if let Some(select) = first_child_of_kind(&node, &["select"]) {
                let _ = select;
                if let Some(sym) = statement_symbol(node, source, parent, "SELECT") {
                    symbols.push(sym);
                }
                return;
            }
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                walk(child, source, parent, symbols);
            }
        }
        "transaction" | "block" => {
            let name = node.kind().to_uppercase();
            symbols.push(Symbol {
                name: name.clone(),
                kind: SymbolKind::SqlStatement,
                start_line: start_line(node),
                end_line: end_line(node),
                start_byte: node.start_byte() as u32,
                end_byte: node.end_byte() as u32,
                source: node_text(node, source).to_string(),
                signature: Some(node_text(node, source).to_string()),
                parent: parent.to_string(),
                visibility: Visibility::Public,
                doc_string: None,
            });
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                walk(child, source, &name, symbols);
            }
        }
        kind => {
            if let Some(verb) = verb_for(kind) {
                if let Some(sym) = statement_symbol(node, source, parent, verb) {
                    symbols.push(sym);
                    return;
                }
            }
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                walk(child, source, parent, symbols);
            }
        }
    }
}

fn statement_symbol(node: Node, source: &str, parent: &str, verb: &str) -> Option<Symbol> {
    let object = find_object_reference(node).map(|n| node_text(n, source).to_string());
    let name = match object {
        Some(obj) if !obj.is_empty() => format!("{verb} {obj}"),
        _ => verb.to_string(),
    };
    let text = node_text(node, source).to_string();
    Some(Symbol {
        name,
        kind: SymbolKind::SqlStatement,
        start_line: start_line(node),
        end_line: end_line(node),
        start_byte: node.start_byte() as u32,
        end_byte: node.end_byte() as u32,
        source: text.clone(),
        signature: Some(text),
        parent: parent.to_string(),
        visibility: Visibility::Public,
        doc_string: None,
    })
}

fn find_object_reference(node: Node) -> Option<Node> {
    if node.kind() == "object_reference" {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = find_object_reference(child) {
            return Some(found);
        }
    }
    None
}

fn verb_for(kind: &str) -> Option<&'static str> {
    Some(match kind {
        "create_table" => "CREATE TABLE",
        "create_index" => "CREATE INDEX",
        "create_view" => "CREATE VIEW",
        "create" => "CREATE",
        "drop_table" => "DROP TABLE",
        "drop_index" => "DROP INDEX",
        "drop" => "DROP",
        "alter_table" => "ALTER TABLE",
        "alter" => "ALTER",
        "select" => "SELECT",
        "insert" => "INSERT",
        "update" => "UPDATE",
        "delete" => "DELETE",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = include_str!("../../testdata/sql/schema.sql");

    #[test]
    fn create_table_name_includes_object() {
        let out = SqlParser.extract(SCHEMA).unwrap();
        assert!(out.symbols.iter().any(|s| s.name.starts_with("CREATE TABLE") && s.name.contains("users")));
    }

    #[test]
    fn select_and_insert_are_extracted() {
        let out = SqlParser.extract(SCHEMA).unwrap();
        assert!(out.symbols.iter().any(|s| s.name.starts_with("SELECT")));
        assert!(out.symbols.iter().any(|s| s.name.starts_with("INSERT")));
    }

    #[test]
    fn no_imports_are_produced() {
        let out = SqlParser.extract(SCHEMA).unwrap();
        assert!(out.imports.is_empty());
    }
}
