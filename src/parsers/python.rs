//! Python parser (§4.2.2).

use tree_sitter::{Node, Parser};

use crate::error::ChunkError;
use crate::model::{Symbol, SymbolKind, Visibility};
use crate::parsers::{collect_parse_errors, end_line, node_text, start_line, LanguageParser, ParseOutput};
use crate::registry::{self, LanguageId};

pub struct PythonParser;

impl LanguageParser for PythonParser {
    fn language_name(&self) -> &'static str {
        "python"
    }

    fn extract(&self, source: &str) -> crate::error::Result<ParseOutput> {
        let mut out = ParseOutput::default();
        let language = registry::grammar_for(LanguageId::Python, false)
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
        "function_definition" => {
            if let Some(sym) = function_symbol(node, source, parent) {
                let name = sym.name.clone();
                symbols.push(sym);
                if let Some(body) = node.child_by_field_name("body") {
                    walk(body, source, &name, symbols);
                }
            }
        }
        "class_definition" => {
            if let Some(sym) = class_symbol(node, source, parent) {
                let name = sym.name.clone();
                symbols.push(sym);
                if let Some(body) = node.child_by_field_name("body") {
                    walk(body, source, &name, symbols);
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

fn function_symbol(node: Node, source: &str, parent: &str) -> Option<Symbol> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, source).to_string();
    let params = node.child_by_field_name("parameters");
    let is_method = params
        .and_then(|p| first_param_name(p, source))
        .is_some_and(|first| first == "self" || first == "cls");
    let kind = if is_method { SymbolKind::Method } else { SymbolKind::Function };
    let signature = params.map(|p| node_text(p, source).to_string());
    Some(Symbol {
        name: name.clone(),
        kind,
        start_line: start_line(node),
        end_line: end_line(node),
        start_byte: node.start_byte() as u32,
        end_byte: node.end_byte() as u32,
        source: node_text(node, source).to_string(),
        signature,
        parent: parent.to_string(),
        visibility: python_visibility(&name),
        doc_string: extract_docstring(node, source),
    })
}

fn class_symbol(node: Node, source: &str, parent: &str) -> Option<Symbol> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, source).to_string();
    let signature = node
        .child_by_field_name("superclasses")
        .map(|s| node_text(s, source).to_string());
    Some(Symbol {
        name: name.clone(),
        kind: SymbolKind::Class,
        start_line: start_line(node),
        end_line: end_line(node),
        start_byte: node.start_byte() as u32,
        end_byte: node.end_byte() as u32,
        source: node_text(node, source).to_string(),
        signature,
        parent: parent.to_string(),
        visibility: python_visibility(&name),
        doc_string: extract_docstring(node, source),
    })
}

fn first_param_name<'a>(params: Node<'a>, source: &'a str) -> Option<&'a str> {
    let mut cursor = params.walk();
    for child in params.children(&mut cursor) {
        match child.kind() {
            "identifier" => return Some(node_text(child, source)),
            "typed_parameter" | "default_parameter" | "typed_default_parameter" => {
                let mut inner = child.walk();
                for grand in child.children(&mut inner) {
                    if grand.kind() == "identifier" {
                        return Some(node_text(grand, source));
                    }
                }
                return None;
            }
            "(" | ")" | "," => continue,
            _ => continue,
        }
    }
    None
}

fn python_visibility(name: &str) -> Visibility {
    if name.starts_with("__") && !name.ends_with("__") {
        Visibility::Private
    } else if name.starts_with('_') {
        Visibility::Protected
    } else {
        Visibility::Public
    }
}

fn extract_docstring(node: Node, source: &str) -> Option<String> {
    let body = node.child_by_field_name("body")?;
    let mut cursor = body.walk();
    let first_stmt = body.named_children(&mut cursor).next()?;
    if first_stmt.kind() != "expression_statement" {
        return None;
    }
    let mut inner = first_stmt.walk();
    let string_node = first_stmt.named_children(&mut inner).next()?;
    if string_node.kind() != "string" {
        return None;
    }
    let raw = node_text(string_node, source);
    Some(strip_docstring(raw))
}

fn strip_docstring(s: &str) -> String {
    let s = s.trim();
    let inner = ["\"\"\"", "'''"]
        .iter()
        .find(|q| s.starts_with(*q) && s.ends_with(*q) && s.len() >= 6)
        .map(|q| &s[q.len()..s.len() - q.len()])
        .or_else(|| {
            ["\"", "'"]
                .iter()
                .find(|q| s.starts_with(*q) && s.ends_with(*q) && s.len() >= 2)
                .map(|q| &s[q.len()..s.len() - q.len()])
        })
        .unwrap_or(s);
    dedent(inner)
}

fn dedent(s: &str) -> String {
    let lines: Vec<&str> = s.lines().collect();
    if lines.len() <= 1 {
        return s.trim().to_string();
    }
    let min_indent = lines[1..]
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);
    let dedented: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, l)| {
            if i == 0 {
                l.trim()
            } else if l.trim().is_empty() {
                ""
            } else {
                &l[min_indent.min(l.len())..]
            }
        })
        .collect();
    dedented.join("\n").trim().to_string()
}

fn extract_imports(root: Node, source: &str) -> Vec<String> {
    let mut imports = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match node.kind() {
            "import_statement" => {
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    if matches!(child.kind(), "dotted_name" | "aliased_import") {
                        let name_node = if child.kind() == "aliased_import" {
                            child.child_by_field_name("name").unwrap_or(child)
                        } else {
                            child
                        };
                        imports.push(node_text(name_node, source).to_string());
                    }
                }
            }
            "import_from_statement" => {
                if let Some(module) = child_after_keyword(node, "module_name") {
                    imports.push(node_text(module, source).to_string());
                }
            }
            _ => {}
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            stack.push(child);
        }
    }
    imports
}

fn child_after_keyword<'a>(node: Node<'a>, field: &str) -> Option<Node<'a>> {
    node.child_by_field_name(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CALC: &str = include_str!("../../testdata/python/calculator.py");

    #[test]
    fn extracts_class_and_methods() {
        let out = PythonParser.extract(CALC).unwrap();
        let calc = out.symbols.iter().find(|s| s.name == "Calculator").unwrap();
        assert_eq!(calc.kind, SymbolKind::Class);
        let helper = out.symbols.iter().find(|s| s.name == "_helper").unwrap();
        assert_eq!(helper.kind, SymbolKind::Method);
        assert_eq!(helper.parent, "Calculator");
        assert_eq!(helper.visibility, Visibility::Protected);
    }

    #[test]
    fn dunder_name_is_private() {
        let out = PythonParser.extract(CALC).unwrap();
        let dunder = out.symbols.iter().find(|s| s.name == "__reset").unwrap();
        assert_eq!(dunder.visibility, Visibility::Private);
    }

    #[test]
    fn module_function_is_public() {
        let out = PythonParser.extract(CALC).unwrap();
        let func = out.symbols.iter().find(|s| s.name == "add").unwrap();
        assert_eq!(func.visibility, Visibility::Public);
        assert_eq!(func.kind, SymbolKind::Function);
        assert_eq!(func.parent, "");
    }

    #[test]
    fn docstring_is_dedented() {
        let out = PythonParser.extract(CALC).unwrap();
        let calc = out.symbols.iter().find(|s| s.name == "Calculator").unwrap();
        assert_eq!(calc.doc_string.as_deref(), Some("A simple running-total calculator."));
    }

    #[test]
    fn imports_cover_both_forms() {
        let out = PythonParser.extract(CALC).unwrap();
        assert!(out.imports.contains(&"math".to_string()));
        assert!(out.imports.contains(&"dataclasses".to_string()));
    }
}
