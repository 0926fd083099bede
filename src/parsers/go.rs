//! Go parser (§4.2.1).

use tree_sitter::{Node, Parser};

use crate::error::ChunkError;
use crate::model::{Symbol, SymbolKind, Visibility};
use crate::parsers::{collect_parse_errors, end_line, node_text, start_line, LanguageParser, ParseOutput};
use crate::registry::{self, LanguageId};
use crate::util::split_lines;

pub struct GoParser;

impl LanguageParser for GoParser {
    fn language_name(&self) -> &'static str {
        "go"
    }

    fn extract(&self, source: &str) -> crate::error::Result<ParseOutput> {
        let mut out = ParseOutput::default();
        let language = registry::grammar_for(LanguageId::Go, false)
            .ok_or_else(|| ChunkError::ParseInitFailure { language: self.language_name().to_string() })?;
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|_| ChunkError::ParseInitFailure { language: self.language_name().to_string() })?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ChunkError::ParseFailure { language: self.language_name().to_string() })?;

        out.parse_errors = collect_parse_errors(tree.root_node());
        out.package = extract_package(tree.root_node(), source);

        let mut cursor = tree.root_node().walk();
        for child in tree.root_node().children(&mut cursor) {
            walk(child, source, &mut out.symbols);
        }
        out.imports = extract_imports(tree.root_node(), source);
        Ok(out)
    }
}

fn extract_package(root: Node, source: &str) -> Option<String> {
    let mut cursor = root.walk();
    for child in root.children(&mut cursor) {
        if child.kind() == "package_clause" {
            let mut pc = child.walk();
            for pkg_child in child.children(&mut pc) {
                if pkg_child.kind() == "package_identifier" {
                    return Some(node_text(pkg_child, source).to_string());
                }
            }
        }
    }
    None
}

fn walk(node: Node, source: &str, symbols: &mut Vec<Symbol>) {
    match node.kind() {
        "function_declaration" => {
            if let Some(sym) = function_symbol(node, source, SymbolKind::Function, "") {
                symbols.push(sym);
            }
        }
        "method_declaration" => {
            let parent = method_receiver(node, source).unwrap_or_default();
            if let Some(sym) = function_symbol(node, source, SymbolKind::Method, &parent) {
                symbols.push(sym);
            }
        }
        "type_declaration" => {
            let mut cursor = node.walk();
            for spec in node.children(&mut cursor) {
                if spec.kind() == "type_spec" {
                    if let Some(sym) = type_spec_symbol(spec, source) {
                        symbols.push(sym);
                    }
                }
            }
        }
        "const_declaration" => {
            symbols.extend(spec_symbols(node, source, "const_spec", SymbolKind::Constant));
        }
        "var_declaration" => {
            symbols.extend(spec_symbols(node, source, "var_spec", SymbolKind::Variable));
        }
        _ => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                walk(child, source, symbols);
            }
        }
    }
}

fn method_receiver(node: Node, source: &str) -> Option<String> {
    let receiver = node.child_by_field_name("receiver")?;
    let mut cursor = receiver.walk();
    for decl in receiver.children(&mut cursor) {
        if decl.kind() == "parameter_declaration" {
            if let Some(ty) = decl.child_by_field_name("type") {
                let text = node_text(ty, source).trim_start_matches('*');
                return Some(text.to_string());
            }
        }
    }
    None
}

fn function_symbol(node: Node, source: &str, kind: SymbolKind, parent: &str) -> Option<Symbol> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, source).to_string();
    let signature = node
        .child_by_field_name("parameters")
        .map(|p| node_text(p, source).to_string());
    let visibility = go_visibility(&name);
    let doc_string = extract_go_doc(source, start_line(node));
    Some(Symbol {
        name,
        kind,
        start_line: start_line(node),
        end_line: end_line(node),
        start_byte: node.start_byte() as u32,
        end_byte: node.end_byte() as u32,
        source: node_text(node, source).to_string(),
        signature,
        parent: parent.to_string(),
        visibility,
        doc_string,
    })
}

fn type_spec_symbol(node: Node, source: &str) -> Option<Symbol> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, source).to_string();
    let ty = node.child_by_field_name("type")?;
    let kind = match ty.kind() {
        "struct_type" => SymbolKind::Struct,
        "interface_type" => SymbolKind::Interface,
        _ => SymbolKind::TypeAlias,
    };
    let visibility = go_visibility(&name);
    let doc_string = extract_go_doc(source, start_line(node));
    Some(Symbol {
        name,
        kind,
        start_line: start_line(node),
        end_line: end_line(node),
        start_byte: node.start_byte() as u32,
        end_byte: node.end_byte() as u32,
        source: node_text(node, source).to_string(),
        signature: Some(node_text(ty, source).to_string()),
        parent: String::new(),
        visibility,
        doc_string,
    })
}

fn spec_symbols(decl: Node, source: &str, spec_kind: &str, kind: SymbolKind) -> Vec<Symbol> {
    let mut symbols = Vec::new();
    let mut cursor = decl.walk();
    let specs: Vec<Node> = decl.children(&mut cursor).filter(|c| c.kind() == spec_kind).collect();
    for spec in specs {
        let mut name_cursor = spec.walk();
        for child in spec.children(&mut name_cursor) {
            if child.kind() == "identifier" {
                let name = node_text(child, source).to_string();
                let visibility = go_visibility(&name);
                let doc_string = extract_go_doc(source, start_line(spec));
                symbols.push(Symbol {
                    name,
                    kind,
                    start_line: start_line(spec),
                    end_line: end_line(spec),
                    start_byte: spec.start_byte() as u32,
                    end_byte: spec.end_byte() as u32,
                    source: node_text(spec, source).to_string(),
                    signature: None,
                    parent: String::new(),
                    visibility,
                    doc_string,
                });
            }
        }
    }
    symbols
}

fn go_visibility(name: &str) -> Visibility {
    match name.chars().next() {
        Some(c) if c.is_ascii_uppercase() => Visibility::Public,
        _ => Visibility::Private,
    }
}

/// Scan backwards, line by line, from the line above `sym_start_line`,
/// collecting contiguous `//`-prefixed lines. A blank line stops the scan.
fn extract_go_doc(source: &str, sym_start_line: u32) -> Option<String> {
    let lines = split_lines(source);
    if sym_start_line < 2 {
        return None;
    }
    let mut collected = Vec::new();
    let mut idx = sym_start_line as i64 - 2; // 0-indexed line above the symbol
    while idx >= 0 {
        let line = lines[idx as usize].trim();
        if line.starts_with("//") {
            collected.push(line.trim_start_matches('/').trim().to_string());
            idx -= 1;
        } else {
            break;
        }
    }
    if collected.is_empty() {
        return None;
    }
    collected.reverse();
    Some(collected.join("\n"))
}

fn extract_imports(root: Node, source: &str) -> Vec<String> {
    let mut imports = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.kind() == "import_spec" {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                if child.kind() == "interpreted_string_literal" {
                    let text = node_text(child, source);
                    imports.push(text.trim_matches('"').to_string());
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

    const GREET: &str = include_str!("../../testdata/go/greet.go");

    #[test]
    fn extracts_top_level_symbols() {
        let out = GoParser.extract(GREET).unwrap();
        let names: Vec<&str> = out.symbols.iter().map(|s| s.name.as_str()).collect();
        assert!(names.contains(&"Greet"), "names: {names:?}");
        assert!(names.contains(&"greeting"), "names: {names:?}");
        assert!(names.contains(&"Greeter"), "names: {names:?}");
    }

    #[test]
    fn method_parent_strips_pointer_receiver() {
        let out = GoParser.extract(GREET).unwrap();
        let method = out
            .symbols
            .iter()
            .find(|s| s.name == "SayHello")
            .expect("SayHello method present");
        assert_eq!(method.parent, "Greeter");
        assert_eq!(method.kind, SymbolKind::Method);
    }

    #[test]
    fn visibility_follows_first_letter_case() {
        let out = GoParser.extract(GREET).unwrap();
        let greet = out.symbols.iter().find(|s| s.name == "Greet").unwrap();
        assert_eq!(greet.visibility, Visibility::Public);
        let helper = out.symbols.iter().find(|s| s.name == "reverse").unwrap();
        assert_eq!(helper.visibility, Visibility::Private);
    }

    #[test]
    fn doc_comment_is_collected() {
        let out = GoParser.extract(GREET).unwrap();
        let greet = out.symbols.iter().find(|s| s.name == "Greet").unwrap();
        assert!(greet.doc_string.as_deref().unwrap_or("").contains("Greet returns"));
    }

    #[test]
    fn package_name_is_extracted() {
        let out = GoParser.extract(GREET).unwrap();
        assert_eq!(out.package.as_deref(), Some("greet"));
    }

    #[test]
    fn const_doc_comment_is_collected() {
        let out = GoParser.extract(GREET).unwrap();
        let greeting = out.symbols.iter().find(|s| s.name == "greeting").unwrap();
        assert!(greeting.doc_string.as_deref().unwrap_or("").contains("default salutation"));
    }
}
