//! TypeScript/JavaScript parser (§4.2.3). One implementation parameterized
//! by `is_typescript`, selecting the TS or JS grammar (and, for Vue's
//! `<script lang="...">`, the TSX grammar when requested).

use tree_sitter::{Node, Parser};

use crate::error::ChunkError;
use crate::model::{Symbol, SymbolKind, Visibility};
use crate::parsers::{collect_parse_errors, end_line, node_text, start_line, LanguageParser, ParseOutput};
use crate::registry::{self, LanguageId};

pub struct JsTsParser {
    pub is_typescript: bool,
    /// When true and `is_typescript`, select the TSX grammar variant.
    pub tsx: bool,
}

impl JsTsParser {
    pub fn javascript() -> Self {
        Self { is_typescript: false, tsx: false }
    }

    pub fn typescript() -> Self {
        Self { is_typescript: true, tsx: false }
    }

    pub fn tsx() -> Self {
        Self { is_typescript: true, tsx: true }
    }
}

impl LanguageParser for JsTsParser {
    fn language_name(&self) -> &'static str {
        if self.is_typescript {
            "typescript"
        } else {
            "javascript"
        }
    }

    fn extract(&self, source: &str) -> crate::error::Result<ParseOutput> {
        let mut out = ParseOutput::default();
        let id = if self.is_typescript {
            LanguageId::TypeScript
        } else {
            LanguageId::JavaScript
        };
        let language = registry::grammar_for(id, self.tsx)
            .ok_or_else(|| ChunkError::ParseInitFailure { language: self.language_name().to_string() })?;
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|_| ChunkError::ParseInitFailure { language: self.language_name().to_string() })?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ChunkError::ParseFailure { language: self.language_name().to_string() })?;

        out.parse_errors = collect_parse_errors(tree.root_node());
        let lang_name = self.language_name();
        walk(tree.root_node(), source, "", lang_name, &mut out.symbols);
        out.imports = extract_imports(tree.root_node(), source);
        Ok(out)
    }
}

fn walk(node: Node, source: &str, parent: &str, lang: &str, symbols: &mut Vec<Symbol>) {
    match node.kind() {
        "function_declaration" | "generator_function_declaration" => {
            if let Some(sym) = function_symbol(node, source, parent, lang, SymbolKind::Function) {
                symbols.push(sym);
            }
        }
        "class_declaration" => {
            if let Some(sym) = class_symbol(node, source, parent, lang) {
                let name = sym.name.clone();
                symbols.push(sym);
                if let Some(body) = node.child_by_field_name("body") {
                    let mut cursor = body.walk();
                    for child in body.children(&mut cursor) {
                        if child.kind() == "method_definition" {
                            if let Some(m) = function_symbol(child, source, &name, lang, SymbolKind::Method) {
                                symbols.push(m);
                            }
                        }
                    }
                }
            }
        }
        "method_definition" => {
            if let Some(sym) = function_symbol(node, source, parent, lang, SymbolKind::Method) {
                symbols.push(sym);
            }
        }
        "interface_declaration" => {
            if let Some(sym) = interface_symbol(node, source, parent, lang) {
                symbols.push(sym);
            }
        }
        "lexical_declaration" | "variable_declaration" => {
            symbols.extend(variable_function_symbols(node, source, parent, lang));
        }
        "export_statement" => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                walk(child, source, parent, lang, symbols);
            }
        }
        _ => {
            let mut cursor = node.walk();
            for child in node.children(&mut cursor) {
                walk(child, source, parent, lang, symbols);
            }
        }
    }
}

fn function_symbol(node: Node, source: &str, parent: &str, lang: &str, kind: SymbolKind) -> Option<Symbol> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, source).to_string();
    let signature = build_signature(node, source);
    let visibility = ts_visibility(node, source, lang);
    let doc_string = extract_doc(node, source, lang);
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

fn class_symbol(node: Node, source: &str, parent: &str, lang: &str) -> Option<Symbol> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, source).to_string();
    let doc_string = extract_doc(node, source, lang);
    Some(Symbol {
        name,
        kind: SymbolKind::Class,
        start_line: start_line(node),
        end_line: end_line(node),
        start_byte: node.start_byte() as u32,
        end_byte: node.end_byte() as u32,
        source: node_text(node, source).to_string(),
        signature: None,
        parent: parent.to_string(),
        visibility: Visibility::Public,
        doc_string,
    })
}

fn interface_symbol(node: Node, source: &str, parent: &str, lang: &str) -> Option<Symbol> {
    let name_node = node.child_by_field_name("name")?;
    let name = node_text(name_node, source).to_string();
    let signature = node.child_by_field_name("body").map(|b| node_text(b, source).to_string());
    let doc_string = extract_doc(node, source, lang);
    Some(Symbol {
        name,
        kind: SymbolKind::Interface,
        start_line: start_line(node),
        end_line: end_line(node),
        start_byte: node.start_byte() as u32,
        end_byte: node.end_byte() as u32,
        source: node_text(node, source).to_string(),
        signature,
        parent: parent.to_string(),
        visibility: Visibility::Public,
        doc_string,
    })
}

/// Variable declarators whose initializer is an arrow function or a function
/// expression are promoted to `function` kind (§4.2.3).
fn variable_function_symbols(decl: Node, source: &str, parent: &str, lang: &str) -> Vec<Symbol> {
    let mut out = Vec::new();
    let mut cursor = decl.walk();
    for declarator in decl.children(&mut cursor) {
        if declarator.kind() != "variable_declarator" {
            continue;
        }
        let Some(name_node) = declarator.child_by_field_name("name") else { continue };
        let Some(value) = declarator.child_by_field_name("value") else { continue };
        if !matches!(value.kind(), "arrow_function" | "function" | "function_expression" | "generator_function") {
            continue;
        }
        let name = node_text(name_node, source).to_string();
        let signature = build_signature(value, source);
        out.push(Symbol {
            name,
            kind: SymbolKind::Function,
            start_line: start_line(declarator),
            end_line: end_line(declarator),
            start_byte: declarator.start_byte() as u32,
            end_byte: declarator.end_byte() as u32,
            source: node_text(declarator, source).to_string(),
            signature,
            parent: parent.to_string(),
            visibility: Visibility::Public,
            doc_string: extract_doc(decl, source, lang),
        });
    }
    out
}

fn build_signature(node: Node, source: &str) -> Option<String> {
    let params = node.child_by_field_name("parameters")?;
    let mut sig = node_text(params, source).to_string();
    if let Some(ret) = node.child_by_field_name("return_type") {
        sig.push_str(": ");
        sig.push_str(node_text(ret, source));
    }
    Some(sig)
}

fn ts_visibility(node: Node, source: &str, lang: &str) -> Visibility {
    if lang != "typescript" {
        return Visibility::Public;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "accessibility_modifier" {
            return match node_text(child, source) {
                "private" => Visibility::Private,
                "protected" => Visibility::Protected,
                _ => Visibility::Public,
            };
        }
    }
    Visibility::Public
}

/// Try a `/** ... */` block immediately preceding the node; fall back to
/// contiguous `//` line comments.
fn extract_doc(node: Node, source: &str, _lang: &str) -> Option<String> {
    // `export function f() {}` nests the declaration inside an
    // `export_statement`; the doc comment precedes the statement, not the
    // declaration itself.
    let anchor = match node.parent() {
        Some(p) if p.kind() == "export_statement" => p,
        _ => node,
    };
    let mut sib = anchor.prev_named_sibling();
    if let Some(s) = sib {
        if s.kind() == "comment" {
            let raw = node_text(s, source).trim();
            if raw.starts_with("/**") {
                return Some(strip_block_comment(raw));
            }
        }
    }

    let mut lines = Vec::new();
    while let Some(s) = sib {
        if s.kind() != "comment" {
            break;
        }
        let raw = node_text(s, source).trim();
        if !raw.starts_with("//") {
            break;
        }
        lines.push(raw.trim_start_matches('/').trim().to_string());
        sib = s.prev_named_sibling();
    }
    if lines.is_empty() {
        return None;
    }
    lines.reverse();
    Some(lines.join("\n"))
}

fn strip_block_comment(raw: &str) -> String {
    let inner = raw.strip_prefix("/**").unwrap_or(raw);
    let inner = inner.strip_suffix("*/").unwrap_or(inner);
    inner
        .lines()
        .map(|l| {
            let s = l.trim();
            s.strip_prefix('*').unwrap_or(s).trim()
        })
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn extract_imports(root: Node, source: &str) -> Vec<String> {
    let mut imports = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match node.kind() {
            "import_statement" => {
                if let Some(src) = node.child_by_field_name("source") {
                    imports.push(node_text(src, source).trim_matches(|c| c == '"' || c == '\'').to_string());
                }
            }
            "call_expression" => {
                if let Some(func) = node.child_by_field_name("function") {
                    if node_text(func, source) == "require" {
                        if let Some(args) = node.child_by_field_name("arguments") {
                            let mut cursor = args.walk();
                            if let Some(arg) = args.named_children(&mut cursor).next() {
                                if arg.kind() == "string" {
                                    imports.push(
                                        node_text(arg, source)
                                            .trim_matches(|c| c == '"' || c == '\'')
                                            .to_string(),
                                    );
                                }
                            }
                        }
                    }
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

#[cfg(test)]
mod tests {
    use super::*;

    const TS_SRC: &str = include_str!("../../testdata/ts/validation.ts");
    const JS_SRC: &str = include_str!("../../testdata/js/dom.js");

    #[test]
    fn typescript_extracts_function_class_and_arrow() {
        let out = JsTsParser::typescript().extract(TS_SRC).unwrap();
        let names: Vec<&str> = out.symbols.iter().map(|s| s.name.as_str()).collect();
        assert!(names.contains(&"validateEmail"), "{names:?}");
        assert!(names.contains(&"formatDate"), "{names:?}");
        assert!(names.contains(&"User"), "{names:?}");
        let user = out.symbols.iter().find(|s| s.name == "User").unwrap();
        assert_eq!(user.kind, SymbolKind::Interface);
    }

    #[test]
    fn typescript_private_method_detected() {
        let out = JsTsParser::typescript().extract(TS_SRC).unwrap();
        let m = out.symbols.iter().find(|s| s.name == "normalize").unwrap();
        assert_eq!(m.visibility, Visibility::Private);
        assert_eq!(m.parent, "Validator");
    }

    #[test]
    fn javascript_arrow_function_promoted() {
        let out = JsTsParser::javascript().extract(JS_SRC).unwrap();
        let debounce = out.symbols.iter().find(|s| s.name == "debounce").unwrap();
        assert_eq!(debounce.kind, SymbolKind::Function);
    }

    #[test]
    fn javascript_doc_comment_extracted() {
        let out = JsTsParser::javascript().extract(JS_SRC).unwrap();
        let group_by = out.symbols.iter().find(|s| s.name == "groupBy").unwrap();
        assert!(group_by.doc_string.is_some());
    }

    #[test]
    fn imports_cover_statement_and_require() {
        let out = JsTsParser::javascript().extract(JS_SRC).unwrap();
        assert!(out.imports.iter().any(|i| i == "node:assert" || i == "./util"));
    }
}
