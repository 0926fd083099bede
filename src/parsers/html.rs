//! HTML parser (§4.2.4).

use tree_sitter::{Node, Parser};

use crate::error::ChunkError;
use crate::model::{Symbol, SymbolKind, Visibility};
use crate::parsers::{collect_parse_errors, end_line, first_child_of_kind, node_text, start_line, LanguageParser, ParseOutput};
use crate::registry::{self, LanguageId};

pub struct HtmlParser;

impl LanguageParser for HtmlParser {
    fn language_name(&self) -> &'static str {
        "html"
    }

    fn extract(&self, source: &str) -> crate::error::Result<ParseOutput> {
        let mut out = ParseOutput::default();
        let language = registry::grammar_for(LanguageId::Html, false)
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
        "element" => {
            if let Some(sym) = element_symbol(node, source, parent, SymbolKind::Element) {
                let name = sym.name.clone();
                symbols.push(sym);
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    if matches!(child.kind(), "start_tag" | "end_tag" | "self_closing_tag") {
                        continue;
                    }
                    walk(child, source, &name, symbols);
                }
            }
        }
        "script_element" => {
            if let Some(sym) = element_symbol(node, source, parent, SymbolKind::Script) {
                symbols.push(sym);
            }
        }
        "style_element" => {
            if let Some(sym) = element_symbol(node, source, parent, SymbolKind::Style) {
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

fn element_symbol(node: Node, source: &str, parent: &str, kind: SymbolKind) -> Option<Symbol> {
    let tag_node = first_child_of_kind(&node, &["start_tag", "self_closing_tag"])?;
    let tag_name_node = first_child_of_kind(&tag_node, &["tag_name"])?;
    let tag_name = node_text(tag_name_node, source).to_string();
    let attrs = attributes(tag_node, source);
    let id_suffix = attrs
        .iter()
        .find(|(k, _)| k == "id")
        .map(|(_, v)| format!("#{v}"))
        .unwrap_or_default();
    let signature = attrs
        .iter()
        .map(|(k, v)| format!("{k}='{v}'"))
        .collect::<Vec<_>>()
        .join(" ");
    Some(Symbol {
        name: format!("{tag_name}{id_suffix}"),
        kind,
        start_line: start_line(node),
        end_line: end_line(node),
        start_byte: node.start_byte() as u32,
        end_byte: node.end_byte() as u32,
        source: node_text(node, source).to_string(),
        signature: if signature.is_empty() { None } else { Some(signature) },
        parent: parent.to_string(),
        visibility: Visibility::Public,
        doc_string: None,
    })
}

fn attributes(tag_node: Node, source: &str) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    let mut cursor = tag_node.walk();
    for attr in tag_node.children(&mut cursor) {
        if attr.kind() != "attribute" {
            continue;
        }
        let Some(name_node) = first_child_of_kind(&attr, &["attribute_name"]) else { continue };
        let name = node_text(name_node, source).to_string();
        let value = first_child_of_kind(&attr, &["quoted_attribute_value", "attribute_value"])
            .map(|v| attribute_value_text(v, source))
            .unwrap_or_default();
        attrs.push((name, value));
    }
    attrs
}

fn attribute_value_text(value_node: Node, source: &str) -> String {
    if value_node.kind() == "quoted_attribute_value" {
        let mut cursor = value_node.walk();
        value_node
            .children(&mut cursor)
            .find(|c| c.kind() == "attribute_value")
            .map(|c| node_text(c, source).to_string())
            .unwrap_or_default()
    } else {
        node_text(value_node, source).to_string()
    }
}

fn extract_imports(root: Node, source: &str) -> Vec<String> {
    let mut imports = Vec::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        match node.kind() {
            "element" => {
                if let Some(tag) = first_child_of_kind(&node, &["start_tag", "self_closing_tag"]) {
                    if let Some(name) = first_child_of_kind(&tag, &["tag_name"]) {
                        if node_text(name, source) == "link" {
                            if let Some((_, href)) = attributes(tag, source).into_iter().find(|(k, _)| k == "href") {
                                imports.push(href);
                            }
                        }
                    }
                }
            }
            "script_element" => {
                if let Some(tag) = first_child_of_kind(&node, &["start_tag"]) {
                    if let Some((_, src)) = attributes(tag, source).into_iter().find(|(k, _)| k == "src") {
                        imports.push(src);
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

    const PAGE: &str = include_str!("../../testdata/html/page.html");

    #[test]
    fn element_ids_suffix_the_name() {
        let out = HtmlParser.extract(PAGE).unwrap();
        let header = out.symbols.iter().find(|s| s.name == "div#app").unwrap();
        assert_eq!(header.kind, SymbolKind::Element);
    }

    #[test]
    fn nested_elements_get_parent() {
        let out = HtmlParser.extract(PAGE).unwrap();
        let button = out.symbols.iter().find(|s| s.name == "button").unwrap();
        assert_eq!(button.parent, "div#app");
    }

    #[test]
    fn script_and_style_are_terminal() {
        let out = HtmlParser.extract(PAGE).unwrap();
        assert!(out.symbols.iter().any(|s| s.kind == SymbolKind::Script));
        assert!(out.symbols.iter().any(|s| s.kind == SymbolKind::Style));
    }

    #[test]
    fn link_and_script_src_are_imports() {
        let out = HtmlParser.extract(PAGE).unwrap();
        assert!(out.imports.iter().any(|i| i == "styles.css"));
        assert!(out.imports.iter().any(|i| i == "app.js"));
    }
}
