//! Markdown parser (§4.2.7). Two AST passes plus a regex link pass.

use regex::Regex;
use tree_sitter::{Node, Parser};

use crate::error::ChunkError;
use crate::model::{Symbol, SymbolKind, Visibility};
use crate::parsers::{collect_parse_errors, end_line, first_child_of_kind, node_text, start_line, LanguageParser, ParseOutput};
use crate::registry::{self, LanguageId};
use crate::util::{byte_offset_of_line, split_lines};

pub struct MarkdownParser;

impl LanguageParser for MarkdownParser {
    fn language_name(&self) -> &'static str {
        "markdown"
    }

    fn extract(&self, source: &str) -> crate::error::Result<ParseOutput> {
        let mut out = ParseOutput::default();
        let language = registry::grammar_for(LanguageId::Markdown, false)
            .ok_or_else(|| ChunkError::ParseInitFailure { language: self.language_name().to_string() })?;
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .map_err(|_| ChunkError::ParseInitFailure { language: self.language_name().to_string() })?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ChunkError::ParseFailure { language: self.language_name().to_string() })?;

        out.parse_errors = collect_parse_errors(tree.root_node());

        let mut flat = Vec::new();
        collect_relevant(tree.root_node(), &mut flat);

        let mut symbols = pass_a(&flat, source);
        fix_up_heading_ranges(&mut symbols, source);
        let mut link_symbols = link_pass(source, &symbols);
        symbols.append(&mut link_symbols);

        out.imports = symbols
            .iter()
            .filter(|s| s.kind == SymbolKind::Link)
            .filter_map(|s| s.signature.clone())
            .filter(|url| !url.starts_with("http://") && !url.starts_with("https://"))
            .collect();

        out.symbols = symbols;
        Ok(out)
    }
}

fn collect_relevant<'a>(node: Node<'a>, out: &mut Vec<Node<'a>>) {
    if matches!(
        node.kind(),
        "atx_heading" | "setext_heading" | "fenced_code_block" | "indented_code_block"
    ) {
        out.push(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_relevant(child, out);
    }
}

/// Pass A: emit headings (tracking a level stack for `parent`) and code
/// blocks (parented to the top of that stack).
fn pass_a(flat: &[Node], source: &str) -> Vec<Symbol> {
    let mut symbols = Vec::new();
    let mut stack: Vec<(u8, String)> = Vec::new();

    for &node in flat {
        match node.kind() {
            "atx_heading" | "setext_heading" => {
                let level = heading_level(node, source);
                let name = heading_text(node, source);
                while stack.last().is_some_and(|(l, _)| *l >= level) {
                    stack.pop();
                }
                let parent = stack.last().map(|(_, n)| n.clone()).unwrap_or_default();
                symbols.push(Symbol {
                    name: name.clone(),
                    kind: SymbolKind::Heading,
                    start_line: start_line(node),
                    end_line: end_line(node),
                    start_byte: node.start_byte() as u32,
                    end_byte: node.end_byte() as u32,
                    source: node_text(node, source).to_string(),
                    signature: Some(format!("h{level}")),
                    parent,
                    visibility: Visibility::Public,
                    doc_string: None,
                });
                stack.push((level, name));
            }
            "fenced_code_block" | "indented_code_block" => {
                let parent = stack.last().map(|(_, n)| n.clone()).unwrap_or_default();
                let lang = first_child_of_kind(&node, &["info_string"]).map(|n| node_text(n, source).trim().to_string());
                let name = match &lang {
                    Some(l) if !l.is_empty() => format!("code:{l}"),
                    _ => "code".to_string(),
                };
                symbols.push(Symbol {
                    name,
                    kind: SymbolKind::CodeBlock,
                    start_line: start_line(node),
                    end_line: end_line(node),
                    start_byte: node.start_byte() as u32,
                    end_byte: node.end_byte() as u32,
                    source: node_text(node, source).to_string(),
                    signature: lang,
                    parent,
                    visibility: Visibility::Public,
                    doc_string: None,
                });
            }
            _ => {}
        }
    }
    symbols
}

fn heading_level(node: Node, source: &str) -> u8 {
    if node.kind() == "atx_heading" {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            let kind = child.kind();
            if let Some(rest) = kind.strip_prefix("atx_h").and_then(|s| s.strip_suffix("_marker")) {
                if let Ok(n) = rest.parse::<u8>() {
                    return n;
                }
            }
        }
        let _ = source;
        1
    } else {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "setext_h1_underline" => return 1,
                "setext_h2_underline" => return 2,
                _ => {}
            }
        }
        1
    }
}

fn heading_text(node: Node, source: &str) -> String {
    let inline = first_child_of_kind(&node, &["inline", "paragraph"]);
    inline
        .map(|n| node_text(n, source).trim().trim_matches('#').trim().to_string())
        .unwrap_or_default()
}

/// Pass B: for each heading at level L, find the next heading with level
/// <= L; cap its `end_line` one line before that heading (or EOF), then
/// expand `source` to the full span.
fn fix_up_heading_ranges(symbols: &mut [Symbol], source: &str) {
    let lines = split_lines(source);
    let total_lines = lines.len() as u32;

    let heading_indices: Vec<usize> = symbols
        .iter()
        .enumerate()
        .filter(|(_, s)| s.kind == SymbolKind::Heading)
        .map(|(i, _)| i)
        .collect();

    let levels: Vec<u8> = heading_indices
        .iter()
        .map(|&i| symbols[i].signature.as_deref().and_then(|s| s.strip_prefix('h')).and_then(|n| n.parse().ok()).unwrap_or(1))
        .collect();
    let starts: Vec<u32> = heading_indices.iter().map(|&i| symbols[i].start_line).collect();

    for (pos, &idx) in heading_indices.iter().enumerate() {
        let level = levels[pos];
        let mut end_line = total_lines;
        for j in (pos + 1)..heading_indices.len() {
            if levels[j] <= level {
                end_line = starts[j].saturating_sub(1);
                break;
            }
        }
        let start_line = symbols[idx].start_line;
        let end_line = end_line.max(start_line);
        symbols[idx].end_line = end_line;
        let new_source = lines[(start_line as usize - 1)..(end_line as usize).min(lines.len())].join("\n");
        symbols[idx].end_byte = byte_offset_of_line(&lines, end_line + 1).saturating_sub(1).max(symbols[idx].start_byte);
        symbols[idx].source = new_source;
    }
}

fn link_pass(source: &str, headings: &[Symbol]) -> Vec<Symbol> {
    let re = Regex::new(r"\[([^\]]*)\]\(([^)]+)\)").unwrap();
    let mut links = Vec::new();
    for m in re.find_iter(source) {
        let line = source[..m.start()].matches('\n').count() as u32 + 1;
        let caps = re.captures(m.as_str()).unwrap();
        let url = caps.get(2).map(|g| g.as_str().to_string()).unwrap_or_default();
        let text = caps.get(1).map(|g| g.as_str().to_string()).unwrap_or_default();
        let parent = headings
            .iter()
            .filter(|h| h.kind == SymbolKind::Heading && h.start_line <= line)
            .max_by_key(|h| h.start_line)
            .map(|h| h.name.clone())
            .unwrap_or_default();
        links.push(Symbol {
            name: text,
            kind: SymbolKind::Link,
            start_line: line,
            end_line: line,
            start_byte: m.start() as u32,
            end_byte: m.end() as u32,
            source: m.as_str().to_string(),
            signature: Some(url),
            parent,
            visibility: Visibility::Public,
            doc_string: None,
        });
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = include_str!("../../testdata/markdown/guide.md");

    #[test]
    fn heading_stack_assigns_nested_parents() {
        let out = MarkdownParser.extract(DOC).unwrap();
        let usage = out.symbols.iter().find(|s| s.name == "Usage").unwrap();
        assert_eq!(usage.parent, "Guide");
        let install = out.symbols.iter().find(|s| s.name == "Install").unwrap();
        assert_eq!(install.parent, "Usage");
    }

    #[test]
    fn code_block_parent_and_language() {
        let out = MarkdownParser.extract(DOC).unwrap();
        let code = out.symbols.iter().find(|s| s.kind == SymbolKind::CodeBlock).unwrap();
        assert_eq!(code.name, "code:bash");
        assert_eq!(code.parent, "Install");
    }

    #[test]
    fn heading_range_stops_before_sibling() {
        let out = MarkdownParser.extract(DOC).unwrap();
        let usage = out.symbols.iter().find(|s| s.name == "Usage").unwrap();
        let faq = out.symbols.iter().find(|s| s.name == "FAQ").unwrap();
        assert!(usage.end_line < faq.start_line);
    }

    #[test]
    fn internal_links_become_imports() {
        let out = MarkdownParser.extract(DOC).unwrap();
        assert!(out.imports.iter().any(|i| i == "./CONTRIBUTING.md"));
        assert!(!out.imports.iter().any(|i| i.starts_with("https://")));
    }
}
