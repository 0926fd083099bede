//! Vue SFC parser (§4.2.6). No dedicated grammar tracks current tree-sitter
//! ABI versions, so the file is split into `<template>`/`<script>`/`<style>`
//! sections with regex, each reparsed with its own language parser, and the
//! resulting symbols rebased into the outer file's coordinate space.

use regex::Regex;
use std::sync::OnceLock;

use crate::model::{Symbol, SymbolKind, Visibility};
use crate::parsers::html::HtmlParser;
use crate::parsers::js_ts::JsTsParser;
use crate::parsers::css::CssParser;
use crate::parsers::{LanguageParser, ParseOutput};

pub struct VueParser;

fn template_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<template[^>]*>(.*?)</template>").unwrap())
}

fn script_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<script([^>]*)>(.*?)</script>").unwrap())
}

fn style_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<style[^>]*>(.*?)</style>").unwrap())
}

fn lang_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"lang\s*=\s*["']([^"']+)["']"#).unwrap())
}

impl LanguageParser for VueParser {
    fn language_name(&self) -> &'static str {
        "vue"
    }

    fn extract(&self, source: &str) -> crate::error::Result<ParseOutput> {
        let mut out = ParseOutput::default();

        for m in template_re().captures_iter(source) {
            let whole = m.get(0).unwrap();
            let inner = m.get(1).unwrap();
            let parser = HtmlParser;
            process_section(source, whole.range(), inner.range(), "template", SymbolKind::Element, &parser, &mut out)?;
        }

        for m in script_re().captures_iter(source) {
            let whole = m.get(0).unwrap();
            let attrs = m.get(1).map(|a| a.as_str()).unwrap_or("");
            let inner = m.get(2).unwrap();
            let lang = lang_re()
                .captures(attrs)
                .and_then(|c| c.get(1))
                .map(|g| g.as_str().to_ascii_lowercase());
            let parser: Box<dyn LanguageParser> = match lang.as_deref() {
                Some("ts") | Some("typescript") => Box::new(JsTsParser::typescript()),
                Some("tsx") => Box::new(JsTsParser::tsx()),
                _ => Box::new(JsTsParser::javascript()),
            };
            process_section(source, whole.range(), inner.range(), "script", SymbolKind::Script, parser.as_ref(), &mut out)?;
        }

        for m in style_re().captures_iter(source) {
            let whole = m.get(0).unwrap();
            let inner = m.get(1).unwrap();
            let parser = CssParser;
            process_section(source, whole.range(), inner.range(), "style", SymbolKind::Style, &parser, &mut out)?;
        }

        Ok(out)
    }
}

fn line_of(source: &str, byte: usize) -> u32 {
    source[..byte].matches('\n').count() as u32 + 1
}

fn process_section(
    source: &str,
    whole: std::ops::Range<usize>,
    inner: std::ops::Range<usize>,
    name: &str,
    kind: SymbolKind,
    parser: &dyn LanguageParser,
    out: &mut ParseOutput,
) -> crate::error::Result<()> {
    let section_start_line = line_of(source, whole.start);
    let section_end_line = line_of(source, whole.end);
    out.symbols.push(Symbol {
        name: name.to_string(),
        kind,
        start_line: section_start_line,
        end_line: section_end_line,
        start_byte: whole.start as u32,
        end_byte: whole.end as u32,
        source: source[whole.clone()].to_string(),
        signature: None,
        parent: String::new(),
        visibility: Visibility::Public,
        doc_string: None,
    });

    let inner_source = &source[inner.clone()];
    let inner_out = parser.extract(inner_source)?;
    let opening_lines = line_of(source, inner.start) - 1;

    for mut sym in inner_out.symbols {
        sym.start_line += opening_lines;
        sym.end_line += opening_lines;
        sym.start_byte += inner.start as u32;
        sym.end_byte += inner.start as u32;
        if sym.parent.is_empty() {
            sym.parent = name.to_string();
        }
        out.symbols.push(sym);
    }
    out.imports.extend(inner_out.imports);

    for mut err in inner_out.parse_errors {
        err.line += opening_lines;
        out.parse_errors.push(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPONENT: &str = include_str!("../../testdata/vue/Counter.vue");

    #[test]
    fn emits_one_section_symbol_per_block() {
        let out = VueParser.extract(COMPONENT).unwrap();
        assert!(out.symbols.iter().any(|s| s.name == "template" && s.kind == SymbolKind::Element));
        assert!(out.symbols.iter().any(|s| s.name == "script" && s.kind == SymbolKind::Script));
        assert!(out.symbols.iter().any(|s| s.name == "style" && s.kind == SymbolKind::Style));
    }

    #[test]
    fn script_lang_ts_selects_typescript_grammar() {
        let out = VueParser.extract(COMPONENT).unwrap();
        let increment = out.symbols.iter().find(|s| s.name == "increment").unwrap();
        assert_eq!(increment.parent, "script");
    }

    #[test]
    fn rebased_symbols_point_past_the_opening_tag() {
        let out = VueParser.extract(COMPONENT).unwrap();
        let script_section = out.symbols.iter().find(|s| s.name == "script").unwrap();
        let increment = out.symbols.iter().find(|s| s.name == "increment").unwrap();
        assert!(increment.start_line > script_section.start_line);
    }

    #[test]
    fn template_elements_are_reparented_to_template() {
        let out = VueParser.extract(COMPONENT).unwrap();
        let button = out.symbols.iter().find(|s| s.name == "button").unwrap();
        assert_eq!(button.parent, "template");
    }

    #[test]
    fn imports_combine_script_and_style() {
        let out = VueParser.extract(COMPONENT).unwrap();
        assert!(out.imports.iter().any(|i| i == "./shared.css"));
    }

    #[test]
    fn parse_errors_inside_a_section_are_collected() {
        let broken = "<script>\nconst x = ;\n</script>\n";
        let out = VueParser.extract(broken).unwrap();
        assert!(!out.parse_errors.is_empty());
        let err = &out.parse_errors[0];
        assert!(err.line >= 2, "expected the error rebased past the opening tag, got line {}", err.line);
    }
}
